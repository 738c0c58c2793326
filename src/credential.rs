pub const CREDENTIAL_PREFIX: &str = "gsk_";
pub const CREDENTIAL_BODY_MIN_LEN: usize = 40;
pub const CREDENTIAL_BODY_MAX_LEN: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("enter an API key to start the pipeline")]
    Missing,
    #[error("invalid API key format: expected `gsk_` followed by 40-60 letters or digits")]
    InvalidFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    NoCredential,
    CredentialInvalid,
    Ready,
}

impl std::fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCredential => write!(f, "no_credential"),
            Self::CredentialInvalid => write!(f, "credential_invalid"),
            Self::Ready => write!(f, "ready"),
        }
    }
}

/// A key that passed the format check. The secret never appears in `Debug`
/// output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn parse(raw: &str) -> Result<Self, CredentialError> {
        if validate_credential(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(CredentialError::InvalidFormat)
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential({CREDENTIAL_PREFIX}***)")
    }
}

/// Format check only; the key is not verified against the remote service.
pub fn validate_credential(secret: &str) -> bool {
    let Some(body) = secret.strip_prefix(CREDENTIAL_PREFIX) else {
        return false;
    };
    (CREDENTIAL_BODY_MIN_LEN..=CREDENTIAL_BODY_MAX_LEN).contains(&body.len())
        && body.bytes().all(|b| b.is_ascii_alphanumeric())
}

pub fn check_credential(input: Option<&str>) -> Result<Credential, CredentialError> {
    match input {
        None => Err(CredentialError::Missing),
        Some(raw) if raw.trim().is_empty() => Err(CredentialError::Missing),
        Some(raw) => Credential::parse(raw),
    }
}
