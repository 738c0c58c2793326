use crate::credential::{check_credential, Credential, CredentialError, CredentialStatus};
use crate::pipeline::{PipelineError, Stage, StageInput, StageStatus};
use crate::runtime::now_millis;
use crate::shared::generate_session_id;
use std::collections::{BTreeMap, BTreeSet};

/// Proof that a stage invocation is in flight. Hand it back through
/// [`Session::finish_stage`] or [`Session::abandon_stage`].
#[derive(Debug)]
#[must_use = "an unreleased ticket keeps the stage busy"]
pub struct StageTicket {
    stage: Stage,
}

#[derive(Debug, Clone)]
pub struct Session {
    session_id: String,
    student_id: Option<String>,
    model: Option<String>,
    model_lock_released: bool,
    credential_status: CredentialStatus,
    credential: Option<Credential>,
    problem_statement: String,
    outputs: BTreeMap<Stage, String>,
    in_flight: BTreeSet<Stage>,
}

impl Session {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            student_id: None,
            model: None,
            model_lock_released: false,
            credential_status: CredentialStatus::NoCredential,
            credential: None,
            problem_statement: String::new(),
            outputs: BTreeMap::new(),
            in_flight: BTreeSet::new(),
        }
    }

    pub fn start() -> Result<Self, String> {
        Ok(Self::new(generate_session_id(now_millis())?))
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Runs the credential gate. A rejected or missing key clears any key
    /// accepted earlier, which locks every stage that is not yet complete.
    pub fn enter_credential(&mut self, input: Option<&str>) -> Result<(), CredentialError> {
        match check_credential(input) {
            Ok(credential) => {
                self.credential = Some(credential);
                self.credential_status = CredentialStatus::Ready;
                Ok(())
            }
            Err(err) => {
                self.credential = None;
                self.credential_status = match err {
                    CredentialError::Missing => CredentialStatus::NoCredential,
                    CredentialError::InvalidFormat => CredentialStatus::CredentialInvalid,
                };
                Err(err)
            }
        }
    }

    pub fn credential_status(&self) -> CredentialStatus {
        self.credential_status
    }

    pub fn credential(&self) -> Result<&Credential, PipelineError> {
        match (&self.credential, self.credential_status) {
            (Some(credential), CredentialStatus::Ready) => Ok(credential),
            (_, CredentialStatus::CredentialInvalid) => {
                Err(PipelineError::Credential(CredentialError::InvalidFormat))
            }
            _ => Err(PipelineError::Credential(CredentialError::Missing)),
        }
    }

    pub fn set_student_id(&mut self, raw: &str) {
        let trimmed = raw.trim();
        self.student_id = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    pub fn student_id(&self) -> Option<&str> {
        self.student_id.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn is_model_locked(&self) -> bool {
        self.model.is_some() && !self.model_lock_released
    }

    /// Selecting the model that is already locked in is a no-op.
    pub fn select_model(&mut self, requested: &str) -> Result<(), PipelineError> {
        let requested = requested.trim();
        if requested.is_empty() {
            return Err(PipelineError::EmptyModel);
        }
        if let Some(current) = self.model.as_deref() {
            if self.is_model_locked() {
                if current == requested {
                    return Ok(());
                }
                return Err(PipelineError::ModelLocked {
                    current: current.to_string(),
                    requested: requested.to_string(),
                });
            }
        }
        self.model = Some(requested.to_string());
        self.model_lock_released = false;
        Ok(())
    }

    /// Returns the model in effect, locking in `fallback` when none was chosen.
    pub fn ensure_model(&mut self, fallback: &str) -> Result<String, PipelineError> {
        if let Some(model) = self.model.as_deref() {
            return Ok(model.to_string());
        }
        self.select_model(fallback)?;
        Ok(fallback.trim().to_string())
    }

    pub fn set_problem_statement(&mut self, text: &str) {
        self.problem_statement = text.to_string();
    }

    pub fn problem_statement(&self) -> &str {
        &self.problem_statement
    }

    pub fn output(&self, stage: Stage) -> Option<&str> {
        self.outputs.get(&stage).map(String::as_str)
    }

    pub fn outputs(&self) -> &BTreeMap<Stage, String> {
        &self.outputs
    }

    pub fn stage_status(&self, stage: Stage) -> StageStatus {
        if self.outputs.contains_key(&stage) {
            return StageStatus::Complete;
        }
        if self.credential_status != CredentialStatus::Ready {
            return StageStatus::Locked;
        }
        match stage.prerequisite() {
            Some(required) if !self.outputs.contains_key(&required) => StageStatus::Locked,
            _ => StageStatus::Available,
        }
    }

    /// Stages that are available but not yet complete.
    pub fn next_actions(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|stage| self.stage_status(*stage) == StageStatus::Available)
            .collect()
    }

    pub fn is_in_flight(&self, stage: Stage) -> bool {
        self.in_flight.contains(&stage)
    }

    /// Checks that `stage` may be invoked now. Complete stages may be re-run.
    pub fn ensure_invocable(&self, stage: Stage) -> Result<(), PipelineError> {
        self.credential()?;
        if let Some(required) = stage.prerequisite() {
            if !self.outputs.contains_key(&required) {
                return Err(PipelineError::StageLocked {
                    stage,
                    requires: required,
                });
            }
        }
        if self.in_flight.contains(&stage) {
            return Err(PipelineError::StageBusy { stage });
        }
        Ok(())
    }

    pub fn stage_input(&self, stage: Stage) -> Result<String, PipelineError> {
        match stage.input() {
            StageInput::ProblemStatement => {
                if self.problem_statement.trim().is_empty() {
                    return Err(PipelineError::MissingInput {
                        stage,
                        reason: "problem statement is empty".to_string(),
                    });
                }
                Ok(self.problem_statement.clone())
            }
            StageInput::Output(source) => {
                self.outputs
                    .get(&source)
                    .cloned()
                    .ok_or(PipelineError::StageLocked {
                        stage,
                        requires: source,
                    })
            }
        }
    }

    pub fn begin_stage(&mut self, stage: Stage) -> Result<StageTicket, PipelineError> {
        self.ensure_invocable(stage)?;
        self.in_flight.insert(stage);
        Ok(StageTicket { stage })
    }

    /// Stores `output`, overwriting any earlier run. Downstream outputs are
    /// left as they are.
    pub fn finish_stage(&mut self, ticket: StageTicket, output: String) {
        self.in_flight.remove(&ticket.stage);
        self.outputs.insert(ticket.stage, output);
        if ticket.stage.is_terminal() {
            self.model_lock_released = true;
        }
    }

    pub fn abandon_stage(&mut self, ticket: StageTicket) {
        self.in_flight.remove(&ticket.stage);
    }
}
