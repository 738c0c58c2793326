use crate::provider::{CompletionClient, CompletionError, DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BODY_EXCERPT_LIMIT: usize = 512;

/// OpenAI-compatible chat-completion client for the Groq endpoint.
#[derive(Debug, Clone)]
pub struct GroqClient {
    api_base: String,
    agent: ureq::Agent,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl Default for GroqClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT)
    }
}

impl GroqClient {
    pub fn new(api_base: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            api_base: api_base.to_string(),
            agent,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

impl CompletionClient for GroqClient {
    fn complete(
        &self,
        prompt: &str,
        credential: &str,
        model_id: &str,
    ) -> Result<String, CompletionError> {
        let endpoint = self.endpoint();
        let body = ChatRequest {
            model: model_id,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .agent
            .post(&endpoint)
            .set("Authorization", &format!("Bearer {credential}"))
            .send_json(&body)
            .map_err(|err| match err {
                ureq::Error::Status(status, response) => CompletionError::Status {
                    status,
                    body: body_excerpt(response.into_string().unwrap_or_default()),
                },
                ureq::Error::Transport(transport) => CompletionError::Transport {
                    endpoint: endpoint.clone(),
                    reason: transport.to_string(),
                },
            })?;

        let parsed: ChatResponse = response
            .into_json()
            .map_err(|err| CompletionError::InvalidResponse(err.to_string()))?;
        extract_content(parsed)
    }
}

fn extract_content(response: ChatResponse) -> Result<String, CompletionError> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();
    if content.trim().is_empty() {
        return Err(CompletionError::EmptyContent);
    }
    Ok(content)
}

fn body_excerpt(body: String) -> String {
    if body.len() <= BODY_EXCERPT_LIMIT {
        return body;
    }
    let mut cut = BODY_EXCERPT_LIMIT;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &body[..cut])
}
