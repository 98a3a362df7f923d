use super::ReplyGenerator;
use crate::config::GenerationConfig;
use crate::error::ReplyError;
use crate::prompt::Prompt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const UNKNOWN_SERVICE_ERROR: &str = "Unknown error occurred";
const EMPTY_COMPLETION: &str = "Generation service returned no completion";

pub struct OpenAiGenerator {
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

impl OpenAiGenerator {
    pub fn new(config: &GenerationConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("reply-assist/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            client,
        }
    }
}

fn service_error(message: impl Into<String>) -> ReplyError {
    let message = message.into();
    tracing::warn!(%message, "generation service failed");
    ReplyError::GenerationService(message)
}

#[async_trait]
impl ReplyGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &Prompt, credential: &str) -> Result<String, ReplyError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "requesting completion");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", credential))
            .json(&request)
            .send()
            .await
            .map_err(|e| service_error(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| service_error(e.to_string()))?;
        let parsed = serde_json::from_str::<ChatResponse>(&body).ok();

        if !status.is_success() {
            let message = parsed
                .and_then(|r| r.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| UNKNOWN_SERVICE_ERROR.to_string());
            return Err(service_error(message));
        }

        parsed
            .and_then(|r| r.choices.into_iter().next())
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| service_error(EMPTY_COMPLETION))
    }
}
