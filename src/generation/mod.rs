pub mod openai;

use crate::error::ReplyError;
use crate::prompt::Prompt;
use async_trait::async_trait;

pub use openai::OpenAiGenerator;

/// Produces raw candidate text for a prompt.
///
/// One call is one attempt. The returned text is trimmed but not yet
/// validated.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, prompt: &Prompt, credential: &str) -> Result<String, ReplyError>;
}
