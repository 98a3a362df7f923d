use thiserror::Error;

/// Failures of the key/value persistence substrate.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Every way a generate cycle can end without an accepted reply.
///
/// None of these are fatal; each resolves to a status line via
/// [`ReplyError::status_message`] and the next attempt starts clean.
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("Could not extract tweet data. Make sure you're on a tweet page.")]
    NoContext,
    #[error("OpenAI API key is required")]
    MissingCredential,
    #[error("Tweet content is too short to generate a meaningful reply")]
    InsufficientContext,
    #[error("Not enough meaningful replies to generate contextual response")]
    InsufficientConversation,
    #[error("{0}")]
    GenerationService(String),
    #[error("Generated reply does not meet requirements")]
    InvalidCandidate,
    #[error("Failed to save reply")]
    Persistence(#[source] StorageError),
    #[error("Content script not loaded. Try refreshing the page.")]
    ContentScriptUnavailable,
}

impl ReplyError {
    pub fn status_message(&self) -> String {
        self.to_string()
    }

    /// Eligibility refusals: generation was never attempted.
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            ReplyError::MissingCredential
                | ReplyError::InsufficientContext
                | ReplyError::InsufficientConversation
        )
    }
}
