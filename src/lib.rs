pub mod bridge;
pub mod config;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod generation;
pub mod pipeline;
pub mod post;
pub mod prompt;
pub mod storage;
pub mod store;

pub use error::{ReplyError, StorageError};
pub use pipeline::{AcceptedReply, ReplyPipeline};
pub use post::{GeneratedReply, PostContext, ReplyExcerpt, SavedReply};
