//! Request/response channel between a page process and the control side.
//!
//! The page side answers `getContext` and `insertReply` requests and emits a
//! single `contextReady` notification when it starts. The control side keeps
//! per-page activation state in [`tabs::TabTracker`].

pub mod page;
pub mod tabs;

use std::fmt;

pub use page::{InsertReplyError, PageDocument, PageHandle, PageProcess};
pub use tabs::{EntryPoint, TabActivationState, TabTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u64);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page-{}", self.0)
    }
}

/// Lifecycle notifications consumed by the tab tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    NavigationComplete { page: PageId, url: String },
    ContextReady { page: PageId, url: String },
    PageClosed { page: PageId },
}
