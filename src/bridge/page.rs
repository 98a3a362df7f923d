use super::{BridgeEvent, PageId};
use crate::error::ReplyError;
use crate::extractor::{extract_post_context, has_reply_input};
use crate::post::PostContext;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

const REQUEST_BUFFER: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsertReplyError {
    #[error("Could not find reply box")]
    ReplyBoxNotFound,
    #[error("No reply text provided")]
    EmptyText,
}

/// Snapshot of one loaded page plus whatever was typed into its reply box.
#[derive(Debug, Clone)]
pub struct PageDocument {
    url: String,
    html: String,
    reply_draft: Option<String>,
}

impl PageDocument {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            reply_draft: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn reply_draft(&self) -> Option<&str> {
        self.reply_draft.as_deref()
    }

    pub fn get_context(&self) -> Option<PostContext> {
        extract_post_context(&self.url, &self.html)
    }

    /// Put `text` into the reply input, replacing any previous draft.
    pub fn insert_reply(&mut self, text: &str) -> Result<(), InsertReplyError> {
        if text.is_empty() {
            return Err(InsertReplyError::EmptyText);
        }
        if !has_reply_input(&self.html) {
            return Err(InsertReplyError::ReplyBoxNotFound);
        }

        self.reply_draft = Some(text.to_string());
        Ok(())
    }
}

enum PageRequest {
    GetContext {
        reply: oneshot::Sender<Option<PostContext>>,
    },
    InsertReply {
        text: String,
        reply: oneshot::Sender<Result<(), InsertReplyError>>,
    },
}

/// Control-side handle to a running page process. The page shuts down once
/// every handle is dropped.
#[derive(Clone)]
pub struct PageHandle {
    id: PageId,
    requests: mpsc::Sender<PageRequest>,
}

impl PageHandle {
    pub async fn get_context(&self) -> Result<Option<PostContext>, ReplyError> {
        let (reply, response) = oneshot::channel();
        self.request(PageRequest::GetContext { reply }).await?;
        response.await.map_err(|_| ReplyError::ContentScriptUnavailable)
    }

    pub async fn insert_reply(
        &self,
        text: &str,
    ) -> Result<Result<(), InsertReplyError>, ReplyError> {
        let (reply, response) = oneshot::channel();
        self.request(PageRequest::InsertReply {
            text: text.to_string(),
            reply,
        })
        .await?;
        response.await.map_err(|_| ReplyError::ContentScriptUnavailable)
    }

    async fn request(&self, request: PageRequest) -> Result<(), ReplyError> {
        self.requests.send(request).await.map_err(|_| {
            tracing::warn!(page = %self.id, "page process is not reachable");
            ReplyError::ContentScriptUnavailable
        })
    }
}

/// Reports the page as closed when dropped, so the tracker forgets it
/// whether the task finishes, panics or is aborted.
struct CloseNotice {
    page: PageId,
    events: mpsc::UnboundedSender<BridgeEvent>,
}

impl Drop for CloseNotice {
    fn drop(&mut self) {
        let _ = self.events.send(BridgeEvent::PageClosed { page: self.page });
    }
}

pub struct PageProcess;

impl PageProcess {
    /// Start serving `document` on its own task.
    ///
    /// Sends `ContextReady` once on start and `PageClosed` when the task
    /// ends for any reason. The task resolves to the final document once
    /// the last handle is dropped.
    pub fn spawn(
        id: PageId,
        mut document: PageDocument,
        events: mpsc::UnboundedSender<BridgeEvent>,
    ) -> (PageHandle, JoinHandle<PageDocument>) {
        let (tx, mut rx) = mpsc::channel(REQUEST_BUFFER);
        let notice = CloseNotice { page: id, events };

        let task = tokio::spawn(async move {
            let _ = notice.events.send(BridgeEvent::ContextReady {
                page: id,
                url: document.url().to_string(),
            });

            while let Some(request) = rx.recv().await {
                match request {
                    PageRequest::GetContext { reply } => {
                        let _ = reply.send(document.get_context());
                    }
                    PageRequest::InsertReply { text, reply } => {
                        let outcome = document.insert_reply(&text);
                        if let Err(e) = &outcome {
                            tracing::warn!(page = %id, error = %e, "insert reply failed");
                        }
                        let _ = reply.send(outcome);
                    }
                }
            }

            drop(notice);
            document
        });

        (PageHandle { id, requests: tx }, task)
    }
}
