use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One existing reply under the post, as read from the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyExcerpt {
    pub reply_id: String,
    pub content: String,
    pub author: String,
}

/// Conversation snapshot of a single post page.
///
/// Built fresh for every extraction request and dropped after one
/// generation cycle. `replies` never contains the post itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostContext {
    pub post_id: String,
    pub body_text: String,
    pub author_handle: String,
    pub replies: Vec<ReplyExcerpt>,
}

/// A candidate that passed structural validation.
///
/// Only [`crate::gate::validate_candidate`] constructs one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReply {
    text: String,
}

impl GeneratedReply {
    pub(crate) fn accepted(text: String) -> Self {
        Self { text }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedReply {
    pub id: Uuid,
    pub content: String,
    pub post_id: String,
    pub created_at_millis: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_reply_json_shape() {
        let reply = SavedReply {
            id: Uuid::nil(),
            content: "Solid numbers".to_string(),
            post_id: "42".to_string(),
            created_at_millis: 1_700_000_000_000,
        };
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["postId"], "42");
        assert_eq!(value["createdAtMillis"], 1_700_000_000_000i64);
        assert_eq!(value["content"], "Solid numbers");
    }

    #[test]
    fn test_post_context_uses_camel_case() {
        let ctx = PostContext {
            post_id: "1".to_string(),
            body_text: "body".to_string(),
            author_handle: "Unknown".to_string(),
            replies: vec![ReplyExcerpt {
                reply_id: "2".to_string(),
                content: "hi".to_string(),
                author: "someone".to_string(),
            }],
        };
        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["bodyText"], "body");
        assert_eq!(value["replies"][0]["replyId"], "2");
    }
}
