use crate::error::ReplyError;
use crate::post::{GeneratedReply, PostContext, ReplyExcerpt};

pub const MIN_BODY_CHARS: usize = 10;
pub const MEANINGFUL_REPLY_CHARS: usize = 15;
pub const MIN_MEANINGFUL_REPLIES: usize = 2;
pub const MAX_REPLY_CHARS: usize = 90;

const FORBIDDEN_MARKERS: [char; 2] = ['?', ';'];

/// Length in UTF-16 code units, the unit the limits above are defined in.
/// An emoji outside the BMP counts as two.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// A reply counts toward eligibility when its trimmed text is longer than
/// [`MEANINGFUL_REPLY_CHARS`].
pub fn is_meaningful(reply: &ReplyExcerpt) -> bool {
    utf16_len(reply.content.trim()) > MEANINGFUL_REPLY_CHARS
}

pub fn meaningful_reply_count(ctx: &PostContext) -> usize {
    ctx.replies.iter().filter(|r| is_meaningful(r)).count()
}

/// Decide whether a generation attempt is worth making.
///
/// Checks run in order and the first failure wins: credential, body
/// length, then conversation depth.
pub fn check_eligibility(ctx: &PostContext, credential: &str) -> Result<(), ReplyError> {
    if credential.is_empty() {
        return Err(ReplyError::MissingCredential);
    }

    if utf16_len(ctx.body_text.trim()) < MIN_BODY_CHARS {
        return Err(ReplyError::InsufficientContext);
    }

    if meaningful_reply_count(ctx) < MIN_MEANINGFUL_REPLIES {
        return Err(ReplyError::InsufficientConversation);
    }

    Ok(())
}

/// Accept or reject a raw completion.
///
/// The text is trimmed first; anything over [`MAX_REPLY_CHARS`] or carrying
/// a question mark or semicolon is rejected.
pub fn validate_candidate(raw: &str) -> Result<GeneratedReply, ReplyError> {
    let text = raw.trim();

    if utf16_len(text) > MAX_REPLY_CHARS || text.contains(FORBIDDEN_MARKERS) {
        tracing::debug!(candidate = text, "rejected candidate");
        return Err(ReplyError::InvalidCandidate);
    }

    Ok(GeneratedReply::accepted(text.to_string()))
}
