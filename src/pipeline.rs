use crate::bridge::PageHandle;
use crate::error::ReplyError;
use crate::gate::{check_eligibility, validate_candidate};
use crate::generation::ReplyGenerator;
use crate::post::{GeneratedReply, PostContext, SavedReply};
use crate::prompt::build_prompt;
use crate::store::{CredentialStore, ReplyStore};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AcceptedReply {
    pub reply: GeneratedReply,
    pub saved: SavedReply,
}

/// One generate action: extract, gate, prompt, call, validate, persist.
///
/// Stages run strictly in sequence. Two overlapping runs for the same post
/// both persist their result.
pub struct ReplyPipeline {
    generator: Arc<dyn ReplyGenerator>,
    credentials: CredentialStore,
    replies: ReplyStore,
}

impl ReplyPipeline {
    pub fn new(
        generator: Arc<dyn ReplyGenerator>,
        credentials: CredentialStore,
        replies: ReplyStore,
    ) -> Self {
        Self {
            generator,
            credentials,
            replies,
        }
    }

    pub fn replies(&self) -> &ReplyStore {
        &self.replies
    }

    pub async fn generate_for_page(&self, page: &PageHandle) -> Result<AcceptedReply, ReplyError> {
        let ctx = page.get_context().await?.ok_or(ReplyError::NoContext)?;
        self.generate(&ctx).await
    }

    pub async fn generate(&self, ctx: &PostContext) -> Result<AcceptedReply, ReplyError> {
        let outcome = self.run(ctx).await;
        match &outcome {
            Err(e) if e.is_refusal() => {
                tracing::info!(post_id = %ctx.post_id, reason = %e, "generation not attempted");
            }
            Err(e) => {
                tracing::warn!(post_id = %ctx.post_id, error = %e, "generation failed");
            }
            Ok(_) => {}
        }
        outcome
    }

    async fn run(&self, ctx: &PostContext) -> Result<AcceptedReply, ReplyError> {
        let credential = self.credentials.get().await;
        check_eligibility(ctx, &credential)?;

        let prompt = build_prompt(ctx);
        tracing::debug!(post_id = %ctx.post_id, "calling generation service");
        let candidate = self.generator.generate(&prompt, &credential).await?;

        let reply = validate_candidate(&candidate)?;
        let saved = self.replies.append(&ctx.post_id, reply.text()).await?;

        Ok(AcceptedReply { reply, saved })
    }
}
