use crate::post::PostContext;

/// System instruction shared by every generation request.
pub const SYSTEM_INSTRUCTION: &str = "You are an AI reply generator for Twitter/X. Analyze the tweet content and existing replies to generate a contextually relevant, single-sentence response that adds value to the conversation.

CRITICAL REQUIREMENTS:
- Generate reply ONLY if you can add meaningful value based on tweet content and existing replies
- Must be ONE simple sentence under 90 characters
- Must be directly relevant to the conversation context
- NO questions unless absolutely necessary
- NO generic advice
- NO promotional language
- Focus on adding specific value to the ongoing discussion";

const REQUIREMENTS_BLOCK: &str = "REQUIREMENTS:
- Reply must be directly relevant to the specific conversation
- Must add unique value based on the context
- Must be under 90 characters
- Must be a single, simple sentence
- Must avoid generic responses
- Only reply if you can add meaningful value

Reply:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Numbered `n. author: "content"` lines for every extracted reply.
///
/// All replies are listed, including the short ones the eligibility check
/// does not count.
fn conversation_block(ctx: &PostContext) -> String {
    if ctx.replies.is_empty() {
        return String::new();
    }

    let lines: Vec<String> = ctx
        .replies
        .iter()
        .enumerate()
        .map(|(idx, reply)| format!("{}. {}: \"{}\"", idx + 1, reply.author, reply.content))
        .collect();

    format!(
        "Existing conversation context (analyze these replies):\n{}",
        lines.join("\n")
    )
}

pub fn build_prompt(ctx: &PostContext) -> Prompt {
    let user = format!(
        "Analyze this conversation and generate a contextually relevant reply:\n\nOriginal Tweet by {}: \"{}\"\n\n{}\n\n{}",
        ctx.author_handle,
        ctx.body_text,
        conversation_block(ctx),
        REQUIREMENTS_BLOCK
    );

    Prompt {
        system: SYSTEM_INSTRUCTION.to_string(),
        user,
    }
}
