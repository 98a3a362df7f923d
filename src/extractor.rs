use crate::post::{PostContext, ReplyExcerpt};
use scraper::{ElementRef, Html, Selector};
use url::Url;

pub const POST_TEXT_SELECTOR: &str = r#"[data-testid="tweetText"]"#;
pub const AUTHOR_SELECTOR: &str = r#"[data-testid="User-Name"]"#;
pub const POST_BLOCK_SELECTOR: &str = r#"[data-testid="tweet"]"#;
pub const REPLY_INPUT_SELECTOR: &str = r#"[data-testid="tweetTextarea_0"]"#;
const REPLY_ID_ATTR: &str = "data-tweet-id";

pub const UNKNOWN_AUTHOR: &str = "Unknown";
pub const EMPTY_TEXT: &str = "";
const EMPTY_REPLY_ID: &str = "";

pub const MAX_REPLIES: usize = 10;

const HOST_DOMAINS: [&str; 2] = ["twitter.com", "x.com"];

fn is_host_domain(host: &str) -> bool {
    HOST_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
}

/// True when the URL points anywhere on twitter.com or x.com.
pub fn is_host_page(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(is_host_domain))
        .unwrap_or(false)
}

/// Extract the numeric post id from a URL like x.com/{handle}/status/{id}.
pub fn post_id_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if !is_host_domain(parsed.host_str()?) {
        return None;
    }

    let mut segments = parsed.path_segments()?;
    let handle = segments.next()?;
    if handle.is_empty() || segments.next()? != "status" {
        return None;
    }

    // Only the leading digits count, so /status/123/photo/1 still resolves
    let id: String = segments
        .next()?
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

pub fn is_post_page(url: &str) -> bool {
    post_id_from_url(url).is_some()
}

/// Text content of the first match under `scope`, or `default` when the
/// element is missing or renders no text.
fn query_or(scope: ElementRef<'_>, selector: &Selector, default: &str) -> String {
    scope
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| default.to_string())
}

struct Selectors {
    post_text: Selector,
    author: Selector,
    post_block: Selector,
}

impl Selectors {
    fn parse() -> Option<Self> {
        Some(Self {
            post_text: Selector::parse(POST_TEXT_SELECTOR).ok()?,
            author: Selector::parse(AUTHOR_SELECTOR).ok()?,
            post_block: Selector::parse(POST_BLOCK_SELECTOR).ok()?,
        })
    }
}

/// Build a [`PostContext`] from a page snapshot.
///
/// Returns `None` when the URL is not a post page (the HTML is not parsed
/// at all in that case) or when the post body has not rendered yet. The
/// latter is worth retrying once the page settles.
pub fn extract_post_context(url: &str, html: &str) -> Option<PostContext> {
    let Some(post_id) = post_id_from_url(url) else {
        tracing::debug!(url, "not a post page");
        return None;
    };

    let document = Html::parse_document(html);
    let selectors = Selectors::parse()?;
    let root = document.root_element();

    if root.select(&selectors.post_text).next().is_none() {
        tracing::warn!(post_id = %post_id, "post body element not found");
        return None;
    }

    let body_text = query_or(root, &selectors.post_text, EMPTY_TEXT);
    let author_handle = query_or(root, &selectors.author, UNKNOWN_AUTHOR);

    // The first post block is the original post rendered inline
    let replies: Vec<ReplyExcerpt> = root
        .select(&selectors.post_block)
        .skip(1)
        .take(MAX_REPLIES)
        .map(|block| ReplyExcerpt {
            reply_id: block
                .value()
                .attr(REPLY_ID_ATTR)
                .unwrap_or(EMPTY_REPLY_ID)
                .to_string(),
            content: query_or(block, &selectors.post_text, EMPTY_TEXT),
            author: query_or(block, &selectors.author, UNKNOWN_AUTHOR),
        })
        .filter(|reply| !reply.content.trim().is_empty())
        .collect();

    tracing::debug!(post_id = %post_id, replies = replies.len(), "extracted post context");

    Some(PostContext {
        post_id,
        body_text,
        author_handle,
        replies,
    })
}

/// True when the page renders a reply input box.
pub fn has_reply_input(html: &str) -> bool {
    let Ok(selector) = Selector::parse(REPLY_INPUT_SELECTOR) else {
        return false;
    };
    Html::parse_document(html).select(&selector).next().is_some()
}
