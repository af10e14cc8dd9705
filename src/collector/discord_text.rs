//! Discord message length limits for rendered menu pages
//!
//! Lengths are counted in characters, not bytes, so multibyte text is
//! never cut in the middle of a character.

use tracing::warn;

/// Discord API maximum for message content
pub const MAX_CONTENT_LEN: usize = 2000;

const ELLIPSIS: &str = "...";

/// Fit page content into a single message
///
/// Content over the limit keeps its first 1997 characters followed by "...".
pub fn truncate_content(content: &str) -> String {
    let char_count = content.chars().count();
    if char_count <= MAX_CONTENT_LEN {
        return content.to_string();
    }

    let kept = MAX_CONTENT_LEN - ELLIPSIS.len();
    let mut truncated: String = content.chars().take(kept).collect();
    truncated.push_str(ELLIPSIS);

    warn!(
        original_len = char_count,
        truncated_len = MAX_CONTENT_LEN,
        "Page content exceeds message limit, truncated"
    );
    truncated
}
