use common::{PostSummary, Result, ScrapeError};

/// First post whose title contains `pattern` (case-sensitive).
///
/// No match is fatal: there is no fallback thread.
pub fn locate_thread<'a>(
    posts: &'a [PostSummary],
    pattern: &str,
    community: &str,
) -> Result<&'a PostSummary> {
    posts
        .iter()
        .find(|post| post.title.contains(pattern))
        .ok_or_else(|| ScrapeError::ThreadNotFound {
            pattern: pattern.to_string(),
            community: community.to_string(),
        })
}
