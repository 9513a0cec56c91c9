use crate::url::filter::{has_excluded_suffix, is_fragment_only};
use url::Url;

/// Resolves a raw anchor target against its page and decides if it is a candidate
///
/// Returns `None` when the target should be dropped:
/// - fragment-only targets (`#section`)
/// - `javascript:`, `mailto:`, `tel:`, `data:` targets
/// - targets that fail to resolve
/// - non-HTTP(S) URLs after resolution
/// - raw or resolved targets ending in `.js`, `.svg`, `.css` or `.json`
///
/// Malformed targets are dropped silently. The fragment of a resolved target
/// is removed so anchors into the same page share one key.
///
/// # Examples
///
/// ```
/// use spider_index::url::resolve_candidate;
/// use url::Url;
///
/// let base = Url::parse("https://a.com/x/y").unwrap();
/// let resolved = resolve_candidate("../z", &base).unwrap();
/// assert_eq!(resolved.as_str(), "https://a.com/z");
/// ```
pub fn resolve_candidate(raw: &str, base: &Url) -> Option<Url> {
    let raw = raw.trim();

    if raw.is_empty() || is_fragment_only(raw) || has_excluded_suffix(raw) {
        return None;
    }

    let lowered = raw.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let mut resolved = base.join(raw).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    resolved.set_fragment(None);

    if has_excluded_suffix(resolved.as_str()) {
        return None;
    }

    Some(resolved)
}
