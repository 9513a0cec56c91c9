/// Resource suffixes that never name a crawlable page
pub const EXCLUDED_SUFFIXES: &[&str] = &[".js", ".svg", ".css", ".json"];

/// Returns true if the resolved target ends in an excluded resource suffix
pub fn has_excluded_suffix(resolved: &str) -> bool {
    EXCLUDED_SUFFIXES
        .iter()
        .any(|suffix| resolved.ends_with(suffix))
}

/// Returns true if the raw anchor target only points inside the current page
pub fn is_fragment_only(raw: &str) -> bool {
    raw.starts_with('#')
}
