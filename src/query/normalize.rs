//! Pure input normalization shared by the write and read paths

/// Reduce a raw tag list to its canonical form.
///
/// Blank entries are dropped, the rest are trimmed and lowercased, then
/// deduplicated and sorted ascending. Absent input yields an empty list.
pub fn normalize_tags<S: AsRef<str>>(tags: Option<&[S]>) -> Vec<String> {
    let mut normalized: Vec<String> = tags
        .unwrap_or_default()
        .iter()
        .map(|tag| tag.as_ref().trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_lowercase)
        .collect();

    normalized.sort();
    normalized.dedup();
    normalized
}

/// Normalize a free-text query: `None` when absent or blank, otherwise the
/// trimmed lowercase term.
pub fn build_search_term(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
}
