/// Splits a comma-separated attribute value, trimming each entry and dropping
/// empty ones. Order is preserved.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins list entries with `,`. Returns `None` for an empty list so callers can
/// omit the attribute entirely.
pub fn join_list(items: &[String]) -> Option<String> {
    if items.is_empty() {
        None
    } else {
        Some(items.join(","))
    }
}
