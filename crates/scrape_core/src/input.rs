/// Splits pasted or piped text into URLs: one per line, surrounding
/// whitespace trimmed, blank lines skipped. Duplicates are kept.
pub fn parse_urls(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
