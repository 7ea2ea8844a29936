//! Parsing the answer of a delegated `--query-features` call.

/// Flag that asks a tool copy to list its features on stdout.
pub const QUERY_FEATURES_FLAG: &str = "--query-features";

/// Markers that only show up when a copy printed its generic help text
/// instead of answering the query (copies that predate the flag do this).
const USAGE_MARKERS: &[&str] = &["Usage:", "USAGE:", "[OPTIONS]", "[options]", "--help"];

/// Heuristic check for a usage/help banner on stdout.
#[must_use]
pub fn looks_like_usage_banner(stdout: &str) -> bool {
    USAGE_MARKERS.iter().any(|marker| stdout.contains(marker))
}

/// Split a feature report into identifiers, one per non-empty line.
#[must_use]
pub fn parse_feature_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
