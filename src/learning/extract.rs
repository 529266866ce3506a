//! Rule extraction from preference analysis text
//!
//! The analysis comes back from a generative service and is treated as
//! untrusted, loosely structured text. The acceptable shape is exactly:
//! a summary section announced by one of three fixed marker phrases,
//! followed by lines carrying `{information type, disclosure directive}`
//! pairs. Anything else is skipped, never escalated.

use crate::types::PreferenceRule;
use tracing::debug;

/// Marker phrases announcing the summary section, checked in this order.
///
/// This set is fixed; a broader section-detection heuristic would accept
/// shapes the analysis prompts never ask for.
pub const SUMMARY_MARKERS: [&str; 3] = [
    "Summary of user privacy preferences:",
    "suggests the following privacy preferences:",
    "the user's justifications suggest the following privacy preferences:",
];

/// ASCII case-insensitive substring search
///
/// The markers are ASCII, so byte-wise comparison is safe and the returned
/// offset always lands on a char boundary of the original text.
fn find_marker(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

/// Extract canonical preference rules from an analysis text
///
/// Returns an empty list when no marker phrase is present: an analysis may
/// legitimately contain no new preference. After the first matching marker,
/// each line holding a `{...}` fragment contributes one rule if the
/// fragment splits on a comma into two non-empty halves; malformed
/// fragments are dropped per line. Appearance order is preserved.
pub fn extract_rules(analysis: &str) -> Vec<PreferenceRule> {
    let tail = SUMMARY_MARKERS.iter().find_map(|marker| {
        find_marker(analysis, marker).map(|pos| &analysis[pos + marker.len()..])
    });

    let Some(section) = tail else {
        debug!("No summary marker found in analysis");
        return Vec::new();
    };

    let mut rules = Vec::new();
    for line in section.lines() {
        let Some(open) = line.find('{') else { continue };
        let Some(close) = line[open + 1..].find('}') else {
            continue;
        };

        let fragment = &line[open + 1..open + 1 + close];
        let Some((information_type, directive)) = fragment.split_once(',') else {
            continue;
        };

        if let Some(rule) = PreferenceRule::new(information_type, directive) {
            rules.push(rule);
        }
    }

    debug!("Extracted {} preference rules", rules.len());
    rules
}
