//! Free-text filtering and jump-to-letter over a catalog.

use crate::normalize::NormalizedRecord;
use crate::pagination::page_of_index;

/// Keys offered by the jump-to-letter index, in display order.
pub const INDEX_KEYS: [char; 27] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '#',
];

/// Records whose search key contains `query`, in catalog order.
///
/// An empty query returns every record untouched. Matching is a plain,
/// case-insensitive substring test; no tokenizing, no fuzziness.
pub fn filter<'a>(records: &'a [NormalizedRecord], query: &str) -> Vec<&'a NormalizedRecord> {
    if query.is_empty() {
        return records.iter().collect();
    }

    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| record.search_key().contains(&needle))
        .collect()
}

/// Index of the first record whose display name starts with `letter`.
///
/// Scans in the order given, which callers keep as the unfiltered catalog order.
pub fn find_start_index(records: &[NormalizedRecord], letter: char) -> Option<usize> {
    records.iter().position(|record| {
        record
            .display_name()
            .chars()
            .next()
            .is_some_and(|first| chars_eq_ignore_case(first, letter))
    })
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// A press on the jump-to-letter index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexJump {
    /// `#`: back to the first page.
    Reset,
    Letter(char),
}

impl IndexJump {
    pub fn parse(key: char) -> Option<Self> {
        match key {
            '#' => Some(IndexJump::Reset),
            c if c.is_ascii_alphabetic() => Some(IndexJump::Letter(c.to_ascii_uppercase())),
            _ => None,
        }
    }
}

/// Page to show after an index jump, or `None` to leave pagination alone.
pub fn resolve_jump(records: &[NormalizedRecord], jump: IndexJump, page_size: usize) -> Option<usize> {
    match jump {
        IndexJump::Reset => Some(1),
        IndexJump::Letter(letter) => {
            find_start_index(records, letter).map(|index| page_of_index(index, page_size))
        }
    }
}

/// Ids closest to `token` by Jaro-Winkler similarity, best first.
///
/// Used for "did you mean" hints when a detail lookup finds nothing.
pub fn suggest<'a>(records: &'a [NormalizedRecord], token: &str, limit: usize) -> Vec<&'a str> {
    let needle = token.to_lowercase();
    let mut scored: Vec<(f64, &str)> = records
        .iter()
        .map(|record| (strsim::jaro_winkler(&needle, &record.id().to_lowercase()), record.id()))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.into_iter().take(limit).map(|(_, id)| id).collect()
}

const SUGGESTION_THRESHOLD: f64 = 0.85;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_keys() {
        assert_eq!(INDEX_KEYS.first(), Some(&'A'));
        assert_eq!(INDEX_KEYS[25], 'Z');
        assert_eq!(INDEX_KEYS.last(), Some(&'#'));
    }

    #[test]
    fn test_parse_jump() {
        assert_eq!(IndexJump::parse('#'), Some(IndexJump::Reset));
        assert_eq!(IndexJump::parse('m'), Some(IndexJump::Letter('M')));
        assert_eq!(IndexJump::parse('Q'), Some(IndexJump::Letter('Q')));
        assert_eq!(IndexJump::parse('7'), None);
        assert_eq!(IndexJump::parse('é'), None);
    }

    #[test]
    fn test_char_case_folding() {
        assert!(chars_eq_ignore_case('m', 'M'));
        assert!(chars_eq_ignore_case('Ä', 'ä'));
        assert!(!chars_eq_ignore_case('m', 'n'));
    }
}
