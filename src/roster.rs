// Participant roster: the canonical ordered name list.
//
// The roster is the single source of truth for every other component. It is
// replaced wholesale from pasted text or an uploaded file, keeps duplicates
// by default, and derives a duplicate-annotated participant view on demand.

use std::collections::{HashMap, HashSet};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Delimiters for manually pasted text.
const TEXT_DELIMITERS: &[char] = &['\n', ','];

/// Delimiters for uploaded file content. Includes carriage return so files
/// with CRLF or bare-CR line endings tokenize cleanly.
const FILE_DELIMITERS: &[char] = &['\n', '\r', ','];

/// Built-in demo roster. Contains one intentional duplicate so the duplicate
/// annotation is visible immediately after loading.
const SAMPLE_NAMES: &[&str] = &[
    "陳小明",
    "王大同",
    "李志豪",
    "張雅婷",
    "林佳穎",
    "黃博文",
    "趙雲",
    "關羽",
    "周杰倫",
    "蔡依林",
    "王力宏",
    "張惠妹",
    "陳小明",
    "劉德華",
    "張學友",
    "郭富城",
    "黎明",
    "金城武",
    "梁朝偉",
    "周星馳",
    "吳孟達",
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One roster position in the derived view.
///
/// The `id` combines the name with its positional index, so it stays unique
/// even when the same name appears more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub is_duplicate: bool,
}

/// The canonical ordered list of participant names.
///
/// Insertion order is preserved and duplicates are allowed. Entries are
/// guaranteed non-empty after trimming; tokenization drops everything else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    names: Vec<String>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Roster { names: Vec::new() }
    }

    /// Build a roster from pasted text. Tokens are split on newlines and
    /// commas, trimmed, and dropped when empty. Order of appearance is kept.
    pub fn from_text(raw: &str) -> Self {
        Roster {
            names: tokenize(raw, TEXT_DELIMITERS),
        }
    }

    /// Build a roster from uploaded file content. Same tokenization as
    /// `from_text` with carriage return added to the delimiter set.
    pub fn from_file_text(raw: &str) -> Self {
        Roster {
            names: tokenize(raw, FILE_DELIMITERS),
        }
    }

    /// The built-in sample roster.
    pub fn sample() -> Self {
        Roster {
            names: SAMPLE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the entire roster from pasted text (not additive).
    pub fn replace_from_text(&mut self, raw: &str) {
        self.names = tokenize(raw, TEXT_DELIMITERS);
    }

    /// Replace the entire roster from uploaded file content.
    pub fn replace_from_file_text(&mut self, raw: &str) {
        self.names = tokenize(raw, FILE_DELIMITERS);
    }

    /// Drop all but the first occurrence of each distinct name, preserving
    /// the relative order of first occurrences.
    pub fn dedupe(&mut self) {
        let mut seen = HashSet::new();
        self.names.retain(|name| seen.insert(name.clone()));
    }

    /// Derive the participant view: one entry per roster position, annotated
    /// with a synthetic id and duplicate status. Recomputed on every call.
    pub fn participants(&self) -> Vec<Participant> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for name in &self.names {
            *counts.entry(name.as_str()).or_insert(0) += 1;
        }

        self.names
            .iter()
            .enumerate()
            .map(|(index, name)| Participant {
                id: format!("{name}-{index}"),
                name: name.clone(),
                is_duplicate: counts[name.as_str()] > 1,
            })
            .collect()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether any name appears more than once.
    pub fn has_duplicates(&self) -> bool {
        let mut seen = HashSet::new();
        self.names.iter().any(|name| !seen.insert(name.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn tokenize(raw: &str, delimiters: &[char]) -> Vec<String> {
    raw.split(delimiters)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Ingestion --

    #[test]
    fn from_text_splits_on_newlines_and_commas() {
        let roster = Roster::from_text("Alice\nBob,Carol\n Dave ");
        assert_eq!(roster.names(), &["Alice", "Bob", "Carol", "Dave"]);
    }

    #[test]
    fn from_text_drops_empty_tokens() {
        let roster = Roster::from_text("Alice,,\n  \n,Bob");
        assert_eq!(roster.names(), &["Alice", "Bob"]);
    }

    #[test]
    fn from_text_preserves_input_order_and_duplicates() {
        let roster = Roster::from_text("B\nA\nB\nC");
        assert_eq!(roster.names(), &["B", "A", "B", "C"]);
    }

    #[test]
    fn from_text_empty_input_yields_empty_roster() {
        assert!(Roster::from_text("").is_empty());
        assert!(Roster::from_text("  \n , \n ").is_empty());
    }

    #[test]
    fn from_file_text_also_splits_on_carriage_returns() {
        let roster = Roster::from_file_text("Alice\r\nBob\rCarol,Dave");
        assert_eq!(roster.names(), &["Alice", "Bob", "Carol", "Dave"]);

        // Plain text ingestion treats \r as part of the token instead.
        let roster = Roster::from_text("Alice\rBob");
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn replace_is_not_additive() {
        let mut roster = Roster::from_text("Alice\nBob");
        roster.replace_from_text("Carol");
        assert_eq!(roster.names(), &["Carol"]);

        roster.replace_from_file_text("Dave\r\nEve");
        assert_eq!(roster.names(), &["Dave", "Eve"]);
    }

    // -- Participant derivation --

    #[test]
    fn participants_annotate_duplicates() {
        let roster = Roster::from_text("A\nB\nA");
        let participants = roster.participants();

        assert_eq!(participants.len(), 3);
        assert_eq!(participants[0].name, "A");
        assert!(participants[0].is_duplicate);
        assert_eq!(participants[1].name, "B");
        assert!(!participants[1].is_duplicate);
        assert_eq!(participants[2].name, "A");
        assert!(participants[2].is_duplicate);
    }

    #[test]
    fn participant_ids_are_unique_even_for_repeated_names() {
        let roster = Roster::from_text("A\nA\nA");
        let participants = roster.participants();

        assert_eq!(participants[0].id, "A-0");
        assert_eq!(participants[1].id, "A-1");
        assert_eq!(participants[2].id, "A-2");
    }

    #[test]
    fn duplicate_detection_is_case_sensitive() {
        let roster = Roster::from_text("alice\nAlice");
        assert!(!roster.has_duplicates());
        assert!(roster.participants().iter().all(|p| !p.is_duplicate));
    }

    // -- Dedupe --

    #[test]
    fn dedupe_keeps_first_occurrence_in_order() {
        let mut roster = Roster::from_text("A\nB\nA\nC\nB");
        roster.dedupe();
        assert_eq!(roster.names(), &["A", "B", "C"]);
        assert!(!roster.has_duplicates());
    }

    #[test]
    fn dedupe_on_unique_roster_is_a_no_op() {
        let mut roster = Roster::from_text("A\nB\nC");
        roster.dedupe();
        assert_eq!(roster.names(), &["A", "B", "C"]);
    }

    // -- Sample roster --

    #[test]
    fn sample_roster_has_21_names_with_one_duplicate() {
        let roster = Roster::sample();
        assert_eq!(roster.len(), 21);
        assert!(roster.has_duplicates());

        let duplicated: Vec<_> = roster
            .participants()
            .into_iter()
            .filter(|p| p.is_duplicate)
            .map(|p| p.name)
            .collect();
        assert_eq!(duplicated, vec!["陳小明", "陳小明"]);
    }
}
