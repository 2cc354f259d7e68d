//! Per-page text search
//!
//! A linear regex scan over the current page's joined text. The query is
//! compiled case-insensitively and treated as a pattern, matching the
//! behavior of the search field this replaces. Matches are byte offsets into
//! `TextLayer::text`; the cursor steps through them in order and clamps at
//! both ends.

use crate::text_layer::TextLayer;
use regex::RegexBuilder;
use thiserror::Error;

/// Search failure
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// A single match as a byte range into the page text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    pub start: usize,
    pub len: usize,
}

impl SearchMatch {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Ordered match list plus the cursor position
///
/// Invariant: `current` is `None` exactly when `matches` is empty, and a
/// valid index otherwise.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    matches: Vec<SearchMatch>,
    current: Option<usize>,
}

impl SearchState {
    /// Run a query against a page's text layer
    ///
    /// Previous results are always discarded, including when the pattern
    /// fails to compile. A non-empty result selects the first match.
    pub fn run(&mut self, layer: &TextLayer, query: &str) -> Result<(), SearchError> {
        self.clear();
        if query.is_empty() {
            return Ok(());
        }

        let pattern = RegexBuilder::new(query).case_insensitive(true).build()?;

        self.matches = pattern
            .find_iter(layer.text())
            .filter(|m| m.start() < m.end())
            .map(|m| SearchMatch { start: m.start(), len: m.end() - m.start() })
            .collect();

        if !self.matches.is_empty() {
            self.current = Some(0);
        }

        Ok(())
    }

    pub fn clear(&mut self) {
        self.matches.clear();
        self.current = None;
    }

    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Zero-based cursor index, if any matches exist
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_match(&self) -> Option<&SearchMatch> {
        self.current.map(|i| &self.matches[i])
    }

    pub fn can_prev(&self) -> bool {
        self.current.is_some_and(|i| i > 0)
    }

    pub fn can_next(&self) -> bool {
        self.current.is_some_and(|i| i + 1 < self.matches.len())
    }

    /// Step to the previous match; returns whether the cursor moved
    pub fn prev_match(&mut self) -> bool {
        if !self.can_prev() {
            return false;
        }
        self.current = self.current.map(|i| i - 1);
        true
    }

    /// Step to the next match; returns whether the cursor moved
    pub fn next_match(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.current = self.current.map(|i| i + 1);
        true
    }

    /// Match counter text, e.g. "3/10"
    pub fn label(&self) -> String {
        match self.current {
            Some(i) => format!("{}/{}", i + 1, self.matches.len()),
            None => "No results".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_layer::TextSpan;
    use crate::viewport::PageRect;

    fn layer(words: &[&str]) -> TextLayer {
        let spans = words
            .iter()
            .enumerate()
            .map(|(i, word)| TextSpan {
                text: (*word).to_string(),
                rect: PageRect::new(i as f32 * 50.0, 0.0, 40.0, 12.0),
            })
            .collect();
        TextLayer::from_spans(spans)
    }

    #[test]
    fn finds_matches_in_order() {
        let layer = layer(&["the", "cat", "and", "the", "hat"]);
        let mut search = SearchState::default();
        search.run(&layer, "the").unwrap();

        assert_eq!(search.matches().len(), 2);
        assert!(search.matches()[0].start < search.matches()[1].start);
        assert_eq!(search.current_index(), Some(0));
    }

    #[test]
    fn search_is_case_insensitive() {
        let layer = layer(&["Hello", "WORLD"]);
        let mut search = SearchState::default();
        search.run(&layer, "world").unwrap();
        assert_eq!(search.matches().len(), 1);
    }

    #[test]
    fn matches_can_cross_span_boundaries() {
        // Spans are joined with single spaces, so a phrase query works
        let layer = layer(&["red", "green", "blue"]);
        let mut search = SearchState::default();
        search.run(&layer, "green blue").unwrap();
        assert_eq!(search.matches().len(), 1);
    }

    #[test]
    fn empty_query_clears_results() {
        let layer = layer(&["something"]);
        let mut search = SearchState::default();
        search.run(&layer, "some").unwrap();
        assert!(!search.is_empty());

        search.run(&layer, "").unwrap();
        assert!(search.is_empty());
        assert_eq!(search.current_index(), None);
    }

    #[test]
    fn invalid_pattern_errors_and_clears() {
        let layer = layer(&["bracket"]);
        let mut search = SearchState::default();
        search.run(&layer, "bra").unwrap();

        let result = search.run(&layer, "[unclosed");
        assert!(matches!(result, Err(SearchError::InvalidPattern(_))));
        assert!(search.is_empty());
        assert_eq!(search.current_index(), None);
    }

    #[test]
    fn cursor_clamps_at_both_ends() {
        let layer = layer(&["aa", "aa", "aa"]);
        let mut search = SearchState::default();
        search.run(&layer, "aa").unwrap();

        assert!(!search.can_prev());
        assert!(!search.prev_match());

        assert!(search.next_match());
        assert!(search.next_match());
        assert_eq!(search.current_index(), Some(2));

        assert!(!search.can_next());
        assert!(!search.next_match());
        assert_eq!(search.current_index(), Some(2));
    }

    #[test]
    fn cursor_is_none_iff_no_matches() {
        let layer = layer(&["alpha", "beta"]);
        let mut search = SearchState::default();

        search.run(&layer, "gamma").unwrap();
        assert!(search.is_empty());
        assert_eq!(search.current_index(), None);
        assert!(!search.next_match());
        assert!(!search.prev_match());

        search.run(&layer, "alpha").unwrap();
        assert_eq!(search.current_index(), Some(0));
    }

    #[test]
    fn label_tracks_cursor_and_count() {
        let layer = layer(&["x", "x", "x"]);
        let mut search = SearchState::default();

        search.run(&layer, "q").unwrap();
        assert_eq!(search.label(), "No results");

        search.run(&layer, "x").unwrap();
        assert_eq!(search.label(), "1/3");
        search.next_match();
        assert_eq!(search.label(), "2/3");
    }

    #[test]
    fn zero_width_matches_are_dropped() {
        let layer = layer(&["abc"]);
        let mut search = SearchState::default();
        // "z*" matches the empty string everywhere
        search.run(&layer, "z*").unwrap();
        assert!(search.is_empty());
    }
}
