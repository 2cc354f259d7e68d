//! Text layer for search highlighting
//!
//! Holds the extracted text spans of the current page together with the
//! concatenated page text and each span's byte range within it. Highlight
//! geometry is computed by intersecting search-match ranges with span ranges
//! and mapping span bounds through the viewport transform.

use crate::search::{SearchMatch, SearchState};
use crate::viewport::{PageRect, Viewport};
use std::ops::Range;

/// A positioned run of text in page coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub rect: PageRect,
}

/// A highlight rectangle in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Highlight {
    pub rect: PageRect,
    /// True for the span containing the current search match
    pub selected: bool,
}

/// Text content of one page, indexed for search
#[derive(Debug, Clone, Default)]
pub struct TextLayer {
    spans: Vec<TextSpan>,
    /// Span texts joined by single spaces
    text: String,
    /// Byte range of each span within `text`, parallel to `spans`
    ranges: Vec<Range<usize>>,
}

impl TextLayer {
    pub fn from_spans(spans: Vec<TextSpan>) -> Self {
        let mut text = String::new();
        let mut ranges = Vec::with_capacity(spans.len());

        for span in &spans {
            if !text.is_empty() {
                text.push(' ');
            }
            let start = text.len();
            text.push_str(&span.text);
            ranges.push(start..text.len());
        }

        Self { spans, text, ranges }
    }

    /// The searchable page text
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn spans(&self) -> &[TextSpan] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Highlight rectangles for the current search results
    ///
    /// A span is highlighted when its range intersects any match, and marked
    /// selected when it intersects the current match.
    pub fn highlight_rects(&self, viewport: &Viewport, search: &SearchState) -> Vec<Highlight> {
        if search.is_empty() {
            return Vec::new();
        }

        let current = search.current_match().copied();
        let mut highlights = Vec::new();

        for (span, range) in self.spans.iter().zip(&self.ranges) {
            let matched = search.matches().iter().any(|m| overlaps(range, m));
            if !matched {
                continue;
            }

            let selected = current.is_some_and(|m| overlaps(range, &m));
            highlights.push(Highlight {
                rect: viewport.transform_rect(&span.rect),
                selected,
            });
        }

        highlights
    }
}

fn overlaps(range: &Range<usize>, m: &SearchMatch) -> bool {
    range.start < m.end() && m.start < range.end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::{PageSize, Rotation};

    fn span(text: &str, x: f32) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            rect: PageRect::new(x, 100.0, text.len() as f32 * 6.0, 12.0),
        }
    }

    fn unit_viewport() -> Viewport {
        Viewport::new(PageSize { width: 600.0, height: 800.0 }, 1.0, Rotation::Deg0)
    }

    #[test]
    fn joined_text_uses_single_spaces() {
        let layer = TextLayer::from_spans(vec![span("hello", 0.0), span("world", 40.0)]);
        assert_eq!(layer.text(), "hello world");
    }

    #[test]
    fn span_ranges_index_the_joined_text() {
        let layer = TextLayer::from_spans(vec![
            span("one", 0.0),
            span("two", 30.0),
            span("three", 60.0),
        ]);

        for (span, range) in layer.spans().iter().zip(&layer.ranges) {
            assert_eq!(&layer.text()[range.clone()], span.text);
        }
    }

    #[test]
    fn empty_layer_has_no_text() {
        let layer = TextLayer::from_spans(Vec::new());
        assert!(layer.is_empty());
        assert_eq!(layer.text(), "");
    }

    #[test]
    fn highlights_only_matching_spans() {
        let layer = TextLayer::from_spans(vec![
            span("apple", 0.0),
            span("banana", 50.0),
            span("apple", 110.0),
        ]);

        let mut search = SearchState::default();
        search.run(&layer, "apple").unwrap();

        let highlights = layer.highlight_rects(&unit_viewport(), &search);
        assert_eq!(highlights.len(), 2);
        assert_eq!(highlights[0].rect.x, 0.0);
        assert_eq!(highlights[1].rect.x, 110.0);
    }

    #[test]
    fn selection_follows_the_cursor() {
        let layer = TextLayer::from_spans(vec![span("dog", 0.0), span("dog", 40.0)]);

        let mut search = SearchState::default();
        search.run(&layer, "dog").unwrap();

        let highlights = layer.highlight_rects(&unit_viewport(), &search);
        assert!(highlights[0].selected);
        assert!(!highlights[1].selected);

        search.next_match();
        let highlights = layer.highlight_rects(&unit_viewport(), &search);
        assert!(!highlights[0].selected);
        assert!(highlights[1].selected);
    }

    #[test]
    fn phrase_match_highlights_every_covered_span() {
        let layer = TextLayer::from_spans(vec![
            span("big", 0.0),
            span("bad", 30.0),
            span("wolf", 60.0),
        ]);

        let mut search = SearchState::default();
        search.run(&layer, "bad wolf").unwrap();

        let highlights = layer.highlight_rects(&unit_viewport(), &search);
        assert_eq!(highlights.len(), 2);
        assert!(highlights.iter().all(|h| h.selected));
    }

    #[test]
    fn no_search_results_means_no_highlights() {
        let layer = TextLayer::from_spans(vec![span("text", 0.0)]);
        let search = SearchState::default();
        assert!(layer.highlight_rects(&unit_viewport(), &search).is_empty());
    }

    #[test]
    fn highlight_rects_are_viewport_transformed() {
        let layer = TextLayer::from_spans(vec![span("zoomed", 10.0)]);

        let mut search = SearchState::default();
        search.run(&layer, "zoomed").unwrap();

        let viewport =
            Viewport::new(PageSize { width: 600.0, height: 800.0 }, 2.0, Rotation::Deg0);
        let highlights = layer.highlight_rects(&viewport, &search);
        assert_eq!(highlights[0].rect.x, 20.0);
        assert_eq!(highlights[0].rect.y, 200.0);
    }
}
