//! Per-group byte spans produced by one search

use std::ops::Range;

use serde::Serialize;

/// Half-open byte range `[start, end)` within a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Zero-width span.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

/// Group spans indexed by group number; group 0 is the whole match.
///
/// `None` marks a group that did not participate in the match. A region is
/// scratch space: searches overwrite it, and it is released when dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    spans: Vec<Option<Span>>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(groups: usize) -> Self {
        Self {
            spans: Vec::with_capacity(groups),
        }
    }

    /// Reset to `groups` non-participating entries.
    pub fn reset(&mut self, groups: usize) {
        self.spans.clear();
        self.spans.resize(groups, None);
    }

    pub fn set(&mut self, group: usize, span: Option<Span>) {
        if group >= self.spans.len() {
            self.spans.resize(group + 1, None);
        }
        self.spans[group] = span;
    }

    pub fn get(&self, group: usize) -> Option<Span> {
        self.spans.get(group).copied().flatten()
    }

    pub fn begin(&self, group: usize) -> Option<usize> {
        self.get(group).map(|s| s.start)
    }

    pub fn end(&self, group: usize) -> Option<usize> {
        self.get(group).map(|s| s.end)
    }

    /// Whole-match span (group 0).
    pub fn whole(&self) -> Option<Span> {
        self.get(0)
    }

    /// Number of groups including group 0.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Highest-numbered capturing group (> 0) that participated.
    pub fn last_participating(&self) -> Option<usize> {
        (1..self.spans.len()).rev().find(|&g| self.spans[g].is_some())
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<Span>> + '_ {
        self.spans.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_participating_groups() {
        let mut region = Region::new();
        region.reset(3);
        region.set(0, Some(Span::new(2, 5)));
        region.set(1, Some(Span::new(2, 3)));

        assert_eq!(region.len(), 3);
        assert_eq!(region.whole(), Some(Span::new(2, 5)));
        assert_eq!(region.begin(2), None);
        assert_eq!(region.end(9), None);
        assert_eq!(region.last_participating(), Some(1));
    }

    #[test]
    fn test_reset_clears_previous_match() {
        let mut region = Region::new();
        region.set(2, Some(Span::new(0, 1)));
        region.reset(2);
        assert_eq!(region.len(), 2);
        assert!(region.iter().all(|s| s.is_none()));
        assert_eq!(region.last_participating(), None);
    }

    #[test]
    fn test_span_width() {
        let span = Span::from(4..4);
        assert!(span.is_empty());
        assert_eq!(Span::new(1, 4).len(), 3);
        assert_eq!(Span::new(1, 4).range(), 1..4);
    }
}
