//! Match results
//!
//! A [`MatchData`] pairs the [`Region`] of one successful search with the
//! subject it was found in. It borrows the subject; [`MatchData::into_owned`]
//! detaches it, which is how a caller keeps a "last match" around.

use std::borrow::Cow;
use std::sync::Arc;

use super::options::Encoding;
use super::region::{Region, Span};

/// Group names of a compiled pattern, in group order.
///
/// A name may label several groups; references to it resolve to the last one
/// that participated in the match, or the last one overall if none did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    entries: Vec<(String, Vec<usize>)>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, group: usize) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, groups)) => groups.push(group),
            None => self.entries.push((name.to_string(), vec![group])),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Group indices labelled `name`.
    pub fn groups(&self, name: &[u8]) -> Option<&[usize]> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_bytes() == name)
            .map(|(_, groups)| groups.as_slice())
    }

    /// Resolve `name` to a single group index against a match region.
    pub fn resolve(&self, name: &[u8], region: &Region) -> Option<usize> {
        let groups = self.groups(name)?;
        groups
            .iter()
            .rev()
            .copied()
            .find(|&g| region.get(g).is_some())
            .or_else(|| groups.last().copied())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> + '_ {
        self.entries
            .iter()
            .map(|(name, groups)| (name.as_str(), groups.as_slice()))
    }
}

/// The result of one successful search
#[derive(Debug, Clone)]
pub struct MatchData<'s> {
    region: Region,
    subject: Cow<'s, [u8]>,
    names: Option<Arc<NameTable>>,
    encoding: Encoding,
}

impl<'s> MatchData<'s> {
    pub(crate) fn new(
        region: Region,
        subject: Cow<'s, [u8]>,
        names: Option<Arc<NameTable>>,
        encoding: Encoding,
    ) -> Self {
        debug_assert!(region.whole().is_some(), "a match always has group 0");
        Self {
            region,
            subject,
            names,
            encoding,
        }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    /// The full subject the match was found in.
    pub fn subject(&self) -> &[u8] {
        &self.subject
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Number of groups, including group 0.
    pub fn len(&self) -> usize {
        self.region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    /// Whole-match span.
    pub fn span(&self) -> Span {
        self.region.whole().unwrap_or(Span::new(0, 0))
    }

    pub fn start(&self) -> usize {
        self.span().start
    }

    pub fn end(&self) -> usize {
        self.span().end
    }

    /// Span of a group, or `None` if it did not participate.
    pub fn offset(&self, group: usize) -> Option<Span> {
        self.region.get(group)
    }

    /// Text of a group, or `None` if it did not participate.
    pub fn get(&self, group: usize) -> Option<&[u8]> {
        self.region.get(group).map(|s| &self.subject[s.range()])
    }

    /// The matched text.
    pub fn as_bytes(&self) -> &[u8] {
        &self.subject[self.span().range()]
    }

    /// Text before the match.
    pub fn pre_match(&self) -> &[u8] {
        &self.subject[..self.start()]
    }

    /// Text after the match.
    pub fn post_match(&self) -> &[u8] {
        &self.subject[self.end()..]
    }

    /// Text of the highest-numbered participating group.
    pub fn last_group(&self) -> Option<&[u8]> {
        self.region.last_participating().and_then(|g| self.get(g))
    }

    /// Group index for a name, if the pattern has named groups.
    pub fn group_index(&self, name: impl AsRef<[u8]>) -> Option<usize> {
        self.names.as_ref()?.resolve(name.as_ref(), &self.region)
    }

    /// Text of a named group.
    pub fn name(&self, name: impl AsRef<[u8]>) -> Option<&[u8]> {
        self.group_index(name).and_then(|g| self.get(g))
    }

    pub fn names(&self) -> Option<&NameTable> {
        self.names.as_deref()
    }

    /// Iterate over every group's text, `None` for non-participating groups.
    pub fn iter(&self) -> impl Iterator<Item = Option<&[u8]>> + '_ {
        self.region
            .iter()
            .map(move |span| span.map(|s| &self.subject[s.range()]))
    }

    /// Detach from the subject's lifetime by copying it.
    pub fn into_owned(self) -> MatchData<'static> {
        MatchData {
            region: self.region,
            subject: Cow::Owned(self.subject.into_owned()),
            names: self.names,
            encoding: self.encoding,
        }
    }
}
