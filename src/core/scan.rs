//! Iteration over every non-overlapping match

use std::borrow::Cow;
use std::iter::FusedIterator;

use super::error::Result;
use super::matchdata::MatchData;
use super::pattern::Regex;
use super::region::Region;

/// Iterator over successive matches of a pattern in one subject.
///
/// Searching resumes at the end of the previous match; after a zero-width
/// match it first steps over one character. The first error ends the
/// iteration.
#[derive(Debug)]
pub struct Matches<'r, 's> {
    re: &'r Regex,
    subject: &'s [u8],
    region: Region,
    next_start: Option<usize>,
}

impl<'r, 's> Matches<'r, 's> {
    fn new(re: &'r Regex, subject: &'s [u8]) -> Self {
        Self {
            re,
            subject,
            region: Region::with_capacity(re.group_count()),
            next_start: Some(0),
        }
    }
}

impl<'r, 's> Iterator for Matches<'r, 's> {
    type Item = Result<MatchData<'s>>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start.take()?;

        match self
            .re
            .search_region(self.subject, start..self.subject.len(), &mut self.region)
        {
            Ok(true) => {}
            Ok(false) => return None,
            Err(err) => return Some(Err(err)),
        }

        let m = self.re.match_data(&self.region, Cow::Borrowed(self.subject));
        self.next_start = self.re.advance(self.subject, m.span());
        Some(Ok(m))
    }
}

impl FusedIterator for Matches<'_, '_> {}

impl Regex {
    /// Lazily iterate over all matches.
    pub fn matches<'r, 's, S>(&'r self, subject: &'s S) -> Matches<'r, 's>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        Matches::new(self, subject.as_ref())
    }

    /// Collect every match in order, or `None` if there is none.
    pub fn scan<'s, S>(&self, subject: &'s S) -> Result<Option<Vec<MatchData<'s>>>>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        let all = self.matches(subject).collect::<Result<Vec<_>>>()?;
        log::debug!("scan found {} match(es)", all.len());
        Ok((!all.is_empty()).then_some(all))
    }

    /// Alias of [`Regex::scan`].
    pub fn match_all<'s, S>(&self, subject: &'s S) -> Result<Option<Vec<MatchData<'s>>>>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        self.scan(subject)
    }

    /// Like [`Regex::scan`], also handing each match to `f` as it is found.
    pub fn scan_with<'s, S, F>(&self, subject: &'s S, mut f: F) -> Result<Option<Vec<MatchData<'s>>>>
    where
        S: AsRef<[u8]> + ?Sized,
        F: FnMut(&MatchData<'s>),
    {
        let mut all = Vec::new();
        for m in self.matches(subject) {
            let m = m?;
            f(&m);
            all.push(m);
        }
        Ok((!all.is_empty()).then_some(all))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use crate::core::options::{Encoding, OptionFlags, ResolvedOptions, Syntax};

    fn texts(matches: &[MatchData<'_>]) -> Vec<String> {
        matches
            .iter()
            .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
            .collect()
    }

    #[test]
    fn test_scan_collects_in_order() {
        let re = Regex::new(r"\d+").unwrap();
        let all = re.scan("a1b22c333").unwrap().unwrap();
        assert_eq!(texts(&all), ["1", "22", "333"]);
        assert_eq!(all[1].start(), 3);
    }

    #[test]
    fn test_scan_no_match_is_none() {
        let re = Regex::new(r"\d+").unwrap();
        assert!(re.scan("abc").unwrap().is_none());
        assert!(re.match_all("abc").unwrap().is_none());
    }

    #[test]
    fn test_scan_empty_pattern() {
        let re = Regex::new("").unwrap();
        let all = re.scan("ab").unwrap().unwrap();
        let starts: Vec<_> = all.iter().map(|m| m.start()).collect();
        assert_eq!(starts, [0, 1, 2]);
        assert!(all.iter().all(|m| m.as_bytes().is_empty()));
    }

    #[test]
    fn test_scan_with_callback() {
        let re = Regex::new(r"(\w)(\d)").unwrap();
        let mut seen = Vec::new();
        let all = re
            .scan_with("a1 b2", |m| seen.push(m.get(2).unwrap_or_default().to_vec()))
            .unwrap()
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(seen, [b"1".to_vec(), b"2".to_vec()]);
    }

    #[test]
    fn test_matches_is_fused_after_end() {
        let re = Regex::new("a").unwrap();
        let mut it = re.matches("a");
        assert!(it.next().is_some());
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }

    #[test]
    fn test_scan_propagates_search_error() {
        let re = Regex::with_options(
            r"(?<=a)b",
            ResolvedOptions::new(OptionFlags::empty(), Encoding::Utf8, Syntax::Ruby),
        )
        .unwrap();
        let err = re.scan(b"ab\xff").unwrap_err();
        assert!(matches!(err, Error::Search { .. }));
    }
}
