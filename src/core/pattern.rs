//! Pattern handle and match executor
//!
//! A [`Regex`] owns one compiled pattern together with the source bytes and
//! the resolved options it was built from. The compiled pattern is released
//! when the handle is dropped; a failed compile never produces a handle.

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use super::engine::{AutoBackend, Backend, CompiledPattern, EngineError};
use super::error::{Error, Result};
use super::matchdata::{MatchData, NameTable};
use super::options::{
    resolve_options, resolve_shortcuts, Encoding, OptionFlags, OptionSource, ResolvedOptions,
    Syntax,
};
use super::region::{Region, Span};

/// A compiled pattern plus the text and options it came from
#[derive(Debug)]
pub struct Regex {
    source: Vec<u8>,
    options: ResolvedOptions,
    compiled: Box<dyn CompiledPattern>,
    names: Option<Arc<NameTable>>,
}

impl Regex {
    /// Compile with the default options, `ASCII` encoding and default syntax.
    pub fn new(pattern: impl AsRef<[u8]>) -> Result<Self> {
        Self::with_options(pattern, ResolvedOptions::default())
    }

    /// Compile from either the structured or the shortcut option form.
    pub fn compile<'a>(pattern: impl AsRef<[u8]>, options: impl Into<OptionSource<'a>>) -> Result<Self> {
        Self::with_options(pattern, resolve_options(options))
    }

    /// Compile from shortcut strings, e.g. `("cat", "i", Some("utf8"), Some("java"))`.
    pub fn with_shortcuts(
        pattern: impl AsRef<[u8]>,
        options: &str,
        encoding: Option<&str>,
        syntax: Option<&str>,
    ) -> Result<Self> {
        Self::with_options(pattern, resolve_shortcuts(options, encoding, syntax))
    }

    pub fn with_options(pattern: impl AsRef<[u8]>, options: ResolvedOptions) -> Result<Self> {
        Self::with_backend(pattern, options, &AutoBackend::new())
    }

    /// Compile with a specific matching backend.
    pub fn with_backend(
        pattern: impl AsRef<[u8]>,
        options: ResolvedOptions,
        backend: &dyn Backend,
    ) -> Result<Self> {
        let source = pattern.as_ref().to_vec();
        let compiled = backend.compile(&source, &options).map_err(Error::compile)?;

        let names = (compiled.name_count() > 0).then(|| {
            let mut table = NameTable::new();
            compiled.for_each_name(&mut |name, group| table.insert(name, group));
            Arc::new(table)
        });

        Ok(Self {
            source,
            options,
            compiled,
            names,
        })
    }

    /// The pattern text exactly as given.
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    pub fn options(&self) -> OptionFlags {
        self.options.options
    }

    pub fn encoding(&self) -> Encoding {
        self.options.encoding
    }

    pub fn syntax(&self) -> Syntax {
        self.options.syntax
    }

    pub fn resolved_options(&self) -> &ResolvedOptions {
        &self.options
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.options.is_case_insensitive()
    }

    pub fn engine_name(&self) -> &'static str {
        self.compiled.engine_name()
    }

    /// Number of groups, including group 0.
    pub fn group_count(&self) -> usize {
        self.compiled.group_count()
    }

    pub fn names(&self) -> Option<&NameTable> {
        self.names.as_deref()
    }

    /// Run one search over `window`, filling `region`.
    ///
    /// With `FIND_NOT_EMPTY`, a zero-width match is first retried as a
    /// non-empty match at the same position; failing that the search steps
    /// one character on, until a non-empty match or the window end.
    pub(crate) fn search_region(
        &self,
        subject: &[u8],
        window: Range<usize>,
        region: &mut Region,
    ) -> Result<bool> {
        let skip_empty = self.options.options.contains(OptionFlags::FIND_NOT_EMPTY);
        let mut start = window.start;

        loop {
            log::trace!("search {}..{} of {} bytes", start, window.end, subject.len());

            let found = self
                .compiled
                .search(subject, start..window.end, region)
                .map_err(Error::search)?;
            if !found {
                return Ok(false);
            }

            let whole = region.whole().ok_or_else(|| {
                Error::search(EngineError::InvalidSubject(
                    "engine reported a match without a whole-match span".to_string(),
                ))
            })?;

            if !skip_empty || !whole.is_empty() {
                return Ok(true);
            }
            if self
                .compiled
                .search_not_empty_at(subject, whole.start..window.end, region)
                .map_err(Error::search)?
            {
                return Ok(true);
            }
            if whole.end >= window.end {
                return Ok(false);
            }
            start = whole.end + self.encoding().char_len(&subject[whole.end..window.end]);
        }
    }

    /// Where to resume after `whole`, or `None` when the subject is exhausted.
    ///
    /// A zero-width match steps over exactly one character so the next search
    /// cannot report the same empty match again.
    pub(crate) fn advance(&self, subject: &[u8], whole: Span) -> Option<usize> {
        if !whole.is_empty() {
            return Some(whole.end);
        }
        if whole.end >= subject.len() {
            return None;
        }
        Some(whole.end + self.encoding().char_len(&subject[whole.end..]))
    }

    pub(crate) fn match_data<'s>(&self, region: &Region, subject: Cow<'s, [u8]>) -> MatchData<'s> {
        MatchData::new(region.clone(), subject, self.names.clone(), self.encoding())
    }

    /// Search for the first match starting within `range`.
    ///
    /// Assertions still see the whole subject, so `(?<=2)1` searched from
    /// offset 4 of `"11221122"` can use the `2` before the range.
    pub fn search<'s, S>(&self, subject: &'s S, range: Range<usize>) -> Result<Option<MatchData<'s>>>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        let subject = subject.as_ref();
        let mut region = Region::with_capacity(self.group_count());

        if self.search_region(subject, range, &mut region)? {
            Ok(Some(self.match_data(&region, Cow::Borrowed(subject))))
        } else {
            Ok(None)
        }
    }

    /// First match anywhere in the subject.
    pub fn find<'s, S>(&self, subject: &'s S) -> Result<Option<MatchData<'s>>>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        let len = subject.as_ref().len();
        self.search(subject, 0..len)
    }

    /// First match starting at or after byte offset `start`.
    pub fn find_at<'s, S>(&self, subject: &'s S, start: usize) -> Result<Option<MatchData<'s>>>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        let len = subject.as_ref().len();
        self.search(subject, start..len)
    }

    /// Start offset of the first match.
    pub fn match_offset<S>(&self, subject: &S) -> Result<Option<usize>>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        Ok(self.find(subject)?.map(|m| m.start()))
    }

    pub fn is_match<S>(&self, subject: &S) -> Result<bool>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        Ok(self.find(subject)?.is_some())
    }

    /// Readable form, e.g. `/cat/im`.
    pub fn inspect(&self) -> String {
        let mut out = format!("/{}/", String::from_utf8_lossy(&self.source));
        for (flag, c) in DISPLAY_FLAGS {
            if self.options.options.contains(flag) {
                out.push(c);
            }
        }
        out
    }

    /// Escape metacharacters so the result matches `text` literally.
    pub fn escape(text: impl AsRef<[u8]>, encoding: Encoding) -> Vec<u8> {
        escape(text.as_ref(), encoding)
    }

    /// Alias of [`Regex::escape`].
    pub fn quote(text: impl AsRef<[u8]>, encoding: Encoding) -> Vec<u8> {
        escape(text.as_ref(), encoding)
    }
}

const DISPLAY_FLAGS: [(OptionFlags, char); 3] = [
    (OptionFlags::IGNORECASE, 'i'),
    (OptionFlags::MULTILINE, 'm'),
    (OptionFlags::EXTEND, 'x'),
];

/// Two handles are equal when the source bytes, the encoding and the
/// case-insensitivity bit agree. Other option bits are not compared.
impl PartialEq for Regex {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.encoding() == other.encoding()
            && self.is_case_insensitive() == other.is_case_insensitive()
    }
}

impl Eq for Regex {}

/// `(?imx-imx:source)` notation that recompiles to the same semantics.
impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let on: String = DISPLAY_FLAGS
            .iter()
            .filter(|(flag, _)| self.options.options.contains(*flag))
            .map(|(_, c)| *c)
            .collect();
        let off: String = DISPLAY_FLAGS
            .iter()
            .filter(|(flag, _)| !self.options.options.contains(*flag))
            .map(|(_, c)| *c)
            .collect();

        write!(f, "(?{}", on)?;
        if !off.is_empty() {
            write!(f, "-{}", off)?;
        }
        write!(f, ":{})", String::from_utf8_lossy(&self.source))
    }
}

/// Escape regex metacharacters, whitespace and control characters.
///
/// Multi-byte characters are copied untouched, so a trail byte that happens to
/// look like a metacharacter is never escaped.
pub fn escape(text: &[u8], encoding: Encoding) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());

    for (start, len) in encoding.char_boundaries(text) {
        let ch = &text[start..start + len];
        if len > 1 {
            out.extend_from_slice(ch);
            continue;
        }

        match ch[0] {
            b'[' | b']' | b'{' | b'}' | b'(' | b')' | b'|' | b'-' | b'*' | b'.' | b'\\'
            | b'?' | b'+' | b'^' | b'$' | b'#' | b' ' => {
                out.push(b'\\');
                out.push(ch[0]);
            }
            b'\t' => out.extend_from_slice(b"\\t"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            0x0c => out.extend_from_slice(b"\\f"),
            0x0b => out.extend_from_slice(b"\\v"),
            b => out.push(b),
        }
    }

    out
}
