//! Single and global substitution
//!
//! Every entry point funnels into one state machine driven by
//! [`Regex::substitute`]. The replacement is either a template (see
//! [`expand_template`]) or a closure receiving the [`MatchData`].

use std::borrow::Cow;
use std::cell::RefCell;

use super::error::{Error, Result};
use super::matchdata::MatchData;
use super::pattern::Regex;
use super::region::{Region, Span};
use super::template::expand_template;

/// Produces the replacement text for one match.
pub trait Replacer {
    /// Append the replacement for `m` to `dst`.
    fn replace_append(&mut self, m: &MatchData<'_>, dst: &mut Vec<u8>);
}

impl Replacer for &str {
    fn replace_append(&mut self, m: &MatchData<'_>, dst: &mut Vec<u8>) {
        expand_template(self.as_bytes(), m, dst);
    }
}

impl Replacer for &String {
    fn replace_append(&mut self, m: &MatchData<'_>, dst: &mut Vec<u8>) {
        expand_template(self.as_bytes(), m, dst);
    }
}

impl Replacer for &[u8] {
    fn replace_append(&mut self, m: &MatchData<'_>, dst: &mut Vec<u8>) {
        expand_template(self, m, dst);
    }
}

impl<const N: usize> Replacer for &[u8; N] {
    fn replace_append(&mut self, m: &MatchData<'_>, dst: &mut Vec<u8>) {
        expand_template(&self[..], m, dst);
    }
}

impl Replacer for &Vec<u8> {
    fn replace_append(&mut self, m: &MatchData<'_>, dst: &mut Vec<u8>) {
        expand_template(self, m, dst);
    }
}

/// Closures are called once per match; their output is inserted verbatim.
impl<F, T> Replacer for F
where
    F: FnMut(&MatchData<'_>) -> T,
    T: AsRef<[u8]>,
{
    fn replace_append(&mut self, m: &MatchData<'_>, dst: &mut Vec<u8>) {
        dst.extend_from_slice((*self)(m).as_ref());
    }
}

/// Output of one substitution call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub output: Vec<u8>,
    pub replacements: usize,
}

/// Identity of the buffer behind a shared cell when a substitution started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    ptr: *const u8,
    len: usize,
}

impl Fingerprint {
    fn of(bytes: &[u8]) -> Self {
        Self {
            ptr: bytes.as_ptr(),
            len: bytes.len(),
        }
    }
}

/// A shared cell the replacer can reach. Its identity and length are
/// re-checked after every replacement.
struct CellGuard<'a> {
    cell: &'a RefCell<Vec<u8>>,
    pinned: Fingerprint,
}

impl<'a> CellGuard<'a> {
    /// Pin the cell and take the one copy of its bytes the substitution
    /// works on. A cell that is already mutably borrowed cannot be read.
    fn pin(cell: &'a RefCell<Vec<u8>>) -> Result<(Self, Vec<u8>)> {
        let buf = cell.try_borrow().map_err(|_| Error::ConcurrentModification {
            expected_len: 0,
            actual_len: 0,
        })?;
        let guard = Self {
            cell,
            pinned: Fingerprint::of(&buf),
        };
        Ok((guard, buf.clone()))
    }

    /// Fail unless the cell still has the identity and length pinned at entry.
    fn check(&self) -> Result<()> {
        let actual_len = match self.cell.try_borrow() {
            Ok(buf) if Fingerprint::of(&buf) == self.pinned => return Ok(()),
            Ok(buf) => buf.len(),
            Err(_) => self.pinned.len,
        };
        Err(Error::ConcurrentModification {
            expected_len: self.pinned.len,
            actual_len,
        })
    }
}

enum State {
    Searching { from: usize },
    Replacing,
    Advancing { whole: Span },
    Done,
}

impl Regex {
    /// Replace the first match, or every match when `global` is set.
    ///
    /// With no match the output is an unmodified copy of `subject`.
    pub fn substitute<R: Replacer>(
        &self,
        subject: impl AsRef<[u8]>,
        global: bool,
        mut rep: R,
    ) -> Result<Substitution> {
        self.run_substitution(subject.as_ref(), None, global, &mut rep)
    }

    /// Replace the first match.
    pub fn sub<R: Replacer>(&self, subject: impl AsRef<[u8]>, rep: R) -> Result<Vec<u8>> {
        Ok(self.substitute(subject, false, rep)?.output)
    }

    /// Replace every non-overlapping match.
    pub fn gsub<R: Replacer>(&self, subject: impl AsRef<[u8]>, rep: R) -> Result<Vec<u8>> {
        Ok(self.substitute(subject, true, rep)?.output)
    }

    /// Replace the first match in place. Returns `false`, leaving `subject`
    /// untouched, when nothing matched.
    pub fn sub_in_place<R: Replacer>(&self, subject: &mut Vec<u8>, rep: R) -> Result<bool> {
        self.substitute_in_place(subject, false, rep)
    }

    /// Replace every match in place. Returns `false` when nothing matched.
    pub fn gsub_in_place<R: Replacer>(&self, subject: &mut Vec<u8>, rep: R) -> Result<bool> {
        self.substitute_in_place(subject, true, rep)
    }

    fn substitute_in_place<R: Replacer>(
        &self,
        subject: &mut Vec<u8>,
        global: bool,
        mut rep: R,
    ) -> Result<bool> {
        let result = self.run_substitution(subject, None, global, &mut rep)?;
        if result.replacements == 0 {
            return Ok(false);
        }
        *subject = result.output;
        Ok(true)
    }

    /// Replace the first match in a shared buffer.
    ///
    /// Matching runs over one copy of the buffer taken on entry, and every
    /// [`MatchData`] borrows that copy. The replacer may observe the cell, but
    /// resizing or reallocating it
    /// while the substitution runs fails with
    /// [`Error::ConcurrentModification`] and leaves the cell as the replacer
    /// left it.
    pub fn sub_cell<R: Replacer>(&self, subject: &RefCell<Vec<u8>>, rep: R) -> Result<bool> {
        self.substitute_cell(subject, false, rep)
    }

    /// Replace every match in a shared buffer. See [`Regex::sub_cell`].
    pub fn gsub_cell<R: Replacer>(&self, subject: &RefCell<Vec<u8>>, rep: R) -> Result<bool> {
        self.substitute_cell(subject, true, rep)
    }

    fn substitute_cell<R: Replacer>(
        &self,
        subject: &RefCell<Vec<u8>>,
        global: bool,
        mut rep: R,
    ) -> Result<bool> {
        let (guard, snapshot) = CellGuard::pin(subject)?;
        let result = self.run_substitution(&snapshot, Some(&guard), global, &mut rep)?;
        if result.replacements == 0 {
            return Ok(false);
        }

        let mut buf = subject.try_borrow_mut().map_err(|_| Error::ConcurrentModification {
            expected_len: result.output.len(),
            actual_len: result.output.len(),
        })?;
        *buf = result.output;
        Ok(true)
    }

    /// `guard` is set when `subject` is a snapshot of a shared cell.
    fn run_substitution<R: Replacer + ?Sized>(
        &self,
        subject: &[u8],
        guard: Option<&CellGuard<'_>>,
        global: bool,
        rep: &mut R,
    ) -> Result<Substitution> {
        let mut region = Region::with_capacity(self.group_count());
        let mut output = Vec::with_capacity(subject.len());
        let mut last_end = 0;
        let mut replacements = 0;
        let mut state = State::Searching { from: 0 };

        loop {
            state = match state {
                State::Searching { from } => {
                    if self.search_region(subject, from..subject.len(), &mut region)? {
                        State::Replacing
                    } else {
                        State::Done
                    }
                }
                State::Replacing => {
                    let m = self.match_data(&region, Cow::Borrowed(subject));
                    let whole = m.span();

                    output.extend_from_slice(&subject[last_end..whole.start]);
                    rep.replace_append(&m, &mut output);
                    if let Some(guard) = guard {
                        guard.check()?;
                    }

                    last_end = whole.end;
                    replacements += 1;
                    State::Advancing { whole }
                }
                State::Advancing { whole } if global => match self.advance(subject, whole) {
                    Some(next) => State::Searching { from: next },
                    None => State::Done,
                },
                State::Advancing { .. } => State::Done,
                State::Done => {
                    output.extend_from_slice(&subject[last_end..]);
                    break;
                }
            };
        }

        log::debug!(
            "{} replacement(s) over {} byte subject",
            replacements,
            subject.len()
        );
        Ok(Substitution {
            output,
            replacements,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::{Encoding, OptionFlags, ResolvedOptions, Syntax};

    fn utf8(pattern: &str) -> Regex {
        Regex::with_options(
            pattern,
            ResolvedOptions::new(OptionFlags::empty(), Encoding::Utf8, Syntax::Ruby),
        )
        .unwrap()
    }

    #[test]
    fn test_sub_replaces_first_only() {
        let re = Regex::new(r"\d+").unwrap();
        assert_eq!(re.sub("a1b2c3", "N").unwrap(), b"aNb2c3");
    }

    #[test]
    fn test_gsub_replaces_all() {
        let re = Regex::new(r"\d+").unwrap();
        let result = re.substitute("a1b22c333", true, "<\\&>").unwrap();
        assert_eq!(result.output, b"a<1>b<22>c<333>");
        assert_eq!(result.replacements, 3);
    }

    #[test]
    fn test_no_match_returns_copy() {
        let re = Regex::new(r"\d+").unwrap();
        let result = re.substitute("hello", true, "N").unwrap();
        assert_eq!(result.output, b"hello");
        assert_eq!(result.replacements, 0);
    }

    #[test]
    fn test_empty_matches_advance_one_char() {
        let re = Regex::new("").unwrap();
        assert_eq!(re.gsub("ab", "-").unwrap(), b"-a-b-");

        let re = Regex::new("x*").unwrap();
        assert_eq!(re.gsub("axb", "-").unwrap(), b"-a--b-");
    }

    #[test]
    fn test_empty_matches_step_over_multibyte() {
        let re = utf8("");
        assert_eq!(re.gsub("éa", "|").unwrap(), "|é|a|".as_bytes());

        let re = Regex::with_shortcuts("", "", Some("sjis"), None).unwrap();
        let subject = [0x95, 0x5c, b'a'];
        assert_eq!(
            re.gsub(subject, "|").unwrap(),
            vec![b'|', 0x95, 0x5c, b'|', b'a', b'|']
        );
    }

    #[test]
    fn test_closure_replacer() {
        let re = Regex::new(r"\d+").unwrap();
        let out = re
            .gsub("1 22 333", |m: &MatchData<'_>| m.as_bytes().len().to_string())
            .unwrap();
        assert_eq!(out, b"1 2 3");
    }

    #[test]
    fn test_in_place() {
        let re = Regex::new("o").unwrap();
        let mut subject = b"foo".to_vec();
        assert!(re.gsub_in_place(&mut subject, "0").unwrap());
        assert_eq!(subject, b"f00");

        let mut untouched = b"bar".to_vec();
        assert!(!re.sub_in_place(&mut untouched, "0").unwrap());
        assert_eq!(untouched, b"bar");
    }

    #[test]
    fn test_cell_substitution() {
        let re = Regex::new("o").unwrap();
        let cell = RefCell::new(b"foo".to_vec());
        assert!(re.sub_cell(&cell, "0").unwrap());
        assert_eq!(*cell.borrow(), b"f0o");
    }

    #[test]
    fn test_cell_modified_by_callback() {
        let re = Regex::new("o").unwrap();
        let cell = RefCell::new(b"foo".to_vec());
        let err = re
            .gsub_cell(&cell, |_: &MatchData<'_>| {
                cell.borrow_mut().push(b'!');
                "0"
            })
            .unwrap_err();
        assert_eq!(
            err,
            Error::ConcurrentModification {
                expected_len: 3,
                actual_len: 4
            }
        );
        assert_eq!(*cell.borrow(), b"foo!");
    }

    #[test]
    fn test_cell_read_by_callback_is_fine() {
        let re = Regex::new("o").unwrap();
        let cell = RefCell::new(b"foo".to_vec());
        let changed = re
            .gsub_cell(&cell, |_: &MatchData<'_>| cell.borrow().len().to_string())
            .unwrap();
        assert!(changed);
        assert_eq!(*cell.borrow(), b"f33");
    }

    #[test]
    fn test_cell_replacer_sees_one_snapshot() {
        let re = Regex::new("o").unwrap();
        let cell = RefCell::new(b"foo boo".to_vec());
        let mut seen = Vec::new();
        re.gsub_cell(&cell, |m: &MatchData<'_>| {
            seen.push(m.subject().as_ptr());
            "0"
        })
        .unwrap();
        assert_eq!(seen.len(), 4);
        assert!(seen.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(*cell.borrow(), b"f00 b00");
    }

    #[test]
    fn test_cell_already_borrowed() {
        let re = Regex::new("o").unwrap();
        let cell = RefCell::new(b"foo".to_vec());
        let _writer = cell.borrow_mut();
        assert!(matches!(
            re.sub_cell(&cell, "0"),
            Err(Error::ConcurrentModification { .. })
        ));
    }

    #[test]
    fn test_search_error_keeps_handle_usable() {
        let re = utf8(r"(?<=a)b");
        let err = re.gsub(b"a\xffb", "x").unwrap_err();
        assert!(matches!(err, Error::Search { .. }));
        assert_eq!(re.gsub("ab", "x").unwrap(), b"ax");
    }
}
