//! Matching engine capability and the built-in backend
//!
//! The matching automaton itself is not implemented here. A [`Backend`]
//! compiles pattern bytes into a [`CompiledPattern`], which searches a window
//! of a subject and fills a [`Region`]. Substitution and scanning only talk to
//! these traits, so a different matching library can be plugged in without
//! touching them.
//!
//! [`AutoBackend`] chooses between the `regex-automata` meta engine (fast,
//! linear time) and `fancy-regex` (lookaround, backreferences, backtracking)
//! based on pattern analysis.

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex_automata::meta;
use regex_automata::util::syntax;
use regex_automata::{Input, PatternID};
use thiserror::Error;

use super::options::{Encoding, OptionFlags, ResolvedOptions, Syntax};
use super::region::{Region, Span};

static BACKREFERENCE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"\\[1-9]|\\k<").expect("BUG: backreference detection pattern is invalid")
});

/// Engine types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineType {
    /// regex-automata meta engine (linear time guaranteed)
    Regex,
    /// Fancy-regex (supports lookahead, lookbehind, backreferences)
    FancyRegex,
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineType::Regex => write!(f, "regex"),
            EngineType::FancyRegex => write!(f, "fancy-regex"),
        }
    }
}

/// Errors reported by a backend. These are translated to text once, at the
/// boundary, by [`Error::compile`](super::error::Error::compile) and
/// [`Error::search`](super::error::Error::search).
#[allow(clippy::result_large_err)]
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("{0} is not supported by the {1} backend")]
    UnsupportedSyntax(Syntax, &'static str),

    #[error("cannot compile with an undefined encoding")]
    UndefinedEncoding,

    #[error("invalid subject: {0}")]
    InvalidSubject(String),

    #[error("search range {start}..{end} is outside a subject of {len} bytes")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },

    #[error("Regex error: {0}")]
    RegexError(#[from] meta::BuildError),

    #[error("Fancy-regex error: {0}")]
    FancyRegexError(#[from] fancy_regex::Error),
}

/// Compiles pattern bytes for a set of resolved options.
pub trait Backend: fmt::Debug {
    fn name(&self) -> &'static str;

    #[allow(clippy::result_large_err)]
    fn compile(
        &self,
        pattern: &[u8],
        options: &ResolvedOptions,
    ) -> Result<Box<dyn CompiledPattern>, EngineError>;
}

/// A compiled pattern owned by exactly one [`Regex`](super::pattern::Regex).
///
/// Dropping it releases the engine resources. Searching takes `&self`; a
/// backend whose engine keeps mutable scratch state must synchronise it
/// internally or not be shared across threads.
pub trait CompiledPattern: fmt::Debug + Send + Sync {
    /// Name of the engine that compiled the pattern.
    fn engine_name(&self) -> &'static str;

    /// Number of groups, including group 0.
    fn group_count(&self) -> usize;

    /// Number of named groups.
    fn name_count(&self) -> usize;

    /// Visit every `(name, group_index)` pair in group order.
    fn for_each_name(&self, visit: &mut dyn FnMut(&str, usize));

    /// Search for the first match starting inside `window`.
    ///
    /// Assertions may look at bytes of `subject` outside the window. Returns
    /// `Ok(false)` on mismatch, leaving `region` unspecified.
    #[allow(clippy::result_large_err)]
    fn search(
        &self,
        subject: &[u8],
        window: Range<usize>,
        region: &mut Region,
    ) -> Result<bool, EngineError>;

    /// Search for a non-empty match that starts exactly at `window.start`.
    ///
    /// The executor calls this after an empty match when `FIND_NOT_EMPTY` is
    /// set. Backends that cannot express it report `Ok(false)`.
    #[allow(clippy::result_large_err)]
    fn search_not_empty_at(
        &self,
        _subject: &[u8],
        _window: Range<usize>,
        _region: &mut Region,
    ) -> Result<bool, EngineError> {
        Ok(false)
    }
}

/// Features detected in a pattern that require fancy-regex
#[derive(Debug, Default)]
pub struct FancyFeatures {
    pub lookahead: bool,
    pub lookbehind: bool,
    pub backreference: bool,
    pub atomic_group: bool,
}

impl FancyFeatures {
    /// Returns true if any fancy feature is detected
    pub fn needs_fancy(&self) -> bool {
        self.lookahead || self.lookbehind || self.backreference || self.atomic_group
    }

    /// Get a description of why fancy-regex is needed
    pub fn reason(&self) -> Option<String> {
        let mut reasons = Vec::new();
        if self.lookahead {
            reasons.push("lookahead assertion");
        }
        if self.lookbehind {
            reasons.push("lookbehind assertion");
        }
        if self.backreference {
            reasons.push("backreference");
        }
        if self.atomic_group {
            reasons.push("atomic group");
        }

        if reasons.is_empty() {
            None
        } else {
            Some(format!("Pattern uses {}", reasons.join(", ")))
        }
    }
}

/// Detect which engine features are used in a pattern
pub fn detect_fancy_features(pattern: &str) -> FancyFeatures {
    let mut features = FancyFeatures::default();

    if pattern.contains("(?=") || pattern.contains("(?!") {
        features.lookahead = true;
    }
    if pattern.contains("(?<=") || pattern.contains("(?<!") {
        features.lookbehind = true;
    }
    if pattern.contains("(?>") {
        features.atomic_group = true;
    }

    // \1, \2, ... and \k<name>
    if BACKREFERENCE_RE.is_match(pattern) {
        features.backreference = true;
    }

    features
}

/// Select the appropriate engine for a pattern
pub fn select_engine(pattern: &str) -> (EngineType, FancyFeatures) {
    let features = detect_fancy_features(pattern);
    let engine = if features.needs_fancy() {
        EngineType::FancyRegex
    } else {
        EngineType::Regex
    };
    (engine, features)
}

/// Turn pattern bytes into engine source text.
///
/// UTF-8 patterns must be valid UTF-8. Other encodings compile in byte mode:
/// a non-ASCII byte becomes a `\xHH` escape, and a multi-byte character is
/// escaped as a whole, since its trail byte may look like an ASCII
/// metacharacter. Outside a bracket class the character is grouped so a
/// quantifier applies to all of it.
#[allow(clippy::result_large_err)]
pub fn pattern_text(pattern: &[u8], encoding: Encoding) -> Result<String, EngineError> {
    match encoding {
        Encoding::Undef => Err(EngineError::UndefinedEncoding),
        Encoding::Utf8 => std::str::from_utf8(pattern)
            .map(str::to_string)
            .map_err(|e| EngineError::InvalidPattern(format!("pattern is not valid UTF-8: {}", e))),
        _ => Ok(byte_mode_text(pattern, encoding)),
    }
}

fn byte_mode_text(pattern: &[u8], encoding: Encoding) -> String {
    let mut text = String::with_capacity(pattern.len());
    let mut class_depth = 0usize;
    let mut escaped = false;

    for (start, len) in encoding.char_boundaries(pattern) {
        let ch = &pattern[start..start + len];

        if len == 1 && ch[0].is_ascii() {
            let b = ch[0];
            text.push(char::from(b));
            if escaped {
                escaped = false;
                continue;
            }
            match b {
                b'\\' => escaped = true,
                b'[' => class_depth += 1,
                b']' => class_depth = class_depth.saturating_sub(1),
                _ => {}
            }
            continue;
        }

        // `\` before a non-ASCII character just quotes it
        if escaped {
            text.pop();
            escaped = false;
        }
        let grouped = len > 1 && class_depth == 0;
        if grouped {
            text.push_str("(?:");
        }
        for b in ch {
            text.push_str(&format!("\\x{:02X}", b));
        }
        if grouped {
            text.push(')');
        }
    }

    text
}

/// Inline flag prefix for engines configured through the pattern text
fn inline_flags(options: &ResolvedOptions) -> String {
    let mut flags = String::new();
    if options.options.contains(OptionFlags::IGNORECASE) {
        flags.push('i');
    }
    if options.line_anchors() {
        flags.push('m');
    }
    if options.options.contains(OptionFlags::MULTILINE) {
        flags.push('s');
    }
    if options.options.contains(OptionFlags::EXTEND) {
        flags.push('x');
    }

    if flags.is_empty() {
        flags
    } else {
        format!("(?{})", flags)
    }
}

/// Validate a search window against the subject
#[allow(clippy::result_large_err)]
pub fn check_window(subject: &[u8], window: &Range<usize>) -> Result<(), EngineError> {
    if window.start > window.end || window.end > subject.len() {
        return Err(EngineError::RangeOutOfBounds {
            start: window.start,
            end: window.end,
            len: subject.len(),
        });
    }
    Ok(())
}

/// A compiled regex that can use either engine
#[derive(Debug)]
pub enum CompiledRegex {
    Regex(meta::Regex),
    FancyRegex(FancyPattern),
}

/// A fancy-regex pattern and how subject bytes are presented to it.
///
/// fancy-regex searches `str`. UTF-8 subjects are used as they are; subjects
/// in any other encoding are read as Latin-1, one `char` per byte, which is
/// what the `\xHH` escapes of [`pattern_text`] match.
#[derive(Debug)]
pub struct FancyPattern {
    regex: fancy_regex::Regex,
    latin1: bool,
}

/// A subject as fancy-regex text, with the text offset of every subject byte
struct FancyText<'s> {
    text: Cow<'s, str>,
    offsets: Option<Vec<usize>>,
}

impl<'s> FancyText<'s> {
    #[allow(clippy::result_large_err)]
    fn new(subject: &'s [u8], latin1: bool) -> Result<Self, EngineError> {
        if !latin1 || subject.is_ascii() {
            let text = std::str::from_utf8(subject).map_err(|e| {
                EngineError::InvalidSubject(format!("fancy-regex requires UTF-8 input: {}", e))
            })?;
            return Ok(Self {
                text: Cow::Borrowed(text),
                offsets: None,
            });
        }

        let mut text = String::with_capacity(subject.len() * 2);
        let mut offsets = Vec::with_capacity(subject.len() + 1);
        for &b in subject {
            offsets.push(text.len());
            text.push(char::from(b));
        }
        offsets.push(text.len());

        Ok(Self {
            text: Cow::Owned(text),
            offsets: Some(offsets),
        })
    }

    #[allow(clippy::result_large_err)]
    fn text_offset(&self, pos: usize) -> Result<usize, EngineError> {
        match &self.offsets {
            Some(offsets) => Ok(offsets[pos]),
            None if self.text.is_char_boundary(pos) => Ok(pos),
            None => Err(EngineError::InvalidSubject(format!(
                "offset {} is not on a character boundary",
                pos
            ))),
        }
    }

    fn subject_offset(&self, pos: usize) -> usize {
        match &self.offsets {
            Some(offsets) => offsets.partition_point(|&o| o < pos),
            None => pos,
        }
    }
}

impl FancyPattern {
    /// Search the whole subject from `window.start`, keeping matches that end
    /// inside the window.
    #[allow(clippy::result_large_err)]
    fn search(
        &self,
        subject: &[u8],
        window: Range<usize>,
        region: &mut Region,
    ) -> Result<bool, EngineError> {
        let hay = FancyText::new(subject, self.latin1)?;
        let start = hay.text_offset(window.start)?;
        let end = hay.text_offset(window.end)?;
        let text: &str = &hay.text;

        let mut caps = self.regex.captures_from_pos(text, start)?;
        if caps
            .as_ref()
            .and_then(|c| c.get(0))
            .is_some_and(|m| m.end() > end)
        {
            // the leftmost match runs past the window; retry with the text cut there
            caps = self.regex.captures_from_pos(&text[..end], start)?;
        }
        let Some(caps) = caps else {
            return Ok(false);
        };

        region.reset(caps.len());
        for group in 0..caps.len() {
            region.set(
                group,
                caps.get(group).map(|m| {
                    Span::new(hay.subject_offset(m.start()), hay.subject_offset(m.end()))
                }),
            );
        }
        Ok(true)
    }
}

#[allow(clippy::result_large_err)]
impl CompiledRegex {
    /// Compile a pattern with automatic engine selection
    pub fn new(pattern: &str, options: &ResolvedOptions) -> Result<(Self, EngineType), EngineError> {
        let (engine, features) = select_engine(pattern);

        match engine {
            EngineType::Regex => {
                match build_meta(pattern, options) {
                    Ok(re) => Ok((CompiledRegex::Regex(re), EngineType::Regex)),
                    Err(err) => {
                        // Fall back to fancy-regex, but report the linear engine's error
                        // if neither accepts the pattern
                        let re = build_fancy(pattern, options).map_err(|_| err)?;
                        Ok((CompiledRegex::FancyRegex(re), EngineType::FancyRegex))
                    }
                }
            }
            EngineType::FancyRegex => {
                if let Some(reason) = features.reason() {
                    log::debug!("using fancy-regex: {}", reason);
                }
                let re = build_fancy(pattern, options)?;
                Ok((CompiledRegex::FancyRegex(re), EngineType::FancyRegex))
            }
        }
    }

    /// Compile with a specific engine
    pub fn with_engine(
        pattern: &str,
        engine: EngineType,
        options: &ResolvedOptions,
    ) -> Result<Self, EngineError> {
        match engine {
            EngineType::Regex => Ok(CompiledRegex::Regex(build_meta(pattern, options)?)),
            EngineType::FancyRegex => Ok(CompiledRegex::FancyRegex(build_fancy(pattern, options)?)),
        }
    }

    /// Get the engine type
    pub fn engine_type(&self) -> EngineType {
        match self {
            CompiledRegex::Regex(_) => EngineType::Regex,
            CompiledRegex::FancyRegex(_) => EngineType::FancyRegex,
        }
    }
}

fn build_meta(pattern: &str, options: &ResolvedOptions) -> Result<meta::Regex, meta::BuildError> {
    let unicode = options.encoding == Encoding::Utf8;
    let flags = options.options;

    let syntax = syntax::Config::new()
        .case_insensitive(flags.contains(OptionFlags::IGNORECASE))
        .ignore_whitespace(flags.contains(OptionFlags::EXTEND))
        .dot_matches_new_line(flags.contains(OptionFlags::MULTILINE))
        .multi_line(options.line_anchors())
        .unicode(unicode)
        .utf8(unicode);

    meta::Regex::builder()
        .syntax(syntax)
        .configure(meta::Config::new().utf8_empty(unicode))
        .build(pattern)
}

#[allow(clippy::result_large_err)]
fn build_fancy(pattern: &str, options: &ResolvedOptions) -> Result<FancyPattern, fancy_regex::Error> {
    let regex = fancy_regex::Regex::new(&format!("{}{}", inline_flags(options), pattern))?;
    Ok(FancyPattern {
        regex,
        latin1: options.encoding != Encoding::Utf8,
    })
}

/// `pattern` pinned to the search start by `\G` and refused when the match
/// would end where it began. Backtracking then tries the next alternative in
/// priority order, e.g. `a` for `a*?`.
#[allow(clippy::result_large_err)]
fn build_not_empty(
    pattern: &str,
    options: &ResolvedOptions,
) -> Result<FancyPattern, fancy_regex::Error> {
    // a trailing `#` comment in extended mode must not swallow the closing paren
    let close = if options.options.contains(OptionFlags::EXTEND) {
        "\n)"
    } else {
        ")"
    };
    build_fancy(&format!(r"\G(?:{}{}(?!\G)", pattern, close), options)
}

impl CompiledPattern for CompiledRegex {
    fn engine_name(&self) -> &'static str {
        match self {
            CompiledRegex::Regex(_) => "regex",
            CompiledRegex::FancyRegex(_) => "fancy-regex",
        }
    }

    fn group_count(&self) -> usize {
        match self {
            CompiledRegex::Regex(re) => re.group_info().group_len(PatternID::ZERO),
            CompiledRegex::FancyRegex(re) => re.regex.captures_len(),
        }
    }

    fn name_count(&self) -> usize {
        let mut count = 0;
        self.for_each_name(&mut |_, _| count += 1);
        count
    }

    fn for_each_name(&self, visit: &mut dyn FnMut(&str, usize)) {
        match self {
            CompiledRegex::Regex(re) => {
                for (index, name) in re.group_info().pattern_names(PatternID::ZERO).enumerate() {
                    if let Some(name) = name {
                        visit(name, index);
                    }
                }
            }
            CompiledRegex::FancyRegex(re) => {
                for (index, name) in re.regex.capture_names().enumerate() {
                    if let Some(name) = name {
                        visit(name, index);
                    }
                }
            }
        }
    }

    fn search(
        &self,
        subject: &[u8],
        window: Range<usize>,
        region: &mut Region,
    ) -> Result<bool, EngineError> {
        check_window(subject, &window)?;

        match self {
            CompiledRegex::Regex(re) => {
                let input = Input::new(subject).span(window);
                let mut caps = re.create_captures();
                re.search_captures(&input, &mut caps);
                if !caps.is_match() {
                    return Ok(false);
                }

                region.reset(caps.group_len());
                for group in 0..caps.group_len() {
                    region.set(
                        group,
                        caps.get_group(group).map(|s| Span::new(s.start, s.end)),
                    );
                }
                Ok(true)
            }
            CompiledRegex::FancyRegex(re) => re.search(subject, window, region),
        }
    }
}

/// What [`AutoBackend`] hands out: the compiled pattern, plus its non-empty
/// variant when `FIND_NOT_EMPTY` is set.
#[derive(Debug)]
struct BuiltinPattern {
    compiled: CompiledRegex,
    not_empty: Option<FancyPattern>,
}

impl CompiledPattern for BuiltinPattern {
    fn engine_name(&self) -> &'static str {
        self.compiled.engine_name()
    }

    fn group_count(&self) -> usize {
        self.compiled.group_count()
    }

    fn name_count(&self) -> usize {
        self.compiled.name_count()
    }

    fn for_each_name(&self, visit: &mut dyn FnMut(&str, usize)) {
        self.compiled.for_each_name(visit)
    }

    fn search(
        &self,
        subject: &[u8],
        window: Range<usize>,
        region: &mut Region,
    ) -> Result<bool, EngineError> {
        self.compiled.search(subject, window, region)
    }

    fn search_not_empty_at(
        &self,
        subject: &[u8],
        window: Range<usize>,
        region: &mut Region,
    ) -> Result<bool, EngineError> {
        let Some(not_empty) = &self.not_empty else {
            return Ok(false);
        };
        check_window(subject, &window)?;
        not_empty.search(subject, window, region)
    }
}

/// Default backend: picks an engine per pattern, or uses a forced one.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoBackend {
    engine: Option<EngineType>,
}

impl AutoBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always compile with `engine`.
    pub fn forced(engine: EngineType) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    /// Dialects whose grammar the built-in engines understand.
    pub fn supports_syntax(syntax: Syntax) -> bool {
        matches!(
            syntax,
            Syntax::Default | Syntax::Ruby | Syntax::Perl | Syntax::Java | Syntax::PosixExtended
        )
    }
}

const UNHONOURED_OPTIONS: OptionFlags = OptionFlags::FIND_LONGEST
    .union(OptionFlags::DONT_CAPTURE_GROUP)
    .union(OptionFlags::CAPTURE_GROUP)
    .union(OptionFlags::NOTBOL)
    .union(OptionFlags::NOTEOL)
    .union(OptionFlags::POSIX_REGION);

impl Backend for AutoBackend {
    fn name(&self) -> &'static str {
        "built-in"
    }

    fn compile(
        &self,
        pattern: &[u8],
        options: &ResolvedOptions,
    ) -> Result<Box<dyn CompiledPattern>, EngineError> {
        if !Self::supports_syntax(options.syntax) {
            return Err(EngineError::UnsupportedSyntax(options.syntax, self.name()));
        }

        let text = pattern_text(pattern, options.encoding)?;

        let ignored = options.options & UNHONOURED_OPTIONS;
        if !ignored.is_empty() {
            log::debug!("options {:?} are not honoured by the {} backend", ignored, self.name());
        }

        let compiled = match self.engine {
            Some(engine) => CompiledRegex::with_engine(&text, engine, options)?,
            None => CompiledRegex::new(&text, options)?.0,
        };

        log::debug!(
            "compiled /{}/ with {} ({}, {})",
            text,
            compiled.engine_type(),
            options.encoding,
            options.syntax
        );

        let not_empty = if options.options.contains(OptionFlags::FIND_NOT_EMPTY) {
            match build_not_empty(&text, options) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    log::debug!("no non-empty variant for /{}/: {}", text, e);
                    None
                }
            }
        } else {
            None
        };

        Ok(Box::new(BuiltinPattern {
            compiled,
            not_empty,
        }))
    }
}
