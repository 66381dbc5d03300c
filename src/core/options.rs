//! Option, encoding and syntax resolution
//!
//! Maps symbolic identifiers (option flags, encoding names, syntax names) to the
//! enumerations a [`Backend`](super::engine::Backend) compiles with. Two input
//! forms are accepted: a structured [`CompileOptions`] value (the JSON-friendly
//! form) and the compact shortcut form (`"ix"`, `"utf8"`, `"java"`).

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Compile-time option bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OptionFlags: u32 {
        const IGNORECASE = 1;
        const EXTEND = 2;
        /// Dot matches newline.
        const MULTILINE = 4;
        /// `$` matches only at the end of the subject.
        const SINGLELINE = 8;
        const FIND_LONGEST = 16;
        const FIND_NOT_EMPTY = 32;
        const NEGATE_SINGLELINE = 64;
        const DONT_CAPTURE_GROUP = 128;
        const CAPTURE_GROUP = 256;
        const NOTBOL = 512;
        const NOTEOL = 1024;
        const POSIX_REGION = 2048;
    }
}

impl OptionFlags {
    pub const DEFAULT: OptionFlags = OptionFlags::empty();
    pub const NONE: OptionFlags = OptionFlags::empty();
}

/// Shortcut characters in registration order.
///
/// `E` is registered twice (find-not-empty, then not-end-of-line). Lookups
/// honour the later registration, so `E` resolves to [`OptionFlags::NOTEOL`].
pub const OPTION_SHORTCUTS: &[(char, OptionFlags)] = &[
    ('i', OptionFlags::IGNORECASE),
    ('x', OptionFlags::EXTEND),
    ('m', OptionFlags::MULTILINE),
    ('s', OptionFlags::SINGLELINE),
    ('l', OptionFlags::FIND_LONGEST),
    ('E', OptionFlags::FIND_NOT_EMPTY),
    ('S', OptionFlags::NEGATE_SINGLELINE),
    ('G', OptionFlags::DONT_CAPTURE_GROUP),
    ('g', OptionFlags::CAPTURE_GROUP),
    ('B', OptionFlags::NOTBOL),
    ('E', OptionFlags::NOTEOL),
];

/// Look up a single shortcut character; the last registration wins.
pub fn shortcut(c: char) -> Option<OptionFlags> {
    OPTION_SHORTCUTS
        .iter()
        .rev()
        .find(|(key, _)| *key == c)
        .map(|(_, flag)| *flag)
}

/// Error returned by the strict name parsers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnknownName {
    #[error("unknown encoding '{0}'")]
    Encoding(String),
    #[error("unknown syntax '{0}'")]
    Syntax(String),
}

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident, prefix = $prefix:literal, error = $err:ident {
            $($variant:ident = $id:literal => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(u8)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant = $id,)+
        }

        impl $name {
            /// Every identifier, in table order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Identifier name without the prefix, e.g. `UTF8`.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Numeric identifier of the table entry.
            pub fn id(self) -> u8 {
                self as u8
            }

            pub fn from_id(id: u8) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.id() == id)
            }

            /// Resolve a name the way the compact form does: uppercase it and
            /// look up `<PREFIX>_<NAME>`.
            pub fn lookup(name: &str) -> Option<Self> {
                let upper = name.to_ascii_uppercase();
                let ident = upper
                    .strip_prefix(concat!($prefix, "_"))
                    .unwrap_or(&upper);
                Self::ALL.iter().copied().find(|v| v.name() == ident)
            }
        }

        impl FromStr for $name {
            type Err = UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::lookup(s).ok_or_else(|| UnknownName::$err(s.to_string()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.name())
            }
        }
    };
}

named_enum! {
    /// Character encodings known to the resolver.
    pub enum Encoding, prefix = "ENCODING", error = Encoding {
        Undef = 0 => "UNDEF",
        Ascii = 1 => "ASCII",
        Iso8859_1 = 2 => "ISO_8859_1",
        Iso8859_2 = 3 => "ISO_8859_2",
        Iso8859_3 = 4 => "ISO_8859_3",
        Iso8859_4 = 5 => "ISO_8859_4",
        Iso8859_5 = 6 => "ISO_8859_5",
        Iso8859_6 = 7 => "ISO_8859_6",
        Iso8859_7 = 8 => "ISO_8859_7",
        Iso8859_8 = 9 => "ISO_8859_8",
        Iso8859_9 = 10 => "ISO_8859_9",
        Iso8859_10 = 11 => "ISO_8859_10",
        Iso8859_11 = 12 => "ISO_8859_11",
        Iso8859_13 = 13 => "ISO_8859_13",
        Iso8859_14 = 14 => "ISO_8859_14",
        Iso8859_15 = 15 => "ISO_8859_15",
        Iso8859_16 = 16 => "ISO_8859_16",
        Utf8 = 17 => "UTF8",
        EucJp = 18 => "EUC_JP",
        EucTw = 19 => "EUC_TW",
        EucKr = 20 => "EUC_KR",
        EucCn = 21 => "EUC_CN",
        Sjis = 22 => "SJIS",
        Koi8 = 23 => "KOI8",
        Koi8R = 24 => "KOI8_R",
        Big5 = 25 => "BIG5",
    }
}

named_enum! {
    /// Regex dialects known to the resolver.
    pub enum Syntax, prefix = "SYNTAX", error = Syntax {
        Default = 0 => "DEFAULT",
        PosixBasic = 1 => "POSIX_BASIC",
        PosixExtended = 2 => "POSIX_EXTENDED",
        Emacs = 3 => "EMACS",
        Grep = 4 => "GREP",
        GnuRegex = 5 => "GNU_REGEX",
        Java = 6 => "JAVA",
        Perl = 7 => "PERL",
        Ruby = 8 => "RUBY",
    }
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Ascii
    }
}

impl Default for Syntax {
    fn default() -> Self {
        Syntax::Default
    }
}

impl Syntax {
    /// Whether `^`/`$` are string anchors rather than line anchors unless
    /// told otherwise.
    pub fn singleline_by_default(self) -> bool {
        matches!(
            self,
            Syntax::PosixBasic
                | Syntax::PosixExtended
                | Syntax::Grep
                | Syntax::Java
                | Syntax::Perl
        )
    }
}

/// Fully resolved compile parameters of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvedOptions {
    pub options: OptionFlags,
    pub encoding: Encoding,
    pub syntax: Syntax,
}

impl ResolvedOptions {
    pub fn new(options: OptionFlags, encoding: Encoding, syntax: Syntax) -> Self {
        Self {
            options,
            encoding,
            syntax,
        }
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.options.contains(OptionFlags::IGNORECASE)
    }

    /// Whether `^` and `$` match at line boundaries.
    pub fn line_anchors(&self) -> bool {
        let singleline = (self.syntax.singleline_by_default()
            || self.options.contains(OptionFlags::SINGLELINE))
            && !self.options.contains(OptionFlags::NEGATE_SINGLELINE);
        !singleline
    }
}

/// Structured configuration form: `{ "options": 5, "encoding": "UTF8", "syntax": "RUBY" }`.
///
/// Absent keys fall back to the default option set, `ASCII` and the default syntax.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub options: Option<u32>,
    pub encoding: Option<Encoding>,
    pub syntax: Option<Syntax>,
}

impl CompileOptions {
    /// Parse the structured form from JSON.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Either of the two accepted option forms
#[derive(Debug, Clone)]
pub enum OptionSource<'a> {
    Structured(CompileOptions),
    Shortcuts {
        options: Option<&'a str>,
        encoding: Option<&'a str>,
        syntax: Option<&'a str>,
    },
}

impl From<CompileOptions> for OptionSource<'_> {
    fn from(options: CompileOptions) -> Self {
        OptionSource::Structured(options)
    }
}

impl<'a> From<&'a str> for OptionSource<'a> {
    fn from(options: &'a str) -> Self {
        OptionSource::Shortcuts {
            options: Some(options),
            encoding: None,
            syntax: None,
        }
    }
}

impl From<OptionFlags> for OptionSource<'_> {
    fn from(options: OptionFlags) -> Self {
        OptionSource::Structured(CompileOptions {
            options: Some(options.bits()),
            ..CompileOptions::default()
        })
    }
}

/// Resolve either option form to a bitmask, encoding and syntax.
pub fn resolve_options<'a>(source: impl Into<OptionSource<'a>>) -> ResolvedOptions {
    match source.into() {
        OptionSource::Structured(config) => ResolvedOptions {
            options: config
                .options
                .map(OptionFlags::from_bits_truncate)
                .unwrap_or_default(),
            encoding: config.encoding.unwrap_or_default(),
            syntax: config.syntax.unwrap_or_default(),
        },
        OptionSource::Shortcuts {
            options,
            encoding,
            syntax,
        } => resolve_shortcuts(options.unwrap_or(""), encoding, syntax),
    }
}

/// Resolve the compact form.
///
/// Unrecognised option characters are ignored. Encoding and syntax names that
/// do not resolve leave the default in place; this is logged, not rejected.
/// Use [`Encoding::from_str`] / [`Syntax::from_str`] to fail on unknown names.
pub fn resolve_shortcuts(
    options: &str,
    encoding: Option<&str>,
    syntax: Option<&str>,
) -> ResolvedOptions {
    let options = options
        .chars()
        .filter_map(shortcut)
        .fold(OptionFlags::empty(), |acc, flag| acc | flag);

    let encoding = match encoding {
        Some(name) => Encoding::lookup(name).unwrap_or_else(|| {
            log::warn!("unknown encoding '{}', using {}", name, Encoding::default());
            Encoding::default()
        }),
        None => Encoding::default(),
    };

    let syntax = match syntax {
        Some(name) => Syntax::lookup(name).unwrap_or_else(|| {
            log::warn!("unknown syntax '{}', using {}", name, Syntax::default());
            Syntax::default()
        }),
        None => Syntax::default(),
    };

    ResolvedOptions {
        options,
        encoding,
        syntax,
    }
}

/// Names of the set option bits, for display.
pub fn option_names(options: OptionFlags) -> Vec<String> {
    options
        .iter_names()
        .map(|(name, _)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcuts_build_bitmask() {
        let resolved = resolve_shortcuts("ixm", None, None);
        assert_eq!(
            resolved.options,
            OptionFlags::IGNORECASE | OptionFlags::EXTEND | OptionFlags::MULTILINE
        );
        assert_eq!(resolved.encoding, Encoding::Ascii);
        assert_eq!(resolved.syntax, Syntax::Default);
    }

    #[test]
    fn test_unknown_shortcut_ignored() {
        let resolved = resolve_shortcuts("iqz", None, None);
        assert_eq!(resolved.options, OptionFlags::IGNORECASE);
    }

    #[test]
    fn test_duplicate_e_shortcut_resolves_to_noteol() {
        assert_eq!(shortcut('E'), Some(OptionFlags::NOTEOL));
        let resolved = resolve_shortcuts("E", None, None);
        assert!(!resolved.options.contains(OptionFlags::FIND_NOT_EMPTY));
    }

    #[test]
    fn test_names_are_uppercased() {
        let resolved = resolve_shortcuts("", Some("utf8"), Some("java"));
        assert_eq!(resolved.encoding, Encoding::Utf8);
        assert_eq!(resolved.syntax, Syntax::Java);

        let resolved = resolve_shortcuts("", Some("iso_8859_15"), Some("posix_extended"));
        assert_eq!(resolved.encoding, Encoding::Iso8859_15);
        assert_eq!(resolved.syntax, Syntax::PosixExtended);
    }

    #[test]
    fn test_unknown_names_keep_defaults() {
        let resolved = resolve_shortcuts("i", Some("klingon"), Some("cobol"));
        assert_eq!(resolved.encoding, Encoding::Ascii);
        assert_eq!(resolved.syntax, Syntax::Default);
        assert!(resolved.is_case_insensitive());
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        assert_eq!("sjis".parse::<Encoding>(), Ok(Encoding::Sjis));
        assert_eq!("ENCODING_BIG5".parse::<Encoding>(), Ok(Encoding::Big5));
        assert!("utf-16".parse::<Encoding>().is_err());
        assert!(matches!(
            "cobol".parse::<Syntax>(),
            Err(UnknownName::Syntax(_))
        ));
    }

    #[test]
    fn test_encoding_table_is_complete() {
        assert_eq!(Encoding::ALL.len(), 26);
        assert_eq!(Syntax::ALL.len(), 9);
        assert_eq!(Encoding::from_id(17), Some(Encoding::Utf8));
        assert_eq!(Encoding::Koi8R.to_string(), "ENCODING_KOI8_R");
        assert_eq!(Syntax::GnuRegex.to_string(), "SYNTAX_GNU_REGEX");
    }

    #[test]
    fn test_structured_defaults() {
        let resolved = resolve_options(CompileOptions::default());
        assert_eq!(resolved, ResolvedOptions::default());
    }

    #[test]
    fn test_structured_from_json() {
        let config =
            CompileOptions::from_json(r#"{"options": 5, "encoding": "UTF8", "syntax": "PERL"}"#)
                .unwrap();
        let resolved = resolve_options(config);
        assert_eq!(
            resolved.options,
            OptionFlags::IGNORECASE | OptionFlags::MULTILINE
        );
        assert_eq!(resolved.encoding, Encoding::Utf8);
        assert_eq!(resolved.syntax, Syntax::Perl);
    }

    #[test]
    fn test_line_anchor_mode() {
        let ruby = ResolvedOptions::default();
        assert!(ruby.line_anchors());

        let ruby_single = ResolvedOptions::new(OptionFlags::SINGLELINE, Encoding::Ascii, Syntax::Ruby);
        assert!(!ruby_single.line_anchors());

        let perl = ResolvedOptions::new(OptionFlags::empty(), Encoding::Ascii, Syntax::Perl);
        assert!(!perl.line_anchors());

        let perl_negated =
            ResolvedOptions::new(OptionFlags::NEGATE_SINGLELINE, Encoding::Ascii, Syntax::Perl);
        assert!(perl_negated.line_anchors());
    }
}
