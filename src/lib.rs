//! oregex - multi-encoding regex matching over byte strings
//!
//! Compile patterns with Oniguruma-style options, encodings and syntaxes,
//! then search, substitute and scan.
//!
//! ```
//! use oregex::Regex;
//!
//! let re = Regex::with_shortcuts(r"(?<word>\w+)@", "i", Some("utf8"), None).unwrap();
//! assert_eq!(re.gsub("me@host you@host", r"\k<word> at ").unwrap(), b"me at host you at host");
//! ```

pub mod core;
pub mod output;

pub use crate::core::{
    escape, CompileOptions, Encoding, Error, MatchData, OptionFlags, Regex, Replacer, Result,
    Syntax,
};
