//! Core regex engine binding
//!
//! Option resolution, the pattern handle, matching, substitution and
//! scanning. The CLI calls into this module; [`apply`] reports its file
//! rewrites with the output layer's result types.

pub mod apply;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod matchdata;
pub mod options;
pub mod pattern;
pub mod region;
pub mod scan;
pub mod substitute;
pub mod template;

// Re-export commonly used types
pub use apply::{apply_file, ApplyError, ApplyOptions};
pub use engine::{AutoBackend, Backend, CompiledPattern, EngineError, EngineType};
pub use error::{Error, Result};
pub use matchdata::{MatchData, NameTable};
pub use options::{
    resolve_options, resolve_shortcuts, CompileOptions, Encoding, OptionFlags, OptionSource,
    ResolvedOptions, Syntax,
};
pub use pattern::{escape, Regex};
pub use region::{Region, Span};
pub use scan::Matches;
pub use substitute::{Replacer, Substitution};
pub use template::expand_template;
