//! Output types for oregex commands
//!
//! All output structures are JSON-first. Byte strings are rendered lossily
//! as UTF-8.

use serde::{Deserialize, Serialize};

use crate::core::{MatchData, Regex};

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// A single capture group within a match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capture {
    /// Group number (1-indexed for capturing groups)
    pub group: usize,
    /// Named group name (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Captured text, `null` when the group did not participate
    pub text: Option<String>,
    /// Start byte position (0-indexed)
    pub start: Option<usize>,
    /// End byte position (exclusive)
    pub end: Option<usize>,
}

/// A single match result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    /// Full matched text
    pub text: String,
    /// Start byte position (0-indexed)
    pub start: usize,
    /// End byte position (exclusive)
    pub end: usize,
    /// Capture groups (empty if no capturing groups)
    pub captures: Vec<Capture>,
}

impl From<&MatchData<'_>> for Match {
    fn from(m: &MatchData<'_>) -> Self {
        let name_of = |group: usize| {
            m.names().and_then(|names| {
                names
                    .iter()
                    .find(|(_, groups)| groups.contains(&group))
                    .map(|(name, _)| name.to_string())
            })
        };

        let captures = (1..m.len())
            .map(|group| {
                let span = m.offset(group);
                Capture {
                    group,
                    name: name_of(group),
                    text: m.get(group).map(lossy),
                    start: span.map(|s| s.start),
                    end: span.map(|s| s.end),
                }
            })
            .collect();

        Match {
            text: lossy(m.as_bytes()),
            start: m.start(),
            end: m.end(),
            captures,
        }
    }
}

/// How a pattern was compiled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternInfo {
    pub pattern: String,
    /// Which engine was used (regex or fancy-regex)
    pub engine: String,
    pub options: Vec<String>,
    pub encoding: String,
    pub syntax: String,
}

impl From<&Regex> for PatternInfo {
    fn from(re: &Regex) -> Self {
        PatternInfo {
            pattern: lossy(re.source()),
            engine: re.engine_name().to_string(),
            options: crate::core::options::option_names(re.options()),
            encoding: re.encoding().name().to_string(),
            syntax: re.syntax().name().to_string(),
        }
    }
}

/// Result of `oregex match`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(flatten)]
    pub pattern: PatternInfo,
    /// Length of input in bytes
    pub input_length: usize,
    /// Searched byte range
    pub range: [usize; 2],
    pub matched: bool,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub found: Option<Match>,
}

/// Result of `oregex scan`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    #[serde(flatten)]
    pub pattern: PatternInfo,
    pub input_length: usize,
    pub matched: bool,
    pub match_count: usize,
    pub matches: Vec<Match>,
}

/// Result of `oregex sub` / `oregex gsub`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubResult {
    #[serde(flatten)]
    pub pattern: PatternInfo,
    /// The replacement template
    pub template: String,
    pub global: bool,
    pub original: String,
    /// Result after replacement
    pub result: String,
    pub replacements_made: usize,
}

/// A single changed line (for file substitution)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplacePreview {
    /// Line number (1-indexed)
    pub line: usize,
    /// Original line content
    pub before: String,
    /// Line content after replacement
    pub after: String,
}

/// Result of `oregex apply`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    pub pattern: String,
    pub template: String,
    /// Path to the file that was modified
    pub file_path: String,
    pub global: bool,
    /// Path to the backup file (None if --no-backup)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,
    /// Total number of replacements made
    pub replacements_made: usize,
    /// Whether changes were actually written (false for dry-run)
    pub applied: bool,
    /// Preview of changes
    pub preview: Vec<ReplacePreview>,
}

/// Result of `oregex escape`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscapeResult {
    pub input: String,
    pub escaped: String,
    pub encoding: String,
}

/// A named group and the group indices it labels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedGroup {
    pub name: String,
    pub groups: Vec<usize>,
}

/// Result of `oregex inspect`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectResult {
    #[serde(flatten)]
    pub pattern: PatternInfo,
    /// `(?imx-imx:...)` form
    pub display: String,
    /// `/.../imx` form
    pub inspect: String,
    /// Number of capture groups, excluding the whole match
    pub group_count: usize,
    pub names: Vec<NamedGroup>,
}

impl From<&Regex> for InspectResult {
    fn from(re: &Regex) -> Self {
        let names = re
            .names()
            .map(|table| {
                table
                    .iter()
                    .map(|(name, groups)| NamedGroup {
                        name: name.to_string(),
                        groups: groups.to_vec(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        InspectResult {
            pattern: PatternInfo::from(re),
            display: re.to_string(),
            inspect: re.inspect(),
            group_count: re.group_count().saturating_sub(1),
            names,
        }
    }
}

/// Generic error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always true for errors
    pub error: bool,
    /// Error code
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: true,
            code: code.into(),
            message: message.into(),
        }
    }
}
