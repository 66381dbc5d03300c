//! CLI interface using clap
//!
//! Defines all command-line arguments and subcommands.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};

use oregex::core::{
    apply_file, resolve_options, ApplyError, ApplyOptions, AutoBackend, CompileOptions, Encoding,
    EngineType, Error, Regex, ResolvedOptions, Syntax,
};
use oregex::output::json::format_json;
use oregex::output::text;
use oregex::output::{
    EscapeResult, InspectResult, Match, MatchResult, PatternInfo, ScanResult, SubResult,
};

#[derive(Parser)]
#[command(name = "oregex")]
#[command(author, version, about = "Multi-encoding regex matching, substitution and scanning", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub compile: CompileArgs,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON output (default)
    Json,
    /// Human-readable text
    Text,
}

/// How patterns are compiled
#[derive(Args, Clone, Default)]
pub struct CompileArgs {
    /// Option characters: i (ignore case), x (extended), m (dot matches newline), s, l, E, ...
    #[arg(long, short = 'o', global = true, default_value = "")]
    pub options: String,

    /// Encoding name, e.g. utf8, ascii, sjis, euc_jp
    #[arg(long, short = 'e', global = true, default_value = "utf8")]
    pub encoding: String,

    /// Syntax name, e.g. ruby, perl, java
    #[arg(long, short = 's', global = true)]
    pub syntax: Option<String>,

    /// Compile options as JSON, e.g. '{"options": 1, "encoding": "UTF8"}'
    #[arg(long, global = true, conflicts_with = "options")]
    pub config: Option<String>,

    /// Force specific engine (regex or fancy-regex)
    #[arg(long, global = true)]
    pub engine: Option<String>,
}

/// Where the subject comes from
#[derive(Args, Clone, Default)]
pub struct SubjectArgs {
    /// Subject text (use --file for file input, or pipe via stdin)
    pub subject: Option<String>,

    /// File to read the subject from
    #[arg(long, short = 'F', conflicts_with = "subject")]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for the first match
    Match {
        /// The pattern
        pattern: String,

        #[command(flatten)]
        input: SubjectArgs,

        /// Byte offset where the search window starts
        #[arg(long)]
        begin: Option<usize>,

        /// Byte offset where the search window ends
        #[arg(long)]
        end: Option<usize>,
    },

    /// Replace the first match
    Sub {
        /// The pattern
        pattern: String,

        /// The replacement template (supports \1, \k<name>, \&, \`, \', \+)
        template: String,

        #[command(flatten)]
        input: SubjectArgs,
    },

    /// Replace every match
    Gsub {
        /// The pattern
        pattern: String,

        /// The replacement template (supports \1, \k<name>, \&, \`, \', \+)
        template: String,

        #[command(flatten)]
        input: SubjectArgs,
    },

    /// List every match
    Scan {
        /// The pattern
        pattern: String,

        #[command(flatten)]
        input: SubjectArgs,

        /// Maximum number of matches to return
        #[arg(long, default_value = "100")]
        max_matches: usize,
    },

    /// Substitute inside a file in place (with backup)
    Apply {
        /// The pattern
        pattern: String,

        /// The replacement template
        template: String,

        /// File to rewrite
        #[arg(long, short = 'F', required = true)]
        file: PathBuf,

        /// Dry-run mode (show what would change, don't write)
        #[arg(long)]
        dry_run: bool,

        /// Disable backup (.bak) creation
        #[arg(long)]
        no_backup: bool,

        /// Replace only the first match instead of all
        #[arg(long)]
        first: bool,

        /// Maximum number of preview lines
        #[arg(long, default_value = "20")]
        max_preview: usize,
    },

    /// Escape regex metacharacters in text
    Escape {
        /// Text to escape
        text: String,
    },

    /// Show how a pattern compiles
    Inspect {
        /// The pattern
        pattern: String,
    },
}

/// Parse CLI arguments
pub fn parse() -> Cli {
    Cli::parse()
}

/// Stable error code for the JSON error object
pub fn error_code(err: &anyhow::Error) -> &'static str {
    if let Some(e) = err.downcast_ref::<Error>() {
        return e.code();
    }
    match err.downcast_ref::<ApplyError>() {
        Some(ApplyError::Regex(e)) => e.code(),
        Some(_) => "IO_ERROR",
        None => "COMMAND_ERROR",
    }
}

fn engine_type(name: &str) -> anyhow::Result<EngineType> {
    match name {
        "regex" => Ok(EngineType::Regex),
        "fancy-regex" | "fancy" => Ok(EngineType::FancyRegex),
        _ => bail!("Unknown engine '{}'. Valid options: regex, fancy-regex", name),
    }
}

impl CompileArgs {
    /// Resolve options strictly: unknown encoding or syntax names are errors.
    pub fn resolve(&self) -> anyhow::Result<ResolvedOptions> {
        if let Some(json) = &self.config {
            let config = CompileOptions::from_json(json).context("invalid --config JSON")?;
            return Ok(resolve_options(config));
        }

        let encoding = Encoding::from_str(&self.encoding)?;
        let syntax = match &self.syntax {
            Some(name) => Syntax::from_str(name)?,
            None => Syntax::default(),
        };
        let flags = resolve_options(self.options.as_str()).options;
        Ok(ResolvedOptions::new(flags, encoding, syntax))
    }

    pub fn compile(&self, pattern: &str) -> anyhow::Result<Regex> {
        let options = self.resolve()?;
        let backend = match &self.engine {
            Some(name) => AutoBackend::forced(engine_type(name)?),
            None => AutoBackend::new(),
        };
        Ok(Regex::with_backend(pattern, options, &backend)?)
    }
}

impl SubjectArgs {
    /// Subject bytes from the argument, the file, or stdin.
    pub fn read(&self, command: &str) -> anyhow::Result<Vec<u8>> {
        if let Some(text) = &self.subject {
            return Ok(text.as_bytes().to_vec());
        }
        if let Some(path) = &self.file {
            return std::fs::read(path)
                .with_context(|| format!("Failed to read file: {}", path.display()));
        }

        // Read from stdin, but hint if it's a terminal (no pipe)
        if io::stdin().is_terminal() {
            eprintln!("oregex: reading from stdin (pipe data or press Ctrl-D when done)");
            eprintln!(
                "  hint: oregex {} ... \"text\", or: cat file | oregex {} ...",
                command, command
            );
        }
        let mut input = Vec::new();
        io::stdin()
            .read_to_end(&mut input)
            .context("Failed to read stdin")?;
        Ok(input)
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Handle the match command
pub fn handle_match(
    pattern: &str,
    input: &SubjectArgs,
    begin: Option<usize>,
    end: Option<usize>,
    compile: &CompileArgs,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let re = compile.compile(pattern)?;
    let subject = input.read("match")?;
    let range = begin.unwrap_or(0)..end.unwrap_or(subject.len());

    let found = re.search(&subject, range.clone())?;
    let result = MatchResult {
        pattern: PatternInfo::from(&re),
        input_length: subject.len(),
        range: [range.start, range.end],
        matched: found.is_some(),
        found: found.as_ref().map(Match::from),
    };

    match format {
        OutputFormat::Json => Ok(format_json(&result)),
        OutputFormat::Text => Ok(text::format_match_result(&result)),
    }
}

/// Handle the sub and gsub commands
pub fn handle_sub(
    pattern: &str,
    template: &str,
    input: &SubjectArgs,
    global: bool,
    compile: &CompileArgs,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let re = compile.compile(pattern)?;
    let subject = input.read(if global { "gsub" } else { "sub" })?;

    let substitution = re.substitute(&subject, global, template)?;
    let result = SubResult {
        pattern: PatternInfo::from(&re),
        template: template.to_string(),
        global,
        original: lossy(&subject),
        result: lossy(&substitution.output),
        replacements_made: substitution.replacements,
    };

    match format {
        OutputFormat::Json => Ok(format_json(&result)),
        OutputFormat::Text => Ok(text::format_sub_result(&result)),
    }
}

/// Handle the scan command
pub fn handle_scan(
    pattern: &str,
    input: &SubjectArgs,
    max_matches: usize,
    compile: &CompileArgs,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let re = compile.compile(pattern)?;
    let subject = input.read("scan")?;

    let mut matches = Vec::new();
    for m in re.matches(&subject).take(max_matches) {
        matches.push(Match::from(&m?));
    }
    let result = ScanResult {
        pattern: PatternInfo::from(&re),
        input_length: subject.len(),
        matched: !matches.is_empty(),
        match_count: matches.len(),
        matches,
    };

    match format {
        OutputFormat::Json => Ok(format_json(&result)),
        OutputFormat::Text => Ok(text::format_scan_result(&result)),
    }
}

/// Handle the apply command
#[allow(clippy::too_many_arguments)]
pub fn handle_apply(
    pattern: &str,
    template: &str,
    file: &std::path::Path,
    dry_run: bool,
    no_backup: bool,
    first: bool,
    max_preview: usize,
    compile: &CompileArgs,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let re = compile.compile(pattern)?;
    let options = ApplyOptions {
        global: !first,
        dry_run,
        backup: !no_backup,
        max_preview,
    };

    let result = apply_file(&re, template, file, &options)?;

    match format {
        OutputFormat::Json => Ok(format_json(&result)),
        OutputFormat::Text => Ok(text::format_apply_result(&result)),
    }
}

/// Handle the escape command
pub fn handle_escape(
    input: &str,
    compile: &CompileArgs,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let encoding = compile.resolve()?.encoding;
    let result = EscapeResult {
        input: input.to_string(),
        escaped: lossy(&Regex::escape(input, encoding)),
        encoding: encoding.name().to_string(),
    };

    match format {
        OutputFormat::Json => Ok(format_json(&result)),
        OutputFormat::Text => Ok(text::format_escape_result(&result)),
    }
}

/// Handle the inspect command
pub fn handle_inspect(
    pattern: &str,
    compile: &CompileArgs,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let re = compile.compile(pattern)?;
    let result = InspectResult::from(&re);

    match format {
        OutputFormat::Json => Ok(format_json(&result)),
        OutputFormat::Text => Ok(text::format_inspect_result(&result)),
    }
}
