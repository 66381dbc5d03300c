//! Destructive substitution on a file, with an optional `.bak` backup

use std::fs;
use std::path::{Path, PathBuf};

use super::error::Error;
use super::pattern::Regex;
use crate::output::{ApplyResult, ReplacePreview};

/// Failure while applying a substitution to a file
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to create backup {path}: {source}")]
    Backup {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Regex(#[from] Error),
}

/// Options for [`apply_file`]
#[derive(Debug, Clone, Copy)]
pub struct ApplyOptions {
    /// Replace every match rather than only the first.
    pub global: bool,
    /// Report what would change without writing.
    pub dry_run: bool,
    /// Copy the original to `<path>.bak` before writing.
    pub backup: bool,
    pub max_preview: usize,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            global: true,
            dry_run: false,
            backup: true,
            max_preview: 20,
        }
    }
}

/// Substitute inside the file at `path`, rewriting it unless `dry_run` is set
/// or nothing matched.
pub fn apply_file(
    re: &Regex,
    template: &str,
    path: &Path,
    options: &ApplyOptions,
) -> Result<ApplyResult, ApplyError> {
    let display = path.display().to_string();
    let original = fs::read(path).map_err(|source| ApplyError::Read {
        path: display.clone(),
        source,
    })?;

    let substitution = re.substitute(&original, options.global, template)?;
    let replacements = substitution.replacements;
    let content = substitution.output;
    let changed = replacements > 0;

    let preview = line_preview(&original, &content, options.max_preview);
    let mut backup_path = None;
    let applied = changed && !options.dry_run;

    if applied {
        if options.backup {
            let bak = PathBuf::from(format!("{}.bak", display));
            fs::copy(path, &bak).map_err(|source| ApplyError::Backup {
                path: bak.display().to_string(),
                source,
            })?;
            backup_path = Some(bak.to_string_lossy().into_owned());
        }

        fs::write(path, &content).map_err(|source| ApplyError::Write {
            path: display.clone(),
            source,
        })?;
        log::info!("rewrote {} ({} replacement(s))", display, replacements);
    }

    Ok(ApplyResult {
        pattern: String::from_utf8_lossy(re.source()).into_owned(),
        template: template.to_string(),
        file_path: display,
        global: options.global,
        backup_path,
        replacements_made: replacements,
        applied,
        preview,
    })
}

/// Pair up changed lines; when the line count moved, show the whole file.
fn line_preview(before: &[u8], after: &[u8], max_preview: usize) -> Vec<ReplacePreview> {
    let before = String::from_utf8_lossy(before);
    let after = String::from_utf8_lossy(after);
    let old_lines: Vec<&str> = before.lines().collect();
    let new_lines: Vec<&str> = after.lines().collect();

    if old_lines.len() != new_lines.len() {
        if before == after {
            return Vec::new();
        }
        return vec![ReplacePreview {
            line: 1,
            before: before.into_owned(),
            after: after.into_owned(),
        }];
    }

    old_lines
        .iter()
        .zip(&new_lines)
        .enumerate()
        .filter(|(_, (old, new))| old != new)
        .take(max_preview)
        .map(|(i, (old, new))| ReplacePreview {
            line: i + 1,
            before: old.to_string(),
            after: new.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn temp_with(content: &str) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), content).unwrap();
        file
    }

    #[test]
    fn test_apply_rewrites_and_backs_up() {
        let file = temp_with("foo = 1\nbar = 2\nfoo = 3\n");
        let re = Regex::new(r"foo").unwrap();

        let result = apply_file(&re, "baz", file.path(), &ApplyOptions::default()).unwrap();

        assert!(result.applied);
        assert_eq!(result.replacements_made, 2);
        assert_eq!(result.preview.len(), 2);
        assert_eq!(
            fs::read_to_string(file.path()).unwrap(),
            "baz = 1\nbar = 2\nbaz = 3\n"
        );

        let bak = result.backup_path.unwrap();
        assert_eq!(fs::read_to_string(&bak).unwrap(), "foo = 1\nbar = 2\nfoo = 3\n");
        fs::remove_file(bak).unwrap();
    }

    #[test]
    fn test_apply_first_only_without_backup() {
        let file = temp_with("a a a");
        let re = Regex::new("a").unwrap();
        let options = ApplyOptions {
            global: false,
            backup: false,
            ..ApplyOptions::default()
        };

        let result = apply_file(&re, "b", file.path(), &options).unwrap();

        assert_eq!(result.replacements_made, 1);
        assert!(result.backup_path.is_none());
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "b a a");
    }

    #[test]
    fn test_dry_run_leaves_file() {
        let file = temp_with("hello world");
        let re = Regex::new(r"(\w+) (\w+)").unwrap();
        let options = ApplyOptions {
            dry_run: true,
            ..ApplyOptions::default()
        };

        let result = apply_file(&re, r"\2 \1", file.path(), &options).unwrap();

        assert!(!result.applied);
        assert_eq!(result.preview[0].after, "world hello");
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "hello world");
    }

    #[test]
    fn test_no_match_does_not_write() {
        let file = temp_with("abc");
        let re = Regex::new(r"\d").unwrap();

        let result = apply_file(&re, "x", file.path(), &ApplyOptions::default()).unwrap();

        assert!(!result.applied);
        assert_eq!(result.replacements_made, 0);
        assert!(result.backup_path.is_none());
    }

    #[test]
    fn test_missing_file() {
        let re = Regex::new("a").unwrap();
        let err = apply_file(
            &re,
            "b",
            Path::new("/nonexistent/oregex-test"),
            &ApplyOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ApplyError::Read { .. }));
    }
}
