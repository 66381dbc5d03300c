//! Human-friendly text output formatting
//!
//! Used when --format text is specified.

use super::types::*;

fn plural(count: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", count, if count == 1 { singular } else { plural })
}

fn format_pattern_info(output: &mut String, info: &PatternInfo) {
    output.push_str(&format!("Pattern:  {}\n", info.pattern));
    output.push_str(&format!(
        "Engine:   {} ({})\n",
        info.engine,
        if info.engine == "regex" {
            "linear time"
        } else {
            "backtracking"
        }
    ));
    output.push_str(&format!("Encoding: {}\n", info.encoding));
    output.push_str(&format!("Syntax:   {}\n", info.syntax));
    if !info.options.is_empty() {
        output.push_str(&format!("Options:  {}\n", info.options.join(" | ")));
    }
}

fn format_match(output: &mut String, index: usize, m: &Match) {
    output.push_str(&format!(
        "Match {}: \"{}\" [{}..{}]\n",
        index, m.text, m.start, m.end
    ));

    for cap in &m.captures {
        let name_str = cap
            .name
            .as_ref()
            .map(|n| format!(" ({})", n))
            .unwrap_or_default();
        match (&cap.text, cap.start, cap.end) {
            (Some(text), Some(start), Some(end)) => output.push_str(&format!(
                "  Group {}{}: \"{}\" [{}..{}]\n",
                cap.group, name_str, text, start, end
            )),
            _ => output.push_str(&format!("  Group {}{}: (unmatched)\n", cap.group, name_str)),
        }
    }
}

/// Format MatchResult as human-readable text
pub fn format_match_result(result: &MatchResult) -> String {
    let mut output = String::new();
    format_pattern_info(&mut output, &result.pattern);
    output.push('\n');

    match &result.found {
        Some(m) => format_match(&mut output, 1, m),
        None => output.push_str(&format!(
            "No match in [{}..{}]\n",
            result.range[0], result.range[1]
        )),
    }

    output
}

/// Format ScanResult as human-readable text
pub fn format_scan_result(result: &ScanResult) -> String {
    let mut output = String::new();
    format_pattern_info(&mut output, &result.pattern);
    output.push('\n');

    if result.matched {
        for (i, m) in result.matches.iter().enumerate() {
            format_match(&mut output, i + 1, m);
        }
        output.push('\n');
        output.push_str(&format!(
            "{} found\n",
            plural(result.match_count, "match", "matches")
        ));
    } else {
        output.push_str("No matches found\n");
    }

    output
}

/// Format SubResult as human-readable text
pub fn format_sub_result(result: &SubResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Pattern:  {}\n", result.pattern.pattern));
    output.push_str(&format!("Template: {}\n", result.template));
    output.push('\n');
    output.push_str(&format!("Original: {}\n", result.original));
    output.push_str(&format!("Result:   {}\n", result.result));
    output.push('\n');
    output.push_str(&format!(
        "{} made\n",
        plural(result.replacements_made, "replacement", "replacements")
    ));

    output
}

/// Format ApplyResult as human-readable text
pub fn format_apply_result(result: &ApplyResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("File:     {}\n", result.file_path));
    output.push_str(&format!("Pattern:  {}\n", result.pattern));
    output.push_str(&format!("Template: {}\n", result.template));
    output.push('\n');

    for preview in &result.preview {
        output.push_str(&format!(
            "Line {}: {} → {}\n",
            preview.line, preview.before, preview.after
        ));
    }
    if !result.preview.is_empty() {
        output.push('\n');
    }

    let count = plural(result.replacements_made, "replacement", "replacements");
    if result.applied {
        output.push_str(&format!("{} applied\n", count));
        if let Some(ref bak) = result.backup_path {
            output.push_str(&format!("Backup: {}\n", bak));
        }
    } else {
        output.push_str(&format!("{} (not written)\n", count));
    }

    output
}

/// Format EscapeResult as human-readable text
pub fn format_escape_result(result: &EscapeResult) -> String {
    format!("{}\n", result.escaped)
}

/// Format InspectResult as human-readable text
pub fn format_inspect_result(result: &InspectResult) -> String {
    let mut output = String::new();
    format_pattern_info(&mut output, &result.pattern);
    output.push('\n');
    output.push_str(&format!("Display:  {}\n", result.display));
    output.push_str(&format!("Inspect:  {}\n", result.inspect));
    output.push_str(&format!("Groups:   {}\n", result.group_count));

    for named in &result.names {
        let groups: Vec<String> = named.groups.iter().map(|g| g.to_string()).collect();
        output.push_str(&format!("  {} -> {}\n", named.name, groups.join(", ")));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Regex;

    #[test]
    fn test_scan_text() {
        let re = Regex::new(r"(\d)(x)?").unwrap();
        let matches: Vec<Match> = re
            .matches("1 2")
            .map(|m| Match::from(&m.unwrap()))
            .collect();
        let result = ScanResult {
            pattern: PatternInfo::from(&re),
            input_length: 3,
            matched: true,
            match_count: matches.len(),
            matches,
        };

        let text = format_scan_result(&result);
        assert!(text.contains("Match 2: \"2\" [2..3]"));
        assert!(text.contains("Group 2: (unmatched)"));
        assert!(text.contains("2 matches found"));
    }

    #[test]
    fn test_sub_text_singular() {
        let re = Regex::new("a").unwrap();
        let result = SubResult {
            pattern: PatternInfo::from(&re),
            template: "b".into(),
            global: false,
            original: "a".into(),
            result: "b".into(),
            replacements_made: 1,
        };
        assert!(format_sub_result(&result).contains("1 replacement made"));
    }
}
