//! Fuzzy tool-name dispatch and authorization.
//!
//! Clients sometimes ask for a tool by a free-form name ("format
//! code"). When the incoming name is not a registered tool, the
//! matcher scores it against a static table of canonical names,
//! aliases, and example phrases, and remaps it when the best score
//! clears the configured threshold. Matching is deterministic: the
//! table order breaks ties, first entry wins.

use std::collections::HashSet;

/// One candidate in the static match table.
struct ToolSpec {
    name: &'static str,
    aliases: &'static [&'static str],
    phrases: &'static [&'static str],
}

/// Canonical tool names in registration order.
pub const TOOL_NAMES: [&str; 7] = [
    "go_build",
    "go_run",
    "go_test",
    "go_fmt",
    "go_mod",
    "go_analyze",
    "go_workspace",
];

static TOOLS: [ToolSpec; 7] = [
    ToolSpec {
        name: "go_build",
        aliases: &["build", "compile", "gobuild"],
        phrases: &["compile code", "build the project", "compile go program"],
    },
    ToolSpec {
        name: "go_run",
        aliases: &["run", "execute", "gorun"],
        phrases: &["run code", "execute program", "run go program"],
    },
    ToolSpec {
        name: "go_test",
        aliases: &["test", "gotest"],
        phrases: &["run tests", "test code", "run unit tests"],
    },
    ToolSpec {
        name: "go_fmt",
        aliases: &["fmt", "format", "gofmt"],
        phrases: &["format code", "format go source", "fix formatting"],
    },
    ToolSpec {
        name: "go_mod",
        aliases: &["mod", "modules", "gomod"],
        phrases: &["manage modules", "tidy dependencies", "init module"],
    },
    ToolSpec {
        name: "go_analyze",
        aliases: &["analyze", "vet", "lint", "govet"],
        phrases: &["vet code", "analyze code", "find issues in code"],
    },
    ToolSpec {
        name: "go_workspace",
        aliases: &["workspace", "work", "gowork"],
        phrases: &["manage workspace", "multi module workspace", "workspace info"],
    },
];

/// Result of a fuzzy match.
#[derive(Debug, Clone)]
pub struct ToolMatch {
    /// Canonical tool name after matching.
    pub tool_name: String,
    /// Match confidence in [0, 1].
    pub score: f64,
    /// Human-readable rationale tag.
    pub reason: &'static str,
}

/// Scores `name` against every candidate and returns the best match at
/// or above `threshold`, or `None` (the caller forwards the original
/// name unchanged).
#[must_use]
pub fn match_tool(name: &str, threshold: f64) -> Option<ToolMatch> {
    let mut best: Option<ToolMatch> = None;
    for spec in &TOOLS {
        let (score, reason) = score_candidate(name, spec);
        // strictly-greater keeps the first (table-order) candidate on ties
        if best.as_ref().is_none_or(|b| score > b.score) {
            best = Some(ToolMatch {
                tool_name: spec.name.to_string(),
                score,
                reason,
            });
        }
    }
    best.filter(|m| m.score >= threshold)
}

/// The scoring ladder, highest rule wins per candidate.
fn score_candidate(name: &str, spec: &ToolSpec) -> (f64, &'static str) {
    let lower = name.to_lowercase();
    let canonical = spec.name.to_lowercase();

    if lower == canonical {
        return (1.0, "Exact tool name match");
    }
    if spec.aliases.iter().any(|a| lower == *a) {
        return (0.95, "Exact alias match");
    }
    if canonical.contains(&lower) {
        return (0.85, "Tool name contains request");
    }
    if spec.aliases.iter().any(|a| a.contains(&lower)) {
        return (0.8, "Alias contains request");
    }
    if lower.contains(&canonical) {
        return (0.75, "Request contains tool name");
    }
    if spec.aliases.iter().any(|a| lower.contains(a)) {
        return (0.7, "Request contains alias");
    }

    let name_tokens = tokenize(&lower);
    let phrase_score = spec
        .phrases
        .iter()
        .map(|p| token_overlap(&name_tokens, &tokenize(p)) * 0.7)
        .fold(0.0, f64::max);
    if phrase_score > 0.0 {
        return (phrase_score, "Example phrase overlap");
    }

    let long_tokens: Vec<String> = name_tokens.into_iter().filter(|t| t.len() > 2).collect();
    let canon_score = token_overlap(&long_tokens, &tokenize(&canonical)) * 0.6;
    if canon_score > 0.0 {
        return (canon_score, "Tool name token overlap");
    }

    (0.0, "No match")
}

/// Lowercases and splits on whitespace and punctuation.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Shared-token ratio of two token sets, in [0, 1].
fn token_overlap(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let b_set: HashSet<&str> = b.iter().map(String::as_str).collect();
    let common = a.iter().filter(|t| b_set.contains(t.as_str())).count();
    common as f64 / a.len().max(b.len()) as f64
}

/// Authorization check against an optional allow-set. `None` allows
/// everything.
#[must_use]
pub fn is_authorized(allowed: Option<&HashSet<String>>, tool: &str) -> bool {
    allowed.is_none_or(|set| set.contains(tool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_canonical() {
        let m = match_tool("go_build", 0.4).unwrap();
        assert_eq!(m.tool_name, "go_build");
        assert!((m.score - 1.0).abs() < f64::EPSILON);
        assert_eq!(m.reason, "Exact tool name match");
    }

    #[test]
    fn test_exact_alias() {
        let m = match_tool("compile", 0.4).unwrap();
        assert_eq!(m.tool_name, "go_build");
        assert!((m.score - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn test_substring_of_canonical() {
        let m = match_tool("workspac", 0.4).unwrap();
        assert_eq!(m.tool_name, "go_workspace");
        assert!((m.score - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn test_phrase_overlap_format_code() {
        let m = match_tool("format code", 0.4).unwrap();
        assert_eq!(m.tool_name, "go_fmt");
        assert!(m.score >= 0.4);
    }

    #[test]
    fn test_below_threshold_yields_none() {
        assert!(match_tool("open a pull request", 0.4).is_none());
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        for name in [
            "go_build",
            "build",
            "run the go program now",
            "xyzzy",
            "format",
            "tidy dependencies please",
        ] {
            for spec in &TOOLS {
                let (score, _) = score_candidate(name, spec);
                assert!((0.0..=1.0).contains(&score), "{name} scored {score}");
            }
        }
    }

    #[test]
    fn test_deterministic_tie_break() {
        // identical inputs always map to the same candidate
        let a = match_tool("go", 0.0).unwrap();
        let b = match_tool("go", 0.0).unwrap();
        assert_eq!(a.tool_name, b.tool_name);
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn test_tokenize_splits_punctuation() {
        assert_eq!(tokenize("go_build now!"), vec!["go", "build", "now"]);
    }

    #[test]
    fn test_authorization() {
        let mut allowed = HashSet::new();
        allowed.insert("go_build".to_string());
        assert!(is_authorized(None, "go_run"));
        assert!(is_authorized(Some(&allowed), "go_build"));
        assert!(!is_authorized(Some(&allowed), "go_run"));
    }
}
