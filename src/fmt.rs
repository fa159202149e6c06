//! Human-friendly CLI output formatters.
//!
//! Each `fmt_*` function formats one tool's output for terminal
//! display. When `color` is true, ANSI escape codes are emitted via
//! `owo_colors`.

use crate::report::Outcome;
use crate::tools::{AnalyzeOutput, BuildOutput, TestOutput, WorkspaceOutput};
use owo_colors::OwoColorize;
use std::io::{self, Write};

fn fmt_outcome(w: &mut impl Write, outcome: &Outcome, color: bool) -> io::Result<()> {
    let status = if outcome.success { "ok" } else { "FAILED" };
    if color {
        if outcome.success {
            writeln!(w, "{}  {}", status.green().bold(), outcome.message)?;
        } else {
            writeln!(w, "{}  {}", status.red().bold(), outcome.message)?;
        }
    } else {
        writeln!(w, "{status}  {}", outcome.message)?;
    }

    if let Some(stdout) = &outcome.stdout {
        write!(w, "{stdout}")?;
        if !stdout.ends_with('\n') {
            writeln!(w)?;
        }
    }
    if let Some(stderr) = &outcome.stderr {
        if color {
            write!(w, "{}", stderr.dimmed())?;
        } else {
            write!(w, "{stderr}")?;
        }
        if !stderr.ends_with('\n') {
            writeln!(w)?;
        }
    }
    Ok(())
}

// ── build ───────────────────────────────────────────────────────────────────

pub fn fmt_build(w: &mut impl Write, out: &BuildOutput, color: bool) -> io::Result<()> {
    fmt_outcome(w, &out.outcome, color)?;
    if let Some(path) = &out.output_path {
        if color {
            writeln!(w, "binary: {}", path.bold())?;
        } else {
            writeln!(w, "binary: {path}")?;
        }
    }
    if let Some(details) = &out.outcome.error_details {
        for d in details {
            match (&d.file, d.line) {
                (Some(file), Some(line)) => {
                    if color {
                        writeln!(w, "  {}:{}  {}", file.bold(), line, d.message)?;
                    } else {
                        writeln!(w, "  {file}:{line}  {}", d.message)?;
                    }
                }
                _ => writeln!(w, "  {}", d.message)?,
            }
        }
    }
    Ok(())
}

// ── test ────────────────────────────────────────────────────────────────────

pub fn fmt_test(w: &mut impl Write, out: &TestOutput, color: bool) -> io::Result<()> {
    fmt_outcome(w, &out.outcome, color)?;
    if let Some(coverage) = &out.coverage {
        if color {
            writeln!(w, "{}", coverage.cyan())?;
        } else {
            writeln!(w, "{coverage}")?;
        }
    }
    Ok(())
}

// ── vet ─────────────────────────────────────────────────────────────────────

pub fn fmt_vet(w: &mut impl Write, out: &AnalyzeOutput, color: bool) -> io::Result<()> {
    fmt_outcome(w, &out.outcome, color)?;
    for issue in &out.issues {
        let loc = match (&issue.file, issue.line) {
            (Some(file), Some(line)) => format!("{file}:{line}"),
            (Some(file), None) => file.clone(),
            _ => String::new(),
        };
        if color {
            writeln!(w, "  {}  {}", loc.bold(), issue.message)?;
        } else {
            writeln!(w, "  {loc}  {}", issue.message)?;
        }
    }
    Ok(())
}

// ── workspace ───────────────────────────────────────────────────────────────

pub fn fmt_workspace(w: &mut impl Write, out: &WorkspaceOutput, color: bool) -> io::Result<()> {
    fmt_outcome(w, &out.outcome, color)?;
    if let Some(info) = &out.info {
        let marker = if info.has_go_work {
            "go.work"
        } else {
            "multi-module (no go.work)"
        };
        if color {
            writeln!(w, "{}  ({})", info.path.bold(), marker.dimmed())?;
        } else {
            writeln!(w, "{}  ({marker})", info.path)?;
        }
        for module in &info.modules {
            writeln!(w, "  {module}")?;
        }
    }
    Ok(())
}
