//! Human-readable run report.

use crossterm::style::Stylize;
use std::fmt::Write;
use std::path::Path;

use skilltree_core::{ArtifactStatus, Finding, SyncReport};

/// Render the report printed after every run.
///
/// Always starts with the summary line; warnings, errors and the staleness
/// diff follow only when present.
pub fn render_report(report: &SyncReport, workspace_root: &Path, color: bool) -> String {
    let paint = |text: String, style: fn(String) -> crossterm::style::StyledContent<String>| {
        if color {
            style(text).to_string()
        } else {
            text
        }
    };

    let findings = &report.findings;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Scanned {} skills ({} routers): {} errors, {} warnings",
        report.skills,
        report.routers,
        findings.errors.len(),
        findings.warnings.len()
    );

    let artifact = report
        .artifact
        .strip_prefix(workspace_root)
        .unwrap_or(&report.artifact)
        .display()
        .to_string();
    let status = match &report.artifact_status {
        ArtifactStatus::UpToDate => paint(format!("✓ {} is up to date", artifact), |s| s.green()),
        ArtifactStatus::Created => paint(format!("✓ Created {}", artifact), |s| s.green()),
        ArtifactStatus::Updated => paint(format!("✓ Updated {}", artifact), |s| s.green()),
        ArtifactStatus::Stale { .. } => paint(format!("✗ {} is stale", artifact), |s| s.red()),
        ArtifactStatus::Missing => paint(format!("✗ {} is missing", artifact), |s| s.red()),
    };
    let _ = writeln!(out, "{}", status);

    if let ArtifactStatus::Stale { diff } = &report.artifact_status {
        let _ = write!(out, "\n{}", diff);
    }

    render_list(&mut out, "Warnings", &findings.warnings, |s| {
        paint(s, |s| s.yellow())
    });
    render_list(&mut out, "Errors", &findings.errors, |s| paint(s, |s| s.red()));

    out
}

fn render_list(
    out: &mut String,
    title: &str,
    items: &[Finding],
    paint: impl Fn(String) -> String,
) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{}:", paint(title.to_string()));
    for item in items {
        let _ = writeln!(out, "  - {}", item);
    }
}
