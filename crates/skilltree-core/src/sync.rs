//! Index synchronization: scan, generate, validate, then compare the fresh
//! index with the persisted one.
//!
//! In check mode a stale or missing index becomes an error finding and
//! nothing is written. In write mode the index is replaced atomically when
//! it differs or does not exist yet.

use anyhow::{Context, Result};
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::Builder;
use tracing::{debug, info};

use skilltree_config::Config;

use crate::skills::{
    discover_skills, generate_tree, validate_registry, Finding, Findings, TreeOptions,
    ValidateOptions,
};

/// Whether the run may touch the persisted index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Report staleness, never write
    Check,
    /// Create or replace the index when it differs
    Write,
}

/// What happened to the persisted index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtifactStatus {
    /// On-disk index matches the generated one
    UpToDate,
    /// Check mode: on-disk index differs; `diff` is a unified diff
    Stale { diff: String },
    /// Check mode: no index on disk
    Missing,
    /// Write mode: existing index replaced
    Updated,
    /// Write mode: index written for the first time
    Created,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub mode: Mode,
    pub artifact: PathBuf,
    pub artifact_status: ArtifactStatus,
    pub skills: usize,
    pub routers: usize,
    pub findings: Findings,
}

impl SyncReport {
    /// Warnings never fail a run.
    pub fn is_success(&self) -> bool {
        self.findings.errors.is_empty()
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Run the whole pipeline for a workspace.
///
/// Only I/O failures and duplicate skill names are returned as `Err`;
/// everything else is a finding in the report.
pub fn sync_tree(workspace_root: &Path, config: &Config, mode: Mode) -> Result<SyncReport> {
    let skills_dir = config.skills_dir(workspace_root);
    let artifact = config.output_path(workspace_root);

    let registry = discover_skills(&skills_dir, &config.skills.filename)?;
    info!(
        "Scanned {} skills ({} routers) in {}",
        registry.len(),
        registry.router_count(),
        skills_dir.display()
    );

    let generated = generate_tree(
        &registry,
        &TreeOptions {
            base_dir: workspace_root.to_path_buf(),
            sdk_setup_prefix: config.tree.sdk_setup_prefix.clone(),
        },
    );

    let mut findings = validate_registry(
        &registry,
        &ValidateOptions {
            breadcrumb_prefix: config.skills.breadcrumb_prefix.clone(),
            link_extension: link_extension(&config.skills.filename),
        },
    );

    let label = artifact_label(&artifact, workspace_root);
    let existing = read_artifact(&artifact)?;
    let artifact_status = match (existing, mode) {
        (Some(current), _) if normalize_newline(&current) == normalize_newline(&generated) => {
            debug!("{} is up to date", artifact.display());
            ArtifactStatus::UpToDate
        }
        (Some(current), Mode::Check) => {
            findings.errors.push(Finding::new(
                &label,
                "index is stale; run skilltree without --check to regenerate",
            ));
            ArtifactStatus::Stale {
                diff: unified_diff(&current, &generated, &label),
            }
        }
        (None, Mode::Check) => {
            findings.errors.push(Finding::new(
                &label,
                "index is missing; run skilltree without --check to generate it",
            ));
            ArtifactStatus::Missing
        }
        (Some(_), Mode::Write) => {
            write_atomic(&artifact, &generated)?;
            info!("Updated {}", artifact.display());
            ArtifactStatus::Updated
        }
        (None, Mode::Write) => {
            write_atomic(&artifact, &generated)?;
            info!("Created {}", artifact.display());
            ArtifactStatus::Created
        }
    };

    Ok(SyncReport {
        mode,
        artifact,
        artifact_status,
        skills: registry.len(),
        routers: registry.router_count(),
        findings,
    })
}

/// `.md` for `SKILL.md`; the whole filename if it has no extension.
fn link_extension(filename: &str) -> String {
    match Path::new(filename).extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy()),
        None => filename.to_string(),
    }
}

fn artifact_label(artifact: &Path, workspace_root: &Path) -> String {
    artifact
        .strip_prefix(workspace_root)
        .unwrap_or(artifact)
        .display()
        .to_string()
}

fn read_artifact(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Any run of trailing newlines compares as exactly one.
fn normalize_newline(text: &str) -> String {
    format!("{}\n", text.trim_end_matches(['\n', '\r']))
}

/// Unified diff from the on-disk index to the generated one.
pub fn unified_diff(old: &str, new: &str, label: &str) -> String {
    let old = normalize_newline(old);
    let new = normalize_newline(new);
    let diff = TextDiff::from_lines(&old, &new);

    let mut output = format!("--- {} (on disk)\n+++ {} (generated)\n", label, label);
    for group in diff.grouped_ops(3) {
        let (old_start, old_count, new_start, new_count) = group.iter().fold(
            (usize::MAX, 0usize, usize::MAX, 0usize),
            |(os, oc, ns, nc), op| {
                let old_range = op.old_range();
                let new_range = op.new_range();
                (
                    os.min(old_range.start),
                    oc + old_range.len(),
                    ns.min(new_range.start),
                    nc + new_range.len(),
                )
            },
        );
        output.push_str(&format!(
            "@@ -{},{} +{},{} @@\n",
            old_start + 1,
            old_count,
            new_start + 1,
            new_count
        ));

        for op in &group {
            for change in diff.iter_changes(op) {
                let prefix = match change.tag() {
                    ChangeTag::Delete => "-",
                    ChangeTag::Insert => "+",
                    ChangeTag::Equal => " ",
                };
                output.push_str(prefix);
                output.push_str(change.value());
            }
        }
    }
    output
}

/// Mode for a newly created index, before the umask applies.
#[cfg(unix)]
const NEW_ARTIFACT_MODE: u32 = 0o644;

/// Replace `path` in one rename so readers never see a partial index.
///
/// An existing index keeps its permissions; a new one gets
/// [`NEW_ARTIFACT_MODE`] with the umask applied.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(NEW_ARTIFACT_MODE));
    }
    let mut tmp = builder
        .tempfile_in(&dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if let Ok(existing) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .with_context(|| format!("Failed to copy permissions of {}", path.display()))?;
    }
    tmp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_skill(root: &Path, dir: &str, content: &str) {
        let skill_dir = root.join("skills").join(dir);
        fs::create_dir_all(&skill_dir).unwrap();
        fs::write(skill_dir.join("SKILL.md"), content).unwrap();
    }

    /// Router `A` listing workflow leaf `B`, with a breadcrumb back up.
    fn valid_workspace() -> TempDir {
        let temp = TempDir::new().unwrap();
        write_skill(
            temp.path(),
            "a",
            "---\nname: A\nrole: router\ndescription: Routes things. More.\n---\n\n\
             - [B](./b/SKILL.md)\n",
        );
        write_skill(
            temp.path(),
            "a/b",
            "---\nname: B\ndescription: Does B. Details.\ncategory: workflow\nparent: A\n\
             disable-model-invocation: true\n---\n\n> [A](../SKILL.md)\n",
        );
        temp
    }

    #[test]
    fn test_write_creates_then_check_is_clean() {
        let temp = valid_workspace();
        let config = Config::default();

        let written = sync_tree(temp.path(), &config, Mode::Write).unwrap();
        assert_eq!(written.artifact_status, ArtifactStatus::Created);
        assert!(written.is_success(), "{:?}", written.findings);
        assert_eq!(written.skills, 2);
        assert_eq!(written.routers, 1);

        let content = fs::read_to_string(temp.path().join("SKILL_TREE.md")).unwrap();
        assert!(content.contains("| B | `skills/a/b/SKILL.md` | Does B |"));

        let checked = sync_tree(temp.path(), &config, Mode::Check).unwrap();
        assert_eq!(checked.artifact_status, ArtifactStatus::UpToDate);
        assert_eq!(checked.exit_code(), 0);
    }

    #[test]
    fn test_check_reports_missing_artifact() {
        let temp = valid_workspace();
        let report = sync_tree(temp.path(), &Config::default(), Mode::Check).unwrap();

        assert_eq!(report.artifact_status, ArtifactStatus::Missing);
        assert_eq!(report.findings.errors.len(), 1);
        assert_eq!(report.findings.errors[0].subject, "SKILL_TREE.md");
        assert_eq!(report.exit_code(), 1);
        assert!(!temp.path().join("SKILL_TREE.md").exists());
    }

    #[test]
    fn test_check_reports_stale_artifact_with_diff() {
        let temp = valid_workspace();
        let config = Config::default();
        sync_tree(temp.path(), &config, Mode::Write).unwrap();

        let path = temp.path().join("SKILL_TREE.md");
        let edited = fs::read_to_string(&path).unwrap().replace("Does B", "Did B");
        fs::write(&path, &edited).unwrap();

        let report = sync_tree(temp.path(), &config, Mode::Check).unwrap();
        match &report.artifact_status {
            ArtifactStatus::Stale { diff } => {
                assert!(diff.contains("-| B | `skills/a/b/SKILL.md` | Did B |"));
                assert!(diff.contains("+| B | `skills/a/b/SKILL.md` | Does B |"));
                assert!(diff.contains("@@ "));
            }
            other => panic!("expected stale, got {:?}", other),
        }
        assert!(!report.is_success());
        // Check mode never writes
        assert_eq!(fs::read_to_string(&path).unwrap(), edited);
    }

    #[test]
    fn test_write_replaces_stale_artifact() {
        let temp = valid_workspace();
        let path = temp.path().join("SKILL_TREE.md");
        fs::write(&path, "old index\n").unwrap();

        let report = sync_tree(temp.path(), &Config::default(), Mode::Write).unwrap();
        assert_eq!(report.artifact_status, ArtifactStatus::Updated);
        assert!(report.is_success());
        assert!(fs::read_to_string(&path).unwrap().starts_with("# Skill Tree\n"));
    }

    #[test]
    fn test_trailing_newline_normalized() {
        let temp = valid_workspace();
        let config = Config::default();
        sync_tree(temp.path(), &config, Mode::Write).unwrap();

        let path = temp.path().join("SKILL_TREE.md");
        let content = fs::read_to_string(&path).unwrap();
        fs::write(&path, format!("{}\n\n", content)).unwrap();

        let report = sync_tree(temp.path(), &config, Mode::Check).unwrap();
        assert_eq!(report.artifact_status, ArtifactStatus::UpToDate);
    }

    #[test]
    fn test_validation_errors_do_not_block_write() {
        let temp = valid_workspace();
        write_skill(temp.path(), "orphan", "---\nname: orphan\ncategory: workflow\n---\n");

        let report = sync_tree(temp.path(), &Config::default(), Mode::Write).unwrap();
        assert_eq!(report.artifact_status, ArtifactStatus::Created);
        assert_eq!(report.findings.errors.len(), 2, "{:?}", report.findings.errors);
        assert_eq!(report.exit_code(), 1);
        assert!(fs::read_to_string(temp.path().join("SKILL_TREE.md"))
            .unwrap()
            .contains("| orphan |"));
    }

    #[test]
    fn test_warning_only_run_succeeds() {
        let temp = TempDir::new().unwrap();
        write_skill(temp.path(), "a", "---\nname: A\nrole: router\n---\nB\n");
        write_skill(
            temp.path(),
            "b",
            "---\nname: B\ncategory: experimental\nparent: A\n\
             disable-model-invocation: true\n---\n",
        );

        let report = sync_tree(temp.path(), &Config::default(), Mode::Write).unwrap();
        assert_eq!(report.findings.warnings.len(), 1);
        assert!(report.is_success());
    }

    #[test]
    fn test_renamed_directories_keep_row_order() {
        let leaf = |name: &str| {
            format!(
                "---\nname: {}\ncategory: workflow\nparent: r\n\
                 disable-model-invocation: true\n---\n",
                name
            )
        };
        let build = |dirs: [&str; 2]| {
            let temp = TempDir::new().unwrap();
            write_skill(temp.path(), "r", "---\nname: r\nrole: router\n---\nx y\n");
            write_skill(temp.path(), dirs[0], &leaf("x"));
            write_skill(temp.path(), dirs[1], &leaf("y"));
            sync_tree(temp.path(), &Config::default(), Mode::Write).unwrap();
            let tree = fs::read_to_string(temp.path().join("SKILL_TREE.md")).unwrap();
            tree.find("| x |").unwrap() < tree.find("| y |").unwrap()
        };

        assert!(build(["a-first", "b-second"]));
        assert!(!build(["z-last", "b-second"]));
    }

    #[cfg(unix)]
    #[test]
    fn test_created_index_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = valid_workspace();
        sync_tree(temp.path(), &Config::default(), Mode::Write).unwrap();

        let mode = fs::metadata(temp.path().join("SKILL_TREE.md"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o600, 0o600, "mode {:o}", mode);

        // A plain write gets 0666 minus the umask; the index should match its read bits
        let reference = temp.path().join("reference");
        fs::write(&reference, "").unwrap();
        let umasked = fs::metadata(&reference).unwrap().permissions().mode();
        assert_eq!(mode & 0o044, umasked & 0o044, "mode {:o}", mode);
    }

    #[cfg(unix)]
    #[test]
    fn test_update_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = valid_workspace();
        let path = temp.path().join("SKILL_TREE.md");
        fs::write(&path, "old index\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        let report = sync_tree(temp.path(), &Config::default(), Mode::Write).unwrap();
        assert_eq!(report.artifact_status, ArtifactStatus::Updated);
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640, "mode {:o}", mode);
    }

    #[test]
    fn test_missing_skills_dir_is_fatal() {
        let temp = TempDir::new().unwrap();
        assert!(sync_tree(temp.path(), &Config::default(), Mode::Check).is_err());
    }

    #[test]
    fn test_output_in_nested_directory() {
        let temp = valid_workspace();
        let mut config = Config::default();
        config.tree.output = "docs/generated/TREE.md".to_string();

        let report = sync_tree(temp.path(), &config, Mode::Write).unwrap();
        assert_eq!(report.artifact_status, ArtifactStatus::Created);
        assert!(temp.path().join("docs/generated/TREE.md").exists());
    }

    #[test]
    fn test_link_extension() {
        assert_eq!(link_extension("SKILL.md"), ".md");
        assert_eq!(link_extension("guide.markdown"), ".markdown");
    }

    #[test]
    fn test_unified_diff_identical_inputs() {
        let diff = unified_diff("a\nb\n", "a\nb", "T.md");
        assert_eq!(diff, "--- T.md (on disk)\n+++ T.md (generated)\n");
    }
}
