//! Skill discovery - builds the registry from a directory tree.
//!
//! Every file named like the configured skill filename (default `SKILL.md`)
//! below the skills directory is one document. Paths are sorted before
//! extraction so iteration order never depends on the filesystem.

use anyhow::{bail, Context, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use super::model::SkillDocument;
use super::parser::Frontmatter;

/// All skills of one run, keyed by name, iterated in path order.
#[derive(Debug, Default)]
pub struct Registry {
    skills: Vec<SkillDocument>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    /// Build a registry from documents in any order.
    ///
    /// Duplicate names are rejected.
    pub fn from_documents(mut documents: Vec<SkillDocument>) -> Result<Self> {
        documents.sort_by(|a, b| path_order(&a.path, &b.path));

        let mut by_name = HashMap::with_capacity(documents.len());
        for (idx, doc) in documents.iter().enumerate() {
            if let Some(&existing) = by_name.get(&doc.name) {
                let first: &SkillDocument = &documents[existing];
                bail!(
                    "Duplicate skill name '{}' declared by {} and {}",
                    doc.name,
                    first.path.display(),
                    doc.path.display()
                );
            }
            by_name.insert(doc.name.clone(), idx);
        }

        Ok(Self {
            skills: documents,
            by_name,
        })
    }

    pub fn get(&self, name: &str) -> Option<&SkillDocument> {
        self.by_name.get(name).map(|&idx| &self.skills[idx])
    }

    /// Skills in discovery path order.
    pub fn iter(&self) -> impl Iterator<Item = &SkillDocument> {
        self.skills.iter()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn router_count(&self) -> usize {
        self.skills.iter().filter(|s| s.is_router()).count()
    }
}

/// Scan `skills_dir` recursively and build the registry.
///
/// Any unreadable directory or file aborts the scan.
pub fn discover_skills(skills_dir: &Path, filename: &str) -> Result<Registry> {
    let paths = find_skill_files(skills_dir, filename)?;

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        documents.push(load_skill_file(path)?);
    }

    let registry = Registry::from_documents(documents)?;
    debug!(
        "Discovered {} skills under {}",
        registry.len(),
        skills_dir.display()
    );
    Ok(registry)
}

/// Sorted paths of every skill document below `dir`.
fn find_skill_files(dir: &Path, filename: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Skills directory not found: {}", dir.display());
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry =
            entry.with_context(|| format!("Failed to read skills directory {}", dir.display()))?;
        if entry.file_type().is_file() && entry.file_name() == filename {
            paths.push(entry.into_path());
        }
    }
    paths.sort_by(|a, b| path_order(a, b));
    Ok(paths)
}

/// Byte-lexicographic order of the full path string, so `a-b/` sorts
/// before `a/` (`-` < `/`).
fn path_order(a: &Path, b: &Path) -> Ordering {
    a.as_os_str()
        .as_encoded_bytes()
        .cmp(b.as_os_str().as_encoded_bytes())
}

/// Read and extract a single skill document.
fn load_skill_file(path: PathBuf) -> Result<SkillDocument> {
    let source =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let fm = Frontmatter::extract(&source);
    let doc = SkillDocument::from_frontmatter(path, source, fm);
    debug!("Loaded skill '{}' from {}", doc.name, doc.path.display());
    Ok(doc)
}
