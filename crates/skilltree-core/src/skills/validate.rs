//! Hierarchy validation.
//!
//! Each check returns its own [`Findings`]; [`validate_registry`] merges them
//! per skill in a fixed order. Nothing short-circuits, so one run reports
//! every defect in the tree.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::Path;

use super::discovery::Registry;
use super::model::{Category, SkillDocument};

/// Inline markdown link: `[text](target)`.
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]\(([^)\s]+)\)").expect("link pattern is valid"));

/// A single validation result attached to a skill (or the index artifact).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Skill name, or the artifact path for staleness findings
    pub subject: String,
    pub message: String,
}

impl Finding {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Errors fail the run; warnings are reported only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Findings {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl Findings {
    fn error(&mut self, skill: &SkillDocument, message: impl Into<String>) {
        self.errors.push(Finding::new(&skill.name, message));
    }

    fn warning(&mut self, skill: &SkillDocument, message: impl Into<String>) {
        self.warnings.push(Finding::new(&skill.name, message));
    }

    pub fn merge(&mut self, other: Findings) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Settings the link check needs from the document format.
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// Line prefix identifying a breadcrumb line
    pub breadcrumb_prefix: String,
    /// Only link targets with this suffix are checked (e.g. `.md`)
    pub link_extension: String,
}

/// Validate every skill in registry order.
pub fn validate_registry(registry: &Registry, options: &ValidateOptions) -> Findings {
    let mut findings = Findings::default();
    for skill in registry.iter() {
        findings.merge(check_required_fields(skill));
        findings.merge(check_known_category(skill));
        findings.merge(check_parent(skill, registry));
        findings.merge(check_back_reference(skill, registry));
        findings.merge(check_breadcrumb_links(skill, options));
    }
    findings
}

/// Routers need nothing; internal skills need the disable flag; every other
/// skill needs category, parent and the disable flag.
pub fn check_required_fields(skill: &SkillDocument) -> Findings {
    let mut findings = Findings::default();
    if skill.is_router() {
        return findings;
    }

    let internal = skill.category == Some(Category::Internal);
    if !internal {
        if skill.category.is_none() {
            findings.error(skill, "missing required field 'category'");
        }
        if skill.parent.is_none() {
            findings.error(skill, "missing required field 'parent'");
        }
    }
    if !skill.model_invocation_disabled {
        findings.error(skill, "missing required field 'disable-model-invocation: true'");
    }
    findings
}

pub fn check_known_category(skill: &SkillDocument) -> Findings {
    let mut findings = Findings::default();
    if skill.is_router() {
        return findings;
    }
    if let Some(Category::Unrecognized(value)) = &skill.category {
        findings.warning(
            skill,
            format!(
                "unknown category '{}' (expected one of: sdk-setup, workflow, \
                 feature-setup, internal); skill is left out of the index",
                value
            ),
        );
    }
    findings
}

/// The declared parent must exist and be a router.
pub fn check_parent(skill: &SkillDocument, registry: &Registry) -> Findings {
    let mut findings = Findings::default();
    let Some(parent_name) = skill.parent.as_deref() else {
        return findings;
    };

    match registry.get(parent_name) {
        None => findings.error(skill, format!("parent '{}' does not exist", parent_name)),
        Some(parent) if !parent.is_router() => findings.error(
            skill,
            format!(
                "parent '{}' is not a router (role: {})",
                parent_name,
                parent.role.as_deref().unwrap_or("none")
            ),
        ),
        Some(_) => {}
    }
    findings
}

/// A resolved router parent must mention the child's name in its text.
pub fn check_back_reference(skill: &SkillDocument, registry: &Registry) -> Findings {
    let mut findings = Findings::default();
    let Some(parent) = skill
        .parent
        .as_deref()
        .and_then(|name| registry.get(name))
        .filter(|p| p.is_router())
    else {
        return findings;
    };

    if !parent.source.contains(skill.name.as_str()) {
        findings.error(
            skill,
            format!(
                "not listed in parent router '{}' ({} does not mention '{}')",
                parent.name,
                parent.path.display(),
                skill.name
            ),
        );
    }
    findings
}

/// Relative links on breadcrumb lines must point at existing files.
pub fn check_breadcrumb_links(skill: &SkillDocument, options: &ValidateOptions) -> Findings {
    let mut findings = Findings::default();
    let base = skill.path.parent().unwrap_or_else(|| Path::new(""));

    for target in breadcrumb_links(&skill.source, options) {
        let resolved = base.join(target);
        if !resolved.exists() {
            findings.error(
                skill,
                format!(
                    "broken breadcrumb link '{}' (resolved to {})",
                    target,
                    resolved.display()
                ),
            );
        }
    }
    findings
}

/// Local link targets on breadcrumb lines, in document order.
fn breadcrumb_links<'a>(source: &'a str, options: &ValidateOptions) -> Vec<&'a str> {
    source
        .lines()
        .filter(|line| line.starts_with(options.breadcrumb_prefix.as_str()))
        .flat_map(|line| LINK_RE.captures_iter(line))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .filter(|target| target.ends_with(options.link_extension.as_str()))
        .filter(|target| !target.contains("://"))
        .collect()
}
