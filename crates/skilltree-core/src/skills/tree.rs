//! Render the skill tree index document.
//!
//! Output is a pure function of the registry and options, so regenerating an
//! unchanged tree is byte-identical.

use std::path::{Path, PathBuf};

use super::categorize::{categorize, Buckets};
use super::discovery::Registry;
use super::model::{Category, SkillDocument};

const PREAMBLE: &str = "\
# Skill Tree

<!-- Generated by skilltree. Do not edit by hand; run `skilltree` to regenerate. -->

Index of every skill document and where it sits in the hierarchy.

## Navigation

- Start from a router below and follow its links down to the leaf skills it lists.
- Leaf skills point back to their router from the `>` breadcrumb line near the top.
- Run `skilltree --check` to verify this file matches the skill documents.
";

/// Inputs to rendering that are not part of the registry.
#[derive(Debug, Clone)]
pub struct TreeOptions {
    /// Paths in the `Path` column are shown relative to this directory
    pub base_dir: PathBuf,
    /// Leading phrase removed from sdk-setup descriptions
    pub sdk_setup_prefix: String,
}

/// One table in the index.
struct Section {
    title: &'static str,
    column: &'static str,
    rule: ColumnRule,
}

#[derive(Clone, Copy)]
enum ColumnRule {
    FirstSentence,
    StripPrefixThenFirstSentence,
}

const ROUTER_SECTION: Section = Section {
    title: "Routers",
    column: "Covers",
    rule: ColumnRule::FirstSentence,
};

fn category_section(category: &Category) -> Section {
    match category {
        Category::SdkSetup => Section {
            title: "SDK Setup",
            column: "Platform",
            rule: ColumnRule::StripPrefixThenFirstSentence,
        },
        Category::Workflow => Section {
            title: "Workflows",
            column: "Purpose",
            rule: ColumnRule::FirstSentence,
        },
        Category::FeatureSetup => Section {
            title: "Feature Setup",
            column: "Feature",
            rule: ColumnRule::FirstSentence,
        },
        Category::Internal | Category::Unrecognized(_) => Section {
            title: "Internal",
            column: "Purpose",
            rule: ColumnRule::FirstSentence,
        },
    }
}

/// Render the full index document.
pub fn generate_tree(registry: &Registry, options: &TreeOptions) -> String {
    let buckets: Buckets<'_> = categorize(registry);

    let mut out = String::from(PREAMBLE);
    render_section(&mut out, &ROUTER_SECTION, &buckets.routers, options);
    for category in &Category::KNOWN {
        render_section(
            &mut out,
            &category_section(category),
            buckets.category(category),
            options,
        );
    }
    out
}

fn render_section(
    out: &mut String,
    section: &Section,
    skills: &[&SkillDocument],
    options: &TreeOptions,
) {
    out.push_str(&format!("\n## {}\n\n", section.title));
    out.push_str(&format!("| Skill | Path | {} |\n", section.column));
    out.push_str("|---|---|---|\n");

    for skill in skills {
        let value = match section.rule {
            ColumnRule::FirstSentence => first_sentence(&skill.description),
            ColumnRule::StripPrefixThenFirstSentence => {
                sdk_setup_column(&skill.description, &options.sdk_setup_prefix)
            }
        };
        out.push_str(&format!(
            "| {} | `{}` | {} |\n",
            escape_cell(&skill.name),
            display_path(&skill.path, &options.base_dir),
            escape_cell(value),
        ));
    }
}

/// Text before the first `". "`, else the whole description.
///
/// A lone trailing period is kept.
pub fn first_sentence(description: &str) -> &str {
    let description = description.trim();
    match description.find(". ") {
        Some(idx) => &description[..idx],
        None => description,
    }
}

/// sdk-setup rule: strip the leading phrase if present, then cut at the
/// first `". "` or drop a trailing period.
pub fn sdk_setup_column<'a>(description: &'a str, prefix: &str) -> &'a str {
    let description = description.trim();
    let stripped = if prefix.is_empty() {
        description
    } else {
        description.strip_prefix(prefix).unwrap_or(description)
    };
    match stripped.find(". ") {
        Some(idx) => &stripped[..idx],
        None => stripped.strip_suffix('.').unwrap_or(stripped),
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Path relative to `base`, with `/` separators regardless of platform.
fn display_path(path: &Path, base: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
