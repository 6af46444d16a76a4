//! Skill hierarchy support.
//!
//! A skill is a directory containing a `SKILL.md` file whose header declares
//! where it sits in the hierarchy:
//!
//! ```text
//! ---
//! name: posthog-nextjs
//! description: Set up PostHog in a Next.js app. Use when adding analytics.
//! category: sdk-setup
//! parent: sdk-router
//! disable-model-invocation: true
//! ---
//!
//! > [SDK setup](../SKILL.md)
//! ```
//!
//! Routers (`role: router`) are hierarchy roots. Every other skill names a
//! router as `parent`, and that router must mention the skill in its text.
//!
//! # Pipeline
//!
//! 1. [`discover_skills`] walks the skills directory into a [`Registry`]
//! 2. [`categorize`] groups skills into index sections
//! 3. [`generate_tree`] renders the index document
//! 4. [`validate_registry`] checks the hierarchy and links

mod categorize;
mod discovery;
mod model;
mod parser;
mod tree;
mod validate;

pub use categorize::{categorize, Buckets};
pub use discovery::{discover_skills, Registry};
pub use model::{Category, SkillDocument, ROUTER_ROLE};
pub use parser::{Frontmatter, FRONTMATTER_MARKER};
pub use tree::{first_sentence, generate_tree, sdk_setup_column, TreeOptions};
pub use validate::{
    check_back_reference, check_breadcrumb_links, check_known_category, check_parent,
    check_required_fields, validate_registry, Finding, Findings, ValidateOptions,
};
