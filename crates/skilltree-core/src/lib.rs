//! Core of the skilltree index builder: skill discovery, index generation,
//! hierarchy validation and index synchronization.

pub mod skills;
pub mod sync;

pub use skills::{
    discover_skills, generate_tree, validate_registry, Category, Finding, Findings, Registry,
    SkillDocument,
};
pub use sync::{sync_tree, ArtifactStatus, Mode, SyncReport};
