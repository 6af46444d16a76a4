//! Partition the registry into index sections.

use super::discovery::Registry;
use super::model::{Category, SkillDocument};

/// Registry entries grouped for generation, each list in registry order.
#[derive(Debug, Default)]
pub struct Buckets<'a> {
    pub routers: Vec<&'a SkillDocument>,
    pub sdk_setup: Vec<&'a SkillDocument>,
    pub workflow: Vec<&'a SkillDocument>,
    pub feature_setup: Vec<&'a SkillDocument>,
    pub internal: Vec<&'a SkillDocument>,
}

impl<'a> Buckets<'a> {
    /// Skills of one known category. Unrecognized categories have no bucket.
    pub fn category(&self, category: &Category) -> &[&'a SkillDocument] {
        match category {
            Category::SdkSetup => &self.sdk_setup,
            Category::Workflow => &self.workflow,
            Category::FeatureSetup => &self.feature_setup,
            Category::Internal => &self.internal,
            Category::Unrecognized(_) => &[],
        }
    }
}

/// Routers go only to `routers`, whatever category they also declare.
/// Skills without a recognized category are left out.
pub fn categorize(registry: &Registry) -> Buckets<'_> {
    let mut buckets = Buckets::default();
    for skill in registry.iter() {
        if skill.is_router() {
            buckets.routers.push(skill);
            continue;
        }
        let bucket = match skill.category {
            Some(Category::SdkSetup) => &mut buckets.sdk_setup,
            Some(Category::Workflow) => &mut buckets.workflow,
            Some(Category::FeatureSetup) => &mut buckets.feature_setup,
            Some(Category::Internal) => &mut buckets.internal,
            Some(Category::Unrecognized(_)) | None => continue,
        };
        bucket.push(skill);
    }
    buckets
}
