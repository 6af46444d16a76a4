//! Skill document types.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::parser::Frontmatter;

/// Role value marking a hierarchy root.
pub const ROUTER_ROLE: &str = "router";

/// Category of a leaf skill.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    SdkSetup,
    Workflow,
    FeatureSetup,
    Internal,
    /// Any value outside the known set
    Unrecognized(String),
}

impl Category {
    /// Known categories in index order.
    pub const KNOWN: [Category; 4] = [
        Category::SdkSetup,
        Category::Workflow,
        Category::FeatureSetup,
        Category::Internal,
    ];

    /// Parse a header value. Empty values mean "no category".
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "" => None,
            "sdk-setup" => Some(Category::SdkSetup),
            "workflow" => Some(Category::Workflow),
            "feature-setup" => Some(Category::FeatureSetup),
            "internal" => Some(Category::Internal),
            other => Some(Category::Unrecognized(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::SdkSetup => "sdk-setup",
            Category::Workflow => "workflow",
            Category::FeatureSetup => "feature-setup",
            Category::Internal => "internal",
            Category::Unrecognized(value) => value,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Category::Unrecognized(_))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered skill document.
#[derive(Debug, Clone, Serialize)]
pub struct SkillDocument {
    /// Location of the source file
    pub path: PathBuf,
    /// Declared name, or the containing directory name
    pub name: String,
    pub description: String,
    pub category: Option<Category>,
    /// Name of the router this skill hangs under
    pub parent: Option<String>,
    pub role: Option<String>,
    pub model_invocation_disabled: bool,
    /// Full document text, used for back-reference and breadcrumb checks
    #[serde(skip)]
    pub source: String,
}

impl SkillDocument {
    /// Build a document from its extracted header, falling back to the
    /// parent directory name when `name` is absent or empty.
    pub fn from_frontmatter(path: PathBuf, source: String, fm: Frontmatter) -> Self {
        let model_invocation_disabled = fm.model_invocation_disabled();
        let name = fm
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| dir_name(&path));

        Self {
            name,
            description: fm.description.unwrap_or_default(),
            category: fm.category.as_deref().and_then(Category::parse),
            parent: fm.parent.filter(|p| !p.is_empty()),
            role: fm.role.filter(|r| !r.is_empty()),
            model_invocation_disabled,
            source,
            path,
        }
    }

    pub fn is_router(&self) -> bool {
        self.role.as_deref() == Some(ROUTER_ROLE)
    }
}

fn dir_name(path: &std::path::Path) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
