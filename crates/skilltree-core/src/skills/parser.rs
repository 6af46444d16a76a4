//! SKILL.md metadata extraction.
//!
//! Reads the `key: value` lines between the first two `---` marker lines.
//! Extraction never fails: a missing or unclosed block yields an empty
//! [`Frontmatter`], and missing fields are reported by the validator.

use serde::Serialize;

/// Marker line opening and closing the metadata block.
pub const FRONTMATTER_MARKER: &str = "---";

/// Recognized metadata keys from a skill document header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Frontmatter {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub parent: Option<String>,
    pub role: Option<String>,
    /// Raw value of `disable-model-invocation` / `disable_model_invocation`
    pub disable_model_invocation: Option<String>,
}

impl Frontmatter {
    /// Extract the metadata block from document text.
    pub fn extract(content: &str) -> Self {
        let Some(lines) = block_lines(content) else {
            return Self::default();
        };

        let mut fm = Self::default();
        for line in lines {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = clean_value(value);
            let slot = match canonical_key(key).as_str() {
                "name" => &mut fm.name,
                "description" => &mut fm.description,
                "category" => &mut fm.category,
                "parent" => &mut fm.parent,
                "role" => &mut fm.role,
                "disable_model_invocation" => &mut fm.disable_model_invocation,
                _ => continue,
            };
            // First occurrence wins
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        fm
    }

    /// True only for the literal value `true`.
    pub fn model_invocation_disabled(&self) -> bool {
        self.disable_model_invocation.as_deref() == Some("true")
    }
}

/// Lines strictly between the first and second marker, or `None` if the
/// block is absent or never closed.
fn block_lines(content: &str) -> Option<Vec<&str>> {
    let mut lines = content.lines().map(|l| l.trim_end_matches('\r'));
    lines.by_ref().find(|l| *l == FRONTMATTER_MARKER)?;

    let mut block = Vec::new();
    for line in lines {
        if line == FRONTMATTER_MARKER {
            return Some(block);
        }
        block.push(line);
    }
    None
}

/// Keys compare with `-` folded to `_`.
fn canonical_key(key: &str) -> String {
    key.trim().replace('-', "_")
}

fn clean_value(value: &str) -> String {
    let value = value.trim();
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}
