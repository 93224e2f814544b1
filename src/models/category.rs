//! Document categories — classification only, never a workflow gate.

use serde::{Deserialize, Serialize};

use super::enums::{CategoryColor, CategoryType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDef {
    /// Short slug, e.g. "iso", "hr".
    pub id: String,
    pub name: String,
    pub color: CategoryColor,
    /// System categories are seeded and cannot be deleted.
    pub kind: CategoryType,
}

impl CategoryDef {
    pub fn system(id: &str, name: &str, color: CategoryColor) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color,
            kind: CategoryType::System,
        }
    }

    pub fn custom(id: &str, name: &str, color: CategoryColor) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color,
            kind: CategoryType::Custom,
        }
    }
}
