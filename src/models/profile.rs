//! Variable profiles — named sets of substitution values representing one
//! organizational identity (e.g. one company among several sharing the same
//! templates).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Variable keys follow the UPPER_SNAKE convention, e.g. `COMPANY_NAME`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableProfile {
    pub id: Uuid,
    pub profile_name: String,
    /// Key → replacement text. Keys are unique by construction.
    pub variables: BTreeMap<String, String>,
}

impl VariableProfile {
    pub fn new(profile_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile_name: profile_name.into(),
            variables: BTreeMap::new(),
        }
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_keys_keep_last_value() {
        let profile = VariableProfile::new("Acme")
            .with_variable("COMPANY_NAME", "Acme Ltd")
            .with_variable("COMPANY_NAME", "Acme Corp");
        assert_eq!(profile.variables.len(), 1);
        assert_eq!(
            profile.variables.get("COMPANY_NAME").map(String::as_str),
            Some("Acme Corp")
        );
    }
}
