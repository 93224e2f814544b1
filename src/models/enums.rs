use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing a closed enum from its string form fails.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid value for {field}: {value}")]
pub struct ParseEnumError {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ParseEnumError {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(DocStatus {
    Draft => "draft",
    Review => "review",
    Approving => "approving",
    Approved => "approved",
});

str_enum!(DecisionStatus {
    Pending => "pending",
    Approved => "approved",
});

str_enum!(DocLevel {
    Manual => "manual",
    Procedure => "procedure",
    WorkInstruction => "work_instruction",
    FormRecord => "form_record",
});

str_enum!(CategoryColor {
    Blue => "blue",
    Purple => "purple",
    Emerald => "emerald",
    Amber => "amber",
    Rose => "rose",
    Slate => "slate",
});

str_enum!(CategoryType {
    System => "system",
    Custom => "custom",
});

str_enum!(Tone {
    Standard => "standard",
    Hr => "hr",
    Official => "official",
});

impl DocLevel {
    /// Ranked tier, 1 (manual) through 4 (forms/records). Informational only;
    /// the tier never gates workflow transitions.
    pub fn tier(&self) -> u8 {
        match self {
            Self::Manual => 1,
            Self::Procedure => 2,
            Self::WorkInstruction => 3,
            Self::FormRecord => 4,
        }
    }

    /// Human-facing label used on the PDF control sheet.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Manual => "Level 1: Quality Manual",
            Self::Procedure => "Level 2: Standard Operating Procedure",
            Self::WorkInstruction => "Level 3: Work Instruction",
            Self::FormRecord => "Level 4: Form / Record",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn doc_status_round_trip() {
        for (variant, s) in [
            (DocStatus::Draft, "draft"),
            (DocStatus::Review, "review"),
            (DocStatus::Approving, "approving"),
            (DocStatus::Approved, "approved"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(DocStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn doc_level_round_trip_and_tier() {
        for (variant, s, tier) in [
            (DocLevel::Manual, "manual", 1),
            (DocLevel::Procedure, "procedure", 2),
            (DocLevel::WorkInstruction, "work_instruction", 3),
            (DocLevel::FormRecord, "form_record", 4),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(DocLevel::from_str(s).unwrap(), variant);
            assert_eq!(variant.tier(), tier);
        }
    }

    #[test]
    fn category_color_round_trip() {
        for (variant, s) in [
            (CategoryColor::Blue, "blue"),
            (CategoryColor::Purple, "purple"),
            (CategoryColor::Emerald, "emerald"),
            (CategoryColor::Amber, "amber"),
            (CategoryColor::Rose, "rose"),
            (CategoryColor::Slate, "slate"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(CategoryColor::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(DocStatus::from_str("archived").is_err());
        assert!(Tone::from_str("casual").is_err());
        assert!(CategoryType::from_str("").is_err());
    }
}
