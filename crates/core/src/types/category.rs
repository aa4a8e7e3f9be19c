//! Product category enum.

use serde::{Deserialize, Serialize};

/// Product catalog category.
///
/// A closed set; unknown categories are rejected at deserialization time.
/// The wire representation uses the display names the frontend filters on
/// (e.g. `"Home & Kitchen"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    Electronics,
    Clothing,
    Books,
    #[serde(rename = "Home & Kitchen")]
    HomeAndKitchen,
    Beauty,
    Toys,
    #[default]
    Other,
}

impl Category {
    /// Stable string form, matching the serialized representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Electronics => "Electronics",
            Self::Clothing => "Clothing",
            Self::Books => "Books",
            Self::HomeAndKitchen => "Home & Kitchen",
            Self::Beauty => "Beauty",
            Self::Toys => "Toys",
            Self::Other => "Other",
        }
    }

    /// All categories, in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Electronics,
            Self::Clothing,
            Self::Books,
            Self::HomeAndKitchen,
            Self::Beauty,
            Self::Toys,
            Self::Other,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Electronics" => Ok(Self::Electronics),
            "Clothing" => Ok(Self::Clothing),
            "Books" => Ok(Self::Books),
            "Home & Kitchen" => Ok(Self::HomeAndKitchen),
            "Beauty" => Ok(Self::Beauty),
            "Toys" => Ok(Self::Toys),
            "Other" => Ok(Self::Other),
            _ => Err(format!("invalid category: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_matches_display() {
        for category in Category::all() {
            let json = serde_json::to_string(category).expect("serialize");
            assert_eq!(json, format!("\"{category}\""));
            let back: Category = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(back, *category);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("Gadgets".parse::<Category>().is_err());
        assert_eq!(
            "Home & Kitchen".parse::<Category>(),
            Ok(Category::HomeAndKitchen)
        );
    }
}
