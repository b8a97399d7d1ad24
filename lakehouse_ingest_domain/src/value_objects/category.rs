use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of document categories the classifier assigns. `General` is
/// the fallback when no rule or LLM classification clears the confidence
/// bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Tax,
    Legal,
    Products,
    Hr,
    Correspondence,
    General,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Tax,
        Category::Legal,
        Category::Products,
        Category::Hr,
        Category::Correspondence,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tax => "tax",
            Category::Legal => "legal",
            Category::Products => "products",
            Category::Hr => "hr",
            Category::Correspondence => "correspondence",
            Category::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tax" => Ok(Category::Tax),
            "legal" => Ok(Category::Legal),
            "products" => Ok(Category::Products),
            "hr" => Ok(Category::Hr),
            "correspondence" => Ok(Category::Correspondence),
            "general" => Ok(Category::General),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for cat in Category::ALL {
            assert_eq!(cat.as_str().parse::<Category>().unwrap(), cat);
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!("unknown".parse::<Category>().is_err());
    }
}
