//! Inventory categories

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::DomainError;

/// One of the fixed inventory classifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Cl2,
    Cl6,
    Cl7,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 3] = [Category::Cl2, Category::Cl6, Category::Cl7];

    /// The canonical code stored in grant rows (`CL2`, `CL6`, `CL7`)
    pub fn code(&self) -> &'static str {
        match self {
            Category::Cl2 => "CL2",
            Category::Cl6 => "CL6",
            Category::Cl7 => "CL7",
        }
    }

    /// Lowercase form used in route paths
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Cl2 => "cl2",
            Category::Cl6 => "cl6",
            Category::Cl7 => "cl7",
        }
    }

    /// Parse a code leniently: surrounding whitespace and case are ignored.
    /// Returns `None` for empty or unknown input.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "CL2" => Some(Category::Cl2),
            "CL6" => Some(Category::Cl6),
            "CL7" => Some(Category::Cl7),
            _ => None,
        }
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::parse_lenient(s).ok_or_else(|| DomainError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
