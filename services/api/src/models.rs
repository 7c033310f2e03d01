//! Models for the API service

use serde::{Deserialize, Deserializer, Serialize};

pub mod inventory;
pub mod users;

/// Query parameters for paginated, searchable listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Free-text search
    pub q: Option<String>,
    /// Page number (1-based); unparsable or negative input counts as absent
    #[serde(default, deserialize_with = "lenient_page")]
    pub page: Option<u32>,
}

fn lenient_page<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;

    Ok(raw
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .and_then(|page| u32::try_from(page).ok()))
}

impl ListQuery {
    /// Search term, `None` when blank
    pub fn search(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    /// Requested page, values below 1 clamp to 1
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

/// One page of a listing
#[derive(Debug, Clone, Serialize)]
pub struct ItemPage<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}
