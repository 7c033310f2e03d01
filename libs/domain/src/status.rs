//! Status normalization
//!
//! Free-text status values are folded (trimmed, lowercased, accents removed)
//! and matched against three synonym sets. Input that matches none of them
//! passes through as its trimmed uppercase form.

use serde::{Serialize, Serializer};
use std::fmt;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

const AVAILABLE_SYNONYMS: &[&str] = &["", "ok", "livre", "disponivel", "available"];
const UNAVAILABLE_SYNONYMS: &[&str] = &["defeito", "manutencao", "indisponivel", "unavailable"];
const CHECKED_OUT_SYNONYMS: &[&str] = &["cautelado", "emprestado", "checked_out"];

/// Canonical status of an inventory record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalStatus {
    Available,
    Unavailable,
    CheckedOut,
    /// Input outside every synonym set, kept as its uppercase form
    Unclassified(String),
}

impl CanonicalStatus {
    pub fn as_str(&self) -> &str {
        match self {
            CanonicalStatus::Available => "AVAILABLE",
            CanonicalStatus::Unavailable => "UNAVAILABLE",
            CanonicalStatus::CheckedOut => "CHECKED_OUT",
            CanonicalStatus::Unclassified(raw) => raw,
        }
    }

    pub fn is_classified(&self) -> bool {
        !matches!(self, CanonicalStatus::Unclassified(_))
    }
}

impl fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CanonicalStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

fn fold(raw: &str) -> String {
    raw.trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Map free text to a canonical status. Absent input counts as available.
pub fn normalize(raw: Option<&str>) -> CanonicalStatus {
    let raw = raw.unwrap_or_default();
    let folded = fold(raw);

    if AVAILABLE_SYNONYMS.contains(&folded.as_str()) {
        CanonicalStatus::Available
    } else if UNAVAILABLE_SYNONYMS.contains(&folded.as_str()) {
        CanonicalStatus::Unavailable
    } else if CHECKED_OUT_SYNONYMS.contains(&folded.as_str()) {
        CanonicalStatus::CheckedOut
    } else {
        CanonicalStatus::Unclassified(raw.trim().to_uppercase())
    }
}

/// Convenience over [`normalize`] for stored values
pub fn normalize_str(raw: &str) -> CanonicalStatus {
    normalize(Some(raw))
}
