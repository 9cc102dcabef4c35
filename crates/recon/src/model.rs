use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Keys + entries
// ---------------------------------------------------------------------------

/// `"{source}_{source_id}"`: binds one product across files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProductKey(String);

impl ProductKey {
    pub fn new(source: &str, source_id: &str) -> Self {
        Self(format!("{source}_{source_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Borrow<str> for ProductKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Working state for one product while the index is being built.
///
/// `manufacturers` keeps every attribution in encounter order, duplicates
/// included; deduplication happens at finalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductEntry {
    pub title: String,
    pub manufacturers: Vec<String>,
}

impl ProductEntry {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            manufacturers: Vec::new(),
        }
    }

    /// Manufacturers with exact duplicates removed, first occurrence kept.
    pub fn unique_manufacturers(&self) -> Vec<String> {
        let mut unique: Vec<String> = Vec::with_capacity(self.manufacturers.len());
        for m in &self.manufacturers {
            if !unique.contains(m) {
                unique.push(m.clone());
            }
        }
        unique
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Inferred hierarchy among the manufacturers attributed to one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RelationType {
    #[serde(rename = "")]
    None,
    #[serde(rename = "parent")]
    Parent,
    #[serde(rename = "child/parent")]
    ChildParent,
    #[serde(rename = "parent/child")]
    ParentChild,
    #[serde(rename = "sibling")]
    Sibling,
    #[serde(rename = "unknown")]
    Unknown,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Parent => "parent",
            Self::ChildParent => "child/parent",
            Self::ParentChild => "parent/child",
            Self::Sibling => "sibling",
            Self::Unknown => "unknown",
        }
    }

    /// Inverse of [`RelationType::as_str`]; `None` for unrecognised labels.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "" => Some(Self::None),
            "parent" => Some(Self::Parent),
            "child/parent" => Some(Self::ChildParent),
            "parent/child" => Some(Self::ParentChild),
            "sibling" => Some(Self::Sibling),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A finalized product, ready to be handed to a record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub name: ProductKey,
    pub title: String,
    pub manufacturers: Vec<String>,
    pub relation_type: RelationType,
    pub investigation_required: bool,
}

impl ProductRecord {
    /// Manufacturers joined with `,` in first-seen order.
    pub fn related_manufacturers(&self) -> String {
        self.manufacturers.join(",")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub rows: usize,
    pub malformed: usize,
    pub without_manufacturer: usize,
    pub entries_created: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub rows: usize,
    pub malformed: usize,
    pub unknown_competitor: usize,
    pub merged: usize,
    pub aliased: usize,
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MappingSummary {
    pub products: usize,
    pub investigation_required: usize,
    pub relation_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MappingMeta {
    pub engine_version: String,
    pub run_at: String,
    pub source_files: usize,
}

/// Everything one pipeline invocation produces.
#[derive(Debug, Clone, Serialize)]
pub struct MappingRun {
    pub meta: MappingMeta,
    pub summary: MappingSummary,
    pub ingest: Vec<IngestStats>,
    pub merge: MergeStats,
    pub records: Vec<ProductRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_key_format() {
        assert_eq!(ProductKey::new("shop", "42").as_str(), "shop_42");
        assert_eq!(ProductKey::new("", "").as_str(), "_");
    }

    #[test]
    fn dedup_preserves_first_seen_order() {
        let entry = ProductEntry {
            title: "t".into(),
            manufacturers: vec!["A".into(), "B".into(), "A".into(), "C".into()],
        };
        assert_eq!(entry.unique_manufacturers(), vec!["A", "B", "C"]);
    }

    #[test]
    fn dedup_is_case_sensitive() {
        let entry = ProductEntry {
            title: "t".into(),
            manufacturers: vec!["Acme".into(), "ACME".into(), "Acme".into()],
        };
        assert_eq!(entry.unique_manufacturers(), vec!["Acme", "ACME"]);
    }

    #[test]
    fn relation_labels_round_trip_through_serde() {
        let json = serde_json::to_string(&RelationType::ChildParent).unwrap();
        assert_eq!(json, "\"child/parent\"");
        let json = serde_json::to_string(&RelationType::None).unwrap();
        assert_eq!(json, "\"\"");
        assert_eq!(RelationType::from_label("parent/child"), Some(RelationType::ParentChild));
        assert_eq!(RelationType::from_label("cousin"), None);
    }
}
