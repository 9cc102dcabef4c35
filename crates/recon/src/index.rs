//! Product index: ProductKey → entry.
//!
//! Entries live in an arena and keys map to arena handles, so several keys
//! can resolve to the same entry once the crosswalk aliases them. A mutation
//! through any of those keys is visible through all of them.

use std::path::Path;

use indexmap::IndexMap;
use log::debug;

use crate::error::ReconError;
use crate::model::{IngestStats, ProductEntry, ProductKey};
use crate::parser::{read_records, SourceRow, SOURCE_HEADER_MARKERS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

#[derive(Debug, Default)]
pub struct ProductIndex {
    entries: Vec<ProductEntry>,
    keys: IndexMap<ProductKey, EntryId>,
}

impl ProductIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys, aliases included.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of distinct underlying entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    pub fn handle(&self, key: &str) -> Option<EntryId> {
        self.keys.get(key).copied()
    }

    pub fn get(&self, key: &str) -> Option<&ProductEntry> {
        self.handle(key).map(|id| &self.entries[id.0])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ProductEntry> {
        let id = self.handle(key)?;
        Some(&mut self.entries[id.0])
    }

    /// True when both keys are bound to the same entry.
    pub fn shares_entry(&self, a: &str, b: &str) -> bool {
        matches!((self.handle(a), self.handle(b)), (Some(x), Some(y)) if x == y)
    }

    /// Keys in insertion order, each with the entry it resolves to.
    pub fn iter(&self) -> impl Iterator<Item = (&ProductKey, &ProductEntry)> {
        self.keys.iter().map(|(k, id)| (k, &self.entries[id.0]))
    }

    /// Attribute `manufacturer` to `key`, creating the entry on first sight.
    ///
    /// The first non-empty title wins. Returns true if a new entry was created.
    pub fn record(&mut self, key: ProductKey, title: &str, manufacturer: &str) -> bool {
        let existing = self.keys.get(&key).copied();
        let (id, created) = match existing {
            Some(id) => (id, false),
            None => {
                let id = EntryId(self.entries.len());
                self.entries.push(ProductEntry::new(title));
                self.keys.insert(key, id);
                (id, true)
            }
        };

        let entry = &mut self.entries[id.0];
        if entry.title.is_empty() && !title.is_empty() {
            entry.title = title.to_string();
        }
        entry.manufacturers.push(manufacturer.to_string());
        created
    }

    /// Bind `alias` to the entry behind `target`.
    ///
    /// Returns false, binding nothing, if `target` is unknown or `alias` is
    /// already bound.
    pub fn alias(&mut self, alias: ProductKey, target: &str) -> bool {
        if self.keys.contains_key(alias.as_str()) {
            return false;
        }
        match self.handle(target) {
            Some(id) => {
                self.keys.insert(alias, id);
                true
            }
            None => false,
        }
    }

    /// Append each of `source`'s manufacturers that `dest` does not list yet.
    ///
    /// Comparison is exact and case-sensitive. Returns the number appended, or
    /// `None` if either key is unknown.
    pub fn union(&mut self, dest: &str, source: &str) -> Option<usize> {
        let dest_id = self.handle(dest)?;
        let source_id = self.handle(source)?;
        if dest_id == source_id {
            return Some(0);
        }

        let incoming = self.entries[source_id.0].manufacturers.clone();
        let target = &mut self.entries[dest_id.0].manufacturers;
        let mut appended = 0;
        for m in incoming {
            if !target.contains(&m) {
                target.push(m);
                appended += 1;
            }
        }
        Some(appended)
    }
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Feed every row of one source catalog into `index`.
///
/// Rows without a manufacturer and rows whose token count differs from the
/// header are skipped without error.
pub fn ingest_bytes(data: &[u8], index: &mut ProductIndex) -> Result<IngestStats, ReconError> {
    let mut stats = IngestStats::default();

    for line in read_records(data, &SOURCE_HEADER_MARKERS)? {
        stats.rows += 1;

        let row = match SourceRow::decode(&line.record, line.number) {
            Ok(row) => row,
            Err(e) => {
                debug!("skipping source row: {e}");
                stats.malformed += 1;
                continue;
            }
        };

        let Some(manufacturer) = row.manufacturer() else {
            stats.without_manufacturer += 1;
            continue;
        };

        if index.record(row.product_key(), row.title(), manufacturer) {
            stats.entries_created += 1;
        }
    }

    Ok(stats)
}

pub fn ingest_str(data: &str, index: &mut ProductIndex) -> Result<IngestStats, ReconError> {
    ingest_bytes(data.as_bytes(), index)
}

/// Read `path` and ingest it. Any read failure is fatal for the caller's run.
pub fn ingest_file(path: &Path, index: &mut ProductIndex) -> Result<IngestStats, ReconError> {
    let data = std::fs::read(path).map_err(|e| ReconError::file_access(path, e))?;
    let stats = ingest_bytes(&data, index)?;
    debug!(
        "ingested {}: {} rows, {} new products, {} malformed, {} without manufacturer",
        path.display(),
        stats.rows,
        stats.entries_created,
        stats.malformed,
        stats.without_manufacturer,
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "title;manufacturer;source;source_id";

    fn ingest(rows: &[&str], index: &mut ProductIndex) -> IngestStats {
        let mut data = String::from(HEADER);
        for r in rows {
            data.push('\n');
            data.push_str(r);
        }
        ingest_str(&data, index).unwrap()
    }

    #[test]
    fn creates_entry_and_appends_duplicates() {
        let mut index = ProductIndex::new();
        let stats = ingest(
            &["Acme Widget;Acme;shop;1", "Acme Widget;Acme;shop;1", "Acme Widget;Acme Corp;shop;1"],
            &mut index,
        );
        assert_eq!(stats.rows, 3);
        assert_eq!(stats.entries_created, 1);
        let entry = index.get("shop_1").unwrap();
        assert_eq!(entry.title, "Acme Widget");
        assert_eq!(entry.manufacturers, vec!["Acme", "Acme", "Acme Corp"]);
    }

    #[test]
    fn manufacturer_less_rows_leave_no_trace() {
        let mut index = ProductIndex::new();
        let stats = ingest(&["Lonely Widget;;shop;1", "Other;Acme;shop;2"], &mut index);
        assert_eq!(stats.without_manufacturer, 1);
        assert!(!index.contains("shop_1"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn manufacturer_less_row_does_not_touch_existing_entry() {
        let mut index = ProductIndex::new();
        ingest(&[";Acme;shop;1", "Late Title;;shop;1"], &mut index);
        let entry = index.get("shop_1").unwrap();
        assert_eq!(entry.title, "");
        assert_eq!(entry.manufacturers, vec!["Acme"]);
    }

    #[test]
    fn first_title_wins() {
        let mut index = ProductIndex::new();
        ingest(&["First;Acme;shop;1", "Second;Globex;shop;1"], &mut index);
        assert_eq!(index.get("shop_1").unwrap().title, "First");
    }

    #[test]
    fn empty_first_title_is_filled_later() {
        let mut index = ProductIndex::new();
        ingest(&[";Acme;shop;1", "Named;Acme;shop;1", "Renamed;Acme;shop;1"], &mut index);
        assert_eq!(index.get("shop_1").unwrap().title, "Named");
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let mut index = ProductIndex::new();
        let stats = ingest(&["Widget;Acme;shop", "Widget;Acme;shop;2"], &mut index);
        assert_eq!(stats.malformed, 1);
        assert!(!index.contains("shop_"));
        assert!(index.contains("shop_2"));
    }

    #[test]
    fn alias_shares_entry() {
        let mut index = ProductIndex::new();
        index.record(ProductKey::new("comp", "9"), "Widget", "Acme");
        assert!(index.alias(ProductKey::new("main", "1"), "comp_9"));
        assert!(index.shares_entry("main_1", "comp_9"));

        index.get_mut("main_1").unwrap().manufacturers.push("Globex".into());
        assert_eq!(index.get("comp_9").unwrap().manufacturers, vec!["Acme", "Globex"]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.entry_count(), 1);
    }

    #[test]
    fn alias_refuses_unknown_target_or_bound_key() {
        let mut index = ProductIndex::new();
        index.record(ProductKey::new("a", "1"), "", "Acme");
        index.record(ProductKey::new("b", "1"), "", "Globex");
        assert!(!index.alias(ProductKey::new("c", "1"), "zzz"));
        assert!(!index.alias(ProductKey::new("b", "1"), "a_1"));
        assert!(!index.shares_entry("a_1", "b_1"));
    }

    #[test]
    fn union_appends_missing_only() {
        let mut index = ProductIndex::new();
        index.record(ProductKey::new("m", "1"), "", "Acme");
        index.record(ProductKey::new("c", "1"), "", "acme");
        index.record(ProductKey::new("c", "1"), "", "Acme");
        index.record(ProductKey::new("c", "1"), "", "Globex");

        assert_eq!(index.union("m_1", "c_1"), Some(2));
        assert_eq!(index.get("m_1").unwrap().manufacturers, vec!["Acme", "acme", "Globex"]);
        assert_eq!(index.union("m_1", "nope"), None);
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut index = ProductIndex::new();
        index.record(ProductKey::new("b", "2"), "", "X");
        index.record(ProductKey::new("a", "1"), "", "Y");
        index.alias(ProductKey::new("z", "0"), "b_2");
        let keys: Vec<&str> = index.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b_2", "a_1", "z_0"]);
    }

    #[test]
    fn missing_file_is_file_access_error() {
        let mut index = ProductIndex::new();
        let err = ingest_file(Path::new("/definitely/not/here.csv"), &mut index).unwrap_err();
        assert!(matches!(err, ReconError::FileAccess { .. }));
    }

    #[test]
    fn header_per_row_with_reordered_columns() {
        let mut index = ProductIndex::new();
        let stats = ingest_str(
            "title;manufacturer;source;source_id\n\
             A Widget;Acme;s;1\n\
             source_id;source;manufacturer;title\n\
             2;s;Globex;Globex Gadget\n",
            &mut index,
        )
        .unwrap();
        assert_eq!(stats.rows, 2);
        let keys: Vec<&str> = index.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["s_1", "s_2"]);
        let entry = index.get("s_2").unwrap();
        assert_eq!(entry.title, "Globex Gadget");
        assert_eq!(entry.manufacturers, vec!["Globex"]);
    }

    #[test]
    fn non_utf8_file_is_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.csv");
        std::fs::write(&path, b"title;manufacturer;source;source_id\nCaf\xe9;Acme;s;1\n").unwrap();
        let mut index = ProductIndex::new();
        let err = ingest_file(&path, &mut index).unwrap_err();
        assert!(matches!(err, ReconError::Csv(_)));
        assert!(index.is_empty());
    }
}
