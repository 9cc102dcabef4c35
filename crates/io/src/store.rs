// Manufacturer record store using SQLite

use std::path::Path;

use rusqlite::{params, Connection, Row};
use serde::Serialize;

use brandmap_recon::{ProductRecord, RelationType};

use crate::error::StoreError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS manufacturer (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,              -- product key, not a manufacturer name
    title TEXT NOT NULL DEFAULT '',
    related_manufacturers TEXT NOT NULL,    -- comma-joined, first-seen order
    relation_type TEXT,
    investigation_required INTEGER NOT NULL DEFAULT 0
);
"#;

const COLUMNS: &str =
    "id, name, title, related_manufacturers, relation_type, investigation_required";

/// A persisted product → manufacturers mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturerRecord {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub related_manufacturers: String,
    pub relation_type: String,
    pub investigation_required: bool,
}

impl ManufacturerRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            title: row.get(2)?,
            related_manufacturers: row.get(3)?,
            relation_type: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            investigation_required: row.get(5)?,
        })
    }

    pub fn manufacturers(&self) -> Vec<&str> {
        if self.related_manufacturers.is_empty() {
            return Vec::new();
        }
        self.related_manufacturers.split(',').collect()
    }
}

/// A record not yet written; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewManufacturer {
    pub name: String,
    pub title: String,
    pub related_manufacturers: String,
    pub relation_type: RelationType,
    pub investigation_required: bool,
}

impl From<&ProductRecord> for NewManufacturer {
    fn from(record: &ProductRecord) -> Self {
        Self {
            name: record.name.to_string(),
            title: record.title.clone(),
            related_manufacturers: record.related_manufacturers(),
            relation_type: record.relation_type,
            investigation_required: record.investigation_required,
        }
    }
}

pub struct ManufacturerStore {
    conn: Connection,
}

impl ManufacturerStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Insert unless a record with the same name exists.
    ///
    /// Returns the stored record, or `None` when the existing one was kept.
    pub fn insert_if_absent(&self, record: &NewManufacturer) -> Result<Option<ManufacturerRecord>, StoreError> {
        insert_with(&self.conn, record)
    }

    /// Insert every absent record inside one transaction.
    ///
    /// Returns only the records this call wrote, in input order.
    pub fn insert_all_if_absent(&mut self, records: &[NewManufacturer]) -> Result<Vec<ManufacturerRecord>, StoreError> {
        let tx = self.conn.transaction()?;
        let mut inserted = Vec::new();
        for record in records {
            if let Some(saved) = insert_with(&tx, record)? {
                inserted.push(saved);
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<ManufacturerRecord>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM manufacturer WHERE name = ?1");
        let mut rows = self.query(&sql, params![name])?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }

    pub fn find_by_title(&self, title: &str) -> Result<Vec<ManufacturerRecord>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM manufacturer WHERE title = ?1 ORDER BY id");
        self.query(&sql, params![title])
    }

    /// First record (by id) whose joined manufacturer list equals `related`.
    pub fn find_by_related_manufacturers(&self, related: &str) -> Result<Option<ManufacturerRecord>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM manufacturer WHERE related_manufacturers = ?1 ORDER BY id LIMIT 1"
        );
        let mut rows = self.query(&sql, params![related])?;
        Ok(rows.pop())
    }

    pub fn list_all(&self) -> Result<Vec<ManufacturerRecord>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM manufacturer ORDER BY id");
        self.query(&sql, [])
    }

    pub fn list_investigation_required(&self) -> Result<Vec<ManufacturerRecord>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM manufacturer WHERE investigation_required = 1 ORDER BY id"
        );
        self.query(&sql, [])
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM manufacturer", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    fn query<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<ManufacturerRecord>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, ManufacturerRecord::from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

fn insert_with(conn: &Connection, record: &NewManufacturer) -> Result<Option<ManufacturerRecord>, StoreError> {
    // UNIQUE(name) + OR IGNORE: the existence check and the insert are one statement
    let changed = conn.execute(
        "INSERT OR IGNORE INTO manufacturer \
         (name, title, related_manufacturers, relation_type, investigation_required) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            record.name,
            record.title,
            record.related_manufacturers,
            record.relation_type.as_str(),
            record.investigation_required,
        ],
    )?;

    if changed == 0 {
        return Ok(None);
    }

    Ok(Some(ManufacturerRecord {
        id: conn.last_insert_rowid(),
        name: record.name.clone(),
        title: record.title.clone(),
        related_manufacturers: record.related_manufacturers.clone(),
        relation_type: record.relation_type.as_str().to_string(),
        investigation_required: record.investigation_required,
    }))
}
