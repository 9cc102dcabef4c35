//! `;`-delimited record parsing.
//!
//! A catalog file is a sequence of header lines and data lines. Each data line
//! is paired positionally with the most recent header to form a
//! [`RawRecord`]; the typed
//! decoders ([`SourceRow`], [`MatchRow`]) then pull their allow-listed fields
//! out of it. No quoting or escaping is supported.

use indexmap::IndexMap;

use crate::error::ReconError;
use crate::model::ProductKey;

pub const DELIMITER: u8 = b';';

/// Fields the index builder reads from a source file.
pub const SOURCE_FIELDS: [&str; 4] = ["title", "manufacturer", "source", "source_id"];

/// Fields the crosswalk merger reads from a match file.
pub const MATCH_FIELDS: [&str; 4] = ["m_source", "m_source_id", "c_source", "c_source_id"];

// ---------------------------------------------------------------------------
// Raw record
// ---------------------------------------------------------------------------

/// Field name → value mapping for one data line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: IndexMap<String, String>,
    header_len: usize,
    value_len: usize,
}

impl RawRecord {
    /// Split a header line and a data line and pair the tokens by position.
    ///
    /// Pairing stops at the shorter of the two; use [`RawRecord::is_well_formed`]
    /// to find out whether anything was dropped.
    pub fn parse(header: &str, data: &str) -> Self {
        let delim = DELIMITER as char;
        Self::from_tokens(header.split(delim), data.split(delim))
    }

    pub fn from_tokens<'a, H, V>(header: H, values: V) -> Self
    where
        H: IntoIterator<Item = &'a str>,
        V: IntoIterator<Item = &'a str>,
    {
        let header: Vec<&str> = header.into_iter().collect();
        let values: Vec<&str> = values.into_iter().collect();

        let mut fields = IndexMap::with_capacity(header.len().min(values.len()));
        for (key, value) in header.iter().zip(values.iter()) {
            // Repeated header names: the later column wins.
            fields.insert((*key).to_string(), (*value).to_string());
        }

        Self {
            fields,
            header_len: header.len(),
            value_len: values.len(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True when header and data split into the same number of tokens.
    pub fn is_well_formed(&self) -> bool {
        self.header_len == self.value_len
    }

    fn check_shape(&self, line: u64) -> Result<(), ReconError> {
        if self.is_well_formed() {
            Ok(())
        } else {
            Err(ReconError::MalformedRow {
                line,
                expected: self.header_len,
                found: self.value_len,
            })
        }
    }

    fn take<const N: usize>(&self, names: [&str; N]) -> [Option<String>; N] {
        names.map(|name| self.get(name).map(str::to_string))
    }
}

// ---------------------------------------------------------------------------
// Typed rows
// ---------------------------------------------------------------------------

/// One row of an "other source" catalog file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRow {
    pub title: Option<String>,
    pub manufacturer: Option<String>,
    pub source: Option<String>,
    pub source_id: Option<String>,
}

impl SourceRow {
    pub fn decode(record: &RawRecord, line: u64) -> Result<Self, ReconError> {
        record.check_shape(line)?;
        let [title, manufacturer, source, source_id] = record.take(SOURCE_FIELDS);
        Ok(Self {
            title,
            manufacturer,
            source,
            source_id,
        })
    }

    pub fn product_key(&self) -> ProductKey {
        ProductKey::new(
            self.source.as_deref().unwrap_or_default(),
            self.source_id.as_deref().unwrap_or_default(),
        )
    }

    /// The manufacturer, if present and non-empty.
    pub fn manufacturer(&self) -> Option<&str> {
        self.manufacturer.as_deref().filter(|m| !m.is_empty())
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
}

/// One row of the crosswalk (match) file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchRow {
    pub m_source: Option<String>,
    pub m_source_id: Option<String>,
    pub c_source: Option<String>,
    pub c_source_id: Option<String>,
}

impl MatchRow {
    pub fn decode(record: &RawRecord, line: u64) -> Result<Self, ReconError> {
        record.check_shape(line)?;
        let [m_source, m_source_id, c_source, c_source_id] = record.take(MATCH_FIELDS);
        Ok(Self {
            m_source,
            m_source_id,
            c_source,
            c_source_id,
        })
    }

    pub fn main_key(&self) -> ProductKey {
        ProductKey::new(
            self.m_source.as_deref().unwrap_or_default(),
            self.m_source_id.as_deref().unwrap_or_default(),
        )
    }

    pub fn competitor_key(&self) -> ProductKey {
        ProductKey::new(
            self.c_source.as_deref().unwrap_or_default(),
            self.c_source_id.as_deref().unwrap_or_default(),
        )
    }
}

// ---------------------------------------------------------------------------
// File framing
// ---------------------------------------------------------------------------

/// A data line paired with its header, tagged with its 1-based line number.
#[derive(Debug, Clone)]
pub struct Line {
    pub number: u64,
    pub record: RawRecord,
}

/// Tokens that mark a source-file line as a header.
pub const SOURCE_HEADER_MARKERS: [&str; 3] = ["manufacturer", "source", "source_id"];

/// Tokens that mark a match-file line as a header.
pub const MATCH_HEADER_MARKERS: [&str; 4] = MATCH_FIELDS;

const BOM: &[u8] = b"\xEF\xBB\xBF";

fn is_header(record: &csv::StringRecord, markers: &[&str]) -> bool {
    markers.iter().all(|m| record.iter().any(|token| token == *m))
}

/// Split delimited bytes into header-paired records.
///
/// Every data line pairs with the most recent header line. The first
/// non-blank line is always a header; any later line carrying all of
/// `header_markers` replaces it, so files may repeat (or reorder) the header
/// before each data line. Rows with the wrong number of tokens are still
/// returned; rejecting them is the decoder's job.
pub fn read_records(data: &[u8], header_markers: &[&str]) -> Result<Vec<Line>, ReconError> {
    let data = data.strip_prefix(BOM).unwrap_or(data);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .quoting(false)
        .flexible(true)
        .has_headers(false)
        .from_reader(data);

    let mut header: Option<csv::StringRecord> = None;
    let mut lines = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| ReconError::Csv(e.to_string()))?;
        if header.is_none() || is_header(&record, header_markers) {
            header = Some(record);
            continue;
        }
        let Some(current) = header.as_ref() else {
            continue;
        };
        let number = record.position().map(|p| p.line()).unwrap_or_default();
        lines.push(Line {
            number,
            record: RawRecord::from_tokens(current.iter(), record.iter()),
        });
    }

    Ok(lines)
}
