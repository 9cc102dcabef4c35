//! Crosswalk merge: fold competitor attributions into main products.

use std::path::Path;

use log::debug;

use crate::error::ReconError;
use crate::index::ProductIndex;
use crate::model::MergeStats;
use crate::parser::{read_records, MatchRow, MATCH_HEADER_MARKERS};

/// Apply every row of a match file to `index`, in file order.
///
/// Per row, with `main`/`competitor` as product keys:
/// - competitor unknown → nothing happens
/// - both known → competitor manufacturers missing from main are appended
/// - only competitor known → main becomes an alias of the competitor entry
pub fn merge_bytes(data: &[u8], index: &mut ProductIndex) -> Result<MergeStats, ReconError> {
    let mut stats = MergeStats::default();

    for line in read_records(data, &MATCH_HEADER_MARKERS)? {
        stats.rows += 1;

        let row = match MatchRow::decode(&line.record, line.number) {
            Ok(row) => row,
            Err(e) => {
                debug!("skipping match row: {e}");
                stats.malformed += 1;
                continue;
            }
        };

        let main = row.main_key();
        let competitor = row.competitor_key();

        if !index.contains(competitor.as_str()) {
            stats.unknown_competitor += 1;
            continue;
        }

        if index.contains(main.as_str()) {
            index.union(main.as_str(), competitor.as_str());
            stats.merged += 1;
        } else if index.alias(main, competitor.as_str()) {
            stats.aliased += 1;
        }
    }

    Ok(stats)
}

pub fn merge_str(data: &str, index: &mut ProductIndex) -> Result<MergeStats, ReconError> {
    merge_bytes(data.as_bytes(), index)
}

pub fn merge_file(path: &Path, index: &mut ProductIndex) -> Result<MergeStats, ReconError> {
    let data = std::fs::read(path).map_err(|e| ReconError::file_access(path, e))?;
    let stats = merge_bytes(&data, index)?;
    debug!(
        "merged {}: {} rows, {} merged, {} aliased, {} unknown competitor, {} malformed",
        path.display(),
        stats.rows,
        stats.merged,
        stats.aliased,
        stats.unknown_competitor,
        stats.malformed,
    );
    Ok(stats)
}
