use std::path::{Path, PathBuf};

use log::info;

use crate::classify::{classify, investigate};
use crate::crosswalk::merge_file;
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::index::{ingest_file, ProductIndex};
use crate::model::{MappingMeta, MappingRun, ProductRecord};

/// Run the full pipeline: ingest every source in order, apply the crosswalk,
/// then finalize each index key into a classified record.
///
/// Source order is part of the contract: when a product appears in several
/// files, the title from the earliest file wins.
pub fn run<P: AsRef<Path>>(other_sources: &[P], match_source: &Path) -> Result<MappingRun, ReconError> {
    if other_sources.is_empty() {
        return Err(ReconError::InvalidInput("at least one source file is required".into()));
    }

    let mut index = ProductIndex::new();
    let mut ingest = Vec::with_capacity(other_sources.len());
    for path in other_sources {
        ingest.push(ingest_file(path.as_ref(), &mut index)?);
    }

    let merge = merge_file(match_source, &mut index)?;

    let records = finalize(&index);
    let summary = compute_summary(&records);

    info!(
        "mapped {} products from {} source file(s): {} need investigation",
        summary.products,
        other_sources.len(),
        summary.investigation_required,
    );

    Ok(MappingRun {
        meta: MappingMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            source_files: other_sources.len(),
        },
        summary,
        ingest,
        merge,
        records,
    })
}

/// Snapshot every key of the index as a classified record, in key order.
///
/// Aliased keys each get their own record carrying the shared entry's data.
pub fn finalize(index: &ProductIndex) -> Vec<ProductRecord> {
    index
        .iter()
        .map(|(key, entry)| {
            let manufacturers = entry.unique_manufacturers();
            let relation_type = classify(manufacturers.as_slice(), &entry.title);
            let investigation_required = investigate(manufacturers.as_slice(), &entry.title);
            ProductRecord {
                name: key.clone(),
                title: entry.title.clone(),
                manufacturers,
                relation_type,
                investigation_required,
            }
        })
        .collect()
}

/// Resolve `file` against `base` unless it is already absolute.
pub fn resolve_path(base: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
