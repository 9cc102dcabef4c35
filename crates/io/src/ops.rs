//! Operations exposed to front ends: validate the request, run, persist.

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use brandmap_recon::model::{MappingMeta, MappingSummary};
use brandmap_recon::{MappingRun, ReconError, RelationType};

use crate::error::StoreError;
use crate::store::{ManufacturerRecord, ManufacturerStore, NewManufacturer};

/// Names too generic to identify a manufacturer on their own.
pub const GENERIC_NAMES: [&str; 4] = ["Health", "Pharma", "Inc", "Ltd"];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRequest {
    /// Ingested in this order; earlier files win title conflicts.
    pub other_sources: Vec<PathBuf>,
    pub match_source: PathBuf,
}

impl MapRequest {
    pub fn validate(&self) -> Result<(), ReconError> {
        if self.other_sources.is_empty() {
            return Err(ReconError::InvalidInput("otherSources must not be empty".into()));
        }
        if let Some(pos) = self.other_sources.iter().position(|p| is_blank(p)) {
            return Err(ReconError::InvalidInput(format!("otherSources[{pos}] is blank")));
        }
        if is_blank(&self.match_source) {
            return Err(ReconError::InvalidInput("matchSource is blank".into()));
        }
        Ok(())
    }
}

fn is_blank(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().trim().is_empty()
}

#[derive(Debug, Clone, Serialize)]
pub struct MapOutcome {
    pub meta: MappingMeta,
    pub summary: MappingSummary,
    /// Records written by this run; products already in the store are left out.
    pub inserted: Vec<ManufacturerRecord>,
}

/// Run the mapping pipeline and persist every product not yet stored.
///
/// Nothing is written unless every input file was read successfully.
pub fn map_manufacturers(store: &mut ManufacturerStore, request: &MapRequest) -> Result<MapOutcome, StoreError> {
    request.validate()?;

    let run = brandmap_recon::run(request.other_sources.as_slice(), &request.match_source)?;
    persist_run(store, run)
}

/// Persist every record of a finished pipeline run that is not yet stored.
pub fn persist_run(store: &mut ManufacturerStore, run: MappingRun) -> Result<MapOutcome, StoreError> {
    let pending: Vec<NewManufacturer> = run.records.iter().map(NewManufacturer::from).collect();
    let inserted = store.insert_all_if_absent(&pending)?;

    info!(
        "stored {} new record(s), {} already present",
        inserted.len(),
        pending.len() - inserted.len(),
    );

    Ok(MapOutcome {
        meta: run.meta,
        summary: run.summary,
        inserted,
    })
}

/// Find the record whose manufacturer list is exactly `title`, or create one.
///
/// A created record is named after the first two words of the title (one if
/// that is all there is), is a `parent` and needs investigation. Returns
/// `None` when that name is already taken by another record.
pub fn assign_manufacturer_by_title(
    store: &ManufacturerStore,
    title: &str,
) -> Result<Option<ManufacturerRecord>, StoreError> {
    if title.trim().is_empty() {
        return Err(ReconError::InvalidInput("title is blank".into()).into());
    }

    if let Some(existing) = store.find_by_related_manufacturers(title)? {
        debug!("title matches existing record {}", existing.name);
        return Ok(Some(existing));
    }

    let name = title.split_whitespace().take(2).collect::<Vec<_>>().join(" ");
    let record = NewManufacturer {
        name: name.clone(),
        title: title.to_string(),
        related_manufacturers: name,
        relation_type: RelationType::Parent,
        investigation_required: true,
    };
    store.insert_if_absent(&record)
}

pub fn list_manual_investigation_items(store: &ManufacturerStore) -> Result<Vec<ManufacturerRecord>, StoreError> {
    store.list_investigation_required()
}

/// Names of stored records that are one of [`GENERIC_NAMES`].
pub fn validate_manufacturer_mapping(store: &ManufacturerStore) -> Result<Vec<String>, StoreError> {
    Ok(store
        .list_all()?
        .into_iter()
        .filter(|r| GENERIC_NAMES.contains(&r.name.as_str()))
        .map(|r| r.name)
        .collect())
}
