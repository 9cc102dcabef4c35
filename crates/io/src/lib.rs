// Record store and operations over it

pub mod error;
pub mod ops;
pub mod store;

pub use error::StoreError;
pub use ops::{
    assign_manufacturer_by_title, list_manual_investigation_items, map_manufacturers,
    persist_run, validate_manufacturer_mapping, MapOutcome, MapRequest,
};
pub use store::{ManufacturerRecord, ManufacturerStore, NewManufacturer};

/// Database file used when neither the caller nor a config names one.
pub const DEFAULT_DATABASE: &str = "manufacturer.db";
