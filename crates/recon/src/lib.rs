//! `brandmap-recon`: product catalog → manufacturer reconciliation engine.
//!
//! Builds a product index from `;`-delimited source catalogs, folds in a
//! crosswalk of matched products, and labels each product's manufacturer set.
//! No storage or CLI dependencies.

pub mod classify;
pub mod config;
pub mod crosswalk;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod index;
pub mod model;
pub mod parser;

pub use classify::{classify, investigate, normalize};
pub use config::MapConfig;
pub use engine::run;
pub use error::ReconError;
pub use index::ProductIndex;
pub use model::{MappingRun, ProductKey, ProductRecord, RelationType};
