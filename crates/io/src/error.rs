use std::fmt;

use brandmap_recon::ReconError;

#[derive(Debug)]
pub enum StoreError {
    /// SQLite open / query / write failure.
    Sqlite(String),
    /// The mapping pipeline or input validation failed before any write.
    Pipeline(ReconError),
}

impl StoreError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::Pipeline(ReconError::InvalidInput(_) | ReconError::ConfigParse(_))
        )
    }

    pub fn is_file_access(&self) -> bool {
        matches!(self, Self::Pipeline(ReconError::FileAccess { .. }))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite(msg) => write!(f, "store error: {msg}"),
            Self::Pipeline(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pipeline(err) => Some(err),
            Self::Sqlite(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite(err.to_string())
    }
}

impl From<ReconError> for StoreError {
    fn from(err: ReconError) -> Self {
        Self::Pipeline(err)
    }
}
