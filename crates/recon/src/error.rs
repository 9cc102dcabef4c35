use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ReconError {
    /// Missing or blank required input (paths, titles) at the operation boundary.
    InvalidInput(String),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// A source or match file could not be opened or read.
    FileAccess { path: PathBuf, message: String },
    /// Input is not valid UTF-8 delimited text.
    Csv(String),
    /// Header and data line split into different token counts.
    MalformedRow { line: u64, expected: usize, found: usize },
}

impl ReconError {
    pub fn file_access(path: impl Into<PathBuf>, err: impl fmt::Display) -> Self {
        Self::FileAccess {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::FileAccess { path, message } => {
                write!(f, "cannot read {}: {message}", path.display())
            }
            Self::Csv(msg) => write!(f, "delimited read error: {msg}"),
            Self::MalformedRow { line, expected, found } => {
                write!(f, "line {line}: expected {expected} field(s), found {found}")
            }
        }
    }
}

impl std::error::Error for ReconError {}
