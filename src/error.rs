use crate::schema::SchemaViolation;

/// Broad category of a [`ConvertError`], used by the CLI for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong invocation shape or input name.
    Argument,
    /// The document is not JSON or does not match its schema.
    Schema,
    /// The document matches its schema but is internally inconsistent.
    Semantic,
    /// Reading or writing failed.
    Io,
}

/// Error type for every conversion stage. All variants abort the run.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("{0}")]
    Argument(String),
    #[error("{document} is not valid: {violation}")]
    Schema {
        document: &'static str,
        violation: SchemaViolation,
    },
    #[error("input volume is empty")]
    EmptyVolume,
    #[error("input array is not rectangular at {path}: expected length {expected}, found {found}")]
    RaggedVolume {
        path: String,
        expected: usize,
        found: usize,
    },
    #[error("block index count {found} does not match size {size:?} (expected {expected})")]
    IndexCountMismatch {
        size: [u32; 3],
        expected: usize,
        found: usize,
    },
    #[error("palette has {found} entries but block indices require exactly {expected}")]
    PaletteSizeMismatch { expected: usize, found: usize },
    #[error("palette index {index} at position {position} is out of range")]
    PaletteIndexOutOfRange { position: usize, index: i64 },
    #[error("block id {value} at {path} does not fit a 32-bit id")]
    BlockIdOutOfRange { path: String, value: i64 },
    #[error("unknown or unsupported input format")]
    UnknownFormat,
    #[error("the {0} format requires a block dictionary")]
    MissingDictionary(&'static str),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::Argument(_) => ErrorKind::Argument,
            ConvertError::Schema { .. } | ConvertError::Json(_) => ErrorKind::Schema,
            ConvertError::EmptyVolume
            | ConvertError::RaggedVolume { .. }
            | ConvertError::IndexCountMismatch { .. }
            | ConvertError::PaletteSizeMismatch { .. }
            | ConvertError::PaletteIndexOutOfRange { .. }
            | ConvertError::BlockIdOutOfRange { .. }
            | ConvertError::UnknownFormat
            | ConvertError::MissingDictionary(_) => ErrorKind::Semantic,
            ConvertError::Io(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
