use thiserror::Error;

/// Errors raised by a [`KeyValueBackend`](crate::backend::KeyValueBackend).
#[derive(Error, Debug)]
pub enum BackendError {
    /// Filesystem error from the on-disk backend.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The write would push the backend past its byte quota.
    #[error("Storage quota exceeded: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },

    /// Key contains characters the backend cannot store.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// The backend refused the operation for another reason.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Read or write rejected by the backend.
    #[error("Storage error: {0}")]
    Backend(#[from] BackendError),

    /// A collection could not be serialized for writing.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The stored value under `key` is not a JSON array, so it cannot be
    /// modified without losing data.
    #[error("Collection {key} is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// An update or delete referenced an id that is not stored.
    #[error("{collection} record not found: {id}")]
    NotFound { collection: &'static str, id: String },

    /// A uniqueness check done before insert found an existing record.
    #[error("{collection} record already exists: {id}")]
    AlreadyExists { collection: &'static str, id: String },

    /// The operation cannot proceed from the current record state.
    #[error("Invalid operation: {0}")]
    Invalid(String),

    /// The gig was removed but a later cascade step failed. Steps that
    /// already ran stay applied.
    #[error("Cascade for gig {gig_id} stopped partway: {source}")]
    PartialCascade {
        gig_id: String,
        #[source]
        source: Box<StoreError>,
    },

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,
}

impl StoreError {
    pub fn not_found(collection: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
