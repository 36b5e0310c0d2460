use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Error taxonomy for ingestion and retrieval
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Upload has an extension outside the allow-list
    #[error("unsupported file type '.{extension}', expected one of: txt, md")]
    UnsupportedFileType { extension: String },

    /// Upload exceeds the size ceiling
    #[error("file is {size} bytes, which exceeds the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    /// Same file name and same content fingerprint already indexed
    #[error("document '{file_name}' with identical content is already in the knowledge base")]
    DuplicateDocument { file_name: String },

    /// I/O failure while writing the corpus snapshot
    #[error("persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    /// Corpus snapshot could not be encoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
