// Re-export main components
pub mod api;
pub mod document;
pub mod error;
pub mod processor;
pub mod ranking;
pub mod service;
pub mod storage;
pub mod store;
pub mod tokenizer;

// Re-export commonly used types
pub use document::{ChunkInfo, Document, DocumentMetadata};
pub use error::{Result, RetrievalError};
pub use service::{
    ContextHit, ContextualPrompt, IngestOptions, IngestReport, RetrievalService, SearchOptions,
    SourceRef,
};
pub use storage::Storage;
pub use store::{DocumentStore, SearchHit, StoreStats};
pub use tokenizer::Tokenizer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
