use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A unit of indexed text.
///
/// `content` and `original_content` hold the same text today; both are kept
/// so the indexed form can diverge from the stored form without a schema
/// change. `words` and `term_frequency` are fixed at creation; `vector` is
/// derived and rewritten whenever the corpus-wide IDF changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub original_content: String,
    pub words: Vec<String>,
    pub term_frequency: HashMap<String, f64>,
    pub vector: HashMap<String, f64>,
    pub metadata: DocumentMetadata,
}

/// Per-document bookkeeping carried through ingestion and persistence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub file_name: String,
    pub file_type: String,
    /// Size of the decoded content in bytes
    pub size: u64,
    /// Word count of the original content, split on whitespace — not the
    /// normalized token count
    pub word_count: usize,
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    /// Fingerprint of the parent document's full extracted content, so
    /// duplicate detection works at source-file granularity
    #[serde(default)]
    pub content_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk: Option<ChunkInfo>,
}

impl DocumentMetadata {
    pub fn is_chunk(&self) -> bool {
        self.chunk.is_some()
    }
}

/// Present only on documents produced by splitting a longer upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkInfo {
    pub parent_id: String,
    pub chunk_index: usize,
    /// Word offset into the parent where this chunk starts
    pub start_index: usize,
    /// Word offset into the parent where this chunk ends, exclusive
    pub end_index: usize,
}
