use crate::document::DocumentMetadata;
use crate::error::{Result, RetrievalError};
use crate::processor;
use crate::storage::Storage;
use crate::store::{DocumentStore, SearchHit, StoreStats};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::RwLock;

/// How many matches feed the contextual prompt
const CONTEXT_MATCHES: usize = 3;
/// Characters of each match embedded in the context block
const EXCERPT_LENGTH: usize = 500;
/// Characters of content surfaced in search previews
const PREVIEW_LENGTH: usize = 200;

pub const DEFAULT_MAX_CONTEXT_LENGTH: usize = 2000;

/// Search tuning knobs
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub top_k: usize,
    pub threshold: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            threshold: 0.1,
        }
    }
}

/// Chunking knobs for ingestion
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub max_chunk_size: usize,
    pub overlap: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            max_chunk_size: processor::DEFAULT_MAX_CHUNK_SIZE,
            overlap: processor::DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Outcome of a successful ingestion
#[derive(Debug, Serialize)]
pub struct IngestReport {
    /// Id of the logical source document (chunks reference it as parent)
    pub document_id: String,
    pub documents_added: usize,
    /// Ids of the indexed documents, in chunk order
    pub chunks: Vec<String>,
}

/// Search result projected for consumers
#[derive(Debug, Clone, Serialize)]
pub struct ContextHit {
    pub id: String,
    pub content: String,
    pub similarity: f64,
    pub metadata: DocumentMetadata,
    pub preview: String,
}

impl From<SearchHit> for ContextHit {
    fn from(hit: SearchHit) -> Self {
        let preview: String = hit
            .document
            .content
            .chars()
            .take(PREVIEW_LENGTH)
            .collect::<String>()
            + "...";
        Self {
            id: hit.document.id,
            content: hit.document.content,
            similarity: hit.similarity,
            metadata: hit.document.metadata,
            preview,
        }
    }
}

/// Citation entry for a document included in a contextual prompt
#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    pub id: String,
    pub file_name: String,
    pub similarity: f64,
}

/// LLM-ready prompt with retrieved context and its citation list
#[derive(Debug, Serialize)]
pub struct ContextualPrompt {
    pub prompt: String,
    pub has_context: bool,
    pub sources: Vec<SourceRef>,
}

/// One-line view of an indexed document for listings
#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub file_name: String,
    pub file_type: String,
    pub word_count: usize,
    pub is_chunk: bool,
    pub parent_id: Option<String>,
}

/// Orchestrates the document processor and the document store: ingestion
/// with duplicate rejection, query-time search, and contextual prompt
/// construction.
///
/// Holds the corpus behind a single read-write lock: mutations take the
/// write lock for the whole dedup-check/insert/rebuild/persist sequence,
/// searches take the read lock, so no reader ever observes a half-rebuilt
/// corpus. Construct one per corpus and share it behind an `Arc`.
pub struct RetrievalService {
    store: RwLock<DocumentStore>,
}

impl RetrievalService {
    pub fn new(storage: Storage) -> Self {
        Self {
            store: RwLock::new(DocumentStore::new(storage)),
        }
    }

    /// Validate, extract, fingerprint, chunk, and index an upload.
    ///
    /// Fails with `DuplicateDocument` when a stored document carries the
    /// same file name and the same content hash; the same name with changed
    /// content is an accepted re-upload. Everything fallible happens before
    /// the first store mutation, and all chunks of one upload are inserted
    /// under a single write-lock hold.
    pub fn add_document(
        &self,
        file_name: &str,
        raw: &[u8],
        options: &IngestOptions,
    ) -> Result<IngestReport> {
        processor::validate(file_name, raw.len() as u64)?;
        let document = processor::process_file(file_name, raw)?;
        let content_hash = fingerprint(&document.content);
        let chunks = processor::chunk_document(&document, options.max_chunk_size, options.overlap);

        let mut store = self.store.write().unwrap();
        if store.has_document(file_name, &content_hash) {
            return Err(RetrievalError::DuplicateDocument {
                file_name: file_name.to_string(),
            });
        }

        let mut ids = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let mut metadata = chunk.metadata;
            metadata.content_hash = Some(content_hash.clone());
            let added = store.add_document(chunk.id, chunk.content, metadata);
            ids.push(added.id);
        }

        tracing::info!(
            "indexed '{}' as {} document(s)",
            file_name,
            ids.len()
        );

        Ok(IngestReport {
            document_id: document.id,
            documents_added: ids.len(),
            chunks: ids,
        })
    }

    /// Ranked search over the corpus, projected into consumer-facing hits
    pub fn search_context(&self, query: &str, options: &SearchOptions) -> Vec<ContextHit> {
        let store = self.store.read().unwrap();
        store
            .search(query, options.top_k, options.threshold)
            .into_iter()
            .map(ContextHit::from)
            .collect()
    }

    /// Compose an LLM-ready prompt embedding retrieved context ahead of the
    /// user's question.
    ///
    /// Takes the top matches and greedily appends an excerpt of each until
    /// the next excerpt would push the accumulated context past
    /// `max_context_length`; the first overflowing document ends the scan,
    /// so `sources` is always a prefix of the ranked matches. With no usable
    /// context the original query comes back unmodified.
    pub fn generate_contextual_prompt(
        &self,
        query: &str,
        max_context_length: usize,
    ) -> ContextualPrompt {
        let hits = {
            let store = self.store.read().unwrap();
            store.search(query, CONTEXT_MATCHES, SearchOptions::default().threshold)
        };

        let mut pieces = Vec::new();
        let mut sources = Vec::new();
        let mut used = 0;

        for hit in &hits {
            let excerpt: String = hit.document.content.chars().take(EXCERPT_LENGTH).collect();
            let excerpt_length = excerpt.chars().count();
            if used + excerpt_length > max_context_length {
                break;
            }
            used += excerpt_length;
            pieces.push(format!(
                "[{}]\n{}",
                hit.document.metadata.file_name, excerpt
            ));
            sources.push(SourceRef {
                id: hit.document.id.clone(),
                file_name: hit.document.metadata.file_name.clone(),
                similarity: hit.similarity,
            });
        }

        if sources.is_empty() {
            return ContextualPrompt {
                prompt: query.to_string(),
                has_context: false,
                sources,
            };
        }

        let context = pieces.join("\n\n");
        let prompt = format!(
            "Use the following context to answer the question.\n\n\
             Context:\n{}\n\n\
             Question: {}\n\n\
             Answer based on the context above. If the context does not \
             contain the answer, say so.",
            context, query
        );

        ContextualPrompt {
            prompt,
            has_context: true,
            sources,
        }
    }

    /// Remove one indexed document; false when the id is unknown
    pub fn remove_document(&self, id: &str) -> bool {
        self.store.write().unwrap().remove_document(id)
    }

    /// Drop the whole knowledge base
    pub fn clear(&self) {
        self.store.write().unwrap().clear();
    }

    pub fn stats(&self) -> StoreStats {
        self.store.read().unwrap().stats()
    }

    pub fn list_documents(&self) -> Vec<DocumentSummary> {
        let store = self.store.read().unwrap();
        store
            .documents()
            .iter()
            .map(|doc| DocumentSummary {
                id: doc.id.clone(),
                file_name: doc.metadata.file_name.clone(),
                file_type: doc.metadata.file_type.clone(),
                word_count: doc.metadata.word_count,
                is_chunk: doc.metadata.is_chunk(),
                parent_id: doc
                    .metadata
                    .chunk
                    .as_ref()
                    .map(|info| info.parent_id.clone()),
            })
            .collect()
    }
}

/// SHA-256 fingerprint of the whole extracted content, hex encoded
fn fingerprint(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}
