use crate::document::{Document, DocumentMetadata};
use crate::ranking;
use crate::storage::{CorpusSnapshot, Storage};
use crate::tokenizer::Tokenizer;
use chrono::Utc;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One ranked search hit
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub document: Document,
    pub similarity: f64,
}

/// Corpus-level statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total_documents: usize,
    pub total_words: usize,
    pub average_words_per_document: usize,
}

/// In-memory corpus of indexed documents plus the derived vocabulary and IDF
/// table. Owns all mutation and similarity search, and writes a snapshot
/// through `Storage` after every mutating operation.
///
/// Not internally synchronized; the retrieval service serializes access with
/// a single read-write lock.
pub struct DocumentStore {
    documents: Vec<Document>,
    vocabulary: HashSet<String>,
    idf: HashMap<String, f64>,
    tokenizer: Tokenizer,
    storage: Storage,
}

impl DocumentStore {
    /// Load the persisted corpus once at construction; any load problem
    /// falls back to an empty corpus.
    pub fn new(storage: Storage) -> Self {
        let snapshot = storage.load();
        Self {
            documents: snapshot.documents,
            vocabulary: snapshot.vocabulary.into_iter().collect(),
            idf: snapshot.idf,
            tokenizer: Tokenizer::new(),
            storage,
        }
    }

    /// Index a document: normalize, record term frequencies, grow the
    /// vocabulary, then rebuild IDF and every vector before persisting.
    ///
    /// Callers are responsible for not issuing duplicate ids.
    pub fn add_document(
        &mut self,
        id: String,
        content: String,
        mut metadata: DocumentMetadata,
    ) -> Document {
        let words = self.tokenizer.analyze(&content);
        let term_frequency = ranking::term_frequency(&words);
        self.vocabulary.extend(words.iter().cloned());
        metadata.added_at = Some(Utc::now());

        let index = self.documents.len();
        self.documents.push(Document {
            id,
            original_content: content.clone(),
            content,
            words,
            term_frequency,
            vector: HashMap::new(),
            metadata,
        });

        self.rebuild();
        self.persist();
        self.documents[index].clone()
    }

    /// Remove a document by id. Absence is not an error; the return value
    /// says whether a removal occurred.
    pub fn remove_document(&mut self, id: &str) -> bool {
        let before = self.documents.len();
        self.documents.retain(|doc| doc.id != id);
        if self.documents.len() == before {
            return false;
        }

        // Vocabulary is rebuilt from scratch so words living only in the
        // removed document drop out.
        self.vocabulary = self
            .documents
            .iter()
            .flat_map(|doc| doc.words.iter().cloned())
            .collect();

        self.rebuild();
        self.persist();
        true
    }

    /// Rank every document by cosine similarity against the query's TF-IDF
    /// vector, keep scores above `threshold`, and return the best `top_k`.
    /// Ties keep insertion order.
    pub fn search(&self, query: &str, top_k: usize, threshold: f64) -> Vec<SearchHit> {
        if self.documents.is_empty() {
            return Vec::new();
        }

        let query_words = self.tokenizer.analyze(query);
        let query_tf = ranking::term_frequency(&query_words);
        let query_vector = ranking::tfidf_vector(&query_tf, &self.idf);

        let mut hits: Vec<SearchHit> = self
            .documents
            .iter()
            .map(|doc| SearchHit {
                similarity: ranking::cosine_similarity(&query_vector, &doc.vector),
                document: doc.clone(),
            })
            .filter(|hit| hit.similarity > threshold)
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);
        hits
    }

    /// Empty the corpus and persist the empty state
    pub fn clear(&mut self) {
        self.documents.clear();
        self.vocabulary.clear();
        self.idf.clear();
        self.persist();
    }

    pub fn stats(&self) -> StoreStats {
        let total_documents = self.documents.len();
        let total_words: usize = self
            .documents
            .iter()
            .map(|doc| doc.metadata.word_count)
            .sum();
        let average_words_per_document = if total_documents == 0 {
            0
        } else {
            (total_words as f64 / total_documents as f64).round() as usize
        };

        StoreStats {
            total_documents,
            total_words,
            average_words_per_document,
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// True if a document with this file name and content fingerprint is
    /// already indexed
    pub fn has_document(&self, file_name: &str, content_hash: &str) -> bool {
        self.documents.iter().any(|doc| {
            doc.metadata.file_name == file_name
                && doc.metadata.content_hash.as_deref() == Some(content_hash)
        })
    }

    /// Recompute IDF and every document vector from the current corpus.
    /// Runs on every mutation; no search is served between a mutation and
    /// this rebuild, so readers never observe stale vectors.
    fn rebuild(&mut self) {
        self.idf = ranking::inverse_document_frequency(&self.documents, &self.vocabulary);
        for doc in &mut self.documents {
            doc.vector = ranking::tfidf_vector(&doc.term_frequency, &self.idf);
        }
    }

    /// Write-through is best effort: a failed write is logged and the
    /// in-memory mutation stands.
    fn persist(&self) {
        let mut vocabulary: Vec<String> = self.vocabulary.iter().cloned().collect();
        vocabulary.sort();

        let snapshot = CorpusSnapshot {
            documents: self.documents.clone(),
            vocabulary,
            idf: self.idf.clone(),
        };

        if let Err(e) = self.storage.save(&snapshot) {
            tracing::error!("failed to persist corpus snapshot: {}", e);
        }
    }
}
