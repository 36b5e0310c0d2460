use crate::document::{ChunkInfo, DocumentMetadata};
use crate::error::{Result, RetrievalError};
use chrono::Utc;
use std::path::Path;
use uuid::Uuid;

/// Upload size ceiling: 10 MiB
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Extensions the processor knows how to decode
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md"];

pub const DEFAULT_MAX_CHUNK_SIZE: usize = 500;
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Extracted text plus metadata, not yet indexed
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub id: String,
    pub content: String,
    pub metadata: DocumentMetadata,
}

fn extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Pure validation; runs before anything touches the corpus
pub fn validate(file_name: &str, size: u64) -> Result<()> {
    let ext = extension(file_name);
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(RetrievalError::UnsupportedFileType { extension: ext });
    }
    if size > MAX_FILE_SIZE {
        return Err(RetrievalError::FileTooLarge {
            size,
            limit: MAX_FILE_SIZE,
        });
    }
    Ok(())
}

/// Decode an upload and attach a fresh id and metadata. Both supported kinds
/// decode as UTF-8 text today; the dispatch is where a new format would
/// slot in.
pub fn process_file(file_name: &str, raw: &[u8]) -> Result<ProcessedDocument> {
    let ext = extension(file_name);
    let content = match ext.as_str() {
        "txt" | "md" => String::from_utf8_lossy(raw).into_owned(),
        _ => return Err(RetrievalError::UnsupportedFileType { extension: ext }),
    };

    let word_count = content.split_whitespace().count();
    Ok(ProcessedDocument {
        id: Uuid::new_v4().to_string(),
        content,
        metadata: DocumentMetadata {
            file_name: file_name.to_string(),
            file_type: ext,
            size: raw.len() as u64,
            word_count,
            processed_at: Some(Utc::now()),
            ..Default::default()
        },
    })
}

/// Split a long document into overlapping word windows of `max_chunk_size`
/// words, advancing by `max_chunk_size - overlap` each step. Documents at or
/// under the window size pass through unchanged. The loop ends when a window
/// reaches the end of the word stream, or immediately if the start index
/// cannot advance (`overlap >= max_chunk_size`).
pub fn chunk_document(
    document: &ProcessedDocument,
    max_chunk_size: usize,
    overlap: usize,
) -> Vec<ProcessedDocument> {
    let words: Vec<&str> = document.content.split_whitespace().collect();
    if max_chunk_size == 0 || words.len() <= max_chunk_size {
        return vec![document.clone()];
    }

    let step = max_chunk_size.saturating_sub(overlap);
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + max_chunk_size).min(words.len());
        let content = words[start..end].join(" ");
        let chunk_index = chunks.len();

        let mut metadata = document.metadata.clone();
        metadata.size = content.len() as u64;
        metadata.word_count = end - start;
        metadata.chunk = Some(ChunkInfo {
            parent_id: document.id.clone(),
            chunk_index,
            start_index: start,
            end_index: end,
        });

        chunks.push(ProcessedDocument {
            id: format!("{}_chunk_{}", document.id, chunk_index),
            content,
            metadata,
        });

        if end >= words.len() || step == 0 {
            break;
        }
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processed(content: &str) -> ProcessedDocument {
        process_file("sample.txt", content.as_bytes()).expect("process")
    }

    #[test]
    fn test_validate_accepts_supported_extensions() {
        assert!(validate("notes.txt", 10).is_ok());
        assert!(validate("README.md", 10).is_ok());
        assert!(validate("NOTES.TXT", 10).is_ok());
    }

    #[test]
    fn test_validate_rejects_unsupported_extension() {
        let err = validate("report.pdf", 10).unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::UnsupportedFileType { extension } if extension == "pdf"
        ));
    }

    #[test]
    fn test_validate_rejects_missing_extension() {
        assert!(validate("Makefile", 10).is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_file() {
        let err = validate("big.txt", MAX_FILE_SIZE + 1).unwrap_err();
        assert!(matches!(err, RetrievalError::FileTooLarge { .. }));
    }

    #[test]
    fn test_process_file_populates_metadata() {
        let doc = processed("hello knowledge base");
        assert!(!doc.id.is_empty());
        assert_eq!(doc.metadata.file_name, "sample.txt");
        assert_eq!(doc.metadata.file_type, "txt");
        assert_eq!(doc.metadata.word_count, 3);
        assert_eq!(doc.metadata.size, 20);
        assert!(doc.metadata.processed_at.is_some());
        assert!(!doc.metadata.is_chunk());
    }

    #[test]
    fn test_short_document_is_not_chunked() {
        let doc = processed("short enough already");
        let chunks = chunk_document(&doc, 10, 2);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, doc.id);
        assert_eq!(chunks[0].content, doc.content);
        assert!(!chunks[0].metadata.is_chunk());
    }

    #[test]
    fn test_chunk_windows_overlap() {
        let doc = processed("a b c d e");
        let chunks = chunk_document(&doc, 3, 1);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "a b c");
        assert_eq!(chunks[1].content, "c d e");
        assert_eq!(chunks[0].id, format!("{}_chunk_0", doc.id));
        assert_eq!(chunks[1].id, format!("{}_chunk_1", doc.id));
    }

    #[test]
    fn test_chunk_metadata() {
        let doc = processed("a b c d e");
        let chunks = chunk_document(&doc, 3, 1);

        let info = chunks[1].metadata.chunk.as_ref().expect("chunk info");
        assert_eq!(info.parent_id, doc.id);
        assert_eq!(info.chunk_index, 1);
        assert_eq!(info.start_index, 2);
        assert_eq!(info.end_index, 5);
        assert_eq!(chunks[1].metadata.word_count, 3);
        assert_eq!(chunks[1].metadata.file_name, "sample.txt");
    }

    #[test]
    fn test_chunk_count_law() {
        // ceil((W - O) / (M - O)) chunks for W words over the window size
        let cases = [(12, 5, 2, 4), (6, 3, 1, 3), (7, 3, 1, 3), (100, 10, 0, 10)];
        for (w, m, o, expected) in cases {
            let content = (0..w).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
            let doc = processed(&content);
            let chunks = chunk_document(&doc, m, o);
            assert_eq!(chunks.len(), expected, "W={} M={} O={}", w, m, o);
        }
    }

    #[test]
    fn test_chunking_terminates_when_overlap_exceeds_window() {
        let content = (0..20).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let doc = processed(&content);
        // A non-advancing window must stop after the first chunk
        let chunks = chunk_document(&doc, 3, 5);
        assert_eq!(chunks.len(), 1);
    }
}
