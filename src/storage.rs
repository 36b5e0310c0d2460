use crate::document::Document;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk shape of a corpus: one JSON file carrying every document plus the
/// derived vocabulary and IDF table
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CorpusSnapshot {
    pub documents: Vec<Document>,
    pub vocabulary: Vec<String>,
    pub idf: HashMap<String, f64>,
}

enum Backend {
    File(PathBuf),
    Memory,
}

/// Persistence adapter for a single corpus. Every mutating store operation
/// rewrites the whole snapshot through `save`.
pub struct Storage {
    backend: Backend,
}

impl Storage {
    /// File-backed storage at the given snapshot path
    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        Self {
            backend: Backend::File(path.as_ref().to_path_buf()),
        }
    }

    /// Persistence stub for tests: saves are dropped, loads are empty
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory,
        }
    }

    /// Rewrite the snapshot file in full
    pub fn save(&self, snapshot: &CorpusSnapshot) -> Result<()> {
        match &self.backend {
            Backend::Memory => Ok(()),
            Backend::File(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent)?;
                    }
                }
                let json = serde_json::to_string_pretty(snapshot)?;
                fs::write(path, json)?;
                Ok(())
            }
        }
    }

    /// Load the persisted corpus. Never fails: a missing file is an empty
    /// corpus and a malformed file is logged and discarded.
    pub fn load(&self) -> CorpusSnapshot {
        let path = match &self.backend {
            Backend::Memory => return CorpusSnapshot::default(),
            Backend::File(path) => path,
        };

        if !path.exists() {
            return CorpusSnapshot::default();
        }

        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(
                    "could not read corpus file {}, starting empty: {}",
                    path.display(),
                    e
                );
                return CorpusSnapshot::default();
            }
        };

        match serde_json::from_str(&json) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    "corpus file {} is malformed, starting empty: {}",
                    path.display(),
                    e
                );
                CorpusSnapshot::default()
            }
        }
    }
}
