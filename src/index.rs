//! Content-addressed element store.
//!
//! Elements live in an append-only JSONL file, one record per line. The
//! only write operations are appending new records and rewriting the whole
//! file (clear, rebuild). Duplicate detection is by content hash, tracked
//! in an in-memory set that is reloaded from the file on init.
//!
//! Readers go straight to the file and never take the hash-set lock, so a
//! read that races a write may miss records appended after it started.

use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;
use tracing::{debug, warn};

use crate::element::{CodeElement, ElementKind};

/// Errors from store operations.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("index store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize element record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Aggregate statistics over the whole store.
#[derive(Debug, Default)]
pub struct IndexStats {
    /// Number of records in the store
    pub total_elements: usize,
    /// Record count per element kind
    pub by_kind: BTreeMap<ElementKind, usize>,
    /// Record count per language
    pub by_language: BTreeMap<String, usize>,
    /// Record count per file
    pub by_file: BTreeMap<String, usize>,
    /// Sum of body lengths in bytes
    pub total_body_bytes: u64,
}

/// Append-only JSONL element store with content-hash dedup.
pub struct ContentIndex {
    index_path: PathBuf,
    dedup: bool,
    seen: RwLock<HashSet<String>>,
}

impl ContentIndex {
    /// Create a handle on a store file. No I/O happens until [`init`]
    /// or one of the operations is called.
    ///
    /// [`init`]: ContentIndex::init
    pub fn new(index_path: impl Into<PathBuf>, dedup: bool) -> Self {
        Self {
            index_path: index_path.into(),
            dedup,
            seen: RwLock::new(HashSet::new()),
        }
    }

    /// Path of the underlying store file.
    pub fn path(&self) -> &Path {
        &self.index_path
    }

    /// Prepare the store for appending.
    ///
    /// Creates the parent directory and, when dedup is enabled, reloads
    /// the hashes of all existing records so duplicates are recognized
    /// across runs.
    pub fn init(&self) -> Result<(), IndexError> {
        if let Some(parent) = self.index_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if self.dedup {
            let existing = self.read_all()?;
            let mut seen = self.seen.write().unwrap();
            for element in existing {
                seen.insert(element.content_hash);
            }
            debug!("loaded {} known content hashes", seen.len());
        }
        Ok(())
    }

    /// Append a batch of elements, returning how many were written.
    ///
    /// With dedup enabled, elements whose content hash is already known
    /// are dropped; this also collapses duplicates within the batch
    /// itself. Hashes are recorded even when dedup is disabled so
    /// [`exists`] stays accurate.
    ///
    /// [`exists`]: ContentIndex::exists
    pub fn append(&self, elements: &[CodeElement]) -> Result<usize, IndexError> {
        let mut seen = self.seen.write().unwrap();

        let mut fresh = Vec::new();
        for element in elements {
            if self.dedup && seen.contains(&element.content_hash) {
                continue;
            }
            seen.insert(element.content_hash.clone());
            fresh.push(element);
        }

        if fresh.is_empty() {
            return Ok(0);
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.index_path)?;
        let mut writer = BufWriter::new(file);
        for element in &fresh {
            let json = serde_json::to_string(element)?;
            writeln!(writer, "{json}")?;
        }
        writer.flush()?;

        Ok(fresh.len())
    }

    /// Read every record in store order.
    ///
    /// A missing store file reads as empty. Malformed lines are skipped
    /// with a warning; one corrupt record never poisons the rest.
    pub fn read_all(&self) -> Result<Vec<CodeElement>, IndexError> {
        if !self.index_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.index_path)?;
        let reader = BufReader::new(file);
        let mut elements = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(element) => elements.push(element),
                Err(e) => warn!("skipping malformed record in {:?}: {e}", self.index_path),
            }
        }

        Ok(elements)
    }

    /// All records matching a predicate, in store order.
    pub fn search<P>(&self, predicate: P) -> Result<Vec<CodeElement>, IndexError>
    where
        P: Fn(&CodeElement) -> bool,
    {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|element| predicate(element))
            .collect())
    }

    /// Records with an exactly matching name.
    pub fn find_by_name(&self, name: &str) -> Result<Vec<CodeElement>, IndexError> {
        self.search(|element| element.name == name)
    }

    /// Records of one kind.
    pub fn find_by_kind(&self, kind: ElementKind) -> Result<Vec<CodeElement>, IndexError> {
        self.search(|element| element.kind == kind)
    }

    /// Records extracted from one file.
    pub fn find_by_file(&self, file: &str) -> Result<Vec<CodeElement>, IndexError> {
        self.search(|element| element.file == file)
    }

    /// Whether a content hash has been seen by this store.
    pub fn exists(&self, content_hash: &str) -> bool {
        self.seen.read().unwrap().contains(content_hash)
    }

    /// Aggregate statistics over all records.
    pub fn stats(&self) -> Result<IndexStats, IndexError> {
        let mut stats = IndexStats::default();
        for element in self.read_all()? {
            stats.total_elements += 1;
            *stats.by_kind.entry(element.kind).or_insert(0) += 1;
            *stats.by_language.entry(element.language).or_insert(0) += 1;
            *stats.by_file.entry(element.file).or_insert(0) += 1;
            stats.total_body_bytes += element.body.len() as u64;
        }
        Ok(stats)
    }

    /// Remove the store file and forget all known hashes.
    pub fn clear(&self) -> Result<(), IndexError> {
        let mut seen = self.seen.write().unwrap();
        seen.clear();
        if self.index_path.exists() {
            fs::remove_file(&self.index_path)?;
        }
        Ok(())
    }

    /// Rewrite the store keeping only the first record of each content
    /// hash, returning how many records survive.
    ///
    /// Collapses duplicates accumulated while dedup was disabled, and is
    /// idempotent: rebuilding an already-unique store changes nothing but
    /// timestamps on the file.
    pub fn rebuild(&self) -> Result<usize, IndexError> {
        let elements = self.read_all()?;

        let mut kept_hashes = HashSet::new();
        let mut unique = Vec::new();
        for element in elements {
            if kept_hashes.insert(element.content_hash.clone()) {
                unique.push(element);
            }
        }

        self.clear()?;
        self.init()?;
        self.append(&unique)
    }
}
