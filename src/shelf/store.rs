//! Durable persistence of the shelf collection.
//!
//! One serialized document, fully overwritten on every save and read
//! once at startup. A crash between a mutation and its save silently
//! reverts to the last saved state on next load — the tracker treats
//! saves as best-effort. No incremental updates, no schema migration.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config;
use crate::models::Book;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Save rejected")]
    SaveRejected,
}

/// Where the shelf collection is loaded from and saved to.
pub trait ShelfStore: Send + Sync {
    fn load(&self) -> Result<Vec<Book>, StoreError>;
    fn save(&self, books: &[Book]) -> Result<(), StoreError>;
}

/// Single-file JSON store.
///
/// Writes go to a sibling temp file first and land with a rename, so
/// a crash mid-write leaves the previous collection intact rather
/// than a truncated file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform default location ([`config::shelf_file`]).
    pub fn default_location() -> Self {
        Self::new(config::shelf_file())
    }
}

impl ShelfStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Book>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, books: &[Book]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(books)?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory store for tests.
///
/// Can be switched to reject every save, to exercise the tracker's
/// best-effort persistence policy.
#[derive(Default)]
pub struct MemoryStore {
    books: Mutex<Vec<Book>>,
    fail_saves: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_books(books: Vec<Book>) -> Self {
        Self {
            books: Mutex::new(books),
            fail_saves: AtomicBool::new(false),
        }
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// The collection as last saved.
    pub fn saved(&self) -> Vec<Book> {
        lock(&self.books).clone()
    }
}

impl ShelfStore for MemoryStore {
    fn load(&self) -> Result<Vec<Book>, StoreError> {
        Ok(lock(&self.books).clone())
    }

    fn save(&self, books: &[Book]) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::SaveRejected);
        }
        *lock(&self.books) = books.to_vec();
        Ok(())
    }
}
