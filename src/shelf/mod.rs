//! Document lifecycle tracker.
//!
//! Owns the tracked collection and drives each book through
//! new → uploading → processing → ready/failed. Remote failures during
//! a pipeline are folded into the owning book's state, never thrown at
//! the caller; the collection is persisted after every mutation.

pub mod store;

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::models::{Book, BookStatus};
use crate::paths;
use crate::remote::{Concept, RemoteError, RemoteServices};

use store::ShelfStore;

/// Errors returned by user-initiated shelf operations.
///
/// Pipeline-internal failures never appear here — they end up in the
/// owning book's `status`/`error_message` instead.
#[derive(Debug, thiserror::Error)]
pub enum ShelfError {
    #[error("No book with id '{0}'")]
    NotFound(String),

    #[error("Only PDF files can be added (got '{0}')")]
    NotAPdf(String),

    #[error("Book '{id}' is in the wrong state: {reason}")]
    InvalidState { id: String, reason: String },

    #[error("Another operation is already running for book '{0}'")]
    OperationInFlight(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Outcome of a status refresh on a processing book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Extracted text arrived and the book is now ready.
    Ready,
    /// The batch has not finished; try again later.
    NotYet,
}

/// The lifecycle tracker.
///
/// Single writer for every tracked book. All async operations release
/// the collection lock before suspending, so pipelines for different
/// books interleave freely; a per-book in-flight set keeps at most one
/// outstanding pipeline or refresh per id.
pub struct Shelf {
    remote: Arc<dyn RemoteServices>,
    store: Arc<dyn ShelfStore>,
    user_id: String,
    books: Mutex<Vec<Book>>,
    in_flight: Mutex<HashSet<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Disambiguate an id candidate against the existing collection.
///
/// Two same-named files added in the same millisecond would otherwise
/// collide; ids must stay unique at all times.
fn unique_id(existing: &[Book], candidate: String) -> String {
    if !existing.iter().any(|b| b.id == candidate) {
        return candidate;
    }
    let mut n = 1;
    loop {
        let attempt = format!("{candidate}-{n}");
        if !existing.iter().any(|b| b.id == attempt) {
            return attempt;
        }
        n += 1;
    }
}

impl Shelf {
    /// Load the persisted collection and build a tracker over it.
    ///
    /// `user_id` must match the identity the facade authenticates as;
    /// it feeds the derived storage paths. A load failure starts the
    /// shelf empty rather than failing startup.
    pub fn load(
        remote: Arc<dyn RemoteServices>,
        store: Arc<dyn ShelfStore>,
        user_id: impl Into<String>,
    ) -> Self {
        let books = store.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not load persisted shelf; starting empty");
            Vec::new()
        });
        for book in &books {
            if let Err(e) = book.validate() {
                tracing::warn!(error = %e, "Persisted book violates an invariant");
            }
        }

        Self {
            remote,
            store,
            user_id: user_id.into(),
            books: Mutex::new(books),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    // ── Accessors ───────────────────────────────────────────

    /// Snapshot of the tracked collection.
    pub fn books(&self) -> Vec<Book> {
        lock(&self.books).clone()
    }

    pub fn get(&self, id: &str) -> Option<Book> {
        lock(&self.books).iter().find(|b| b.id == id).cloned()
    }

    // ── Lifecycle operations ────────────────────────────────

    /// Add a freshly selected file and run its upload pipeline.
    ///
    /// The returned id is the only confirmation. Pipeline failures are
    /// captured in the book's own state and never returned here; only
    /// rejection of the input itself is an error.
    pub async fn add_book(
        &self,
        source_location: &str,
        display_name: &str,
    ) -> Result<String, ShelfError> {
        if !display_name.to_ascii_lowercase().ends_with(".pdf") {
            return Err(ShelfError::NotAPdf(display_name.to_string()));
        }

        let mut book = Book::new(source_location, display_name);
        let id = {
            let mut books = lock(&self.books);
            book.id = unique_id(&books, book.id);
            let id = book.id.clone();
            books.push(book);
            id
        };
        self.persist();
        tracing::info!(book_id = %id, file = %display_name, "Book added");

        self.begin_operation(&id)?;
        self.run_upload_pipeline(&id).await;
        self.end_operation(&id);
        Ok(id)
    }

    /// Ask whether OCR output for a processing book has arrived.
    ///
    /// `NotYet` leaves the book untouched. A genuine remote failure is
    /// a different outcome entirely: the book is marked failed and the
    /// error also surfaces to the caller.
    pub async fn refresh_status(&self, id: &str) -> Result<RefreshOutcome, ShelfError> {
        let book = self
            .get(id)
            .ok_or_else(|| ShelfError::NotFound(id.to_string()))?;
        if book.status != BookStatus::Processing {
            return Err(ShelfError::InvalidState {
                id: id.to_string(),
                reason: format!("status is {}, expected processing", book.status.as_str()),
            });
        }
        let Some(upload_path) = book.remote_upload_path else {
            // A processing book always carries its upload path; a
            // missing one means the persisted state was edited by hand.
            return Err(ShelfError::InvalidState {
                id: id.to_string(),
                reason: "missing upload path".to_string(),
            });
        };

        self.begin_operation(id)?;
        let outcome = self.poll_once(id, &upload_path).await;
        self.end_operation(id);
        outcome
    }

    /// Remove a book unconditionally, whatever its state.
    ///
    /// An in-flight pipeline for this id becomes a no-op on its next
    /// write-back; the entry never reappears.
    pub fn delete_book(&self, id: &str) -> Result<(), ShelfError> {
        let removed = {
            let mut books = lock(&self.books);
            let before = books.len();
            books.retain(|b| b.id != id);
            books.len() != before
        };
        if !removed {
            return Err(ShelfError::NotFound(id.to_string()));
        }
        self.persist();
        tracing::info!(book_id = %id, "Book deleted");
        Ok(())
    }

    // ── Reading aids ────────────────────────────────────────

    /// Summarize a ready book's text. Remote errors surface to the
    /// caller as displayable messages; the book is not mutated.
    pub async fn summarize(&self, id: &str) -> Result<String, ShelfError> {
        let text = self.ready_text(id)?;
        Ok(self.remote.summarize(&text).await?)
    }

    /// Extract key concepts from a ready book's text.
    pub async fn extract_concepts(&self, id: &str) -> Result<Vec<Concept>, ShelfError> {
        let text = self.ready_text(id)?;
        Ok(self.remote.extract_concepts(&text).await?)
    }

    fn ready_text(&self, id: &str) -> Result<String, ShelfError> {
        let book = self
            .get(id)
            .ok_or_else(|| ShelfError::NotFound(id.to_string()))?;
        match (book.status, book.extracted_text) {
            (BookStatus::Ready, Some(text)) => Ok(text),
            (status, _) => Err(ShelfError::InvalidState {
                id: id.to_string(),
                reason: format!("status is {}, expected ready", status.as_str()),
            }),
        }
    }

    // ── Pipeline internals ──────────────────────────────────

    /// Drive one book from `new` to `processing`, or to `failed` on
    /// the first error.
    async fn run_upload_pipeline(&self, id: &str) {
        let Some(book) = self.get(id) else { return };
        let upload_path = paths::upload_path(&self.user_id, &book.display_name);

        if let Err(e) = self
            .upload_steps(id, &book.display_name, &book.source_location, &upload_path)
            .await
        {
            tracing::warn!(book_id = %id, error = %e, "Upload pipeline failed");
            self.fail_book(id, &upload_path, e.to_string());
        }
    }

    /// The fallible steps: destination, transfer, trigger.
    async fn upload_steps(
        &self,
        id: &str,
        display_name: &str,
        source_location: &str,
        upload_path: &str,
    ) -> Result<(), RemoteError> {
        let content_type = mime_guess::from_path(display_name)
            .first_or_octet_stream()
            .to_string();

        let destination = self
            .remote
            .request_upload_destination(display_name, &content_type)
            .await?;

        // The book leaves `new` here: status and upload path together.
        self.update_book(id, |b| {
            b.status = BookStatus::Uploading;
            b.remote_upload_path = Some(upload_path.to_string());
        });

        self.remote
            .transfer_file(&destination, source_location, &content_type)
            .await?;

        self.remote.trigger_processing(upload_path).await?;

        let tracked = self.update_book(id, |b| {
            b.status = BookStatus::Processing;
        });
        if tracked {
            tracing::info!(book_id = %id, path = %upload_path, "Upload accepted; OCR running");
        }
        Ok(())
    }

    async fn poll_once(&self, id: &str, upload_path: &str) -> Result<RefreshOutcome, ShelfError> {
        let output_path = paths::ocr_output_path(upload_path);
        match self.remote.poll_extracted_text(&output_path).await {
            Ok(Some(text)) => {
                self.update_book(id, move |b| {
                    b.status = BookStatus::Ready;
                    b.error_message = None;
                    b.extracted_text = Some(text);
                });
                tracing::info!(book_id = %id, "OCR output arrived; book ready");
                Ok(RefreshOutcome::Ready)
            }
            Ok(None) => Ok(RefreshOutcome::NotYet),
            Err(e) => {
                // A transport or endpoint failure is not "not ready":
                // the book records it and the caller sees it too.
                self.update_book(id, |b| {
                    b.status = BookStatus::Failed;
                    b.extracted_text = None;
                    b.error_message = Some(e.to_string());
                });
                Err(ShelfError::Remote(e))
            }
        }
    }

    /// Fold a pipeline failure into the book's state.
    ///
    /// Also stamps the derived upload path if the failure happened
    /// before the book ever left `new`, keeping the path invariant.
    fn fail_book(&self, id: &str, upload_path: &str, message: String) {
        self.update_book(id, |b| {
            if b.remote_upload_path.is_none() {
                b.remote_upload_path = Some(upload_path.to_string());
            }
            b.status = BookStatus::Failed;
            b.extracted_text = None;
            b.error_message = Some(message);
        });
    }

    /// Apply a mutation to a tracked book and persist the collection.
    ///
    /// Returns false without persisting when the id is gone — a
    /// deleted book must not be resurrected by an in-flight pipeline.
    fn update_book(&self, id: &str, mutate: impl FnOnce(&mut Book)) -> bool {
        let found = {
            let mut books = lock(&self.books);
            match books.iter_mut().find(|b| b.id == id) {
                Some(book) => {
                    mutate(book);
                    true
                }
                None => false,
            }
        };
        if found {
            self.persist();
        }
        found
    }

    /// Write the whole collection through the store, best-effort.
    fn persist(&self) {
        let snapshot = lock(&self.books).clone();
        if let Err(e) = self.store.save(&snapshot) {
            tracing::warn!(error = %e, "Could not persist shelf");
        }
    }

    // ── Per-book operation slot ─────────────────────────────

    fn begin_operation(&self, id: &str) -> Result<(), ShelfError> {
        let mut in_flight = lock(&self.in_flight);
        if !in_flight.insert(id.to_string()) {
            return Err(ShelfError::OperationInFlight(id.to_string()));
        }
        Ok(())
    }

    fn end_operation(&self, id: &str) {
        lock(&self.in_flight).remove(id);
    }
}
