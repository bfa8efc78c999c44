//! shelfscan — client-side core of an ebook shelf.
//!
//! Users add PDF files; the crate uploads them to remote object storage
//! through signed URLs, triggers remote OCR, polls for the extracted
//! text, and offers generative summarization and concept extraction
//! over the result. Each book moves through a small lifecycle
//! (new → uploading → processing → ready/failed) tracked by [`Shelf`]
//! and persisted after every change.
//!
//! All remote work goes through the [`RemoteServices`] facade, which
//! has a real HTTP implementation ([`remote::HttpRemoteServices`]) and
//! a scriptable mock ([`remote::MockRemoteServices`]) for tests.
//!
//! ```no_run
//! use std::sync::Arc;
//! use shelfscan::config::RemoteConfig;
//! use shelfscan::remote::HttpRemoteServices;
//! use shelfscan::shelf::store::JsonFileStore;
//! use shelfscan::Shelf;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RemoteConfig::new(
//!     "https://functions.example.com",
//!     "https://storage.example.com",
//! );
//! let user_id = config.auth.user_id().to_string();
//! let remote = Arc::new(HttpRemoteServices::new(config)?);
//! let store = Arc::new(JsonFileStore::default_location());
//! let shelf = Shelf::load(remote, store, user_id);
//!
//! let id = shelf.add_book("/tmp/report.pdf", "report.pdf").await?;
//! let book = shelf.get(&id).expect("just added");
//! println!("{} is {}", book.display_name, book.status.as_str());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod models;
pub mod paths;
pub mod remote;
pub mod shelf;

pub use models::{Book, BookStatus};
pub use remote::{Concept, RemoteError, RemoteServices};
pub use shelf::{RefreshOutcome, Shelf, ShelfError};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries embedding the crate.
///
/// Respects `RUST_LOG`; falls back to [`config::default_log_filter`].
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
