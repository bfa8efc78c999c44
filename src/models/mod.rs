pub mod book;
pub mod enums;

pub use book::Book;
pub use enums::BookStatus;

/// Errors from model-level parsing and validation.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid value '{value}' for {field}")]
    InvalidEnum { field: String, value: String },

    #[error("Book {id} violates the {rule} invariant")]
    InvariantViolation { id: String, rule: &'static str },
}
