//! Domain records for authors and their quotes.
//!
//! # Responsibility
//! - Define the canonical records returned by stores and the facade.
//! - Own record-level validation and the read-time derivation.
//!
//! # Invariants
//! - Ids are assigned by storage; `0` means "not persisted yet".
//! - Every quote belongs to exactly one author.

pub mod author;
pub mod quote;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failures for author/quote records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    EmptyAuthorName,
    EmptyHeader,
    EmptyContent,
    /// `author_id` must point at a persisted author.
    MissingAuthor,
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyAuthorName => write!(f, "author name cannot be empty"),
            Self::EmptyHeader => write!(f, "quote header cannot be empty"),
            Self::EmptyContent => write!(f, "quote content cannot be empty"),
            Self::MissingAuthor => write!(f, "quote author_id must reference a persisted author"),
        }
    }
}

impl Error for ModelValidationError {}
