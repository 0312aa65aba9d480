//! Author domain model.

use super::quote::QuoteId;
use super::ModelValidationError;
use serde::{Deserialize, Serialize};

/// Storage-assigned author key.
pub type AuthorId = i64;

/// Attributed source of one or more quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// `0` until the store assigns a key.
    pub id: AuthorId,
    pub name: String,
    /// Conventionally within `0.0..=5.0`; not enforced.
    pub rating: f64,
    /// Most recently authored quote, if any.
    ///
    /// Advisory only: set by `QuoteStore::insert_with_author_update` and never
    /// cleared when that quote is deleted, so it can point at a missing row.
    pub last_quote_id: Option<QuoteId>,
}

impl Author {
    /// Creates an unpersisted author with no last quote.
    pub fn new(name: impl Into<String>, rating: f64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            rating,
            last_quote_id: None,
        }
    }

    /// Checks write-time invariants.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.name.trim().is_empty() {
            return Err(ModelValidationError::EmptyAuthorName);
        }
        Ok(())
    }

    /// Case-insensitive name comparison on the trimmed candidate.
    pub fn name_matches(&self, candidate: &str) -> bool {
        self.name.to_lowercase() == candidate.trim().to_lowercase()
    }
}
