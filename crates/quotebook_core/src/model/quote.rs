//! Quote domain model.
//!
//! # Invariants
//! - `read_time` is derived once from content at creation time and is never
//!   recomputed by updates.

use super::author::AuthorId;
use super::ModelValidationError;
use serde::{Deserialize, Serialize};

/// Storage-assigned quote key.
pub type QuoteId = i64;

/// Number of content characters counted as one read-time unit.
pub const CHARS_PER_READ_TIME_UNIT: usize = 10;

/// One captured quotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// `0` until the store assigns a key.
    pub id: QuoteId,
    pub author_id: AuthorId,
    /// Short title/caption.
    pub header: String,
    /// Quotation body.
    pub content: String,
    pub rating: f64,
    /// Estimated reading time, see [`compute_read_time`].
    pub read_time: i64,
}

impl Quote {
    /// Creates an unpersisted quote from raw user input.
    ///
    /// Header and content are trimmed; `read_time` is computed from the
    /// trimmed content.
    pub fn new(
        author_id: AuthorId,
        header: impl AsRef<str>,
        content: impl AsRef<str>,
        rating: f64,
    ) -> Self {
        let content = content.as_ref().trim().to_string();
        let read_time = compute_read_time(&content);
        Self {
            id: 0,
            author_id,
            header: header.as_ref().trim().to_string(),
            content,
            rating,
            read_time,
        }
    }

    /// Checks write-time invariants.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.author_id <= 0 {
            return Err(ModelValidationError::MissingAuthor);
        }
        self.validate_text()
    }

    /// Checks header/content only; usable before the author is resolved.
    pub fn validate_text(&self) -> Result<(), ModelValidationError> {
        if self.header.trim().is_empty() {
            return Err(ModelValidationError::EmptyHeader);
        }
        if self.content.trim().is_empty() {
            return Err(ModelValidationError::EmptyContent);
        }
        Ok(())
    }
}

/// Read-time units for `content`: trimmed character count divided by
/// [`CHARS_PER_READ_TIME_UNIT`], rounded down.
///
/// Characters are Unicode scalar values, so an emoji outside the BMP counts
/// once, not as two UTF-16 code units.
pub fn compute_read_time(content: &str) -> i64 {
    let chars = content.trim().chars().count() / CHARS_PER_READ_TIME_UNIT;
    i64::try_from(chars).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::{compute_read_time, Quote};

    #[test]
    fn read_time_uses_integer_division_of_trimmed_length() {
        assert_eq!(compute_read_time(""), 0);
        assert_eq!(compute_read_time("123456789"), 0);
        assert_eq!(compute_read_time("   1234567890   "), 1);
        assert_eq!(compute_read_time(&"x".repeat(57)), 5);
    }

    #[test]
    fn read_time_counts_characters_not_bytes() {
        assert_eq!(compute_read_time(&"é".repeat(10)), 1);
        assert_eq!(compute_read_time(&"😀".repeat(10)), 1);
        assert_eq!(compute_read_time(&"😀".repeat(9)), 0);
    }

    #[test]
    fn new_quote_trims_input_and_derives_read_time() {
        let quote = Quote::new(3, "  Title ", "  abcdefghijklmnopqrst  ", 4.5);
        assert_eq!(quote.id, 0);
        assert_eq!(quote.header, "Title");
        assert_eq!(quote.content, "abcdefghijklmnopqrst");
        assert_eq!(quote.read_time, 2);
    }

    #[test]
    fn validate_rejects_blank_fields_and_missing_author() {
        assert!(Quote::new(0, "h", "c", 0.0).validate().is_err());
        assert!(Quote::new(1, "  ", "c", 0.0).validate().is_err());
        assert!(Quote::new(1, "h", "\n", 0.0).validate().is_err());
        assert!(Quote::new(1, "h", "c", 0.0).validate().is_ok());
        assert!(Quote::new(0, "h", "c", 0.0).validate_text().is_ok());
    }
}
