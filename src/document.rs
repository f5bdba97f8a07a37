//! Document input records.
//!
//! Tokenization and normalization happen upstream; a [`Document`] carries
//! the stable identifier and the ordered, already-normalized token sequence
//! the index builder consumes.

use serde::{Deserialize, Serialize};

/// A stable document identifier. IDs may be non-contiguous and unsorted.
pub type DocId = u64;

/// A preprocessed document: an identifier plus its normalized tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// The unique, stable document identifier.
    pub id: DocId,
    /// The ordered token sequence. Never mutated after index construction.
    pub tokens: Vec<String>,
}

impl Document {
    /// Create a new document from an id and its tokens.
    pub fn new<I, S>(id: DocId, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Document {
            id,
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// The number of tokens in this document.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether this document has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
