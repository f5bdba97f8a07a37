//! Semantic similarity from precomputed embedding vectors.
//!
//! Embedding computation itself lives outside the engine; this module only
//! consumes vectors an external collaborator supplied ahead of time;
//! scoring is plain cosine similarity.

use ahash::AHashMap;

use crate::document::DocId;
use crate::error::{CallunaError, Result};

/// Source of embedding vectors for the ranker's semantic signal.
pub trait SemanticProvider: Send + Sync {
    /// The precomputed vector for a document, if one exists.
    fn document_vector(&self, doc_id: DocId) -> Option<&[f32]>;

    /// A vector representing the query tokens, if one can be derived.
    fn query_vector(&self, tokens: &[String]) -> Option<Vec<f32>>;
}

/// A [`SemanticProvider`] backed by precomputed document and word vectors.
///
/// The query vector is the mean of the vectors of its in-vocabulary
/// tokens; a query with no known tokens has no vector, and the ranker
/// then skips the semantic refinement entirely.
#[derive(Debug, Default)]
pub struct PrecomputedVectors {
    doc_vectors: AHashMap<DocId, Vec<f32>>,
    word_vectors: AHashMap<String, Vec<f32>>,
    dim: Option<usize>,
}

impl PrecomputedVectors {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the precomputed vector for a document.
    pub fn insert_document_vector(&mut self, doc_id: DocId, vector: Vec<f32>) -> Result<()> {
        self.check_dim(vector.len())?;
        self.doc_vectors.insert(doc_id, vector);
        Ok(())
    }

    /// Register the vector for a vocabulary word (used for query vectors).
    pub fn insert_word_vector<S: Into<String>>(&mut self, word: S, vector: Vec<f32>) -> Result<()> {
        self.check_dim(vector.len())?;
        self.word_vectors.insert(word.into(), vector);
        Ok(())
    }

    fn check_dim(&mut self, len: usize) -> Result<()> {
        match self.dim {
            None => {
                self.dim = Some(len);
                Ok(())
            }
            Some(dim) if dim == len => Ok(()),
            Some(dim) => Err(CallunaError::invalid_argument(format!(
                "vector dimension mismatch: expected {dim}, got {len}"
            ))),
        }
    }
}

impl SemanticProvider for PrecomputedVectors {
    fn document_vector(&self, doc_id: DocId) -> Option<&[f32]> {
        self.doc_vectors.get(&doc_id).map(Vec::as_slice)
    }

    fn query_vector(&self, tokens: &[String]) -> Option<Vec<f32>> {
        let dim = self.dim?;
        let mut sum = vec![0.0f32; dim];
        let mut known = 0usize;
        for token in tokens {
            if let Some(vector) = self.word_vectors.get(token) {
                for (acc, v) in sum.iter_mut().zip(vector) {
                    *acc += v;
                }
                known += 1;
            }
        }
        if known == 0 {
            return None;
        }
        for v in &mut sum {
            *v /= known as f32;
        }
        Some(sum)
    }
}

/// Cosine similarity of two vectors; 0 for mismatched dimensions or a
/// zero-norm operand.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        dot += f64::from(x) * f64::from(y);
        norm_a += f64::from(x) * f64::from(x);
        norm_b += f64::from(y) * f64::from(y);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-12);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-12);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_query_vector_is_mean_of_known_tokens() {
        let mut provider = PrecomputedVectors::new();
        provider.insert_word_vector("a", vec![1.0, 0.0]).unwrap();
        provider.insert_word_vector("b", vec![0.0, 1.0]).unwrap();

        let tokens: Vec<String> = ["a", "b", "unknown"].iter().map(|s| s.to_string()).collect();
        let vector = provider.query_vector(&tokens).unwrap();
        assert_eq!(vector, vec![0.5, 0.5]);
    }

    #[test]
    fn test_query_vector_all_unknown_is_none() {
        let mut provider = PrecomputedVectors::new();
        provider.insert_word_vector("a", vec![1.0]).unwrap();
        let tokens: Vec<String> = vec!["zzz".to_string()];
        assert!(provider.query_vector(&tokens).is_none());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut provider = PrecomputedVectors::new();
        provider.insert_document_vector(1, vec![1.0, 2.0]).unwrap();
        assert!(provider.insert_document_vector(2, vec![1.0]).is_err());
    }
}
