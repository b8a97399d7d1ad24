//! # Embedding Vector Value Object
//!
//! An [`EmbeddingVector`] is the fixed-dimension floating-point output of an
//! embedder. Its invariant - non-empty, finite components - is enforced once
//! at construction so every downstream consumer (the vector store, cosine
//! similarity search, the index-sizing calculation) can treat a constructed
//! `EmbeddingVector` as trustworthy without re-validating it.
//!
//! ## Why validate here and not at the store
//!
//! The vector store's own invariant - "every row has the same dimension as
//! the first row written" - is a *cross-row* invariant and belongs to the
//! store (see `VectorStore::insert`). This value object only guards the
//! *single-vector* invariant: no `NaN`/`Infinity` components, and at least
//! one dimension. A dimension-mismatch between two otherwise-valid vectors
//! is a store-level concern, not something this type alone can catch.
//!
//! ## Examples
//!
//! ```
//! use lakehouse_ingest_domain::value_objects::EmbeddingVector;
//!
//! let v = EmbeddingVector::new(vec![0.1, 0.2, 0.3]).unwrap();
//! assert_eq!(v.dimension(), 3);
//! assert!(EmbeddingVector::new(vec![]).is_err());
//! assert!(EmbeddingVector::new(vec![f32::NAN]).is_err());
//! ```

use serde::{Deserialize, Serialize};

/// A validated, fixed-dimension embedding vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    /// Validates and wraps the given components.
    ///
    /// # Errors
    ///
    /// Returns an error message if `components` is empty or contains a
    /// non-finite value.
    pub fn new(components: Vec<f32>) -> Result<Self, String> {
        if components.is_empty() {
            return Err("embedding vector must have at least one dimension".to_string());
        }
        if let Some(bad) = components.iter().find(|c| !c.is_finite()) {
            return Err(format!("embedding vector contains a non-finite component: {bad}"));
        }
        Ok(Self(components))
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }

    /// Cosine similarity against another vector of the same dimension.
    /// Returns `None` on a dimension mismatch rather than panicking -
    /// callers (the vector store) are expected to have already enforced a
    /// single dimension per table and can `expect` this to be `Some`.
    pub fn cosine_similarity(&self, other: &EmbeddingVector) -> Option<f32> {
        if self.dimension() != other.dimension() {
            return None;
        }
        let dot: f32 = self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum();
        let norm_a: f32 = self.0.iter().map(|v| v * v).sum::<f32>().sqrt();
        let norm_b: f32 = other.0.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return Some(0.0);
        }
        Some(dot / (norm_a * norm_b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_vectors() {
        assert!(EmbeddingVector::new(vec![]).is_err());
    }

    #[test]
    fn rejects_non_finite_components() {
        assert!(EmbeddingVector::new(vec![1.0, f32::NAN]).is_err());
        assert!(EmbeddingVector::new(vec![1.0, f32::INFINITY]).is_err());
    }

    #[test]
    fn accepts_well_formed_vectors() {
        let v = EmbeddingVector::new(vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(v.dimension(), 3);
    }

    #[test]
    fn identical_vectors_have_similarity_one() {
        let v = EmbeddingVector::new(vec![1.0, 0.0]).unwrap();
        let sim = v.cosine_similarity(&v).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_have_similarity_zero() {
        let a = EmbeddingVector::new(vec![1.0, 0.0]).unwrap();
        let b = EmbeddingVector::new(vec![0.0, 1.0]).unwrap();
        let sim = a.cosine_similarity(&b).unwrap();
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn mismatched_dimensions_return_none() {
        let a = EmbeddingVector::new(vec![1.0, 0.0]).unwrap();
        let b = EmbeddingVector::new(vec![1.0, 0.0, 0.0]).unwrap();
        assert!(a.cosine_similarity(&b).is_none());
    }
}
