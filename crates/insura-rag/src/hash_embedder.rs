//! Deterministic hash embedder for offline runs and tests
//!
//! Produces a unit vector derived from an md5 chain over the input text.
//! Useless for semantic similarity, but deterministic and dimension-correct,
//! which is all the pipeline tests and pre-deployment smoke runs need.

use async_trait::async_trait;
use insura_core::{Embedder, Result};

pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    // `is_query` is ignored on purpose: with hashed vectors, prefixing the
    // query side differently from the passage side would make identical
    // texts dissimilar and break offline retrieval entirely.
    async fn embed(&self, text: &str, _is_query: bool) -> Result<Vec<f32>> {
        let mut values = Vec::with_capacity(self.dimension);
        let mut block = 0u32;
        while values.len() < self.dimension {
            let digest = md5::compute(format!("{text}:{block}"));
            for byte in digest.0 {
                if values.len() == self.dimension {
                    break;
                }
                values.push((f32::from(byte) - 127.5) / 127.5);
            }
            block += 1;
        }
        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt() + 1e-12;
        Ok(values.into_iter().map(|v| v / norm).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic_and_normalized() {
        let embedder = HashEmbedder::new(32);
        let a = embedder.embed("실손 청구", true).await.unwrap();
        let b = embedder.embed("실손 청구", false).await.unwrap();
        let c = embedder.embed("다른 질문", true).await.unwrap();

        assert_eq!(a.len(), 32);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
    }
}
