//! Chunk text statistics

use serde::{Deserialize, Serialize};

use crate::kvstore::Chunk;

/// Aggregate text statistics over a set of chunks
///
/// Empty input yields all zeros, including min and max.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStats {
    pub total_characters: usize,
    /// Rounded to 2 decimal places
    pub avg_chunk_length: f64,
    pub min_chunk_length: usize,
    pub max_chunk_length: usize,
}

impl TextStats {
    pub fn from_lengths<I>(lengths: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut count = 0usize;
        let mut total = 0usize;
        let mut min = usize::MAX;
        let mut max = 0usize;

        for len in lengths {
            count += 1;
            total += len;
            min = min.min(len);
            max = max.max(len);
        }

        if count == 0 {
            return Self::default();
        }

        Self {
            total_characters: total,
            avg_chunk_length: round2(total as f64 / count as f64),
            min_chunk_length: min,
            max_chunk_length: max,
        }
    }

    pub fn from_chunks(chunks: &[Chunk]) -> Self {
        Self::from_lengths(chunks.iter().map(|c| c.content_length))
    }
}

/// Round to 2 decimals, exact ties going to even (0.125 -> 0.12)
fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}
