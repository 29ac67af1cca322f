//! Density-based clustering over embedding vectors
//!
//! DBSCAN implementation backing the [`Clusterer`] capability. Points are
//! grouped by local density under Euclidean distance with no fixed cluster
//! count; low-density points receive the reserved noise label.

use crate::error::{Result, SemChunkError};
use crate::ml::{Clusterer, Embedding, NOISE_LABEL};
use std::collections::VecDeque;

/// DBSCAN clusterer with a fixed neighborhood radius
///
/// `min_cluster_size` (supplied per call) acts as the core-point threshold:
/// a point needs that many neighbors within `epsilon`, itself included, to
/// seed or extend a cluster.
#[derive(Debug, Clone)]
pub struct DbscanClusterer {
    /// Euclidean neighborhood radius
    epsilon: f32,
}

impl DbscanClusterer {
    /// Create a new clusterer with the given neighborhood radius
    pub fn new(epsilon: f32) -> Self {
        Self { epsilon }
    }

    /// Neighborhood radius
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }
}

impl Default for DbscanClusterer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Clusterer for DbscanClusterer {
    fn cluster(&self, vectors: &[Embedding], min_cluster_size: usize) -> Result<Vec<i64>> {
        if self.epsilon <= 0.0 {
            return Err(SemChunkError::Clustering(
                "epsilon must be positive".to_string(),
            ));
        }
        if min_cluster_size == 0 {
            return Err(SemChunkError::Clustering(
                "min_cluster_size must be at least 1".to_string(),
            ));
        }

        let n = vectors.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let dim = vectors[0].len();
        if vectors.iter().any(|v| v.len() != dim) {
            return Err(SemChunkError::Clustering(
                "input vectors have mixed dimensions".to_string(),
            ));
        }

        let eps_sq = self.epsilon * self.epsilon;

        // Pre-compute neighbor lists to avoid redundant distance calculations.
        let neighbors: Vec<Vec<usize>> = (0..n)
            .map(|i| {
                (0..n)
                    .filter(|&j| squared_euclidean(&vectors[i], &vectors[j]) <= eps_sq)
                    .collect()
            })
            .collect();

        let mut labels: Vec<Option<i64>> = vec![None; n];
        let mut visited = vec![false; n];
        let mut current_cluster: i64 = 0;

        for i in 0..n {
            if visited[i] {
                continue;
            }
            visited[i] = true;

            if neighbors[i].len() < min_cluster_size {
                // Not a core point; tentatively noise (may be claimed by a cluster later).
                continue;
            }

            // Start a new cluster from this core point.
            labels[i] = Some(current_cluster);

            let mut queue: VecDeque<usize> =
                neighbors[i].iter().copied().filter(|&j| j != i).collect();

            while let Some(j) = queue.pop_front() {
                if labels[j].is_none() {
                    labels[j] = Some(current_cluster);
                }

                if visited[j] {
                    continue;
                }
                visited[j] = true;

                if neighbors[j].len() >= min_cluster_size {
                    // j is also a core point: expand the cluster with its neighbors.
                    for &nb in &neighbors[j] {
                        if labels[nb].is_none() {
                            queue.push_back(nb);
                        }
                    }
                }
            }

            current_cluster += 1;
        }

        Ok(labels
            .into_iter()
            .map(|label| label.unwrap_or(NOISE_LABEL))
            .collect())
    }
}

/// Squared Euclidean distance between two vectors
#[inline]
fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
