//! Clustering: the hybrid density+centroid palette-extraction engine.
//!
//! Sentinel DBSCAN label states are an explicit tagged enum
//! ([`ClusterLabel`]) rather than magic integer constants. The three
//! interchangeable clustering strategies (plain k-means, plain DBSCAN, and
//! the hybrid of both) are narrow implementations of the [`Clusterer`]
//! trait rather than a runtime tag, since dispatch among them never sits on
//! a hot path — the caller picks one once per [`crate::analysis::Analyzer`]
//! call.

pub mod dbscan;
pub mod hybrid;
pub mod kmeans;
pub mod nearest;

use crate::color::ColorPoint;
use crate::rng::Xorshift64;

/// A DBSCAN point label. `Cluster(id)` ids are assigned in discovery order
/// starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterLabel {
    Unclassified,
    Noise,
    InQueue,
    Cluster(u32),
}

/// A pluggable clustering algorithm producing a set of centroids ("palette"
/// before sorting/conversion) from a point cloud.
pub trait Clusterer {
    fn cluster(&self, points: &[ColorPoint], k: usize, rng: &mut Xorshift64) -> Vec<ColorPoint>;
}

pub use dbscan::DbscanClusterer;
pub use hybrid::HybridClusterer;
pub use kmeans::KMeansClusterer;
