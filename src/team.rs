//! Team classification by shirt color.
//!
//! A two-cluster color model is fitted once on the first frame's players; each
//! later player is matched to the nearer team centroid the first time its
//! track id is seen, and keeps that team for the rest of the video.

mod assigner;
mod color;
mod kmeans;

pub use assigner::{TeamAssigner, TeamConfig};
pub use color::dominant_color;
pub use kmeans::{Clustering, KMeans2};
