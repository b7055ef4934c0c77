//! End-to-end enrichment of tracker output.
//!
//! This module provides the seam to the external detector/tracker and the
//! pipeline that runs every enrichment stage over a decoded video.

mod runner;
mod source;

pub use runner::{Enrichment, EnrichmentPipeline, RunError};
pub use source::TrackSource;
