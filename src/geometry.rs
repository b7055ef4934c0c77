//! Bounding-box and point helpers shared by every enrichment stage.

mod bbox;
mod point;

pub use bbox::BBox;
pub use point::{Point, distance, xy_distance};
