use serde::{Deserialize, Serialize};

/// Tunables of the camera motion compensator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraMotionConfig {
    /// Column ranges `[start, end)` in which background features are seeded.
    /// Ranges are clamped to the frame width.
    pub mask_bands: Vec<[usize; 2]>,
    /// Maximum number of features kept per seeding.
    pub max_corners: usize,
    /// Minimum corner response relative to the strongest corner.
    pub quality_level: f32,
    /// Minimum pixel distance between two seeded features.
    pub min_feature_distance: f32,
    /// Side of the neighborhood summed into the structure tensor.
    pub block_size: usize,
    /// Side of the Lucas-Kanade integration window.
    pub window_size: usize,
    /// Highest pyramid level used by the flow (0 = no pyramid).
    pub pyramid_levels: usize,
    pub max_iterations: usize,
    /// Per-iteration update below which the flow solver stops.
    pub epsilon: f32,
    /// Minimum eigenvalue of the window gradient matrix, per pixel, below
    /// which a feature is considered lost.
    pub min_eigen_threshold: f32,
    /// Displacements at or below this distance are treated as jitter.
    pub min_motion_distance: f32,
}

impl Default for CameraMotionConfig {
    fn default() -> Self {
        Self {
            mask_bands: vec![[0, 20], [900, 1050]],
            max_corners: 100,
            quality_level: 0.3,
            min_feature_distance: 3.0,
            block_size: 7,
            window_size: 15,
            pyramid_levels: 2,
            max_iterations: 10,
            epsilon: 0.03,
            min_eigen_threshold: 1e-2,
            min_motion_distance: 5.0,
        }
    }
}
