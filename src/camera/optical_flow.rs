//! Pyramidal sparse Lucas-Kanade optical flow.

use nalgebra::{Matrix2, Vector2};

use super::config::CameraMotionConfig;
use super::pyramid::{Pyramid, interpolate_bilinear};
use crate::geometry::Point;

/// Outcome of tracking one feature between two frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStatus {
    /// Converged or ran out of iterations inside the image.
    Tracked,
    /// The window gradient matrix was too weak to solve.
    Lost,
    /// The tracked position left the image.
    OutOfBounds,
}

/// A feature position in the previous frame and its tracked position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowResult {
    pub from: Point,
    pub to: Point,
    pub status: FlowStatus,
}

impl FlowResult {
    pub fn is_tracked(&self) -> bool {
        self.status == FlowStatus::Tracked
    }
}

/// Coarse-to-fine Lucas-Kanade tracker.
///
/// Template gradients are taken from the previous frame, so the 2x2 system
/// matrix is built once per level and only the mismatch vector is refreshed
/// per iteration.
#[derive(Debug, Clone)]
pub struct LucasKanade {
    half_window: isize,
    max_level: usize,
    max_iterations: usize,
    epsilon: f32,
    min_eigen_threshold: f32,
}

impl LucasKanade {
    pub fn new(config: &CameraMotionConfig) -> Self {
        Self {
            half_window: (config.window_size / 2).max(1) as isize,
            max_level: config.pyramid_levels,
            max_iterations: config.max_iterations.max(1),
            epsilon: config.epsilon,
            min_eigen_threshold: config.min_eigen_threshold,
        }
    }

    /// Track every feature of `prev` into `curr`. The output is parallel to
    /// `features`.
    pub fn track(&self, prev: &Pyramid, curr: &Pyramid, features: &[Point]) -> Vec<FlowResult> {
        let num_levels = (self.max_level + 1)
            .min(prev.num_levels())
            .min(curr.num_levels());

        features
            .iter()
            .map(|&feature| self.track_single(prev, curr, feature, num_levels))
            .collect()
    }

    fn track_single(
        &self,
        prev: &Pyramid,
        curr: &Pyramid,
        feature: Point,
        num_levels: usize,
    ) -> FlowResult {
        let mut d = Vector2::<f32>::zeros();

        for level in (0..num_levels).rev() {
            let scale = 1.0 / (1u32 << level) as f32;
            let px = feature.x * scale;
            let py = feature.y * scale;

            match self.refine(&prev.levels()[level], &curr.levels()[level], px, py, d) {
                Some(refined) => d = refined,
                None => {
                    return FlowResult {
                        from: feature,
                        to: Point::new(feature.x + d.x / scale, feature.y + d.y / scale),
                        status: FlowStatus::Lost,
                    };
                }
            }

            if level > 0 {
                d *= 2.0;
            }
        }

        let to = Point::new(feature.x + d.x, feature.y + d.y);
        let (h, w) = prev.base().dim();
        let inside = to.x >= 0.0 && to.x <= (w - 1) as f32 && to.y >= 0.0 && to.y <= (h - 1) as f32;
        let status = if inside {
            FlowStatus::Tracked
        } else {
            FlowStatus::OutOfBounds
        };

        FlowResult {
            from: feature,
            to,
            status,
        }
    }

    /// Iterate at one pyramid level starting from displacement `d`.
    fn refine(
        &self,
        prev: &ndarray::Array2<f32>,
        curr: &ndarray::Array2<f32>,
        px: f32,
        py: f32,
        mut d: Vector2<f32>,
    ) -> Option<Vector2<f32>> {
        let half = self.half_window;
        let side = (2 * half + 1) as usize;
        let mut template = Vec::with_capacity(side * side);

        let mut g = Matrix2::<f32>::zeros();
        for oy in -half..=half {
            for ox in -half..=half {
                let tx = px + ox as f32;
                let ty = py + oy as f32;
                let value = interpolate_bilinear(prev, tx, ty);
                let ix = 0.5
                    * (interpolate_bilinear(prev, tx + 1.0, ty)
                        - interpolate_bilinear(prev, tx - 1.0, ty));
                let iy = 0.5
                    * (interpolate_bilinear(prev, tx, ty + 1.0)
                        - interpolate_bilinear(prev, tx, ty - 1.0));
                g[(0, 0)] += ix * ix;
                g[(0, 1)] += ix * iy;
                g[(1, 1)] += iy * iy;
                template.push((value, ix, iy));
            }
        }
        g[(1, 0)] = g[(0, 1)];

        let area = (side * side) as f32;
        let half_trace = (g[(0, 0)] + g[(1, 1)]) / 2.0;
        let disc = (((g[(0, 0)] - g[(1, 1)]) / 2.0).powi(2) + g[(0, 1)].powi(2)).sqrt();
        if (half_trace - disc) / area < self.min_eigen_threshold {
            return None;
        }
        let g_inv = g.try_inverse()?;

        for _ in 0..self.max_iterations {
            let mut b = Vector2::<f32>::zeros();
            let mut idx = 0;
            for oy in -half..=half {
                for ox in -half..=half {
                    let (value, ix, iy) = template[idx];
                    idx += 1;
                    let warped = interpolate_bilinear(
                        curr,
                        px + d.x + ox as f32,
                        py + d.y + oy as f32,
                    );
                    let e = value - warped;
                    b.x += ix * e;
                    b.y += iy * e;
                }
            }

            let delta = g_inv * b;
            d += delta;
            if delta.norm_squared() < self.epsilon * self.epsilon {
                break;
            }
        }

        Some(d)
    }
}
