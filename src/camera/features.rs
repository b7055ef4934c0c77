//! Shi-Tomasi corner detection restricted to background bands.

use ndarray::Array2;

use super::config::CameraMotionConfig;
use crate::geometry::Point;

/// Detects "good features to track": local maxima of the minimum eigenvalue of
/// the gradient structure tensor, inside the configured column bands.
#[derive(Debug, Clone)]
pub struct FeatureDetector {
    mask_bands: Vec<[usize; 2]>,
    max_corners: usize,
    quality_level: f32,
    min_distance: f32,
    block_size: usize,
}

impl FeatureDetector {
    pub fn new(config: &CameraMotionConfig) -> Self {
        Self {
            mask_bands: config.mask_bands.clone(),
            max_corners: config.max_corners,
            quality_level: config.quality_level,
            min_distance: config.min_feature_distance,
            block_size: config.block_size.max(1),
        }
    }

    /// Binary inclusion mask for a frame of the given size.
    pub fn mask(&self, height: usize, width: usize) -> Array2<bool> {
        let mut mask = Array2::from_elem((height, width), false);
        for &[start, end] in &self.mask_bands {
            let end = end.min(width);
            for x in start.min(end)..end {
                mask.column_mut(x).fill(true);
            }
        }
        mask
    }

    /// Detect up to `max_corners` features, strongest first.
    pub fn detect(&self, gray: &Array2<f32>) -> Vec<Point> {
        let (h, w) = gray.dim();
        if h < 3 || w < 3 || self.max_corners == 0 {
            return Vec::new();
        }
        let mask = self.mask(h, w);
        let response = self.min_eigen_response(gray, &mask);

        let max_response = response.iter().copied().fold(0.0f32, f32::max);
        if max_response <= 0.0 {
            return Vec::new();
        }
        let threshold = max_response * self.quality_level;

        // Local maxima above threshold, in row-major order.
        let mut candidates = Vec::new();
        for y in 0..h {
            for x in 0..w {
                let r = response[[y, x]];
                if r <= 0.0 || r < threshold || !mask[[y, x]] {
                    continue;
                }
                if is_local_max(&response, y, x) {
                    candidates.push((r, Point::new(x as f32, y as f32)));
                }
            }
        }
        // Stable sort keeps row-major order among equal responses.
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

        let min_dist_sq = self.min_distance * self.min_distance;
        let mut corners: Vec<Point> = Vec::with_capacity(self.max_corners);
        for (_, p) in candidates {
            let too_close = corners.iter().any(|c| {
                let dx = c.x - p.x;
                let dy = c.y - p.y;
                dx * dx + dy * dy < min_dist_sq
            });
            if !too_close {
                corners.push(p);
                if corners.len() == self.max_corners {
                    break;
                }
            }
        }
        corners
    }

    /// Minimum eigenvalue of the block-summed structure tensor at every masked
    /// pixel, zero elsewhere.
    fn min_eigen_response(&self, gray: &Array2<f32>, mask: &Array2<bool>) -> Array2<f32> {
        let (h, w) = gray.dim();
        let (gx, gy) = sobel(gray);

        let ixx = integral(&(&gx * &gx));
        let ixy = integral(&(&gx * &gy));
        let iyy = integral(&(&gy * &gy));

        let r = self.block_size / 2;
        let mut response = Array2::<f32>::zeros((h, w));
        for y in 0..h {
            for x in 0..w {
                if !mask[[y, x]] {
                    continue;
                }
                let y0 = y.saturating_sub(r);
                let x0 = x.saturating_sub(r);
                let y1 = (y + r + 1).min(h);
                let x1 = (x + r + 1).min(w);
                let a = box_sum(&ixx, y0, x0, y1, x1);
                let b = box_sum(&ixy, y0, x0, y1, x1);
                let c = box_sum(&iyy, y0, x0, y1, x1);
                let half_trace = (a + c) / 2.0;
                let disc = (((a - c) / 2.0).powi(2) + b * b).sqrt();
                response[[y, x]] = (half_trace - disc).max(0.0) as f32;
            }
        }
        response
    }
}

fn is_local_max(response: &Array2<f32>, y: usize, x: usize) -> bool {
    let (h, w) = response.dim();
    let r = response[[y, x]];
    for ny in y.saturating_sub(1)..(y + 2).min(h) {
        for nx in x.saturating_sub(1)..(x + 2).min(w) {
            if response[[ny, nx]] > r {
                return false;
            }
        }
    }
    true
}

/// 3x3 Sobel derivatives with replicated borders.
fn sobel(gray: &Array2<f32>) -> (Array2<f32>, Array2<f32>) {
    let (h, w) = gray.dim();
    let at = |y: isize, x: isize| {
        gray[[
            y.clamp(0, h as isize - 1) as usize,
            x.clamp(0, w as isize - 1) as usize,
        ]]
    };
    let mut gx = Array2::<f32>::zeros((h, w));
    let mut gy = Array2::<f32>::zeros((h, w));
    for y in 0..h as isize {
        for x in 0..w as isize {
            let dx = (at(y - 1, x + 1) + 2.0 * at(y, x + 1) + at(y + 1, x + 1))
                - (at(y - 1, x - 1) + 2.0 * at(y, x - 1) + at(y + 1, x - 1));
            let dy = (at(y + 1, x - 1) + 2.0 * at(y + 1, x) + at(y + 1, x + 1))
                - (at(y - 1, x - 1) + 2.0 * at(y - 1, x) + at(y - 1, x + 1));
            gx[[y as usize, x as usize]] = dx / 8.0;
            gy[[y as usize, x as usize]] = dy / 8.0;
        }
    }
    (gx, gy)
}

/// Summed-area table with a zero first row and column.
fn integral(img: &Array2<f32>) -> Array2<f64> {
    let (h, w) = img.dim();
    let mut sat = Array2::<f64>::zeros((h + 1, w + 1));
    for y in 0..h {
        let mut row = 0.0f64;
        for x in 0..w {
            row += img[[y, x]] as f64;
            sat[[y + 1, x + 1]] = sat[[y, x + 1]] + row;
        }
    }
    sat
}

#[inline]
fn box_sum(sat: &Array2<f64>, y0: usize, x0: usize, y1: usize, x1: usize) -> f64 {
    sat[[y1, x1]] - sat[[y0, x1]] - sat[[y1, x0]] + sat[[y0, x0]]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(bands: Vec<[usize; 2]>) -> CameraMotionConfig {
        CameraMotionConfig {
            mask_bands: bands,
            ..CameraMotionConfig::default()
        }
    }

    /// Dark image with bright squares whose corners are strong features.
    fn squares(h: usize, w: usize, origins: &[(usize, usize)]) -> Array2<f32> {
        let mut img = Array2::<f32>::zeros((h, w));
        for &(oy, ox) in origins {
            for y in oy..oy + 10 {
                for x in ox..ox + 10 {
                    img[[y, x]] = 200.0;
                }
            }
        }
        img
    }

    #[test]
    fn test_mask_bands_clamped() {
        let det = FeatureDetector::new(&config(vec![[0, 2], [8, 50]]));
        let mask = det.mask(3, 10);
        let cols: Vec<bool> = (0..10).map(|x| mask[[0, x]]).collect();
        assert_eq!(
            cols,
            vec![true, true, false, false, false, false, false, false, true, true]
        );
    }

    #[test]
    fn test_flat_image_has_no_features() {
        let det = FeatureDetector::new(&config(vec![[0, 64]]));
        assert!(det.detect(&Array2::from_elem((64, 64), 90.0)).is_empty());
    }

    #[test]
    fn test_features_stay_inside_mask() {
        let img = squares(80, 120, &[(20, 10), (40, 90)]);
        let det = FeatureDetector::new(&config(vec![[0, 40]]));
        let features = det.detect(&img);
        assert!(!features.is_empty());
        assert!(features.iter().all(|p| p.x < 40.0));
    }

    #[test]
    fn test_max_corners_and_min_distance() {
        let img = squares(80, 120, &[(10, 10), (40, 10), (10, 60), (40, 60)]);
        let mut cfg = config(vec![[0, 120]]);
        cfg.max_corners = 5;
        cfg.min_feature_distance = 6.0;
        let features = FeatureDetector::new(&cfg).detect(&img);
        assert!(features.len() <= 5);
        for (i, a) in features.iter().enumerate() {
            for b in &features[i + 1..] {
                let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
                assert!(d >= 6.0);
            }
        }
    }
}
