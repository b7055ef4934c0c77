//! Gaussian image pyramid used by the sparse optical flow.

use ndarray::Array2;

/// Smallest side a pyramid level may have.
const MIN_LEVEL_SIDE: usize = 8;

/// Grayscale image pyramid, level 0 at full resolution.
#[derive(Debug, Clone)]
pub struct Pyramid {
    levels: Vec<Array2<f32>>,
}

impl Pyramid {
    /// Build levels `0..=max_level`, stopping early once a level would get
    /// smaller than a few pixels.
    pub fn build(base: Array2<f32>, max_level: usize) -> Self {
        let mut levels = vec![base];
        for _ in 0..max_level {
            let Some(prev) = levels.last() else { break };
            let (h, w) = prev.dim();
            if h / 2 < MIN_LEVEL_SIDE || w / 2 < MIN_LEVEL_SIDE {
                break;
            }
            let next = pyr_down(prev);
            levels.push(next);
        }
        Self { levels }
    }

    pub fn levels(&self) -> &[Array2<f32>] {
        &self.levels
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Full-resolution image.
    pub fn base(&self) -> &Array2<f32> {
        &self.levels[0]
    }
}

const KERNEL: [f32; 5] = [1.0 / 16.0, 4.0 / 16.0, 6.0 / 16.0, 4.0 / 16.0, 1.0 / 16.0];

/// Blur with a 5-tap binomial kernel and drop every other row and column.
fn pyr_down(img: &Array2<f32>) -> Array2<f32> {
    let (h, w) = img.dim();
    let clamp = |v: isize, n: usize| v.clamp(0, n as isize - 1) as usize;

    let mut rows = Array2::<f32>::zeros((h, w / 2));
    for y in 0..h {
        for x in 0..w / 2 {
            let cx = (2 * x) as isize;
            rows[[y, x]] = KERNEL
                .iter()
                .enumerate()
                .map(|(k, weight)| weight * img[[y, clamp(cx + k as isize - 2, w)]])
                .sum();
        }
    }

    let mut out = Array2::<f32>::zeros((h / 2, w / 2));
    for y in 0..h / 2 {
        let cy = (2 * y) as isize;
        for x in 0..w / 2 {
            out[[y, x]] = KERNEL
                .iter()
                .enumerate()
                .map(|(k, weight)| weight * rows[[clamp(cy + k as isize - 2, h), x]])
                .sum();
        }
    }
    out
}

/// Sample `img` at a sub-pixel location, clamping to the border.
pub fn interpolate_bilinear(img: &Array2<f32>, x: f32, y: f32) -> f32 {
    let (h, w) = img.dim();
    let x = x.clamp(0.0, (w - 1) as f32);
    let y = y.clamp(0.0, (h - 1) as f32);
    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let top = img[[y0, x0]] * (1.0 - fx) + img[[y0, x1]] * fx;
    let bottom = img[[y1, x0]] * (1.0 - fx) + img[[y1, x1]] * fx;
    top * (1.0 - fy) + bottom * fy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pyramid_halves_each_level() {
        let pyr = Pyramid::build(Array2::from_elem((64, 80), 10.0), 2);
        assert_eq!(pyr.num_levels(), 3);
        assert_eq!(pyr.levels()[1].dim(), (32, 40));
        assert_eq!(pyr.levels()[2].dim(), (16, 20));
        // A flat image stays flat.
        assert!(pyr.levels()[2].iter().all(|v| (v - 10.0).abs() < 1e-4));
    }

    #[test]
    fn test_pyramid_stops_on_small_images() {
        let pyr = Pyramid::build(Array2::zeros((20, 20)), 4);
        assert_eq!(pyr.num_levels(), 2);
    }

    #[test]
    fn test_bilinear() {
        let img = Array2::from_shape_fn((4, 4), |(y, x)| (x + 10 * y) as f32);
        assert!((interpolate_bilinear(&img, 1.5, 2.0) - 21.5).abs() < 1e-5);
        assert!((interpolate_bilinear(&img, 1.0, 1.5) - 16.0).abs() < 1e-5);
        // Clamped outside the image.
        assert_eq!(interpolate_bilinear(&img, -5.0, 0.0), 0.0);
        assert_eq!(interpolate_bilinear(&img, 10.0, 10.0), 33.0);
    }
}
