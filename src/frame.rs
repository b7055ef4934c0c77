//! Decoded video frames as handed to the pipeline by the caller.

use ndarray::{Array2, Array3, ArrayView3, ShapeError, s};

use crate::geometry::BBox;

/// An owned RGB frame stored as an `(height, width, 3)` array.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pixels: Array3<u8>,
}

impl Frame {
    /// Wrap an `(height, width, 3)` RGB array.
    ///
    /// Returns `None` when the last axis does not hold exactly three channels.
    pub fn from_array(pixels: Array3<u8>) -> Option<Self> {
        (pixels.dim().2 == 3).then_some(Self { pixels })
    }

    /// Build a frame from row-major interleaved RGB bytes.
    pub fn from_rgb(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ShapeError> {
        let pixels = Array3::from_shape_vec((height, width, 3), data)?;
        Ok(Self { pixels })
    }

    /// A frame filled with one color.
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let pixels = Array3::from_shape_fn((height, width, 3), |(_, _, c)| rgb[c]);
        Self { pixels }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    pub fn pixels(&self) -> &Array3<u8> {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut Array3<u8> {
        &mut self.pixels
    }

    /// Fill the pixel rectangle `[x1, x2) x [y1, y2)` with `rgb`, clamped to the frame.
    pub fn fill_rect(&mut self, x1: usize, y1: usize, x2: usize, y2: usize, rgb: [u8; 3]) {
        let (h, w, _) = self.pixels.dim();
        let (x2, y2) = (x2.min(w), y2.min(h));
        if x1 >= x2 || y1 >= y2 {
            return;
        }
        for (c, value) in rgb.into_iter().enumerate() {
            self.pixels.slice_mut(s![y1..y2, x1..x2, c]).fill(value);
        }
    }

    /// Luma conversion with ITU-R BT.601 weights.
    pub fn to_gray(&self) -> Array2<f32> {
        let (h, w, _) = self.pixels.dim();
        Array2::from_shape_fn((h, w), |(y, x)| {
            0.299 * self.pixels[[y, x, 0]] as f32
                + 0.587 * self.pixels[[y, x, 1]] as f32
                + 0.114 * self.pixels[[y, x, 2]] as f32
        })
    }

    /// View of the pixels covered by `bbox`.
    ///
    /// Coordinates are truncated to integers and clamped to the frame, so a box
    /// partially outside the frame yields the visible part and a degenerate box
    /// yields an empty view.
    pub fn crop(&self, bbox: &BBox) -> ArrayView3<'_, u8> {
        let (h, w, _) = self.pixels.dim();
        let clamp = |v: f32, max: usize| (v.max(0.0) as usize).min(max);
        let x1 = clamp(bbox.x1, w);
        let x2 = clamp(bbox.x2, w).max(x1);
        let y1 = clamp(bbox.y1, h);
        let y2 = clamp(bbox.y2, h).max(y1);
        self.pixels.slice(s![y1..y2, x1..x2, ..])
    }
}
