//! Shirt color extraction from a player crop.

use ndarray::{Array2, ArrayView3, s};

use super::kmeans::KMeans2;

/// Dominant shirt color of a player crop.
///
/// Only the upper half of the crop is used. Its pixels are split into two
/// clusters; the cluster owning most of the four corner pixels is taken as
/// background (grass, stands) and the other cluster's centroid is returned.
/// Returns `None` for a crop with no pixels in its upper half, or one that
/// does not split into two colors (background only).
pub fn dominant_color(crop: ArrayView3<'_, u8>, kmeans: &KMeans2) -> Option<[f32; 3]> {
    let (h, w, _) = crop.dim();
    let rows = h / 2;
    if rows == 0 || w == 0 {
        return None;
    }
    let top = crop.slice(s![..rows, .., ..]);
    let samples = Array2::from_shape_fn((rows * w, 3), |(i, c)| top[[i / w, i % w, c]] as f32);
    let fit = kmeans.fit(samples.view())?;
    let in_first = fit.labels.iter().filter(|&&l| l == 0).count();
    if fit.centroids[0] == fit.centroids[1] || in_first == 0 || in_first == fit.labels.len() {
        return None;
    }

    let label_at = |y: usize, x: usize| fit.labels[y * w + x];
    let corners = [
        label_at(0, 0),
        label_at(0, w - 1),
        label_at(rows - 1, 0),
        label_at(rows - 1, w - 1),
    ];
    let in_second = corners.iter().filter(|&&l| l == 1).count();
    // Ties count as background in cluster 0.
    let background = if in_second > corners.len() - in_second { 1 } else { 0 };

    Some(fit.centroids[1 - background])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// Green crop with a colored block in the middle.
    fn player_crop(h: usize, w: usize, shirt: [u8; 3]) -> Array3<u8> {
        Array3::from_shape_fn((h, w, 3), |(y, x, c)| {
            let inside = y >= 2 && x >= w / 4 && x < w - w / 4;
            if inside { shirt[c] } else { [40, 160, 40][c] }
        })
    }

    #[test]
    fn test_shirt_color_ignores_grass() {
        let crop = player_crop(20, 12, [220, 20, 20]);
        let color = dominant_color(crop.view(), &KMeans2::default()).unwrap();
        assert_eq!(color, [220.0, 20.0, 20.0]);
    }

    #[test]
    fn test_shirt_color_when_grass_seeds_second_cluster() {
        // Top-left pixel belongs to the shirt, so the grass ends up in cluster 1.
        let mut crop = player_crop(20, 12, [20, 20, 220]);
        for c in 0..3 {
            crop[[0, 0, c]] = [20, 20, 220][c];
        }
        let color = dominant_color(crop.view(), &KMeans2::default()).unwrap();
        assert_eq!(color, [20.0, 20.0, 220.0]);
    }

    #[test]
    fn test_background_only_crop_has_no_color() {
        let grass = Array3::from_shape_fn((20, 12, 3), |(_, _, c)| [40u8, 160, 40][c]);
        assert!(dominant_color(grass.view(), &KMeans2::default()).is_none());
    }

    #[test]
    fn test_degenerate_crop() {
        let empty = Array3::<u8>::zeros((0, 5, 3));
        assert!(dominant_color(empty.view(), &KMeans2::default()).is_none());
        let one_row = Array3::<u8>::zeros((1, 5, 3));
        assert!(dominant_color(one_row.view(), &KMeans2::default()).is_none());
    }
}
