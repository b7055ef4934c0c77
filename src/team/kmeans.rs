//! Deterministic two-means clustering of RGB samples.

use ndarray::{Array2, ArrayView1, ArrayView2};

/// Result of a two-means fit.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    pub centroids: [[f32; 3]; 2],
    /// Cluster index (0 or 1) of every input sample.
    pub labels: Vec<usize>,
}

impl Clustering {
    /// Index of the centroid nearer to `sample`; ties go to cluster 0.
    pub fn predict(&self, sample: [f32; 3]) -> usize {
        nearest(&self.centroids, sample)
    }
}

/// Two-means clustering with farthest-point seeding.
///
/// The first sample seeds cluster 0 and the sample farthest from it seeds
/// cluster 1, so the result only depends on the input order.
#[derive(Debug, Clone, Copy)]
pub struct KMeans2 {
    max_iterations: usize,
}

impl Default for KMeans2 {
    fn default() -> Self {
        Self::new(100)
    }
}

impl KMeans2 {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations: max_iterations.max(1),
        }
    }

    /// Cluster an `(n, 3)` sample matrix. Returns `None` when it is empty.
    pub fn fit(&self, samples: ArrayView2<'_, f32>) -> Option<Clustering> {
        let first = samples.rows().into_iter().next()?;
        let seed0 = to_rgb(first);
        let seed1 = samples
            .rows()
            .into_iter()
            .map(to_rgb)
            .fold((seed0, 0.0f32), |best, s| {
                let d = sq_dist(seed0, s);
                if d > best.1 { (s, d) } else { best }
            })
            .0;

        let mut centroids = [seed0, seed1];
        let mut labels = vec![usize::MAX; samples.nrows()];

        for _ in 0..self.max_iterations {
            let mut changed = false;
            for (label, row) in labels.iter_mut().zip(samples.rows()) {
                let l = nearest(&centroids, to_rgb(row));
                if *label != l {
                    *label = l;
                    changed = true;
                }
            }
            if !changed {
                break;
            }

            let mut sums = [[0.0f64; 3]; 2];
            let mut counts = [0usize; 2];
            for (&label, row) in labels.iter().zip(samples.rows()) {
                counts[label] += 1;
                for c in 0..3 {
                    sums[label][c] += row[c] as f64;
                }
            }
            for k in 0..2 {
                // An empty cluster keeps its previous centroid.
                if counts[k] > 0 {
                    centroids[k] = sums[k].map(|s| (s / counts[k] as f64) as f32);
                }
            }
        }

        Some(Clustering { centroids, labels })
    }

    /// Convenience wrapper over a slice of colors.
    pub fn fit_colors(&self, colors: &[[f32; 3]]) -> Option<Clustering> {
        let samples = Array2::from_shape_fn((colors.len(), 3), |(i, c)| colors[i][c]);
        self.fit(samples.view())
    }
}

fn to_rgb(row: ArrayView1<'_, f32>) -> [f32; 3] {
    [row[0], row[1], row[2]]
}

#[inline]
pub(super) fn sq_dist(a: [f32; 3], b: [f32; 3]) -> f32 {
    (0..3).map(|c| (a[c] - b[c]).powi(2)).sum()
}

pub(super) fn nearest(centroids: &[[f32; 3]; 2], sample: [f32; 3]) -> usize {
    if sq_dist(centroids[1], sample) < sq_dist(centroids[0], sample) {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_well_separated_groups() {
        let colors = [
            [250.0, 0.0, 0.0],
            [0.0, 0.0, 240.0],
            [240.0, 10.0, 0.0],
            [10.0, 0.0, 250.0],
        ];
        let fit = KMeans2::default().fit_colors(&colors).unwrap();
        assert_eq!(fit.labels, vec![0, 1, 0, 1]);
        assert_eq!(fit.centroids[0], [245.0, 5.0, 0.0]);
        assert_eq!(fit.centroids[1], [5.0, 0.0, 245.0]);
        assert_eq!(fit.predict([200.0, 30.0, 30.0]), 0);
        assert_eq!(fit.predict([30.0, 30.0, 200.0]), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(KMeans2::default().fit_colors(&[]).is_none());
    }

    #[test]
    fn test_identical_samples_share_cluster() {
        let fit = KMeans2::default().fit_colors(&[[7.0, 7.0, 7.0]; 3]).unwrap();
        assert_eq!(fit.labels, vec![0, 0, 0]);
        assert_eq!(fit.centroids[0], fit.centroids[1]);
    }
}
