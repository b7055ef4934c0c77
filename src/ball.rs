//! Gap filling for the intermittently detected ball.

use crate::error::{Error, Result};
use crate::geometry::BBox;
use crate::tracks::{BALL_TRACK_ID, FrameTracks, TrackRecord};

/// Fill the missing entries of a per-frame box series.
///
/// Interior gaps are interpolated linearly between the surrounding
/// detections, a leading gap takes the first detection and a trailing gap
/// keeps the last one. Returns `None` when the series holds no detection.
pub fn interpolate_series(series: &[Option<BBox>]) -> Option<Vec<BBox>> {
    let known: Vec<(usize, BBox)> = series
        .iter()
        .enumerate()
        .filter_map(|(i, b)| b.map(|b| (i, b)))
        .collect();
    let (&(first_idx, first), &(_, last)) = (known.first()?, known.last()?);

    let mut out = Vec::with_capacity(series.len());
    let mut next = 0;
    for i in 0..series.len() {
        while next < known.len() && known[next].0 < i {
            next += 1;
        }
        let value = match known.get(next) {
            Some(&(idx, b)) if idx == i => b,
            _ if i < first_idx => first,
            Some(&(idx, b)) => {
                let (prev_idx, prev) = known[next - 1];
                let t = (i - prev_idx) as f32 / (idx - prev_idx) as f32;
                prev.lerp(&b, t)
            }
            None => last,
        };
        out.push(value);
    }
    Some(out)
}

/// Densify the ball track so every frame holds exactly one ball record under
/// [`BALL_TRACK_ID`].
///
/// Detected frames keep their record; filled frames get a fresh record with
/// only the box set.
pub fn interpolate_ball(ball: &[FrameTracks]) -> Result<Vec<FrameTracks>> {
    let series: Vec<Option<BBox>> = ball
        .iter()
        .map(|frame| frame.values().next().map(TrackRecord::bbox))
        .collect();
    let dense = interpolate_series(&series).ok_or(Error::NoBallDetections)?;

    Ok(ball
        .iter()
        .zip(dense)
        .map(|(frame, bbox)| {
            let record = frame
                .values()
                .next()
                .cloned()
                .unwrap_or_else(|| TrackRecord::new(bbox));
            FrameTracks::from([(BALL_TRACK_ID, record)])
        })
        .collect())
}

/// Number of frames without a ball detection.
pub fn missing_frames(ball: &[FrameTracks]) -> usize {
    ball.iter().filter(|frame| frame.is_empty()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(x: f32) -> BBox {
        BBox::new(x, 100.0, x + 10.0, 110.0)
    }

    #[test]
    fn test_interior_gap_is_linear() {
        let mut series = vec![None; 11];
        series[0] = Some(b(100.0));
        series[10] = Some(b(200.0));
        let dense = interpolate_series(&series).unwrap();
        assert_eq!(dense.len(), 11);
        assert_eq!(dense[5], BBox::new(150.0, 100.0, 160.0, 110.0));
        assert_eq!(dense[1], b(110.0));
        assert_eq!(dense[10], b(200.0));
    }

    #[test]
    fn test_leading_and_trailing_gaps() {
        let series = vec![None, None, Some(b(10.0)), None, Some(b(30.0)), None];
        let dense = interpolate_series(&series).unwrap();
        assert_eq!(
            dense,
            vec![b(10.0), b(10.0), b(10.0), b(20.0), b(30.0), b(30.0)]
        );
    }

    #[test]
    fn test_no_detection() {
        assert!(interpolate_series(&[None, None]).is_none());
        assert!(interpolate_series(&[]).is_none());
        let err = interpolate_ball(&[FrameTracks::new(), FrameTracks::new()]).unwrap_err();
        assert!(matches!(err, Error::NoBallDetections));
    }

    #[test]
    fn test_interpolate_ball_rekeys_and_keeps_detections() {
        let mut detected = TrackRecord::new(b(0.0));
        detected.has_ball = true;
        let ball = vec![
            FrameTracks::from([(7, detected.clone())]),
            FrameTracks::new(),
            FrameTracks::from([(1, TrackRecord::new(b(20.0)))]),
        ];
        let dense = interpolate_ball(&ball).unwrap();
        assert_eq!(dense[0][&BALL_TRACK_ID], detected);
        assert_eq!(dense[1][&BALL_TRACK_ID].bbox(), b(10.0));
        assert_eq!(missing_frames(&ball), 1);
        assert_eq!(missing_frames(&dense), 0);
    }

    #[test]
    fn test_dense_series_is_unchanged() {
        let ball: Vec<FrameTracks> = (0..4)
            .map(|i| FrameTracks::from([(BALL_TRACK_ID, TrackRecord::new(b(i as f32 * 3.0)))]))
            .collect();
        assert_eq!(interpolate_ball(&ball).unwrap(), ball);
    }
}
