use crate::state::{Progress, RingParameters, UiState};
use serde::Serialize;

pub const FULL_CIRCLE: f64 = 360.0;
/// Rotates the arc origin from 3 o'clock to 12 o'clock.
pub const START_OFFSET: f64 = -90.0;

/// Draw instructions for one segment: a track arc and a progress arc sharing a start angle.
///
/// Angles are in degrees, clockwise in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentArc {
    pub start_angle: f64,
    pub track_sweep_angle: f64,
    pub progress_sweep_angle: f64,
}

impl SegmentArc {
    pub fn start_radians(&self) -> f64 {
        self.start_angle.to_radians()
    }

    pub fn track_end_radians(&self) -> f64 {
        (self.start_angle + self.track_sweep_angle).to_radians()
    }

    pub fn progress_end_radians(&self) -> f64 {
        (self.start_angle + self.progress_sweep_angle).to_radians()
    }
}

/// Lays out `segment_count` arcs around the circle, starting at 12 o'clock.
///
/// `progress` is read positionally; missing entries draw as empty and extra ones are ignored.
/// A gap at or above the per-segment angle yields zero-length arcs.
pub fn compute_segment_arcs(
    segment_count: usize,
    gap_angle: f64,
    progress: &[Progress],
) -> Vec<SegmentArc> {
    if segment_count == 0 {
        return Vec::new();
    }

    let angle_per_segment = FULL_CIRCLE / segment_count as f64;
    let track_sweep_angle = (angle_per_segment - gap_angle).max(0.0);

    (0..segment_count)
        .map(|i| {
            let fraction = progress.get(i).copied().unwrap_or_default().clamped();
            SegmentArc {
                start_angle: START_OFFSET + i as f64 * angle_per_segment + gap_angle / 2.0,
                track_sweep_angle,
                progress_sweep_angle: track_sweep_angle * fraction,
            }
        })
        .collect()
}

pub fn arcs_for(state: &UiState) -> Vec<SegmentArc> {
    compute_segment_arcs(
        state.segment_count(),
        state.parameters.gap_angle,
        &state.progress,
    )
}

/// Box model of the avatar and its ring inside a square canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RingGeometry {
    /// Side of the square canvas; the ring stroke sits fully inside it.
    pub canvas_size: f64,
    pub center: f64,
    pub arc_radius: f64,
    pub stroke_width: f64,
    pub avatar_diameter: f64,
}

impl RingGeometry {
    pub fn new(parameters: &RingParameters) -> Self {
        let canvas_size = parameters.avatar_size + 2.0 * parameters.stroke_width;
        Self {
            canvas_size,
            center: canvas_size / 2.0,
            arc_radius: parameters.avatar_size / 2.0,
            stroke_width: parameters.stroke_width,
            avatar_diameter: (parameters.avatar_size
                - parameters.stroke_width
                - parameters.avatar_padding)
                .max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn progress(values: &[f64]) -> Vec<Progress> {
        values.iter().copied().map(Progress::new).collect()
    }

    #[test]
    fn test_four_segments_with_twelve_degree_gap() {
        let arcs = compute_segment_arcs(4, 12.0, &progress(&[0.0; 4]));
        assert_eq!(arcs.len(), 4);
        assert!(arcs.iter().all(|a| (a.track_sweep_angle - 78.0).abs() < EPSILON));
        assert!((arcs[0].start_angle - -84.0).abs() < EPSILON);
        assert!((arcs[1].start_angle - 6.0).abs() < EPSILON);
        assert!((arcs[3].start_angle - 186.0).abs() < EPSILON);
    }

    #[test]
    fn test_zero_segments_is_empty() {
        assert!(compute_segment_arcs(0, 12.0, &[]).is_empty());
        assert!(arcs_for(&UiState::default()).is_empty());
    }

    #[test]
    fn test_tracks_and_gaps_cover_full_circle() {
        for count in 1..=24 {
            let per_segment = FULL_CIRCLE / count as f64;
            for gap in [0.0, 1.0, 6.5, 12.0, 32.0] {
                if gap >= per_segment {
                    continue;
                }
                let arcs = compute_segment_arcs(count, gap, &progress(&vec![0.5; count]));
                let total: f64 = arcs.iter().map(|a| a.track_sweep_angle).sum();
                assert!(
                    (total + gap * count as f64 - FULL_CIRCLE).abs() < 1e-6,
                    "count={count} gap={gap}"
                );
            }
        }
    }

    #[test]
    fn test_progress_sweep_within_track() {
        let values = [-1.0, 0.0, 0.3, 1.0, 2.5, f64::NAN];
        let arcs = compute_segment_arcs(values.len(), 8.0, &progress(&values));
        for arc in &arcs {
            assert!(arc.progress_sweep_angle >= 0.0);
            assert!(arc.progress_sweep_angle <= arc.track_sweep_angle);
        }
        assert_eq!(arcs[0].progress_sweep_angle, 0.0);
        assert_eq!(arcs[3].progress_sweep_angle, arcs[3].track_sweep_angle);
        assert_eq!(arcs[4].progress_sweep_angle, arcs[4].track_sweep_angle);
        assert!((arcs[2].progress_sweep_angle - arcs[2].track_sweep_angle * 0.3).abs() < EPSILON);
    }

    #[test]
    fn test_oversized_gap_draws_nothing() {
        let arcs = compute_segment_arcs(12, 40.0, &progress(&[1.0; 12]));
        assert!(
            arcs.iter()
                .all(|a| a.track_sweep_angle == 0.0 && a.progress_sweep_angle == 0.0)
        );
    }

    #[test]
    fn test_deterministic() {
        let input = progress(&[0.1, 0.7, 0.33]);
        assert_eq!(
            compute_segment_arcs(3, 5.0, &input),
            compute_segment_arcs(3, 5.0, &input)
        );
    }

    #[test]
    fn test_missing_progress_draws_empty() {
        let arcs = compute_segment_arcs(3, 0.0, &progress(&[1.0]));
        assert_eq!(arcs[0].progress_sweep_angle, 120.0);
        assert_eq!(arcs[1].progress_sweep_angle, 0.0);
        assert_eq!(arcs[2].progress_sweep_angle, 0.0);
    }

    #[test]
    fn test_single_segment_starts_at_top() {
        let arcs = compute_segment_arcs(1, 0.0, &progress(&[0.5]));
        assert_eq!(arcs[0].start_angle, -90.0);
        assert_eq!(arcs[0].track_sweep_angle, 360.0);
        assert_eq!(arcs[0].progress_sweep_angle, 180.0);
        assert!((arcs[0].start_radians() + std::f64::consts::FRAC_PI_2).abs() < EPSILON);
        assert!((arcs[0].progress_end_radians() - std::f64::consts::FRAC_PI_2).abs() < EPSILON);
    }

    #[test]
    fn test_ring_geometry_defaults() {
        let geometry = RingGeometry::new(&RingParameters::default());
        assert_eq!(geometry.canvas_size, 140.0);
        assert_eq!(geometry.center, 70.0);
        assert_eq!(geometry.arc_radius, 64.0);
        assert_eq!(geometry.avatar_diameter, 118.0);
    }

    #[test]
    fn test_ring_geometry_avatar_never_negative() {
        let parameters = RingParameters {
            avatar_size: 10.0,
            avatar_padding: 24.0,
            stroke_width: 16.0,
            gap_angle: 1.0,
        };
        assert_eq!(RingGeometry::new(&parameters).avatar_diameter, 0.0);
    }
}
