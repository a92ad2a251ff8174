use crate::store::StoreError;
use derive_more::{Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use std::cmp::Ordering;
use std::ops::RangeInclusive;
use strum::{Display as StrumDisplay, EnumIter, EnumString};

/// Completion of a single segment. Nominally `0.0..=1.0`, but stored as given.
#[derive(
    Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize, Display, Deref, From,
    Into,
)]
#[serde(transparent)]
pub struct Progress(f64);

impl Progress {
    pub const EMPTY: Self = Self(0.0);
    pub const FULL: Self = Self(1.0);

    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// The fraction actually drawn. NaN draws as empty.
    pub fn clamped(self) -> f64 {
        if self.0.is_nan() {
            0.0
        } else {
            self.0.clamp(0.0, 1.0)
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    #[strum(to_string = "avatar_size", serialize = "size")]
    AvatarSize,
    #[strum(to_string = "avatar_padding", serialize = "padding")]
    AvatarPadding,
    #[strum(to_string = "stroke_width", serialize = "stroke", serialize = "width")]
    StrokeWidth,
    #[strum(to_string = "gap_angle", serialize = "gap")]
    GapAngle,
}

impl Parameter {
    /// Slider range suggested to the presentation layer. Not enforced by the store.
    pub fn bounds(&self) -> RangeInclusive<f64> {
        match self {
            Self::AvatarSize => 48.0..=256.0,
            Self::AvatarPadding => 4.0..=24.0,
            Self::StrokeWidth => 4.0..=16.0,
            Self::GapAngle => 1.0..=32.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AvatarSize => "Avatar size",
            Self::AvatarPadding => "Avatar padding",
            Self::StrokeWidth => "Segment width",
            Self::GapAngle => "Segment gap",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingParameters {
    pub avatar_size: f64,
    pub avatar_padding: f64,
    pub stroke_width: f64,
    /// Degrees between adjacent segments.
    pub gap_angle: f64,
}

impl Default for RingParameters {
    fn default() -> Self {
        Self {
            avatar_size: 128.0,
            avatar_padding: 4.0,
            stroke_width: 6.0,
            gap_angle: 12.0,
        }
    }
}

impl RingParameters {
    pub fn get(&self, which: Parameter) -> f64 {
        match which {
            Parameter::AvatarSize => self.avatar_size,
            Parameter::AvatarPadding => self.avatar_padding,
            Parameter::StrokeWidth => self.stroke_width,
            Parameter::GapAngle => self.gap_angle,
        }
    }

    pub fn with(mut self, which: Parameter, value: f64) -> Self {
        let field = match which {
            Parameter::AvatarSize => &mut self.avatar_size,
            Parameter::AvatarPadding => &mut self.avatar_padding,
            Parameter::StrokeWidth => &mut self.stroke_width,
            Parameter::GapAngle => &mut self.gap_angle,
        };
        *field = value;
        self
    }
}

/// One immutable snapshot of everything the front-end observes.
///
/// Transitions never touch `self`; each returns the next snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UiState {
    pub progress: Vec<Progress>,
    pub total_progress: f64,
    pub aggregate_mode: bool,
    pub parameters: RingParameters,
}

impl UiState {
    pub fn new(parameters: RingParameters) -> Self {
        Self {
            parameters,
            ..Self::default()
        }
    }

    pub fn segment_count(&self) -> usize {
        self.progress.len()
    }

    pub fn with_segments_added(&self, values: &[Progress]) -> Self {
        let mut progress = Vec::with_capacity(self.progress.len() + values.len());
        progress.extend_from_slice(&self.progress);
        progress.extend_from_slice(values);
        Self {
            progress,
            ..self.clone()
        }
    }

    pub fn with_segment(&self, index: usize, value: Progress) -> Result<Self, StoreError> {
        let len = self.progress.len();
        if index >= len {
            return Err(StoreError::IndexOutOfRange { index, len });
        }

        let mut progress = self.progress.clone();
        progress[index] = value;
        Ok(Self {
            progress,
            ..self.clone()
        })
    }

    /// Rebuilds the whole list from a single total. Manual per-segment values are lost.
    pub fn with_aggregate_progress(&self, total: f64) -> Self {
        if self.progress.is_empty() {
            return self.clone();
        }

        Self {
            progress: decompose_total(self.progress.len(), total),
            total_progress: total,
            ..self.clone()
        }
    }

    pub fn with_aggregate_mode(&self, enabled: bool) -> Self {
        Self {
            aggregate_mode: enabled,
            total_progress: 0.0,
            ..self.clone()
        }
        .with_aggregate_progress(0.0)
    }

    pub fn with_parameter(&self, which: Parameter, value: f64) -> Self {
        self.with_parameters(self.parameters.with(which, value))
    }

    pub fn with_parameters(&self, parameters: RingParameters) -> Self {
        Self {
            parameters,
            ..self.clone()
        }
    }
}

/// Splits `total` into whole segments filled to 1.0, one partial segment, and zeros.
///
/// Negative totals fill nothing and leave the (negative) remainder on the first segment.
pub fn decompose_total(segment_count: usize, total: f64) -> Vec<Progress> {
    let whole = total.max(0.0).floor();
    let partial = total - whole;
    let full = whole as usize;

    (0..segment_count)
        .map(|i| match i.cmp(&full) {
            Ordering::Less => Progress::FULL,
            Ordering::Equal => Progress::new(partial),
            Ordering::Greater => Progress::EMPTY,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(values: &[f64]) -> UiState {
        UiState {
            progress: values.iter().copied().map(Progress::new).collect(),
            ..UiState::default()
        }
    }

    fn values(state: &UiState) -> Vec<f64> {
        state.progress.iter().map(|p| **p).collect()
    }

    #[test]
    fn test_aggregate_fills_whole_then_partial() {
        let state = state_with(&[0.0, 0.0, 0.0]).with_aggregate_progress(1.5);
        assert_eq!(values(&state), vec![1.0, 0.5, 0.0]);
        assert_eq!(state.total_progress, 1.5);
    }

    #[test]
    fn test_aggregate_zero_clears_everything() {
        let state = state_with(&[1.0, 1.0, 1.0]).with_aggregate_progress(0.0);
        assert_eq!(values(&state), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_aggregate_overwrites_manual_values() {
        let state = state_with(&[0.2, 0.9, 0.7]).with_aggregate_progress(1.25);
        assert_eq!(values(&state), vec![1.0, 0.25, 0.0]);
    }

    #[test]
    fn test_aggregate_at_and_beyond_segment_count() {
        assert_eq!(
            values(&state_with(&[0.0, 0.0]).with_aggregate_progress(2.0)),
            vec![1.0, 1.0]
        );
        assert_eq!(
            values(&state_with(&[0.0, 0.0]).with_aggregate_progress(7.5)),
            vec![1.0, 1.0]
        );
    }

    #[test]
    fn test_aggregate_on_empty_list_is_noop() {
        let state = UiState::default();
        let next = state.with_aggregate_progress(2.0);
        assert_eq!(next, state);
        assert_eq!(next.total_progress, 0.0);
    }

    #[test]
    fn test_aggregate_negative_total() {
        let state = state_with(&[0.5, 0.5]).with_aggregate_progress(-0.25);
        assert_eq!(values(&state), vec![-0.25, 0.0]);
    }

    #[test]
    fn test_aggregate_mode_resets_total_and_list() {
        let state = state_with(&[0.3, 0.6]).with_aggregate_progress(1.5);
        let next = state.with_aggregate_mode(true);
        assert!(next.aggregate_mode);
        assert_eq!(next.total_progress, 0.0);
        assert_eq!(values(&next), vec![0.0, 0.0]);

        let back = next.with_aggregate_mode(false);
        assert!(!back.aggregate_mode);
        assert_eq!(values(&back), vec![0.0, 0.0]);
    }

    #[test]
    fn test_set_segment_out_of_range() {
        let state = state_with(&[0.0, 0.0, 0.0]);
        let err = state.with_segment(5, Progress::new(0.3)).unwrap_err();
        assert_eq!(err, StoreError::IndexOutOfRange { index: 5, len: 3 });
    }

    #[test]
    fn test_set_segment_keeps_value_unclamped() {
        let state = state_with(&[0.0, 0.0])
            .with_segment(1, Progress::new(1.7))
            .unwrap();
        assert_eq!(values(&state), vec![0.0, 1.7]);
    }

    #[test]
    fn test_parameter_update_touches_one_field() {
        let state = state_with(&[0.4]).with_parameter(Parameter::GapAngle, 20.0);
        assert_eq!(state.parameters.gap_angle, 20.0);
        assert_eq!(
            state.parameters.with(Parameter::GapAngle, 12.0),
            RingParameters::default()
        );
        assert_eq!(values(&state), vec![0.4]);
    }

    #[test]
    fn test_parameter_parsing() {
        let cases = vec![
            ("avatar_size", Parameter::AvatarSize),
            ("SIZE", Parameter::AvatarSize),
            ("padding", Parameter::AvatarPadding),
            ("stroke", Parameter::StrokeWidth),
            ("Stroke_Width", Parameter::StrokeWidth),
            ("gap", Parameter::GapAngle),
        ];

        for (input, expected) in cases {
            assert_eq!(input.parse::<Parameter>().unwrap(), expected);
        }
        assert_eq!(Parameter::GapAngle.to_string(), "gap_angle");
        assert!("radius".parse::<Parameter>().is_err());
    }

    #[test]
    fn test_progress_clamping() {
        assert_eq!(Progress::new(-0.5).clamped(), 0.0);
        assert_eq!(Progress::new(0.25).clamped(), 0.25);
        assert_eq!(Progress::new(3.0).clamped(), 1.0);
        assert_eq!(Progress::new(f64::NAN).clamped(), 0.0);
    }

    #[test]
    fn test_decompose_total_many_segments() {
        let progress = decompose_total(100_000, 5.25);
        assert_eq!(progress.len(), 100_000);
        assert!(progress[..5].iter().all(|p| *p == Progress::FULL));
        assert_eq!(progress[5], Progress::new(0.25));
        assert!(progress[6..].iter().all(|p| *p == Progress::EMPTY));
    }

    #[test]
    fn test_segments_added_keep_existing_values() {
        let state = state_with(&[0.7]).with_segments_added(&[Progress::EMPTY, Progress::FULL]);
        assert_eq!(values(&state), vec![0.7, 0.0, 1.0]);
    }
}
