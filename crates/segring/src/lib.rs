//! Geometry and state for a segmented progress ring drawn around an avatar.
//!
//! [`layout`] turns a progress list into arc draw instructions; [`store`] owns the
//! progress list and ring parameters and publishes immutable [`state::UiState`] snapshots.

pub mod config;
pub mod layout;
pub mod state;
pub mod store;

pub use layout::{RingGeometry, SegmentArc, arcs_for, compute_segment_arcs};
pub use state::{Parameter, Progress, RingParameters, UiState};
pub use store::{ProgressStore, StoreError, Subscription};
