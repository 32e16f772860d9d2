use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the tracker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The two coordinate slices passed to a frame update differ in length.
    /// The frame is rejected before any mutation, so the tracker remains
    /// valid for the next call.
    #[error("coordinate slices differ in length: {xs} xs vs {ys} ys")]
    MismatchedInput { xs: usize, ys: usize },

    /// The assignment solver produced something other than a permutation.
    /// Applying it would break identity stability, so the frame is rejected.
    #[error("assignment of length {len} is not a permutation of 0..{expected}")]
    InvalidAssignment { len: usize, expected: usize },

    /// While growing the track set, the number of observations claimed by the
    /// temporary slots did not equal the number of tracks to create.
    #[error("expected {expected} new tracks but the assignment claimed {actual} observations")]
    NewTrackMismatch { expected: usize, actual: usize },
}
