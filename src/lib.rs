//! Identity-stable tracking of 2D point sets.
//!
//! Assigns a stable integer identity to each of a varying number of 2D points
//! observed once per frame (e.g. blob centroids from a detector), so that
//! downstream consumers can refer to "the same point" across time despite
//! points appearing, vanishing or being re-ordered between frames.
//!
//! Per frame the tracker extrapolates every track from its 3-deep position
//! history (constant, linear or quadratic depending on how many real updates
//! the track has absorbed), builds a Euclidean cost matrix between predicted
//! and observed positions, solves a minimum cost perfect matching and
//! reconciles the track-set size against the observation count, creating and
//! retiring identities as points appear and vanish.
//!
//! # Examples
//!
//! ```
//! use postrack_rs::Tracker;
//!
//! let mut tracker = Tracker::<f32>::default();
//!
//! // first frame: two points
//! tracker.update(&[0.0, 10.0], &[0.0, 10.0]).unwrap();
//!
//! // second frame: both points moved, arriving in swapped order
//! tracker.update(&[9.0, 1.0], &[9.0, 1.0]).unwrap();
//!
//! for track in tracker.tracks() {
//!     println!(
//!         "{} {:?} {}",
//!         track.track_id(),
//!         track.position(),
//!         track.hits(),
//!     );
//! }
//!
//! // the identities assigned on the first frame are preserved
//! assert_eq!(tracker.identity_at(1.0, 1.0), Some(0));
//! assert_eq!(tracker.identity_at(9.0, 9.0), Some(1));
//! ```

pub mod error;
pub mod euclidean_matching;
pub mod extrapolation;
pub mod linear_assignment;
pub mod track;
pub mod tracker;

pub use error::{Error, Result};
pub use track::{History, Track, HISTORY_DEPTH};
pub use tracker::{Tracker, TrackerConfig};
