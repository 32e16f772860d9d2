use std::collections::HashSet;

use log::{debug, trace};
use num_traits::Float;

use crate::error::{Error, Result};
use crate::track::Track;
use crate::{euclidean_matching, linear_assignment};

/// Default sentinel coordinate, far outside any practical detector range.
const DEFAULT_BLIND_VALUE: f64 = 9999.0;

/// Per-instance tracker configuration.
#[derive(Debug, Clone)]
pub struct TrackerConfig<T> {
    /// Sentinel coordinate used only to pad the cost matrix to a square shape
    /// when track and observation counts differ. Must lie outside the range a
    /// real detector can produce, or padded entries would compete with real
    /// observations during matching.
    blind_value: T,
}

impl<T: Float> TrackerConfig<T> {
    /// Returns a new TrackerConfig
    ///
    /// # Parameters
    ///
    /// * `blind_value`: Sentinel padding coordinate (see [`TrackerConfig`]).
    pub fn new(blind_value: T) -> TrackerConfig<T> {
        TrackerConfig { blind_value }
    }

    /// Returns the sentinel padding coordinate
    pub fn blind_value(&self) -> T {
        self.blind_value
    }
}

/// The default sentinel coordinate is 9999.
///
/// Panics if `T` cannot represent 9999 (`T::from` returns `None`); for such a
/// coordinate type construct the configuration with [`TrackerConfig::new`]
/// and a representable sentinel instead. `f32` and `f64` represent it exactly.
impl<T: Float> Default for TrackerConfig<T> {
    fn default() -> Self {
        Self::new(T::from(DEFAULT_BLIND_VALUE).unwrap())
    }
}

/// Assigns a stable integer identity to each of a varying number of 2D points
/// observed once per frame, so that downstream consumers can refer to "the
/// same point" across time despite points appearing, vanishing or being
/// re-ordered between frames.
///
/// Each frame the tracker extrapolates every track from its short history,
/// matches predictions against the new observations with a minimum cost
/// assignment and reconciles the track-set size against the observation
/// count. Single-threaded and synchronous; every update runs to completion
/// and mutates the track store in place.
///
/// # Examples
///
/// ```
/// use postrack_rs::Tracker;
///
/// let mut tracker = Tracker::<f32>::default();
///
/// // first frame: two points
/// tracker.update(&[0.0, 10.0], &[0.0, 10.0]).unwrap();
///
/// // second frame: both points moved and arrive in swapped order
/// tracker.update(&[9.0, 1.0], &[9.0, 1.0]).unwrap();
///
/// // the identities assigned on the first frame are preserved
/// assert_eq!(tracker.identity_at(1.0, 1.0), Some(0));
/// assert_eq!(tracker.identity_at(9.0, 9.0), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct Tracker<T> {
    /// Instance configuration.
    config: TrackerConfig<T>,
    /// The list of live tracks, one per observation of the last applied frame.
    tracks: Vec<Track<T>>,
    /// Observation index → track index assignment of the last applied frame.
    current_assignment: Vec<usize>,
}

impl<T: Float> Default for Tracker<T> {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl<T: Float> Tracker<T> {
    /// Returns a new Tracker
    ///
    /// # Parameters
    ///
    /// * `config`: Instance configuration.
    pub fn new(config: TrackerConfig<T>) -> Tracker<T> {
        Tracker {
            config,
            tracks: vec![],
            current_assignment: vec![],
        }
    }

    /// Returns the configuration of the tracker
    pub fn config(&self) -> &TrackerConfig<T> {
        &self.config
    }

    /// Returns the live tracks, one per observation of the last applied frame.
    ///
    /// Iteration order is not guaranteed stable across frames; the track
    /// identity is the only stable handle.
    pub fn tracks(&self) -> &[Track<T>] {
        &self.tracks
    }

    /// Returns the observation index → track index assignment computed for the
    /// last applied frame. On shrink frames the trailing sentinel rows are
    /// included and refer to track indices as they were before retirement.
    ///
    /// A first frame (including the one after an empty frame cleared the
    /// track set) runs no matching; its assignment is the identity
    /// permutation, synthesized to mirror the track creation order.
    pub fn current_assignment(&self) -> &[usize] {
        &self.current_assignment
    }

    /// Ingests one frame of observed positions and reconciles the track set.
    ///
    /// The two slices carry the x and y coordinates of the same points; no
    /// correlation with the previous frame's ordering is assumed. On success
    /// the live-track count equals `xs.len()`: tracks are created for excess
    /// observations and retired for missing ones, all other tracks absorb the
    /// observation matched to them.
    ///
    /// An empty frame is valid and retires every track; the next non-empty
    /// frame then starts identity numbering from the lowest unused integer
    /// again.
    ///
    /// # Errors
    ///
    /// [`Error::MismatchedInput`] when the slices differ in length, returned
    /// before any mutation. [`Error::InvalidAssignment`] and
    /// [`Error::NewTrackMismatch`] signal internal inconsistencies and are
    /// likewise raised before the frame is applied.
    pub fn update(&mut self, xs: &[T], ys: &[T]) -> Result<()> {
        if xs.len() != ys.len() {
            return Err(Error::MismatchedInput {
                xs: xs.len(),
                ys: ys.len(),
            });
        }
        let observations: Vec<(T, T)> = xs.iter().copied().zip(ys.iter().copied()).collect();

        if self.tracks.is_empty() {
            self.apply_first_frame(&observations);
            return Ok(());
        }
        if observations.len() == self.tracks.len() {
            self.apply_balanced(&observations)
        } else if observations.len() < self.tracks.len() {
            self.apply_shrink(&observations)
        } else {
            self.apply_grow(&observations)
        }
    }

    /// Ingests one frame given as an interleaved `[x0, y0, x1, y1, ..]` buffer.
    ///
    /// # Errors
    ///
    /// As for [`Tracker::update`]; an odd buffer length is a mismatched input.
    pub fn update_interleaved(&mut self, xys: &[T]) -> Result<()> {
        if xys.len() % 2 != 0 {
            return Err(Error::MismatchedInput {
                xs: xys.len() / 2 + 1,
                ys: xys.len() / 2,
            });
        }
        let xs: Vec<T> = xys.iter().step_by(2).copied().collect();
        let ys: Vec<T> = xys.iter().skip(1).step_by(2).copied().collect();
        self.update(&xs, &ys)
    }

    /// Returns the identity of the track whose newest position equals the
    /// given coordinates exactly, if any.
    ///
    /// When several tracks share one position the first in iteration order
    /// wins; this is a limitation of the exact-coordinate lookup convenience,
    /// not of the matching itself.
    pub fn identity_at(&self, x: T, y: T) -> Option<usize> {
        self.tracks
            .iter()
            .find(|track| track.position() == (x, y))
            .map(Track::track_id)
    }

    /// Creates one track per observation with identities `0..n`, valid only
    /// while no tracks exist. No matching runs; the recorded assignment is
    /// the identity permutation.
    fn apply_first_frame(&mut self, observations: &[(T, T)]) {
        self.tracks = observations
            .iter()
            .enumerate()
            .map(|(id, &(x, y))| Track::new(id, x, y))
            .collect();
        self.current_assignment = (0..observations.len()).collect();
        debug!("first frame: created {} tracks", self.tracks.len());
    }

    /// Track count equals the observation count: match and update in place.
    fn apply_balanced(&mut self, observations: &[(T, T)]) -> Result<()> {
        let predictions: Vec<(T, T)> = self
            .tracks
            .iter()
            .map(Track::predicted_position)
            .collect();
        let cost = euclidean_matching::distance_matrix(&predictions, observations);
        let assignment = linear_assignment::minimum_cost_assignment(&cost);
        self.ensure_permutation(&assignment, self.tracks.len())?;
        trace!("balanced assignment: {assignment:?}");

        for (obs_idx, &track_idx) in assignment.iter().enumerate() {
            let (x, y) = observations[obs_idx];
            self.tracks[track_idx].absorb(x, y);
        }
        self.current_assignment = assignment;
        debug!("balanced frame: updated {} tracks", self.tracks.len());
        Ok(())
    }

    /// Fewer observations than tracks: pad the observation side with sentinel
    /// entries; tracks claimed by a sentinel row are retired.
    fn apply_shrink(&mut self, observations: &[(T, T)]) -> Result<()> {
        let track_count = self.tracks.len();
        let blind = self.config.blind_value;

        let mut padded = observations.to_vec();
        padded.resize(track_count, (blind, blind));

        let predictions: Vec<(T, T)> = self
            .tracks
            .iter()
            .map(Track::predicted_position)
            .collect();
        let cost = euclidean_matching::distance_matrix(&predictions, &padded);
        let assignment = linear_assignment::minimum_cost_assignment(&cost);
        self.ensure_permutation(&assignment, track_count)?;
        trace!("shrink assignment: {assignment:?}");

        // Build the surviving track list in a fresh buffer straight from the
        // permutation, then swap it in; only real observation rows claim a
        // track, so sentinel-matched tracks fall away.
        let mut claimed: Vec<Option<(T, T)>> = vec![None; track_count];
        for (obs_idx, &track_idx) in assignment.iter().take(observations.len()).enumerate() {
            claimed[track_idx] = Some(observations[obs_idx]);
        }
        let previous = std::mem::take(&mut self.tracks);
        self.tracks = previous
            .into_iter()
            .zip(claimed)
            .filter_map(|(mut track, observation)| {
                observation.map(|(x, y)| {
                    track.absorb(x, y);
                    track
                })
            })
            .collect();
        self.current_assignment = assignment;
        debug!(
            "shrink frame: retired {} of {} tracks",
            track_count - self.tracks.len(),
            track_count
        );
        Ok(())
    }

    /// More observations than tracks: pad the predicted side with sentinel
    /// slots; observations claimed by a sentinel slot become new tracks with
    /// the lowest unused identities.
    fn apply_grow(&mut self, observations: &[(T, T)]) -> Result<()> {
        let track_count = self.tracks.len();
        let growth = observations.len() - track_count;
        let blind = self.config.blind_value;

        let mut predictions: Vec<(T, T)> = self
            .tracks
            .iter()
            .map(Track::predicted_position)
            .collect();
        predictions.resize(observations.len(), (blind, blind));

        let cost = euclidean_matching::distance_matrix(&predictions, observations);
        let assignment = linear_assignment::minimum_cost_assignment(&cost);
        self.ensure_permutation(&assignment, observations.len())?;
        trace!("grow assignment: {assignment:?}");

        // Plan the whole frame before touching the track store so an
        // inconsistent assignment leaves the state untouched.
        let mut spawned: Vec<(T, T)> = vec![];
        for (obs_idx, &track_idx) in assignment.iter().enumerate() {
            if track_idx >= track_count {
                spawned.push(observations[obs_idx]);
            }
        }
        if spawned.len() != growth {
            return Err(Error::NewTrackMismatch {
                expected: growth,
                actual: spawned.len(),
            });
        }

        for (obs_idx, &track_idx) in assignment.iter().enumerate() {
            if track_idx < track_count {
                let (x, y) = observations[obs_idx];
                self.tracks[track_idx].absorb(x, y);
            }
        }
        let new_ids = self.lowest_unused_ids(growth);
        for ((x, y), id) in spawned.into_iter().zip(new_ids) {
            self.tracks.push(Track::new(id, x, y));
        }
        self.current_assignment = assignment;
        debug!(
            "grow frame: created {} tracks, {} total",
            growth,
            self.tracks.len()
        );
        Ok(())
    }

    /// Allocates `count` identities using the lowest-unused-integer rule, in
    /// ascending order.
    fn lowest_unused_ids(&self, count: usize) -> Vec<usize> {
        let live: HashSet<usize> = self.tracks.iter().map(Track::track_id).collect();
        let mut ids = Vec::with_capacity(count);
        let mut candidate = 0;
        while ids.len() < count {
            if !live.contains(&candidate) {
                ids.push(candidate);
            }
            candidate += 1;
        }
        ids
    }

    /// Rejects a solver output that is not a permutation of `0..expected`.
    fn ensure_permutation(&self, assignment: &[usize], expected: usize) -> Result<()> {
        if assignment.len() != expected || !linear_assignment::is_permutation(assignment) {
            return Err(Error::InvalidAssignment {
                len: assignment.len(),
                expected,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    fn sorted_ids(tracker: &Tracker<f64>) -> Vec<usize> {
        tracker
            .tracks()
            .iter()
            .map(Track::track_id)
            .sorted()
            .collect()
    }

    #[test]
    fn first_frame_creates_one_track_per_point() {
        // scenario: two points on the very first frame
        let mut tracker = Tracker::<f64>::default();
        tracker.update(&[0.0, 10.0], &[0.0, 10.0]).unwrap();

        assert_eq!(sorted_ids(&tracker), vec![0, 1]);
        assert!(tracker.tracks().iter().all(|track| track.hits() == 1));
        assert_eq!(tracker.identity_at(0.0, 0.0), Some(0));
        assert_eq!(tracker.identity_at(10.0, 10.0), Some(1));
        // no matching ran; the assignment is the synthesized identity
        assert_eq!(tracker.current_assignment(), &[0, 1]);
    }

    #[test]
    fn identities_follow_moving_points() {
        // scenario: both points move towards the centre on the second frame
        let mut tracker = Tracker::<f64>::default();
        tracker.update(&[0.0, 10.0], &[0.0, 10.0]).unwrap();
        tracker.update(&[1.0, 9.0], &[1.0, 9.0]).unwrap();

        assert_eq!(sorted_ids(&tracker), vec![0, 1]);
        assert!(tracker.tracks().iter().all(|track| track.hits() == 2));
        assert_eq!(tracker.identity_at(1.0, 1.0), Some(0));
        assert_eq!(tracker.identity_at(9.0, 9.0), Some(1));
    }

    #[test]
    fn shrink_retires_the_unmatched_track() {
        // scenario: third frame carries a single point near track 0's path
        let mut tracker = Tracker::<f64>::default();
        tracker.update(&[0.0, 10.0], &[0.0, 10.0]).unwrap();
        tracker.update(&[1.0, 9.0], &[1.0, 9.0]).unwrap();
        tracker.update(&[2.0], &[2.0]).unwrap();

        assert_eq!(tracker.tracks().len(), 1);
        let survivor = &tracker.tracks()[0];
        assert_eq!(survivor.track_id(), 0);
        assert_eq!(survivor.hits(), 3);
        assert_eq!(survivor.position(), (2.0, 2.0));
    }

    #[test]
    fn empty_frame_retires_every_track_and_numbering_restarts() {
        let mut tracker = Tracker::<f64>::default();
        tracker.update(&[0.0, 10.0], &[0.0, 10.0]).unwrap();
        tracker.update(&[], &[]).unwrap();
        assert!(tracker.tracks().is_empty());

        // the next frame behaves like a fresh first frame
        tracker.update(&[5.0], &[5.0]).unwrap();
        assert_eq!(sorted_ids(&tracker), vec![0]);
        assert_eq!(tracker.tracks()[0].hits(), 1);
    }

    #[test]
    fn grow_allocates_lowest_unused_identities() {
        // points on the x axis, well clear of the sentinel diagonal so every
        // matching decision carries a comfortable cost margin
        let mut tracker = Tracker::<f64>::default();
        tracker
            .update(&[0.0, 100.0, 200.0], &[0.0, 0.0, 0.0])
            .unwrap();

        // drop the middle point; its identity 1 is retired
        tracker.update(&[0.0, 200.0], &[0.0, 0.0]).unwrap();
        assert_eq!(sorted_ids(&tracker), vec![0, 2]);

        // a new point appears; it must reuse identity 1
        tracker
            .update(&[0.0, 200.0, 400.0], &[0.0, 0.0, 0.0])
            .unwrap();
        assert_eq!(sorted_ids(&tracker), vec![0, 1, 2]);
        assert_eq!(tracker.identity_at(400.0, 0.0), Some(1));

        let spawned = tracker
            .tracks()
            .iter()
            .find(|track| track.track_id() == 1)
            .unwrap();
        assert_eq!(spawned.hits(), 1);
    }

    #[test]
    fn track_count_always_equals_observation_count() {
        let mut tracker = Tracker::<f64>::default();
        let mut rng = Pcg32::seed_from_u64(11);

        for frame in 0..50 {
            let n = rng.gen_range(0..12usize);
            let xs: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..500.0)).collect();
            let ys: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..500.0)).collect();
            tracker.update(&xs, &ys).unwrap();

            assert_eq!(tracker.tracks().len(), n, "frame {frame}");
            // identities stay pairwise distinct
            let ids = sorted_ids(&tracker);
            assert!(ids.iter().tuple_windows().all(|(a, b)| a < b));
        }
    }

    #[test]
    fn conservation_of_tracks_across_size_changes() {
        let mut tracker = Tracker::<f64>::default();
        tracker
            .update(&[0.0, 100.0, 200.0, 300.0, 400.0], &[0.0; 5])
            .unwrap();
        let before = sorted_ids(&tracker);

        // shrink by two: exactly two identities disappear, none appear
        tracker.update(&[0.0, 100.0, 200.0], &[0.0; 3]).unwrap();
        let after_shrink = sorted_ids(&tracker);
        assert_eq!(after_shrink.len(), 3);
        assert!(after_shrink.iter().all(|id| before.contains(id)));

        // grow by three: exactly three new identities, survivors kept
        tracker
            .update(&[0.0, 100.0, 200.0, 500.0, 600.0, 700.0], &[0.0; 6])
            .unwrap();
        let after_grow = sorted_ids(&tracker);
        assert_eq!(after_grow.len(), 6);
        assert!(after_shrink.iter().all(|id| after_grow.contains(id)));
    }

    #[test]
    fn static_input_reaches_identity_assignment() {
        let xs = [0.0, 10.0, 20.0];
        let ys = [5.0, 15.0, 25.0];
        let mut tracker = Tracker::<f64>::default();
        for _ in 0..5 {
            tracker.update(&xs, &ys).unwrap();
        }

        // with hits >= 3 the prediction equals the observation exactly, so
        // the matching degenerates to the identity permutation
        assert_eq!(tracker.current_assignment(), &[0, 1, 2]);
        for track in tracker.tracks() {
            assert_eq!(track.predicted_position(), track.position());
            assert_eq!(track.hits(), 5);
        }
    }

    #[test]
    fn identical_inputs_yield_identical_states() {
        let mut rng = Pcg32::seed_from_u64(99);
        let frames: Vec<(Vec<f64>, Vec<f64>)> = (0..20)
            .map(|_| {
                let n = rng.gen_range(1..8usize);
                (
                    (0..n).map(|_| rng.gen_range(0.0..300.0)).collect(),
                    (0..n).map(|_| rng.gen_range(0.0..300.0)).collect(),
                )
            })
            .collect();

        let mut a = Tracker::<f64>::default();
        let mut b = Tracker::<f64>::default();
        for (xs, ys) in &frames {
            a.update(xs, ys).unwrap();
            b.update(xs, ys).unwrap();
        }

        assert_eq!(a.tracks(), b.tracks());
        assert_eq!(a.current_assignment(), b.current_assignment());
    }

    #[test]
    fn mismatched_input_is_rejected_without_mutation() {
        let mut tracker = Tracker::<f64>::default();
        tracker.update(&[0.0, 10.0], &[0.0, 10.0]).unwrap();
        let snapshot = tracker.tracks().to_vec();

        let err = tracker.update(&[1.0], &[1.0, 2.0]).unwrap_err();
        assert_eq!(err, Error::MismatchedInput { xs: 1, ys: 2 });
        assert_eq!(tracker.tracks(), snapshot.as_slice());

        // the tracker remains usable
        tracker.update(&[1.0, 9.0], &[1.0, 9.0]).unwrap();
        assert_eq!(tracker.tracks().len(), 2);
    }

    #[test]
    fn interleaved_input_matches_split_input() {
        let mut split = Tracker::<f64>::default();
        let mut interleaved = Tracker::<f64>::default();

        split.update(&[1.0, 3.0], &[2.0, 4.0]).unwrap();
        interleaved.update_interleaved(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(split.tracks(), interleaved.tracks());

        let err = interleaved.update_interleaved(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err, Error::MismatchedInput { xs: 2, ys: 1 });
    }

    #[test]
    fn identity_lookup_misses_return_none() {
        let mut tracker = Tracker::<f64>::default();
        tracker.update(&[0.0], &[0.0]).unwrap();
        assert_eq!(tracker.identity_at(1.0, 0.0), None);
        assert_eq!(Tracker::<f64>::default().identity_at(0.0, 0.0), None);
    }

    #[test]
    fn extrapolation_guides_matching_through_a_crossing() {
        // two points on straight paths that swap sides between frames; with
        // linear prediction each keeps its identity through the crossing
        let mut tracker = Tracker::<f64>::default();
        tracker.update(&[0.0, 100.0], &[0.0, 0.0]).unwrap();
        tracker.update(&[20.0, 80.0], &[0.0, 0.0]).unwrap();
        tracker.update(&[40.0, 60.0], &[0.0, 0.0]).unwrap();
        tracker.update(&[60.0, 40.0], &[0.0, 0.0]).unwrap();
        tracker.update(&[80.0, 20.0], &[0.0, 0.0]).unwrap();

        assert_eq!(tracker.identity_at(80.0, 0.0), Some(0));
        assert_eq!(tracker.identity_at(20.0, 0.0), Some(1));
    }

    #[test]
    fn custom_blind_value_is_used_for_padding() {
        let config = TrackerConfig::new(-1.0e6);
        let mut tracker = Tracker::new(config);
        tracker.update(&[0.0, 100.0], &[0.0, 0.0]).unwrap();
        tracker.update(&[0.0], &[0.0]).unwrap();

        assert_eq!(tracker.tracks().len(), 1);
        assert_eq!(tracker.tracks()[0].track_id(), 0);
        assert_eq!(tracker.config().blind_value(), -1.0e6);
    }

    #[test]
    fn default_config_uses_the_documented_sentinel() {
        assert_eq!(TrackerConfig::<f64>::default().blind_value(), 9999.0);
        assert_eq!(TrackerConfig::<f32>::default().blind_value(), 9999.0);
    }
}
