use crate::extrapolation;
use num_traits::Float;

/// Number of position samples retained per axis for every track.
pub const HISTORY_DEPTH: usize = 3;

/// Rolling window of the last [`HISTORY_DEPTH`] positions of one track,
/// oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct History<T> {
    /// x samples, oldest first.
    xs: [T; HISTORY_DEPTH],
    /// y samples, oldest first.
    ys: [T; HISTORY_DEPTH],
}

impl<T: Float> History<T> {
    /// Returns a History with every slot seeded from a single position.
    pub fn seeded(x: T, y: T) -> History<T> {
        History {
            xs: [x; HISTORY_DEPTH],
            ys: [y; HISTORY_DEPTH],
        }
    }

    /// Appends a position as the newest sample and drops the oldest, per axis.
    pub fn shift_in(&mut self, x: T, y: T) {
        self.xs.rotate_left(1);
        self.ys.rotate_left(1);
        self.xs[HISTORY_DEPTH - 1] = x;
        self.ys[HISTORY_DEPTH - 1] = y;
    }

    /// Returns the newest sample
    pub fn newest(&self) -> (T, T) {
        (self.xs[HISTORY_DEPTH - 1], self.ys[HISTORY_DEPTH - 1])
    }

    /// Returns the x window, oldest first
    pub fn xs(&self) -> &[T; HISTORY_DEPTH] {
        &self.xs
    }

    /// Returns the y window, oldest first
    pub fn ys(&self) -> &[T; HISTORY_DEPTH] {
        &self.ys
    }
}

/// A single followed point: a stable identity plus its short position history.
#[derive(Debug, Clone, PartialEq)]
pub struct Track<T> {
    /// A unique track identifier, stable for the lifetime of the track.
    track_id: usize,
    /// Rolling position history.
    history: History<T>,
    /// Number of consecutive real updates this track has absorbed. Governs the
    /// extrapolation order used when predicting the next position.
    hits: usize,
}

impl<T: Float> Track<T> {
    /// Returns a new Track with its history seeded from the first observation.
    pub(crate) fn new(track_id: usize, x: T, y: T) -> Track<T> {
        Track {
            track_id,
            history: History::seeded(x, y),
            hits: 1,
        }
    }

    /// Returns the identifier of the track
    pub fn track_id(&self) -> usize {
        self.track_id
    }

    /// Returns the newest known position of the track
    pub fn position(&self) -> (T, T) {
        self.history.newest()
    }

    /// Returns the number of consecutive updates the track has absorbed
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Returns the position history of the track
    pub fn history(&self) -> &History<T> {
        &self.history
    }

    /// Extrapolates the position this track is expected to occupy in the next
    /// frame, independently per axis.
    pub fn predicted_position(&self) -> (T, T) {
        (
            extrapolation::next_position(self.history.xs(), self.hits),
            extrapolation::next_position(self.history.ys(), self.hits),
        )
    }

    /// Absorbs the observation assigned to this track for the current frame.
    pub(crate) fn absorb(&mut self, x: T, y: T) {
        self.history.shift_in(x, y);
        self.hits += 1;
    }
}
