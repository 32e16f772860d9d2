use ndarray::Array2;
use num_traits::Float;

/// Builds the square cost matrix between predicted and observed positions.
///
/// Entry `(i, j)` is the Euclidean distance between observation `i` and the
/// predicted position of track `j`. Both slices must already have equal
/// length; padding either side to a common size is the tracker's
/// responsibility, never this function's.
pub fn distance_matrix<T: Float>(predictions: &[(T, T)], observations: &[(T, T)]) -> Array2<T> {
    debug_assert_eq!(predictions.len(), observations.len());
    let n = observations.len();
    Array2::from_shape_fn((n, n), |(i, j)| {
        let (px, py) = predictions[j];
        let (ox, oy) = observations[i];
        ((px - ox).powi(2) + (py - oy).powi(2)).sqrt()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn distances_are_euclidean() {
        let predictions = vec![(0.0, 0.0), (3.0, 4.0)];
        let observations = vec![(0.0, 0.0), (3.0, 4.0)];

        let cost = distance_matrix(&predictions, &observations);

        assert_eq!(cost.dim(), (2, 2));
        assert_approx_eq!(cost[(0, 0)], 0.0);
        assert_approx_eq!(cost[(0, 1)], 5.0);
        assert_approx_eq!(cost[(1, 0)], 5.0);
        assert_approx_eq!(cost[(1, 1)], 0.0);
    }

    #[test]
    fn rows_are_observations_columns_are_tracks() {
        let predictions = vec![(1.0, 0.0), (2.0, 0.0)];
        let observations = vec![(0.0, 0.0), (10.0, 0.0)];

        let cost = distance_matrix(&predictions, &observations);

        assert_approx_eq!(cost[(0, 1)], 2.0); // observation 0 vs track 1
        assert_approx_eq!(cost[(1, 0)], 9.0); // observation 1 vs track 0
    }

    #[test]
    fn empty_input_yields_empty_matrix() {
        let cost = distance_matrix::<f64>(&[], &[]);
        assert_eq!(cost.dim(), (0, 0));
    }
}
