use num_traits::Float;

/// Predicts the next sample of a per-axis history window.
///
/// `window` holds the last three samples, oldest first. `hits` is the number
/// of real updates the owning track has absorbed so far and selects the model
/// order: a single update carries no motion information (constant), two yield
/// a velocity (linear) and three or more yield a velocity plus an acceleration
/// (quadratic). Until `hits` reaches the window depth the older slots still
/// contain seed copies of the first observation, so they must not contribute.
///
/// The quadratic form reduces exactly to the linear one when the acceleration
/// term vanishes, so the model switch itself introduces no jump.
pub fn next_position<T: Float>(window: &[T; 3], hits: usize) -> T {
    let [x0, x1, x2] = *window;
    match hits {
        0 | 1 => x2,
        2 => linear(x1, x2),
        _ => quadratic(x0, x1, x2),
    }
}

/// Linear extrapolation from the two newest samples: `x2 + (x2 - x1)`.
fn linear<T: Float>(x1: T, x2: T) -> T {
    let two = T::one() + T::one();
    two * x2 - x1
}

/// Constant-acceleration extrapolation from the full window:
/// `x2 + v + a` with `v = x2 - x1` and `a = (x2 - x1) - (x1 - x0)`.
fn quadratic<T: Float>(x0: T, x1: T, x2: T) -> T {
    let three = T::one() + T::one() + T::one();
    three * (x2 - x1) + x0
}
