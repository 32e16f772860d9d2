use fixedbitset::FixedBitSet;
use ndarray::Array2;
use num_traits::Float;

/// Cell markings used by the Munkres bookkeeping.
const NONE: u8 = 0;
const STAR: u8 = 1;
const PRIME: u8 = 2;

/// Solves the linear assignment problem on a square cost matrix.
///
/// Returns the permutation `p` minimizing the total cost `Σ cost[(i, p[i])]`
/// over all perfect matchings, using the classical Munkres star/prime/cover
/// formulation in O(N³). Entries must be finite and non-negative.
///
/// The scan order is fixed, so identical input always yields an identical
/// permutation; ties between equal-cost matchings are broken by that order and
/// nothing else.
pub fn minimum_cost_assignment<T: Float>(cost: &Array2<T>) -> Vec<usize> {
    debug_assert_eq!(cost.nrows(), cost.ncols());
    let n = cost.nrows();
    if n == 0 {
        return vec![];
    }

    let mut matrix = cost.to_owned();
    let mut marks = Array2::<u8>::zeros((n, n));
    let mut row_cover = FixedBitSet::with_capacity(n);
    let mut col_cover = FixedBitSet::with_capacity(n);

    reduce_rows(&mut matrix);
    star_initial_zeros(&matrix, &mut marks);

    // Alternate between covering the columns of starred zeros and growing the
    // star set along augmenting paths until every column is covered.
    while cover_starred_columns(&marks, &mut col_cover) < n {
        loop {
            match find_uncovered_zero(&matrix, &row_cover, &col_cover) {
                Some((row, col)) => {
                    marks[(row, col)] = PRIME;
                    match starred_in_row(&marks, row) {
                        Some(star_col) => {
                            row_cover.insert(row);
                            col_cover.set(star_col, false);
                        }
                        None => {
                            augment(&mut marks, row, col);
                            row_cover.clear();
                            col_cover.clear();
                            clear_primes(&mut marks);
                            break;
                        }
                    }
                }
                None => adjust_by_min_uncovered(&mut matrix, &row_cover, &col_cover),
            }
        }
    }

    let n = marks.nrows();
    (0..n)
        .map(|row| {
            (0..n)
                .find(|&col| marks[(row, col)] == STAR)
                .expect("every row carries a starred zero after termination")
        })
        .collect()
}

/// Returns true when `assignment` is a permutation of `0..assignment.len()`.
pub fn is_permutation(assignment: &[usize]) -> bool {
    let n = assignment.len();
    let mut seen = FixedBitSet::with_capacity(n);
    for &idx in assignment {
        if idx >= n || seen.contains(idx) {
            return false;
        }
        seen.insert(idx);
    }
    true
}

/// Subtracts each row's minimum from the row, creating at least one exact zero
/// per row.
fn reduce_rows<T: Float>(matrix: &mut Array2<T>) {
    for mut row in matrix.rows_mut() {
        let min = row.iter().copied().fold(T::infinity(), T::min);
        row.mapv_inplace(|v| v - min);
    }
}

/// Greedily stars zeros that share no row or column with an earlier star.
fn star_initial_zeros<T: Float>(matrix: &Array2<T>, marks: &mut Array2<u8>) {
    let n = matrix.nrows();
    let mut row_used = FixedBitSet::with_capacity(n);
    let mut col_used = FixedBitSet::with_capacity(n);
    for row in 0..n {
        for col in 0..n {
            if matrix[(row, col)] == T::zero() && !row_used.contains(row) && !col_used.contains(col)
            {
                marks[(row, col)] = STAR;
                row_used.insert(row);
                col_used.insert(col);
            }
        }
    }
}

/// Covers every column containing a starred zero and returns the cover count.
fn cover_starred_columns(marks: &Array2<u8>, col_cover: &mut FixedBitSet) -> usize {
    let n = marks.nrows();
    for col in 0..n {
        if (0..n).any(|row| marks[(row, col)] == STAR) {
            col_cover.insert(col);
        }
    }
    col_cover.count_ones(..)
}

/// Returns the first uncovered zero in scan order, if any.
fn find_uncovered_zero<T: Float>(
    matrix: &Array2<T>,
    row_cover: &FixedBitSet,
    col_cover: &FixedBitSet,
) -> Option<(usize, usize)> {
    let n = matrix.nrows();
    (0..n)
        .filter(|&row| !row_cover.contains(row))
        .find_map(|row| {
            (0..n)
                .find(|&col| !col_cover.contains(col) && matrix[(row, col)] == T::zero())
                .map(|col| (row, col))
        })
}

/// Returns the column of the starred zero in `row`, if any.
fn starred_in_row(marks: &Array2<u8>, row: usize) -> Option<usize> {
    (0..marks.ncols()).find(|&col| marks[(row, col)] == STAR)
}

/// Returns the row of the starred zero in `col`, if any.
fn starred_in_col(marks: &Array2<u8>, col: usize) -> Option<usize> {
    (0..marks.nrows()).find(|&row| marks[(row, col)] == STAR)
}

/// Returns the column of the primed zero in `row`, if any.
fn primed_in_row(marks: &Array2<u8>, row: usize) -> Option<usize> {
    (0..marks.ncols()).find(|&col| marks[(row, col)] == PRIME)
}

/// Flips stars and primes along the alternating path that starts at the
/// uncovered primed zero `(row, col)`, growing the matching by one.
fn augment(marks: &mut Array2<u8>, row: usize, col: usize) {
    let mut path = vec![(row, col)];
    loop {
        let (_, last_col) = path[path.len() - 1];
        match starred_in_col(marks, last_col) {
            Some(star_row) => {
                path.push((star_row, last_col));
                let prime_col = primed_in_row(marks, star_row)
                    .expect("a covered row always carries a primed zero on the path");
                path.push((star_row, prime_col));
            }
            None => break,
        }
    }
    for (r, c) in path {
        marks[(r, c)] = if marks[(r, c)] == STAR { NONE } else { STAR };
    }
}

/// Clears all prime markings.
fn clear_primes(marks: &mut Array2<u8>) {
    marks.mapv_inplace(|m| if m == PRIME { NONE } else { m });
}

/// Finds the minimum uncovered entry, adds it to every covered row and
/// subtracts it from every uncovered column, exposing at least one new
/// uncovered zero.
fn adjust_by_min_uncovered<T: Float>(
    matrix: &mut Array2<T>,
    row_cover: &FixedBitSet,
    col_cover: &FixedBitSet,
) {
    let n = matrix.nrows();
    let mut min = T::infinity();
    for row in (0..n).filter(|&row| !row_cover.contains(row)) {
        for col in (0..n).filter(|&col| !col_cover.contains(col)) {
            min = min.min(matrix[(row, col)]);
        }
    }

    for row in 0..n {
        for col in 0..n {
            if row_cover.contains(row) {
                matrix[(row, col)] = matrix[(row, col)] + min;
            }
            if !col_cover.contains(col) {
                matrix[(row, col)] = matrix[(row, col)] - min;
            }
        }
    }
}
