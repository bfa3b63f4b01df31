//! Dense singular value decomposition of the co-occurrence matrix.
//!
//! The decomposition is computed with one-sided Jacobi rotations (Hestenes'
//! method) directly on `ndarray` arrays, without LAPACK. Columns of a working
//! copy of the matrix are rotated pairwise until they are mutually orthogonal;
//! their norms are then the singular values. For the small, dense matrices
//! produced here this is exact to machine precision.

use ndarray::{Array1, Array2, ArrayView2, Axis, s};
use tracing::debug;

use crate::error::{EmbeddingError, Result};

const MAX_SWEEPS: usize = 80;

// singular values below this fraction of the largest one are treated as zero
const RANK_RTOL: f64 = 1e-10;

/// Reduced SVD `M ≈ U · diag(s) · Vᵗ`, truncated to the numerical rank.
#[derive(Clone, Debug)]
pub struct Svd {
    /// Left singular vectors, one row per vocabulary word.
    pub u: Array2<f64>,
    /// Singular values, non-increasing and strictly positive.
    pub s: Array1<f64>,
    /// Right singular vectors.
    pub v: Array2<f64>,
}

impl Svd {

    pub fn rank(&self) -> usize {
        self.s.len()
    }

    /// `U · diag(s) · Vᵗ`
    pub fn reconstruct(&self) -> Array2<f64> {
        let scaled = &self.u * &self.s.view().insert_axis(Axis(0));
        scaled.dot(&self.v.t())
    }

    /// The first `dim` columns of U, i.e. the truncated embeddings of every word.
    pub fn embeddings(&self, dim: usize) -> Result<ArrayView2<'_, f64>> {
        if dim > self.rank() {
            return Err(EmbeddingError::DimensionOutOfRange { dim, rank: self.rank() });
        }
        Ok(self.u.slice(s![.., ..dim]))
    }

}

pub struct Factorizer {}

impl Factorizer {

    fn check_finite(matrix: &Array2<f64>) -> Result<()> {
        match matrix.indexed_iter().find(|(_, x)| !x.is_finite()) {
            Some(((row, col), _)) => Err(EmbeddingError::NonFiniteValue { row, col }),
            None => Ok(())
        }
    }

    fn rotate(a: &mut Array2<f64>, p: usize, q: usize, c: f64, s: f64) {
        for mut row in a.axis_iter_mut(Axis(0)) {
            let x = row[p];
            let y = row[q];
            row[p] = c * x - s * y;
            row[q] = s * x + c * y;
        }
    }

    fn orthogonalize(a: &mut Array2<f64>, v: &mut Array2<f64>) -> Result<()> {

        // rotate pairs of columns of `a` until all of them are orthogonal, applying the
        // same rotations to `v` so that the original matrix times `v` stays equal to `a`
        let n = a.ncols();
        let tol = f64::EPSILON * (a.nrows().max(1) as f64);

        for sweep in 0..MAX_SWEEPS {

            let mut rotations = 0usize;
            for p in 0..n {
                for q in p + 1..n {

                    let (alpha, beta, gamma) = {
                        let col_p = a.column(p);
                        let col_q = a.column(q);
                        (col_p.dot(&col_p), col_q.dot(&col_q), col_p.dot(&col_q))
                    };

                    if alpha < f64::MIN_POSITIVE || beta < f64::MIN_POSITIVE {
                        continue;
                    }
                    if gamma.abs() <= tol * alpha.sqrt() * beta.sqrt() {
                        continue;
                    }

                    let zeta = (beta - alpha) / (2.0 * gamma);
                    let t = zeta.signum() / (zeta.abs() + zeta.hypot(1.0));
                    let c = 1.0 / t.hypot(1.0);
                    let s = c * t;

                    Factorizer::rotate(a, p, q, c, s);
                    Factorizer::rotate(v, p, q, c, s);
                    rotations += 1;
                }
            }

            debug!(sweep, rotations, "jacobi sweep");
            if rotations == 0 {
                return Ok(());
            }
        }

        Err(EmbeddingError::SvdNotConverged { sweeps: MAX_SWEEPS })
    }

    fn run_tall(matrix: &Array2<f64>) -> Result<Svd> {

        // expects rows >= cols
        let (rows, cols) = matrix.dim();
        let mut w = matrix.to_owned();
        let mut v: Array2<f64> = Array2::eye(cols);
        Factorizer::orthogonalize(&mut w, &mut v)?;

        let norms: Vec<f64> = w.axis_iter(Axis(1)).map(|col| col.dot(&col).sqrt()).collect();
        let mut order: Vec<usize> = (0..cols).collect();
        order.sort_by(|i, j| norms[*j].total_cmp(&norms[*i]));

        // anything below the cutoff is rounding noise from a rank deficient input
        let s_max = order.first().map(|i| norms[*i]).unwrap_or(0.0);
        let cutoff = s_max * RANK_RTOL;
        let kept: Vec<usize> = order.into_iter().filter(|i| norms[*i] > cutoff && norms[*i] > 0.0).collect();

        let rank = kept.len();
        let mut u: Array2<f64> = Array2::zeros((rows, rank));
        let mut v_kept: Array2<f64> = Array2::zeros((cols, rank));
        let mut singular: Array1<f64> = Array1::zeros(rank);
        for (k, i) in kept.iter().enumerate() {
            let sigma = norms[*i];
            singular[k] = sigma;
            u.column_mut(k).assign(&w.column(*i).mapv(|x| x / sigma));
            v_kept.column_mut(k).assign(&v.column(*i));
        }

        Ok(Svd { u, s: singular, v: v_kept })
    }

    pub fn run(matrix: &Array2<f64>) -> Result<Svd> {

        Factorizer::check_finite(matrix)?;

        let (rows, cols) = matrix.dim();
        if rows == 0 || cols == 0 {
            return Ok(Svd { u: Array2::zeros((rows, 0)), s: Array1::zeros(0), v: Array2::zeros((cols, 0)) });
        }

        // Jacobi works on columns, so a wide matrix is decomposed through its transpose
        if rows >= cols {
            Factorizer::run_tall(matrix)
        } else {
            let transposed = Factorizer::run_tall(&matrix.t().to_owned())?;
            Ok(Svd { u: transposed.v, s: transposed.s, v: transposed.u })
        }
    }

}


#[cfg(test)]
mod tests {

    use ndarray::{array, Array, Array2, Axis};
    use ndarray_rand::RandomExt;
    use ndarray_rand::rand_distr::Uniform;

    use super::{Factorizer, Svd};
    use crate::error::EmbeddingError;

    fn relative_error(original: &Array2<f64>, svd: &Svd) -> f64 {
        let diff = original - &svd.reconstruct();
        let norm = original.mapv(|x| x * x).sum().sqrt().max(1.0);
        diff.mapv(|x| x * x).sum().sqrt() / norm
    }

    fn assert_orthonormal_columns(m: &Array2<f64>) {
        let gram = m.t().dot(m);
        let eye: Array2<f64> = Array2::eye(m.ncols());
        for (x, y) in gram.iter().zip(eye.iter()) {
            assert!((x - y).abs() < 1e-10, "columns are not orthonormal: {}", gram);
        }
    }

    fn assert_non_increasing(svd: &Svd) {
        for pair in svd.s.windows(2) {
            assert!(pair[0] >= pair[1], "singular values not sorted: {}", svd.s);
        }
        assert!(svd.s.iter().all(|x| *x > 0.0));
    }

    #[test]
    fn diagonal_matrix() {
        let m = array![[1.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 2.0]];
        let svd = Factorizer::run(&m).unwrap();
        assert_eq!(svd.rank(), 3);
        for (got, want) in svd.s.iter().zip([3.0f64, 2.0, 1.0]) {
            assert!((got - want).abs() < 1e-12);
        }
        assert!(relative_error(&m, &svd) < 1e-12);
    }

    #[test]
    fn rank_one_matrix() {
        // outer product of [1, 2] and [3, 4]
        let m = array![[3.0, 4.0], [6.0, 8.0]];
        let svd = Factorizer::run(&m).unwrap();
        assert_eq!(svd.rank(), 1);
        assert!((svd.s[0] - 125.0f64.sqrt()).abs() < 1e-12);
        assert!(relative_error(&m, &svd) < 1e-12);
    }

    #[test]
    fn random_matrices_reconstruct() {

        for (rows, cols) in [(9, 9), (12, 5), (4, 10), (1, 6), (20, 20)] {
            let m: Array2<f64> = Array::random((rows, cols), Uniform::new(-1.0, 1.0));
            let svd = Factorizer::run(&m).unwrap();

            assert_eq!(svd.rank(), rows.min(cols));
            assert_eq!(svd.u.dim(), (rows, svd.rank()));
            assert_eq!(svd.v.dim(), (cols, svd.rank()));
            assert_non_increasing(&svd);
            assert_orthonormal_columns(&svd.u);
            assert_orthonormal_columns(&svd.v);
            assert!(relative_error(&m, &svd) < 1e-9);
        }
    }

    #[test]
    fn rank_deficient_counts_reconstruct() {

        // integer counts with a zero row and two identical rows
        let m: Array2<f64> = array![
            [0.0, 3.0, 0.0, 1.0],
            [0.0, 0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 1.0]
        ];
        let svd = Factorizer::run(&m).unwrap();
        assert_eq!(svd.rank(), 2);
        assert_non_increasing(&svd);
        assert_orthonormal_columns(&svd.u);
        assert!(relative_error(&m, &svd) < 1e-9);
    }

    #[test]
    fn zero_matrix_has_rank_zero() {
        let m: Array2<f64> = Array2::zeros((3, 3));
        let svd = Factorizer::run(&m).unwrap();
        assert_eq!(svd.rank(), 0);
        assert_eq!(svd.u.dim(), (3, 0));
        assert_eq!(svd.reconstruct(), m);

        let empty: Array2<f64> = Array2::zeros((0, 0));
        assert_eq!(Factorizer::run(&empty).unwrap().rank(), 0);
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let mut m: Array2<f64> = Array2::ones((3, 3));
        m[[1, 2]] = f64::NAN;
        match Factorizer::run(&m) {
            Err(EmbeddingError::NonFiniteValue { row, col }) => assert_eq!((row, col), (1, 2)),
            other => panic!("unexpected result {:?}", other)
        }

        m[[1, 2]] = f64::INFINITY;
        assert!(Factorizer::run(&m).is_err());
    }

    #[test]
    fn embeddings_truncate_columns() {
        let m: Array2<f64> = Array::random((6, 6), Uniform::new(0.0, 1.0));
        let svd = Factorizer::run(&m).unwrap();
        let emb = svd.embeddings(2).unwrap();
        assert_eq!(emb.dim(), (6, 2));
        assert_eq!(emb.index_axis(Axis(1), 1), svd.u.column(1));
        assert!(svd.embeddings(svd.rank() + 1).is_err());
    }

}
