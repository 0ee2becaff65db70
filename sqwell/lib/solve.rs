//! Diagonalization of an assembled [`Hamiltonian`] and projection of its
//! eigenvectors back into position space.

use ndarray as nd;
use ndarray_linalg::{ self as la, Eig, EighInto };
use num_complex::Complex64 as C64;
use tracing::{ debug, warn };
use crate::{
    Arr1,
    Arr2,
    error::EError,
    hamiltonian::Hamiltonian,
    well::Well,
    DEF_SYMM_TOL,
};

pub type EResult<T> = Result<T, EError>;

/// Eigenpairs of a [`Hamiltonian`], sorted by ascending energy.
///
/// Row `i` of the eigenvector array is the eigenvector belonging to the `i`-th
/// eigenvalue. Components are coefficients over the well's basis functions,
/// ordered by [`Well::basis_fn`] index.
#[derive(Clone, Debug)]
pub struct Eigenpairs {
    well: Well,
    values: nd::Array1<f64>,
    vectors: nd::Array2<f64>,
}

impl Eigenpairs {
    /// Get the well of the originating Hamiltonian.
    pub fn well(&self) -> &Well { &self.well }

    /// Get a reference to the sorted eigenvalues.
    pub fn values(&self) -> &nd::Array1<f64> { &self.values }

    /// Get a reference to the eigenvectors, one per row.
    pub fn vectors(&self) -> &nd::Array2<f64> { &self.vectors }

    /// Get the number of eigenpairs.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize { self.values.len() }

    /// Get the `n`-th energy.
    pub fn energy(&self, n: usize) -> EResult<f64> {
        EError::check_level(n, self.len())?;
        Ok(self.values[n])
    }

    /// Get the `n`-th eigenvector.
    pub fn vector(&self, n: usize) -> EResult<nd::ArrayView1<'_, f64>> {
        EError::check_level(n, self.len())?;
        Ok(self.vectors.row(n))
    }

    /// Evaluate the `n`-th eigenstate in position space at `x`,
    /// ```text
    /// ψ_n(x) = Σ_j v[n, j] φ_j(x)
    /// ```
    /// where `φ_j` is the `j`-th basis function of the well.
    pub fn project(&self, x: f64, n: usize) -> EResult<f64> {
        let v = self.vector(n)?;
        Ok(self.project_vec(&v, x))
    }

    /// Like [`Self::project`], but for every point in a coordinate array.
    pub fn project_grid<S>(&self, x: &Arr1<S>, n: usize)
        -> EResult<nd::Array1<f64>>
    where S: nd::Data<Elem = f64>
    {
        let v = self.vector(n)?;
        Ok(x.mapv(|xk| self.project_vec(&v, xk)))
    }

    /// Project several eigenstates over a coordinate array, stacked with one
    /// state per row.
    pub fn wavefunctions<S>(&self, x: &Arr1<S>, levels: &[usize])
        -> EResult<nd::Array2<f64>>
    where S: nd::Data<Elem = f64>
    {
        let mut wfs: nd::Array2<f64> = nd::Array2::zeros((levels.len(), x.len()));
        for (&n, mut wf) in levels.iter().zip(wfs.rows_mut()) {
            wf.assign(&self.project_grid(x, n)?);
        }
        Ok(wfs)
    }

    /// Compute the infinity-norm residual `‖H v_n - E_n v_n‖`.
    pub fn residual(&self, h: &Hamiltonian, n: usize) -> EResult<f64> {
        let v = self.vector(n)?;
        let e = self.values[n];
        let hv = h.matrix().dot(&v);
        let res = hv.iter().zip(&v)
            .map(|(hvk, vk)| (hvk - e * vk).abs())
            .fold(0.0, f64::max);
        Ok(res)
    }

    fn project_vec<S>(&self, v: &Arr1<S>, x: f64) -> f64
    where S: nd::Data<Elem = f64>
    {
        v.iter().enumerate()
            .map(|(j, vj)| vj * self.well.basis_fn(j, x))
            .sum()
    }
}

/// Return `true` if `h` equals its transpose to within `tol` relative to its
/// largest element.
pub fn is_symmetric<S>(h: &Arr2<S>, tol: f64) -> bool
where S: nd::Data<Elem = f64>
{
    let scale = h.iter().fold(0.0_f64, |acc, hk| acc.max(hk.abs())).max(1.0);
    h.indexed_iter()
        .all(|((i, j), hij)| (hij - h[[j, i]]).abs() <= tol * scale)
}

// return the permutation that sorts `values` in ascending order; ties keep
// their original relative order
fn argsort(values: &nd::Array1<f64>) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&i, &j| values[i].total_cmp(&values[j]));
    idx
}

/// Compute all eigenpairs of `h`, sorted by ascending eigenvalue.
///
/// Symmetric matrices (the usual case) go through the symmetric solver and
/// have orthonormal eigenvectors. Otherwise the general solver is used and the
/// real parts of its output are kept; any significant imaginary parts are
/// reported as a warning.
pub fn diagonalize(h: &Hamiltonian) -> EResult<Eigenpairs> {
    let m = h.matrix();
    EError::check_square(m)?;
    let (values, vectors): (nd::Array1<f64>, nd::Array2<f64>)
        = if is_symmetric(m, DEF_SYMM_TOL) {
            let (evals, evecs): (nd::Array1<f64>, nd::Array2<f64>)
                = m.to_owned().eigh_into(la::UPLO::Lower)?;
            (evals, evecs.reversed_axes())
        } else {
            warn!("hamiltonian is not symmetric; using the general eigensolver");
            let (evals, evecs): (nd::Array1<C64>, nd::Array2<C64>) = m.eig()?;
            let max_imag
                = evals.iter().fold(0.0_f64, |acc, e| acc.max(e.im.abs()));
            let scale
                = evals.iter().fold(1.0_f64, |acc, e| acc.max(e.norm()));
            if max_imag > DEF_SYMM_TOL * scale {
                warn!(max_imag, "discarding imaginary parts of eigenvalues");
            }
            (evals.mapv(|e| e.re), evecs.mapv(|v| v.re).reversed_axes())
        };
    let idx = argsort(&values);
    let values: nd::Array1<f64> = idx.iter().map(|&i| values[i]).collect();
    let vectors: nd::Array2<f64> = vectors.select(nd::Axis(0), &idx);
    debug!(n = values.len(), "diagonalized hamiltonian");
    Ok(Eigenpairs { well: *h.well(), values, vectors })
}
