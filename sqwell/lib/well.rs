//! The infinite square well and its eigenbasis.

use std::f64::consts::PI;
use ndarray as nd;
use crate::{ error::HError, hamiltonian::HResult };

/// Kronecker delta.
pub fn kronecker(m: usize, n: usize) -> f64 {
    if m == n { 1.0 } else { 0.0 }
}

/// Parameters of an infinite square well occupying `[0, a]`, truncated to a
/// basis of `n` eigenstates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Well {
    // auxiliary parameter, carried for callers and not used in assembly
    r: f64,
    // basis size
    n: usize,
    // width
    a: f64,
}

impl Well {
    /// Create a new `Well`.
    ///
    /// Fails if `n` is zero or `a` is not a positive, finite number.
    pub fn new(r: f64, n: usize, a: f64) -> HResult<Self> {
        HError::check_size(n)?;
        HError::check_width(a)?;
        Ok(Self { r, n, a })
    }

    /// Get the auxiliary parameter.
    pub fn r(&self) -> f64 { self.r }

    /// Get the basis size (matrix dimension).
    pub fn n(&self) -> usize { self.n }

    /// Get the width.
    pub fn a(&self) -> f64 { self.a }

    /// Evaluate the `n`-th (zero-indexed) normalized eigenfunction of the well
    /// at `x`:
    /// ```text
    /// φ_n(x) = √(2/a) sin((n + 1) π x / a)
    /// ```
    pub fn basis_fn(&self, n: usize, x: f64) -> f64 {
        (2.0 / self.a).sqrt() * ((n + 1) as f64 * PI * x / self.a).sin()
    }

    /// Kinetic energy of the `n`-th (zero-indexed) eigenstate, `((n + 1)/a)²`.
    pub fn level(&self, n: usize) -> f64 {
        ((n + 1) as f64 / self.a).powi(2)
    }

    /// Uniform coordinate grid of `samples` points spanning the well,
    /// endpoints included.
    pub fn grid(&self, samples: usize) -> nd::Array1<f64> {
        nd::Array1::linspace(0.0, self.a, samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{ trapz, wf_dot };

    #[test]
    fn rejects_bad_parameters() {
        assert!(matches!(Well::new(0.0, 0, 1.0), Err(HError::BadSize(0))));
        assert!(matches!(Well::new(0.0, 4, 0.0), Err(HError::BadWidth(_))));
        assert!(matches!(Well::new(0.0, 4, -1.0), Err(HError::BadWidth(_))));
        assert!(matches!(
            Well::new(0.0, 4, f64::NAN), Err(HError::BadWidth(_))));
        let well = Well::new(2.5, 4, 1.5).unwrap();
        assert_eq!((well.r(), well.n(), well.a()), (2.5, 4, 1.5));
    }

    #[test]
    fn kronecker_delta() {
        assert_eq!(kronecker(3, 3), 1.0);
        assert_eq!(kronecker(3, 4), 0.0);
    }

    #[test]
    fn unit_well_basis() {
        let well = Well::new(0.0, 3, 1.0).unwrap();
        let x = 0.3;
        let expected = 2.0_f64.sqrt() * (2.0 * PI * x).sin();
        assert!((well.basis_fn(1, x) - expected).abs() < 1e-15);
        assert!(well.basis_fn(0, 0.0).abs() < 1e-15);
        assert!(well.basis_fn(2, 1.0).abs() < 1e-14);
    }

    #[test]
    fn basis_is_orthonormal() {
        let well = Well::new(0.0, 4, 2.0).unwrap();
        let x = well.grid(4001);
        let dx = x[1] - x[0];
        for j in 0..4 {
            let pj = x.mapv(|xk| well.basis_fn(j, xk));
            for k in 0..4 {
                let pk = x.mapv(|xk| well.basis_fn(k, xk));
                let overlap = wf_dot(&pj, &pk, dx);
                assert!((overlap - kronecker(j, k)).abs() < 1e-6);
            }
        }
        let p0 = x.mapv(|xk| well.basis_fn(0, xk).powi(2));
        assert!((trapz(&p0, dx) - 1.0).abs() < 1e-6);
    }
}
