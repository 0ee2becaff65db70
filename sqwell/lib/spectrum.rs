//! Quadratic fits to zones of an energy spectrum.
//!
//! Within a zone of level indices, the energies are fit by least squares to
//! ```text
//! E(n) ≈ c2 n² + c1 n + c0
//! ```
//! with `n` the zero-based level index. A free particle in the well gives
//! `E(n) = (n + 1)²/a²`; departures of the fitted coefficients from this ladder
//! indicate where the potential dominates the spectrum.

use std::ops::Range;
use ndarray as nd;
use ndarray_linalg::LeastSquaresSvd;
use crate::{ Arr1, error::FitError };

pub type FResult<T> = Result<T, FitError>;

/// Coefficients of a fitted quadratic.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Quadratic {
    pub c2: f64,
    pub c1: f64,
    pub c0: f64,
}

impl Quadratic {
    /// Evaluate at `n`.
    pub fn eval(&self, n: f64) -> f64 {
        (self.c2 * n + self.c1) * n + self.c0
    }

    /// Evaluate at every index in `zone`.
    pub fn curve(&self, zone: Range<usize>) -> nd::Array1<f64> {
        zone.map(|n| self.eval(n as f64)).collect()
    }
}

/// Fit a quadratic to the energies at level indices `zone`.
pub fn fit_quadratic<S>(energies: &Arr1<S>, zone: Range<usize>)
    -> FResult<Quadratic>
where S: nd::Data<Elem = f64>
{
    if zone.end > energies.len() || zone.start > zone.end {
        return Err(FitError::BadZone {
            start: zone.start,
            end: zone.end,
            len: energies.len(),
        });
    }
    FitError::check_points(zone.len())?;
    let design: nd::Array2<f64>
        = nd::Array2::from_shape_fn((zone.len(), 3), |(i, j)| {
            let n = (zone.start + i) as f64;
            n.powi(2 - j as i32)
        });
    let rhs: nd::Array1<f64>
        = energies.slice(nd::s![zone.start..zone.end]).to_owned();
    let sol = design.least_squares(&rhs)?.solution;
    Ok(Quadratic { c2: sol[0], c1: sol[1], c0: sol[2] })
}

/// Fit each of several zones.
pub fn fit_zones<S>(energies: &Arr1<S>, zones: &[Range<usize>])
    -> FResult<Vec<Quadratic>>
where S: nd::Data<Elem = f64>
{
    zones.iter().cloned().map(|zone| fit_quadratic(energies, zone)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_quadratic() {
        let e: nd::Array1<f64>
            = (0..20).map(|n| 2.0 * (n * n) as f64 - 3.0 * n as f64 + 0.5)
            .collect();
        let fit = fit_quadratic(&e, 5..15).unwrap();
        assert!((fit.c2 - 2.0).abs() < 1e-9);
        assert!((fit.c1 + 3.0).abs() < 1e-8);
        assert!((fit.c0 - 0.5).abs() < 1e-7);
        let curve = fit.curve(5..15);
        assert_eq!(curve.len(), 10);
        assert!((curve[0] - e[5]).abs() < 1e-8);
    }

    #[test]
    fn free_particle_ladder() {
        let e: nd::Array1<f64> = (0..10).map(|n| ((n + 1) * (n + 1)) as f64).collect();
        let fits = fit_zones(&e, &[0..5, 5..10]).unwrap();
        for fit in fits {
            assert!((fit.c2 - 1.0).abs() < 1e-9);
            assert!((fit.c1 - 2.0).abs() < 1e-8);
            assert!((fit.c0 - 1.0).abs() < 1e-7);
        }
    }

    #[test]
    fn bad_zones() {
        let e: nd::Array1<f64> = nd::Array1::zeros(6);
        assert!(matches!(fit_quadratic(&e, 4..8), Err(FitError::BadZone { .. })));
        assert!(matches!(fit_quadratic(&e, 0..2), Err(FitError::TooFewPoints(2))));
    }
}
