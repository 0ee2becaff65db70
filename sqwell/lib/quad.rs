//! Globally adaptive Gauss-Kronrod quadrature over finite intervals.
//!
//! Each subinterval is integrated with the 7-point Gauss / 15-point Kronrod
//! pair; the subinterval with the largest error estimate is bisected until the
//! total error estimate meets `max(epsabs, epsrel * |result|)` or the
//! subdivision limit is exhausted. Failure to converge is reported in the
//! returned [`Integral`] rather than as an error.
//!
//! ```
//! use std::f64::consts::PI;
//! use sqwell::quad::{ integrate, QuadOptions };
//!
//! let res = integrate(|x| x.sin().powi(2), 0.0, PI, &QuadOptions::default())
//!     .unwrap();
//! assert!(res.converged);
//! assert!((res.value - PI / 2.0).abs() < 1e-10);
//! ```

use crate::{ error::QuadError, DEF_EPSABS, DEF_EPSREL, DEF_LIMIT };

pub type QResult<T> = Result<T, QuadError>;

// Kronrod abscissae on [-1, 1]; odd indices are shared with the 7-point Gauss
// rule, the last entry is the center
const XGK: [f64; 8] = [
    0.991455371120812639206854697526329,
    0.949107912342758524526189684047851,
    0.864864423359769072789712788640926,
    0.741531185599394439863864773280788,
    0.586087235467691130294144845693013,
    0.405845151377397166906606412076961,
    0.207784955007898467600689403773245,
    0.000000000000000000000000000000000,
];

const WGK: [f64; 8] = [
    0.022935322010529224963732008058970,
    0.063092092629978553290700663189204,
    0.104790010322250183839876322541518,
    0.140653259715525918745189590510238,
    0.169004726639267902826583426598550,
    0.190350578064785409913256402421014,
    0.204432940075298892414161999234649,
    0.209482141084727828012999174891714,
];

const WG: [f64; 4] = [
    0.129484966168869693270611432679082,
    0.279705391489276667901467771423780,
    0.381830050505118944950369775488975,
    0.417959183673469387755102040816327,
];

/// Tolerances and subdivision limit for [`integrate`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct QuadOptions {
    /// Absolute error tolerance (default: `1.49e-8`).
    pub epsabs: f64,
    /// Relative error tolerance (default: `1.49e-8`).
    pub epsrel: f64,
    /// Maximum number of subintervals (default: `50`).
    pub limit: usize,
}

impl Default for QuadOptions {
    fn default() -> Self {
        Self { epsabs: DEF_EPSABS, epsrel: DEF_EPSREL, limit: DEF_LIMIT }
    }
}

impl QuadOptions {
    /// Check that tolerances and limit are usable.
    pub fn validate(&self) -> QResult<()> {
        QuadError::check_tolerance(self.epsabs, self.epsrel)?;
        QuadError::check_limit(self.limit)?;
        Ok(())
    }
}

/// Output of [`integrate`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Integral {
    /// Approximate value of the integral.
    pub value: f64,
    /// Estimate of the absolute error.
    pub abserr: f64,
    /// Number of integrand evaluations.
    pub neval: usize,
    /// Number of subintervals in the final partition.
    pub intervals: usize,
    /// `false` if the subdivision limit was reached before the requested
    /// accuracy.
    pub converged: bool,
}

#[derive(Copy, Clone, Debug)]
struct Segment {
    a: f64,
    b: f64,
    value: f64,
    err: f64,
}

// apply the 15-point Kronrod rule to [a, b], returning the Kronrod estimate and
// an error estimate built from its difference with the embedded Gauss rule
fn gk15<F>(f: &mut F, a: f64, b: f64) -> Segment
where F: FnMut(f64) -> f64
{
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);
    let abs_half = half.abs();
    let fc = f(center);
    let mut res_g = fc * WG[3];
    let mut res_k = fc * WGK[7];
    let mut res_abs = res_k.abs();
    let mut fv1 = [0.0_f64; 7];
    let mut fv2 = [0.0_f64; 7];
    for j in 0..7 {
        let dx = half * XGK[j];
        let f1 = f(center - dx);
        let f2 = f(center + dx);
        fv1[j] = f1;
        fv2[j] = f2;
        res_k += WGK[j] * (f1 + f2);
        res_abs += WGK[j] * (f1.abs() + f2.abs());
        if j % 2 == 1 { res_g += WG[j / 2] * (f1 + f2); }
    }
    let mean = 0.5 * res_k;
    let mut res_asc = WGK[7] * (fc - mean).abs();
    for j in 0..7 {
        res_asc += WGK[j] * ((fv1[j] - mean).abs() + (fv2[j] - mean).abs());
    }
    let value = res_k * half;
    res_abs *= abs_half;
    res_asc *= abs_half;
    let mut err = ((res_k - res_g) * half).abs();
    if res_asc != 0.0 && err != 0.0 {
        err = res_asc * (200.0 * err / res_asc).powf(1.5).min(1.0);
    }
    if res_abs > f64::MIN_POSITIVE / (50.0 * f64::EPSILON) {
        err = err.max(50.0 * f64::EPSILON * res_abs);
    }
    Segment { a, b, value, err }
}

/// Integrate `f` over `[a, b]`.
///
/// Returns an error only for unusable arguments; an integral that fails to
/// reach the requested accuracy is returned with `converged = false`.
pub fn integrate<F>(mut f: F, a: f64, b: f64, opts: &QuadOptions)
    -> QResult<Integral>
where F: FnMut(f64) -> f64
{
    opts.validate()?;
    QuadError::check_interval(a, b)?;
    if a == b {
        return Ok(Integral {
            value: 0.0, abserr: 0.0, neval: 0, intervals: 1, converged: true,
        });
    }

    let first = gk15(&mut f, a, b);
    let mut segments: Vec<Segment> = vec![first];
    let mut neval: usize = 15;
    let mut value = first.value;
    let mut abserr = first.err;
    let tol = |value: f64| opts.epsabs.max(opts.epsrel * value.abs());
    while abserr > tol(value) && segments.len() < opts.limit {
        let Some((k, worst))
            = segments.iter().copied().enumerate()
            .max_by(|(_, l), (_, r)| l.err.total_cmp(&r.err))
            else { break; };
        let mid = 0.5 * (worst.a + worst.b);
        // stop once the worst segment can no longer be split in floating point
        if mid <= worst.a.min(worst.b) || mid >= worst.a.max(worst.b) { break; }
        let left = gk15(&mut f, worst.a, mid);
        let right = gk15(&mut f, mid, worst.b);
        neval += 30;
        value += left.value + right.value - worst.value;
        abserr += left.err + right.err - worst.err;
        segments[k] = left;
        segments.push(right);
    }
    // resum to shed the rounding accumulated by incremental updates
    value = segments.iter().map(|s| s.value).sum();
    abserr = segments.iter().map(|s| s.err).sum();
    Ok(Integral {
        value,
        abserr,
        neval,
        intervals: segments.len(),
        converged: abserr <= tol(value),
    })
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;
    use super::*;

    #[test]
    fn polynomial_is_exact() {
        let res = integrate(|x| x.powi(5), 0.0, 1.0, &QuadOptions::default())
            .unwrap();
        assert!((res.value - 1.0 / 6.0).abs() < 1e-14);
        assert_eq!(res.intervals, 1);
        assert_eq!(res.neval, 15);
        assert!(res.converged);
    }

    #[test]
    fn reversed_bounds_flip_sign() {
        let opts = QuadOptions::default();
        let fwd = integrate(|x| x.exp(), 0.0, 2.0, &opts).unwrap();
        let rev = integrate(|x| x.exp(), 2.0, 0.0, &opts).unwrap();
        assert!((fwd.value - (2.0_f64.exp() - 1.0)).abs() < 1e-10);
        assert!((fwd.value + rev.value).abs() < 1e-12);
    }

    #[test]
    fn empty_interval() {
        let res = integrate(|_| 1.0, 0.3, 0.3, &QuadOptions::default())
            .unwrap();
        assert_eq!(res.value, 0.0);
        assert!(res.converged);
    }

    #[test]
    fn oscillatory_product_needs_subdivision() {
        // ∫₀¹ sin²(10πx) dx = 1/2
        let res = integrate(
            |x| (10.0 * PI * x).sin().powi(2),
            0.0,
            1.0,
            &QuadOptions::default(),
        ).unwrap();
        assert!(res.intervals > 1);
        assert!(res.converged);
        assert!((res.value - 0.5).abs() < 1e-8);
    }

    #[test]
    fn step_discontinuity() {
        let res = integrate(
            |x| if x > 1.0 / 3.0 { 1.0 } else { 0.0 },
            0.0,
            1.0,
            &QuadOptions::default(),
        ).unwrap();
        assert!(res.converged);
        assert!((res.value - 2.0 / 3.0).abs() < 1e-7);
    }

    #[test]
    fn limit_reached_is_not_converged() {
        let opts = QuadOptions { limit: 1, ..QuadOptions::default() };
        let res = integrate(|x| (50.0 * x).sin(), 0.0, 10.0, &opts).unwrap();
        assert!(!res.converged);
        assert_eq!(res.intervals, 1);
    }

    #[test]
    fn bad_arguments() {
        let opts = QuadOptions { epsabs: 0.0, epsrel: 0.0, limit: 10 };
        assert!(matches!(
            integrate(|x| x, 0.0, 1.0, &opts),
            Err(QuadError::BadTolerance(..))
        ));
        let opts = QuadOptions { limit: 0, ..QuadOptions::default() };
        assert!(matches!(
            integrate(|x| x, 0.0, 1.0, &opts),
            Err(QuadError::BadLimit(0))
        ));
        assert!(matches!(
            integrate(|x| x, 0.0, f64::INFINITY, &QuadOptions::default()),
            Err(QuadError::BadInterval(..))
        ));
    }
}
