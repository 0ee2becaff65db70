//! Miscellaneous tools for wavefunctions sampled on uniform grids.

use ndarray::{ self as nd, Ix1 };
use num_traits::Float;

/// Integrate using the trapezoidal rule.
///
/// *Panics if `y` has length less than 2*.
pub fn trapz<S, A>(y: &nd::ArrayBase<S, Ix1>, dx: A) -> A
where
    S: nd::Data<Elem = A>,
    A: Float,
{
    let n: usize = y.len();
    let two = A::one() + A::one();
    let inner = y.iter().skip(1).take(n - 2).fold(A::zero(), |acc, yk| acc + *yk);
    (dx / two) * (y[0] + two * inner + y[n - 1])
}

/// Calculate the norm of a real wavefunction.
///
/// *Panics if `q` has length less than 2*.
pub fn wf_norm<S, A>(q: &nd::ArrayBase<S, Ix1>, dx: A) -> A
where
    S: nd::Data<Elem = A>,
    A: Float,
{
    trapz(&q.mapv(|qk| qk * qk), dx)
}

/// Calculate the inner product of two real wavefunctions.
///
/// *Panics if either array has length less than 2*.
pub fn wf_dot<S, T, A>(
    q: &nd::ArrayBase<S, Ix1>,
    p: &nd::ArrayBase<T, Ix1>,
    dx: A,
) -> A
where
    S: nd::Data<Elem = A>,
    T: nd::Data<Elem = A>,
    A: Float,
{
    let prod: nd::Array1<A>
        = q.iter().zip(p).map(|(qk, pk)| *qk * *pk).collect();
    trapz(&prod, dx)
}

/// Return a normalized copy of a wavefunction.
///
/// *Panics if `q` has length less than 2*.
pub fn wf_normalized<S, A>(q: &nd::ArrayBase<S, Ix1>, dx: A) -> nd::Array1<A>
where
    S: nd::Data<Elem = A>,
    A: Float,
{
    let norm = wf_norm(q, dx).sqrt();
    q.mapv(|qk| qk / norm)
}
