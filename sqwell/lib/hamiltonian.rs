//! Assembly of the Hamiltonian matrix in the eigenbasis of the infinite square
//! well.
//!
//! For a well of width *a* and basis states *n*, *m* ∊ {1, ..., *N*}, the
//! matrix elements are
//! ```text
//!          n²            2  a
//! H[n, m] = -- δ[n, m] + - ∫  sin(nπx/a) sin(mπx/a) V(x) dx
//!          a²            a  0
//! ```
//! in units of π²ħ²/2*m* (see [`docs/units`][crate::docs#units]). Every entry is
//! computed independently by [adaptive quadrature][crate::quad]; no symmetry
//! shortcut is taken.

use std::{
    f64::consts::PI,
    path::{ Path, PathBuf },
    time::Instant,
};
use ndarray as nd;
use rayon::prelude::*;
use tracing::{ debug, warn };
use crate::{
    cache::MatrixCache,
    error::{ EError, HError, LengthError },
    potential::{ Params, Potential },
    quad::{ self, Integral, QResult, QuadOptions },
    solve::{ self, EResult, Eigenpairs },
    well::{ kronecker, Well },
};

pub type HResult<T> = Result<T, HError>;

/// Receives row-completion updates during assembly.
///
/// `advance` is called with a monotonically increasing count of completed rows
/// out of `total`. `()` reports nothing; any `FnMut(usize, usize)` closure is
/// called as `advance`.
pub trait Progress {
    /// Called once before the first row.
    fn start(&mut self, _total: usize) { }

    /// Called after each completed row.
    fn advance(&mut self, done: usize, total: usize);

    /// Called once after the last row.
    fn finish(&mut self) { }
}

impl Progress for () {
    fn advance(&mut self, _done: usize, _total: usize) { }
}

impl<F> Progress for F
where F: FnMut(usize, usize)
{
    fn advance(&mut self, done: usize, total: usize) { self(done, total) }
}

/// Scheduling of the independent matrix-element integrals.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Assembly {
    /// Row by row on the calling thread.
    #[default]
    Serial,
    /// Rows spread over the rayon thread pool, one batch of rows per pool
    /// width at a time. Produces the same matrix as `Serial`.
    Parallel,
}

/// Options for [`build_with`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BuildOptions {
    /// Quadrature tolerances for each matrix element.
    pub quad: QuadOptions,
    /// Scheduling of the matrix-element integrals.
    pub assembly: Assembly,
}

/// Where a [`Hamiltonian`] came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Assembled by quadrature.
    Computed,
    /// Read from a cache file.
    Cache(PathBuf),
    /// Supplied directly by the caller.
    External,
}

/// An assembled Hamiltonian matrix together with the well it represents.
#[derive(Clone, Debug)]
pub struct Hamiltonian {
    well: Well,
    h: nd::Array2<f64>,
    origin: Origin,
}

impl Hamiltonian {
    /// Wrap a bare matrix, checking that it is `N`×`N` for the well.
    pub fn from_matrix(well: Well, h: nd::Array2<f64>) -> EResult<Self> {
        EError::check_square(&h)?;
        if h.nrows() != well.n() {
            return Err(LengthError(well.n(), h.nrows()).into());
        }
        Ok(Self { well, h, origin: Origin::External })
    }

    /// Get the well.
    pub fn well(&self) -> &Well { &self.well }

    /// Get a reference to the matrix.
    pub fn matrix(&self) -> &nd::Array2<f64> { &self.h }

    /// Consume `self`, returning the bare matrix.
    pub fn into_matrix(self) -> nd::Array2<f64> { self.h }

    /// Get the origin of the matrix.
    pub fn origin(&self) -> &Origin { &self.origin }

    /// Return `true` if the matrix was read from a cache file.
    pub fn is_cached(&self) -> bool { matches!(self.origin, Origin::Cache(_)) }

    /// Get the matrix dimension.
    pub fn dim(&self) -> usize { self.h.nrows() }

    /// Thin interface to [`solve::diagonalize`].
    pub fn diagonalize(&self) -> EResult<Eigenpairs> { solve::diagonalize(self) }
}

// fill in the width under "a", or check it against the well if present
fn forward_params(well: &Well, params: &Params) -> HResult<Params> {
    match params.get("a") {
        Some(param) if param != well.a() => {
            Err(HError::WidthMismatch { well: well.a(), param })
        },
        Some(_) => Ok(params.clone()),
        None => Ok(params.clone().with("a", well.a())),
    }
}

// compute the (n, m) matrix element for 1-indexed basis states
fn element<P>(
    well: &Well,
    potential: &P,
    params: &Params,
    n: usize,
    m: usize,
    opts: &QuadOptions,
) -> QResult<(f64, Integral)>
where P: Potential + ?Sized
{
    let a = well.a();
    let kn = n as f64 * PI / a;
    let km = m as f64 * PI / a;
    let integral = quad::integrate(
        |x| (kn * x).sin() * (km * x).sin() * potential.value(x, params),
        0.0,
        a,
        opts,
    )?;
    let kinetic = kronecker(n, m) * (n as f64 / a).powi(2);
    Ok((kinetic + 2.0 / a * integral.value, integral))
}

fn row<P>(
    well: &Well,
    potential: &P,
    params: &Params,
    n: usize,
    opts: &QuadOptions,
) -> QResult<Vec<(f64, Integral)>>
where P: Potential + ?Sized
{
    (1..=well.n())
        .map(|m| element(well, potential, params, n, m, opts))
        .collect()
}

#[derive(Copy, Clone, Debug, Default)]
struct QuadStats {
    unconverged: usize,
    worst: Option<(usize, usize, f64)>,
}

impl QuadStats {
    fn record(&mut self, n: usize, m: usize, integral: &Integral) {
        if integral.converged { return; }
        self.unconverged += 1;
        if self.worst.map_or(true, |(_, _, err)| integral.abserr > err) {
            self.worst = Some((n, m, integral.abserr));
        }
    }
}

/// Assemble the matrix by quadrature, without touching any cache.
pub fn assemble<P>(
    well: &Well,
    potential: &P,
    params: &Params,
    opts: &BuildOptions,
    progress: &mut dyn Progress,
) -> HResult<nd::Array2<f64>>
where P: Potential + ?Sized
{
    opts.quad.validate()?;
    let params = forward_params(well, params)?;
    let n_max = well.n();
    let mut h: nd::Array2<f64> = nd::Array2::zeros((n_max, n_max));
    let mut stats = QuadStats::default();
    let mut store = |n: usize, vals: Vec<(f64, Integral)>, h: &mut nd::Array2<f64>| {
        for ((m, (val, integral)), hnm) in
            vals.iter().enumerate().zip(h.row_mut(n - 1))
        {
            *hnm = *val;
            stats.record(n, m + 1, integral);
        }
    };
    let t0 = Instant::now();
    progress.start(n_max);
    match opts.assembly {
        Assembly::Serial => {
            for n in 1..=n_max {
                let r = row(well, potential, &params, n, &opts.quad)?;
                store(n, r, &mut h);
                progress.advance(n, n_max);
            }
        },
        Assembly::Parallel => {
            let batch = rayon::current_num_threads().max(1);
            let ns: Vec<usize> = (1..=n_max).collect();
            for chunk in ns.chunks(batch) {
                let rows: Vec<Vec<(f64, Integral)>>
                    = chunk.par_iter()
                    .map(|&n| row(well, potential, &params, n, &opts.quad))
                    .collect::<QResult<_>>()?;
                for (&n, r) in chunk.iter().zip(rows) {
                    store(n, r, &mut h);
                    progress.advance(n, n_max);
                }
            }
        },
    }
    progress.finish();
    debug!(
        n = n_max,
        assembly = ?opts.assembly,
        elapsed_s = t0.elapsed().as_secs_f64(),
        "assembled hamiltonian",
    );
    if let Some((n, m, err)) = stats.worst {
        warn!(
            unconverged = stats.unconverged,
            worst_entry = ?(n, m),
            worst_abserr = err,
            "quadrature did not reach the requested accuracy for some matrix \
            elements; consider raising the subdivision limit",
        );
    }
    Ok(h)
}

/// Build the Hamiltonian matrix with default quadrature settings and serial
/// assembly.
///
/// See [`build_with`].
pub fn build<P>(
    well: &Well,
    potential: Option<&P>,
    params: &Params,
    cache: Option<&MatrixCache>,
    progress: &mut dyn Progress,
) -> HResult<Hamiltonian>
where P: Potential + ?Sized
{
    build_with(well, potential, params, cache, &BuildOptions::default(), progress)
}

/// Build the Hamiltonian matrix for a potential inside a well.
///
/// If `cache` is given and holds an entry for this setup, the entry is
/// returned without any validation against the potential. An unreadable or
/// malformed entry is treated as missing. A freshly assembled matrix is
/// written to the cache before returning.
///
/// `params` are forwarded to the potential verbatim, with the well width added
/// under `"a"` if absent. Fails with [`HError::MissingPotential`] if
/// `potential` is `None` and [`HError::WidthMismatch`] if `params["a"]`
/// disagrees with the well. Quadrature options are validated before the cache
/// is consulted, and a failed cache write is returned as [`HError::Cache`].
pub fn build_with<P>(
    well: &Well,
    potential: Option<&P>,
    params: &Params,
    cache: Option<&MatrixCache>,
    opts: &BuildOptions,
    progress: &mut dyn Progress,
) -> HResult<Hamiltonian>
where P: Potential + ?Sized
{
    let potential = potential.ok_or(HError::MissingPotential)?;
    opts.quad.validate()?;
    let forwarded = forward_params(well, params)?;
    let entry: Option<(&MatrixCache, PathBuf)>
        = cache.map(|c| (c, c.path_for(well, potential, &forwarded)));

    if let Some((cache, path)) = entry.as_ref() {
        if let Some(h) = try_load(cache, path, well.n()) {
            return Ok(Hamiltonian {
                well: *well,
                h,
                origin: Origin::Cache(path.clone()),
            });
        }
    }

    let h = assemble(well, potential, &forwarded, opts, progress)?;
    if let Some((cache, path)) = entry.as_ref() {
        cache.store(path, &h)?;
    }
    Ok(Hamiltonian { well: *well, h, origin: Origin::Computed })
}

fn try_load(cache: &MatrixCache, path: &Path, n: usize)
    -> Option<nd::Array2<f64>>
{
    match cache.load(path, n) {
        Ok(Some(h)) => Some(h),
        Ok(None) => {
            debug!(path = %path.display(), "cache miss");
            None
        },
        Err(err) => {
            warn!(
                path = %path.display(),
                %err,
                "discarding unreadable cache entry; recomputing",
            );
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use super::*;
    use crate::{
        cache::CacheKey,
        error::QuadError,
        potential::{ Barrier, FnPotential, Harmonic, Linear, Zero },
    };

    fn max_abs_diff(a: &nd::Array2<f64>, b: &nd::Array2<f64>) -> f64 {
        a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max)
    }

    #[test]
    fn zero_potential_is_diagonal() {
        let well = Well::new(0.0, 3, 1.0).unwrap();
        let h = build(&well, Some(&Zero), &Params::new(), None, &mut ())
            .unwrap();
        assert_eq!(h.origin(), &Origin::Computed);
        let expected = nd::Array2::from_diag(&nd::array![1.0, 4.0, 9.0]);
        assert!(max_abs_diff(h.matrix(), &expected) < 1e-12);

        let well = Well::new(0.0, 8, 1.0).unwrap();
        let h = build(&well, Some(&Zero), &Params::new(), None, &mut ())
            .unwrap();
        let diag: nd::Array1<f64> = (1..=8).map(|n| (n * n) as f64).collect();
        let expected = nd::Array2::from_diag(&diag);
        assert!(max_abs_diff(h.matrix(), &expected) < 1e-12);
    }

    #[test]
    fn wide_well_kinetic_scaling() {
        let well = Well::new(0.0, 4, 2.0).unwrap();
        let h = build(&well, Some(&Zero), &Params::new(), None, &mut ())
            .unwrap();
        for n in 0..4 {
            assert!((h.matrix()[[n, n]] - well.level(n)).abs() < 1e-12);
        }
    }

    #[test]
    fn constant_potential_shifts_diagonal() {
        // orthonormal basis: a constant V0 adds V0 to each diagonal entry
        let well = Well::new(0.0, 5, 1.0).unwrap();
        let v0 = FnPotential::new("const", |_x, p: &Params| p.get_or("v0", 0.0));
        let params = Params::new().with("v0", 3.0);
        let h = build(&well, Some(&v0), &params, None, &mut ()).unwrap();
        let expected: nd::Array2<f64>
            = nd::Array2::from_diag(
                &(1..=5).map(|n| (n * n) as f64 + 3.0).collect::<nd::Array1<f64>>());
        assert!(max_abs_diff(h.matrix(), &expected) < 1e-9);
    }

    #[test]
    fn linear_potential_couplings() {
        // 2 ∫₀¹ x sin(nπx) sin(mπx) dx = -8nm / (π² (n² - m²)²) for n + m odd,
        // 0 for n + m even (n ≠ m), and 1/2 on the diagonal
        let well = Well::new(0.0, 4, 1.0).unwrap();
        let params = Params::new().with("slope", 1.0);
        let h = build(&well, Some(&Linear), &params, None, &mut ()).unwrap();
        let h = h.matrix();
        for n in 1..=4_usize {
            for m in 1..=4_usize {
                let (nf, mf) = (n as f64, m as f64);
                let expected
                    = if n == m {
                        nf * nf + 0.5
                    } else if (n + m) % 2 == 1 {
                        -8.0 * nf * mf / (PI.powi(2) * (nf * nf - mf * mf).powi(2))
                    } else {
                        0.0
                    };
                assert!((h[[n - 1, m - 1]] - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn matrix_is_symmetric() {
        let well = Well::new(0.0, 6, 1.0).unwrap();
        let params = Params::new().with("k", 200.0).with("x0", 0.3);
        let h = build(&well, Some(&Harmonic), &params, None, &mut ()).unwrap();
        assert!(max_abs_diff(h.matrix(), &h.matrix().t().to_owned()) < 1e-9);
    }

    #[test]
    fn missing_potential() {
        let well = Well::new(0.0, 3, 1.0).unwrap();
        let res = build(&well, None::<&Zero>, &Params::new(), None, &mut ());
        assert!(matches!(res, Err(HError::MissingPotential)));
    }

    #[test]
    fn width_mismatch() {
        let well = Well::new(0.0, 3, 1.0).unwrap();
        let params = Params::new().with("a", 2.0);
        let res = build(&well, Some(&Zero), &params, None, &mut ());
        assert!(matches!(
            res, Err(HError::WidthMismatch { well, param }) if well == 1.0 && param == 2.0
        ));
        let params = Params::new().with("a", 1.0);
        assert!(build(&well, Some(&Zero), &params, None, &mut ()).is_ok());
    }

    #[test]
    fn width_is_forwarded() {
        let well = Well::new(0.0, 2, 1.5).unwrap();
        let seen = FnPotential::new("probe", |_x, p: &Params| {
            assert_eq!(p.get("a"), Some(1.5));
            0.0
        });
        build(&well, Some(&seen), &Params::new(), None, &mut ()).unwrap();
    }

    #[test]
    fn progress_counts_rows() {
        let well = Well::new(0.0, 5, 1.0).unwrap();
        for assembly in [Assembly::Serial, Assembly::Parallel] {
            let opts = BuildOptions { assembly, ..BuildOptions::default() };
            let mut seen: Vec<(usize, usize)> = Vec::new();
            let mut record = |done: usize, total: usize| seen.push((done, total));
            build_with(&well, Some(&Zero), &Params::new(), None, &opts, &mut record)
                .unwrap();
            assert_eq!(seen, (1..=5).map(|k| (k, 5)).collect::<Vec<_>>());
        }
    }

    #[test]
    fn parallel_matches_serial() {
        let well = Well::new(0.0, 7, 1.0).unwrap();
        let params = Params::new().with("height", 80.0).with("width", 0.2);
        let serial = build(&well, Some(&Barrier), &params, None, &mut ()).unwrap();
        let opts = BuildOptions { assembly: Assembly::Parallel, ..Default::default() };
        let parallel
            = build_with(&well, Some(&Barrier), &params, None, &opts, &mut ())
            .unwrap();
        assert!(
            serial.matrix().iter().zip(parallel.matrix())
                .all(|(x, y)| x.to_bits() == y.to_bits())
        );
    }

    #[test]
    fn uncached_builds_agree() {
        let well = Well::new(0.0, 5, 1.0).unwrap();
        let params = Params::new().with("k", 50.0);
        let h1 = build(&well, Some(&Harmonic), &params, None, &mut ()).unwrap();
        let h2 = build(&well, Some(&Harmonic), &params, None, &mut ()).unwrap();
        assert!(max_abs_diff(h1.matrix(), h2.matrix()) < 1e-12);
        assert!(!h2.is_cached());
    }

    #[test]
    fn cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MatrixCache::new(dir.path().join("cache"));
        let well = Well::new(0.0, 4, 1.0).unwrap();
        let params = Params::new().with("height", 30.0);
        let fresh
            = build(&well, Some(&Barrier), &params, Some(&cache), &mut ())
            .unwrap();
        assert_eq!(fresh.origin(), &Origin::Computed);
        let mut calls: usize = 0;
        let mut count = |_: usize, _: usize| calls += 1;
        let cached
            = build(&well, Some(&Barrier), &params, Some(&cache), &mut count)
            .unwrap();
        assert!(cached.is_cached());
        assert_eq!(calls, 0);
        assert!(
            fresh.matrix().iter().zip(cached.matrix())
                .all(|(x, y)| x.to_bits() == y.to_bits())
        );
    }

    #[test]
    fn corrupt_cache_is_recomputed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MatrixCache::new(dir.path());
        let well = Well::new(0.0, 3, 1.0).unwrap();
        let path = cache.path_for(&well, &Zero, &Params::new().with("a", 1.0));
        fs::write(&path, "garbage\n").unwrap();
        let h = build(&well, Some(&Zero), &Params::new(), Some(&cache), &mut ())
            .unwrap();
        assert_eq!(h.origin(), &Origin::Computed);
        let reread = cache.load(&path, 3).unwrap().unwrap();
        assert_eq!(&reread, h.matrix());
    }

    #[test]
    fn size_key_collides_across_potentials() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MatrixCache::new(dir.path()).with_key(CacheKey::Size);
        let well = Well::new(0.0, 3, 1.0).unwrap();
        build(&well, Some(&Zero), &Params::new(), Some(&cache), &mut ()).unwrap();
        let params = Params::new().with("k", 1000.0);
        let h = build(&well, Some(&Harmonic), &params, Some(&cache), &mut ())
            .unwrap();
        // served from the zero-potential entry
        assert!(h.is_cached());
        assert!((h.matrix()[[0, 0]] - 1.0).abs() < 1e-12);

        let cache = MatrixCache::new(dir.path());
        let h = build(&well, Some(&Harmonic), &params, Some(&cache), &mut ())
            .unwrap();
        assert!(!h.is_cached());
        assert!(h.matrix()[[0, 0]] > 1.0);
    }

    #[test]
    fn quad_stats_track_worst_entry() {
        let integral = |abserr: f64, converged: bool| Integral {
            value: 0.0, abserr, neval: 15, intervals: 1, converged,
        };
        let mut stats = QuadStats::default();
        stats.record(1, 1, &integral(1e-3, true));
        assert_eq!(stats.unconverged, 0);
        assert!(stats.worst.is_none());
        stats.record(1, 2, &integral(2e-6, false));
        stats.record(2, 3, &integral(5e-5, false));
        stats.record(3, 1, &integral(1e-7, false));
        assert_eq!(stats.unconverged, 3);
        assert_eq!(stats.worst, Some((2, 3, 5e-5)));
    }

    #[test]
    fn unconverged_elements_are_kept() {
        let well = Well::new(0.0, 6, 1.0).unwrap();
        let params = Params::new().with("height", 500.0).with("width", 0.2);
        let coarse = BuildOptions {
            quad: QuadOptions { limit: 1, ..QuadOptions::default() },
            ..BuildOptions::default()
        };
        // a single Gauss-Kronrod panel cannot resolve the barrier edges
        let edge = quad::integrate(
            |x| (PI * x).sin().powi(2) * Barrier.value(x, &params),
            0.0,
            1.0,
            &coarse.quad,
        ).unwrap();
        assert!(!edge.converged);
        let rough
            = build_with(&well, Some(&Barrier), &params, None, &coarse, &mut ())
            .unwrap();
        assert!(rough.matrix().iter().all(|v| v.is_finite()));
        let fine = build(&well, Some(&Barrier), &params, None, &mut ()).unwrap();
        assert!(max_abs_diff(rough.matrix(), fine.matrix()) > 0.0);
    }

    #[test]
    fn bad_quad_options() {
        let well = Well::new(0.0, 3, 1.0).unwrap();
        let bad_tol = BuildOptions {
            quad: QuadOptions { epsabs: -1.0, ..QuadOptions::default() },
            ..BuildOptions::default()
        };
        assert!(matches!(
            build_with(&well, Some(&Zero), &Params::new(), None, &bad_tol, &mut ()),
            Err(HError::Quad(QuadError::BadTolerance(..)))
        ));

        // a populated cache does not mask invalid options
        let dir = tempfile::tempdir().unwrap();
        let cache = MatrixCache::new(dir.path());
        build(&well, Some(&Zero), &Params::new(), Some(&cache), &mut ()).unwrap();
        let bad_limit = BuildOptions {
            quad: QuadOptions { limit: 0, ..QuadOptions::default() },
            ..BuildOptions::default()
        };
        assert!(matches!(
            build_with(
                &well, Some(&Zero), &Params::new(), Some(&cache), &bad_limit, &mut ()),
            Err(HError::Quad(QuadError::BadLimit(0)))
        ));
    }

    #[test]
    fn failed_cache_write() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        let cache = MatrixCache::new(&blocker);
        let well = Well::new(0.0, 3, 1.0).unwrap();
        let res = build(&well, Some(&Zero), &Params::new(), Some(&cache), &mut ());
        assert!(matches!(res, Err(HError::Cache(_))));
    }

    #[test]
    fn from_matrix_checks_shape() {
        let well = Well::new(0.0, 2, 1.0).unwrap();
        assert!(matches!(
            Hamiltonian::from_matrix(well, nd::Array2::zeros((2, 3))),
            Err(EError::NotSquare(2, 3))
        ));
        assert!(matches!(
            Hamiltonian::from_matrix(well, nd::Array2::zeros((3, 3))),
            Err(EError::Length(LengthError(2, 3)))
        ));
        let h = Hamiltonian::from_matrix(well, nd::Array2::eye(2)).unwrap();
        assert_eq!(h.origin(), &Origin::External);
        assert_eq!(h.dim(), 2);
    }
}
