//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! [anyhow]: https://crates.io/crates/anyhow

use std::path::PathBuf;
use ndarray as nd;
use ndarray_linalg::error::LinalgError;
use thiserror::Error;

/// Returned when an operation requiring equal-length arrays encounters arrays
/// with unequal length.
#[derive(Debug, Error)]
#[error("encountered arrays with incompatible lengths; got {0} and {1}")]
pub struct LengthError(pub usize, pub usize);

/// Returned from argument validation in [`quad`][crate::quad].
#[derive(Debug, Error)]
pub enum QuadError {
    /// Returned when both tolerances are non-positive, or either is negative
    /// or NaN.
    #[error("quadrature tolerances must be non-negative with at least one positive; got epsabs = {0}, epsrel = {1}")]
    BadTolerance(f64, f64),

    /// Returned when the subdivision limit is zero.
    #[error("subdivision limit must be greater than 0; got {0}")]
    BadLimit(usize),

    /// Returned when an integration bound is not finite.
    #[error("integration bounds must be finite; got [{0}, {1}]")]
    BadInterval(f64, f64),
}

impl QuadError {
    pub(crate) fn check_tolerance(epsabs: f64, epsrel: f64) -> Result<(), Self> {
        let ok = epsabs >= 0.0 && epsrel >= 0.0 && (epsabs > 0.0 || epsrel > 0.0);
        ok.then_some(()).ok_or(Self::BadTolerance(epsabs, epsrel))
    }

    pub(crate) fn check_limit(limit: usize) -> Result<(), Self> {
        (limit != 0).then_some(()).ok_or(Self::BadLimit(limit))
    }

    pub(crate) fn check_interval(a: f64, b: f64) -> Result<(), Self> {
        (a.is_finite() && b.is_finite()).then_some(())
            .ok_or(Self::BadInterval(a, b))
    }
}

/// Returned from reading or writing cached matrices in
/// [`cache`][crate::cache].
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O failure on a cache file or directory.
    #[error("cache i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A field in a cache file could not be read as a number.
    #[error("malformed value on line {line} of {path:?}: {msg}")]
    Parse { path: PathBuf, line: usize, msg: String },

    /// A cache file holds a matrix of the wrong shape.
    #[error("cached matrix in {path:?} has shape {rows}×{cols}; expected {expected}×{expected}")]
    Shape { path: PathBuf, expected: usize, rows: usize, cols: usize },
}

/// Returned from Hamiltonian assembly.
#[derive(Debug, Error)]
pub enum HError {
    /// Returned when no potential function was supplied.
    #[error("no potential function has been defined")]
    MissingPotential,

    /// Returned when a zero basis size is encountered.
    #[error("basis size must be greater than 0; got {0}")]
    BadSize(usize),

    /// Returned when a non-positive or non-finite well width is encountered.
    #[error("well width must be finite and greater than 0; got {0}")]
    BadWidth(f64),

    /// Returned when the width forwarded to the potential disagrees with the
    /// width of the well.
    #[error("potential parameter `a` = {param} does not match the well width {well}")]
    WidthMismatch { well: f64, param: f64 },

    /// [`QuadError`]
    #[error("quadrature error: {0}")]
    Quad(#[from] QuadError),

    /// [`CacheError`]
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

impl HError {
    pub(crate) fn check_size(n: usize) -> Result<(), Self> {
        (n != 0).then_some(()).ok_or(Self::BadSize(n))
    }

    pub(crate) fn check_width(a: f64) -> Result<(), Self> {
        (a.is_finite() && a > 0.0).then_some(()).ok_or(Self::BadWidth(a))
    }
}

/// Returned from diagonalization and projection functions.
#[derive(Debug, Error)]
pub enum EError {
    /// Returned when a non-square matrix is passed to the solver.
    #[error("matrix must be square; got {0}×{1}")]
    NotSquare(usize, usize),

    /// Returned when an energy level outside the computed spectrum is
    /// requested.
    #[error("level {n} is out of range for {len} eigenpairs")]
    BadLevel { n: usize, len: usize },

    /// [`LengthError`]
    #[error("array length error: {0}")]
    Length(#[from] LengthError),

    /// [`LinalgError`].
    #[error("linalg error: {0}")]
    Linalg(#[from] LinalgError),
}

impl EError {
    pub(crate) fn check_square<S>(h: &nd::ArrayBase<S, nd::Ix2>)
        -> Result<(), Self>
    where S: nd::Data<Elem = f64>
    {
        let (r, c) = h.dim();
        (r == c).then_some(()).ok_or(Self::NotSquare(r, c))
    }

    pub(crate) fn check_level(n: usize, len: usize) -> Result<(), Self> {
        (n < len).then_some(()).ok_or(Self::BadLevel { n, len })
    }
}

/// Returned from [`spectrum`][crate::spectrum] fits.
#[derive(Debug, Error)]
pub enum FitError {
    /// Returned when a zone holds fewer points than fit coefficients.
    #[error("quadratic fit requires at least 3 points; got {0}")]
    TooFewPoints(usize),

    /// Returned when a zone reaches past the end of the spectrum.
    #[error("fit zone {start}..{end} exceeds spectrum of length {len}")]
    BadZone { start: usize, end: usize, len: usize },

    /// [`LinalgError`].
    #[error("linalg error: {0}")]
    Linalg(#[from] LinalgError),
}

impl FitError {
    pub(crate) fn check_points(n: usize) -> Result<(), Self> {
        (n >= 3).then_some(()).ok_or(Self::TooFewPoints(n))
    }
}

/// Returned from loading a [`RunConfig`][crate::config::RunConfig].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure reading a config file.
    #[error("config i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML or does not match the schema.
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The well section describes an invalid well.
    #[error("invalid well: {0}")]
    Well(#[from] HError),
}
