//! Potentials placed inside the well, and the named parameters forwarded to
//! them.
//!
//! A potential is anything implementing [`Potential`]. Parameters are passed
//! through verbatim from the caller of [`build`][crate::hamiltonian::build] as a
//! [`Params`] map; by convention the well width is available under the key
//! `"a"`.
//!
//! ```
//! use sqwell::potential::{ Barrier, Params, Potential };
//!
//! let params = Params::new().with("a", 1.0).with("height", 100.0);
//! assert_eq!(Barrier.value(0.5, &params), 100.0);
//! assert_eq!(Barrier.value(0.1, &params), 0.0);
//! ```

use std::collections::BTreeMap;
use ndarray as nd;
use serde::{ Deserialize, Serialize };
use crate::Arr1;

/// Named real-valued potential parameters.
///
/// Keys are kept sorted so that two maps with the same contents always iterate
/// (and hash) identically.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, f64>);

impl Params {
    /// Create an empty parameter set.
    pub fn new() -> Self { Self(BTreeMap::new()) }

    /// Builder-style [`insert`][Self::insert].
    pub fn with(mut self, key: &str, val: f64) -> Self {
        self.insert(key, val);
        self
    }

    /// Set a parameter, returning its previous value if any.
    pub fn insert(&mut self, key: &str, val: f64) -> Option<f64> {
        self.0.insert(key.to_string(), val)
    }

    /// Look up a parameter.
    pub fn get(&self, key: &str) -> Option<f64> { self.0.get(key).copied() }

    /// Look up a parameter, falling back to `default`.
    pub fn get_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).unwrap_or(default)
    }

    /// Iterate over `(name, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of parameters.
    pub fn len(&self) -> usize { self.0.len() }

    /// Return `true` if there are no parameters.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

/// A potential energy function on the well's coordinate.
///
/// Values are in the energy units of the well (see
/// [`docs/units`][crate::docs#units]). The label identifies the functional form
/// for cache keying; two potentials with the same label and parameters are
/// assumed to be the same function.
pub trait Potential: Send + Sync {
    /// Evaluate the potential at `x`.
    fn value(&self, x: f64, params: &Params) -> f64;

    /// Short, stable name of the functional form.
    fn label(&self) -> String;
}

impl<P: Potential + ?Sized> Potential for Box<P> {
    fn value(&self, x: f64, params: &Params) -> f64 {
        (**self).value(x, params)
    }

    fn label(&self) -> String { (**self).label() }
}

/// Wraps a closure as a [`Potential`] under a fixed label.
#[derive(Clone)]
pub struct FnPotential<F> {
    label: String,
    f: F,
}

impl<F> FnPotential<F>
where F: Fn(f64, &Params) -> f64 + Send + Sync
{
    pub fn new(label: &str, f: F) -> Self {
        Self { label: label.to_string(), f }
    }
}

impl<F> Potential for FnPotential<F>
where F: Fn(f64, &Params) -> f64 + Send + Sync
{
    fn value(&self, x: f64, params: &Params) -> f64 { (self.f)(x, params) }

    fn label(&self) -> String { self.label.clone() }
}

impl<F> std::fmt::Debug for FnPotential<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnPotential").field("label", &self.label).finish()
    }
}

// well width from the forwarded parameters, 1 if absent
fn width(params: &Params) -> f64 { params.get_or("a", 1.0) }

/// Flat bottom: the bare infinite square well.
#[derive(Copy, Clone, Debug, Default)]
pub struct Zero;

impl Potential for Zero {
    fn value(&self, _x: f64, _params: &Params) -> f64 { 0.0 }

    fn label(&self) -> String { "zero".into() }
}

/// `k (x - x0)²`, with `x0` defaulting to the center of the well.
#[derive(Copy, Clone, Debug, Default)]
pub struct Harmonic;

impl Potential for Harmonic {
    fn value(&self, x: f64, params: &Params) -> f64 {
        let k = params.get_or("k", 1.0);
        let x0 = params.get_or("x0", width(params) / 2.0);
        k * (x - x0).powi(2)
    }

    fn label(&self) -> String { "harmonic".into() }
}

/// `slope · x`, a uniform field across the well.
#[derive(Copy, Clone, Debug, Default)]
pub struct Linear;

impl Potential for Linear {
    fn value(&self, x: f64, params: &Params) -> f64 {
        params.get_or("slope", 1.0) * x
    }

    fn label(&self) -> String { "linear".into() }
}

/// Rectangular barrier of `height` and total `width` centered in the well,
/// splitting it into a double well.
#[derive(Copy, Clone, Debug, Default)]
pub struct Barrier;

impl Potential for Barrier {
    fn value(&self, x: f64, params: &Params) -> f64 {
        let height = params.get_or("height", 1.0);
        let half = params.get_or("width", 0.1 * width(params)) / 2.0;
        let center = width(params) / 2.0;
        if (x - center).abs() <= half { height } else { 0.0 }
    }

    fn label(&self) -> String { "barrier".into() }
}

/// Step of `height` for all `x ≥ x0` (default: the center of the well).
#[derive(Copy, Clone, Debug, Default)]
pub struct Step;

impl Potential for Step {
    fn value(&self, x: f64, params: &Params) -> f64 {
        let height = params.get_or("height", 1.0);
        let x0 = params.get_or("x0", width(params) / 2.0);
        if x >= x0 { height } else { 0.0 }
    }

    fn label(&self) -> String { "step".into() }
}

/// Sample a potential over a coordinate array.
pub fn sample_potential<P, S>(potential: &P, params: &Params, x: &Arr1<S>)
    -> nd::Array1<f64>
where
    P: Potential + ?Sized,
    S: nd::Data<Elem = f64>,
{
    x.mapv(|xk| potential.value(xk, params))
}
