#![allow(dead_code, non_snake_case)]

//! Provides functions and higher-level constructs for the solution of the
//! one-dimensional, time-independent Schrödinger equation for a particle
//! confined to a box containing an arbitrary potential, by expansion over the
//! eigenstates of the infinite square well.
//!
//! The pipeline is split in two stages:
//! - [Hamiltonian assembly][hamiltonian::build]: matrix elements of the
//!   potential between basis states are computed by [adaptive
//!   Gauss-Kronrod quadrature][quad] and memoized on disk by a
//!   [`MatrixCache`][cache::MatrixCache].
//! - [Diagonalization][solve::diagonalize]: eigenpairs are sorted by energy
//!   and can be [projected][solve::Eigenpairs::project] back into position
//!   space.
//!
//! ```
//! use sqwell::{ hamiltonian, potential::{ Params, Zero }, solve, well::Well };
//!
//! let well = Well::new(0.0, 3, 1.0).unwrap();
//! let h = hamiltonian::build(
//!     &well, Some(&Zero), &Params::new(), None, &mut ()).unwrap();
//! let eig = solve::diagonalize(&h).unwrap();
//! assert!(
//!     [1.0, 4.0, 9.0].into_iter()
//!         .zip(eig.values())
//!         .all(|(expected, computed)| (computed - expected).abs() < 1e-8)
//! )
//! ```
//!
//! See [`docs`] for theoretical background.

pub mod error;
pub mod quad;
pub mod potential;
pub mod well;
pub mod hamiltonian;
pub mod cache;
pub mod solve;
pub mod spectrum;
pub mod config;
pub mod units;
pub mod utils;

pub mod docs;

pub(crate) const DEF_EPSABS: f64 = 1.49e-8;
pub(crate) const DEF_EPSREL: f64 = 1.49e-8;
pub(crate) const DEF_LIMIT: usize = 50;
pub(crate) const DEF_SYMM_TOL: f64 = 1e-10;

pub type Arr1<S> = ndarray::ArrayBase<S, ndarray::Ix1>;
pub type Arr2<S> = ndarray::ArrayBase<S, ndarray::Ix2>;
