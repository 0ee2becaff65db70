#![allow(non_upper_case_globals)]

//! Conversion between the dimensionless energies of the well and physical
//! units.
//!
//! Concrete physical constants are taken from NIST.

use std::f64::consts::PI;

/// Planck constant (kg m^2 s^-1)
pub const h: f64 = 6.62607015e-34;
//             +/- 0 (exact)

/// reduced Planck constant (kg m^2 s^-1)
pub const hbar: f64 = h / 2.0 / PI;
//                +/- 0 (exact)

/// elementary charge (C)
pub const e: f64 = 1.602176634e-19;
//             +/- 0 (exact)

/// electron mass (kg)
pub const me: f64 = 9.1093837015e-31;
//              +/- 0.0000000028e-31

/// unified atomic mass unit (kg)
pub const mu: f64 = 1.66053906660e-27;
//              +/- 0.00000000050e-27

/// Bohr radius (m)
pub const a0: f64 = 5.29177210903e-11;
//              +/- 0.00000000080e-11

/// Hartree energy (J)
pub const Eh: f64 = 4.3597447222071e-18;
//              +/- 0.0000000000085e-18

/// Natural scales of a well of physical width `L` holding a particle of mass
/// `m`.
///
/// The energy unit is the ground-state energy of the unit-width well,
/// ```text
/// ε = π² ħ² / (2 m L²)
/// ```
/// so that a free particle in a well of dimensionless width `a` has energies
/// `(n/a)² ε`. See [`docs/units`][crate::docs#units].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoxUnits {
    /// Particle mass.
    pub m: f64,
    /// Length scale.
    pub l: f64,
    /// Energy scale.
    pub e: f64,
}

impl BoxUnits {
    /// Construct from a mass and length scale in meters/kilograms/seconds
    /// (MKS) units; the energy scale is in joules.
    pub fn from_mks(mass: f64, length: f64) -> Self {
        let e_unit = (PI * hbar).powi(2) / 2.0 / mass / length.powi(2);
        Self { m: mass, l: length, e: e_unit }
    }

    /// Construct from a mass and length scale in atomic units (electron
    /// masses/Bohr radii); the energy scale is in Hartrees.
    pub fn from_au(mass: f64, length: f64) -> Self {
        let e_unit = PI.powi(2) / 2.0 / mass / length.powi(2);
        Self { m: mass, l: length, e: e_unit }
    }

    /// Convert a dimensionless energy to the base unit system.
    pub fn from_nat_energy<T, U>(&self, x: T) -> U
    where T: std::ops::Mul<f64, Output = U>
    {
        x * self.e
    }

    /// Convert an energy in the base unit system to dimensionless units.
    pub fn to_nat_energy<T, U>(&self, x: T) -> U
    where T: std::ops::Mul<f64, Output = U>
    {
        x * self.e.recip()
    }

    /// Convert a dimensionless length to the base unit system.
    pub fn from_nat_length<T, U>(&self, x: T) -> U
    where T: std::ops::Mul<f64, Output = U>
    {
        x * self.l
    }

    /// Convert a length in the base unit system to dimensionless units.
    pub fn to_nat_length<T, U>(&self, x: T) -> U
    where T: std::ops::Mul<f64, Output = U>
    {
        x * self.l.recip()
    }
}
