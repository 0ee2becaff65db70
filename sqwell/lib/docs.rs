//! Theoretical background.
//!
//! # Contents
//! - [Background](#background)
//! - [Units](#units)
//! - [Matrix elements](#matrix-elements)
//! - [Convergence](#convergence)
//!
//! # Background
//! The infinite square well of width *a*, occupying 0 ≤ *x* ≤ *a*, has
//! eigenstates
//! ```text
//!          ⎛2⎞1/2    ⎛n π x⎞
//! φ_n(x) = ⎜-⎟    sin⎜-----⎟ , n = 1, 2, ...
//!          ⎝a⎠       ⎝  a  ⎠
//! ```
//! which form a complete orthonormal set on [0, *a*] for functions that vanish
//! at the walls. Any potential *V*(*x*) placed inside the well can therefore be
//! handled by expanding the unknown eigenstates over this basis[^1],
//! ```text
//! ψ(x) = Σ_n c_n φ_n(x)
//! ```
//! which turns the time-independent Schrödinger equation (TISE) into the matrix
//! eigenvalue problem
//! ```text
//! Σ_m H_nm c_m = E c_n
//! H_nm = ⟨φ_n| H |φ_m⟩
//! ```
//! Truncating the expansion to the first *N* basis states gives an *N* × *N*
//! real symmetric matrix whose eigenvalues approximate the lowest part of the
//! spectrum from above, and whose eigenvectors hold the coefficients *c_n* of
//! the corresponding states.
//!
//! In this crate the basis index is zero-based, so that
//! [`Well::basis_fn(j, x)`][crate::well::Well::basis_fn] is *φ*_(*j* + 1).
//!
//! # Units
//! All energies in this crate are dimensionless. Starting from the usual
//! expression of the TISE for a particle of mass *m* in a box of physical width
//! *L*,
//! ```text
//!    ħ² ∂²
//! - --- --- ψ(x) + V(x) ψ(x) = E ψ(x)
//!   2 m ∂x²
//! ```
//! change variables to *x'* ≡ *x* / *L* and divide through by the ground-state
//! energy of the box,
//! ```text
//!     π² ħ²
//! ε = ------
//!     2 m L²
//! ```
//! giving
//! ```text
//!    1   ∂²
//! - --- ------ ψ'(x') + V'(x') ψ'(x') = E' ψ'(x')
//!   π²  ∂(x')²
//!
//! V'(x') = V(L x') / ε
//! E' = E / ε
//! ```
//! In these units a well of width *a* = 1 has free energies *n*², and a well of
//! width *a* has free energies (*n* / *a*)². Items in
//! [`units`][crate::units] handle conversion to and from physical units.
//!
//! # Matrix elements
//! With the kinetic term diagonal in the square-well basis, the matrix
//! elements are
//! ```text
//!          ⎛n⎞2      2  a    ⎛n π x⎞    ⎛m π x⎞
//! H_nm  =  ⎜-⎟ δ_nm + - ∫ dx sin⎜-----⎟ sin⎜-----⎟ V(x)
//!          ⎝a⎠        a  0    ⎝  a  ⎠    ⎝  a  ⎠
//! ```
//! The integrals are evaluated by adaptive 15-point Gauss-Kronrod
//! quadrature[^2]: each subinterval is integrated with a 7-point Gauss rule and
//! its 15-point Kronrod extension, and the difference between the two serves as
//! an error estimate. The subinterval with the largest estimated error is
//! bisected until the total error falls below the requested tolerance or a
//! subdivision limit is reached. Every entry is integrated on its own, so the
//! symmetry of the result is a check on the quadrature rather than an
//! assumption; rows are independent and may be assembled in parallel.
//!
//! A potential with discontinuities (steps, barriers) converges more slowly in
//! the quadrature; raise [`QuadOptions::limit`][crate::quad::QuadOptions] when
//! unconverged integrals are reported.
//!
//! # Convergence
//! Truncation to *N* basis states is variational, so each computed level
//! decreases monotonically toward its exact value as *N* grows. A useful rule
//! of thumb is that levels well below the free energy (*N* / *a*)² are
//! converged, while the upper part of the computed spectrum mostly reflects the
//! truncation. Fitting the computed energies by zone (see
//! [`spectrum`][crate::spectrum]) makes the crossover visible: levels bound by
//! the potential follow its own ladder (e.g. linear in *n* for a harmonic
//! trap), while levels above the potential's walls revert to the quadratic
//! ladder of the free well.
//!
//! [^1]: F. Marsiglio, "The spectral decomposition in one dimension." American
//! Journal of Physics **77** 253 (2009).
//!
//! [^2]: R. Piessens, E. de Doncker-Kapenga, C. W. Überhuber, and D. K. Kahaner,
//! *QUADPACK: A Subroutine Package for Automatic Integration*. Springer (1983).
