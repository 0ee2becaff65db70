//! Run configuration read from TOML.
//!
//! Only the `[well]` table is required:
//! ```
//! use sqwell::config::RunConfig;
//!
//! let config: RunConfig = r#"
//!     [well]
//!     n = 20
//!     a = 1.0
//!
//!     [potential]
//!     kind = "barrier"
//!     params = { height = 500.0, width = 0.2 }
//! "#.parse().unwrap();
//! assert_eq!(config.well().unwrap().n(), 20);
//! assert!(config.cache.enabled);
//! ```

use std::{
    ops::Range,
    path::{ Path, PathBuf },
    str::FromStr,
};
use serde::{ Deserialize, Serialize };
use tracing::warn;
use crate::{
    cache::{ CacheKey, MatrixCache },
    error::ConfigError,
    hamiltonian::{ Assembly, BuildOptions, HResult },
    potential::{ Barrier, Harmonic, Linear, Params, Potential, Step, Zero },
    quad::QuadOptions,
    well::Well,
    DEF_EPSABS,
    DEF_EPSREL,
    DEF_LIMIT,
};

/// `[well]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WellConfig {
    #[serde(default)]
    pub r: f64,
    pub n: usize,
    #[serde(default = "default_width")]
    pub a: f64,
}

fn default_width() -> f64 { 1.0 }

/// Built-in potentials selectable by name.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PotentialKind {
    #[default]
    Zero,
    Harmonic,
    Linear,
    Barrier,
    Step,
}

impl PotentialKind {
    /// Instantiate the named potential.
    pub fn potential(self) -> Box<dyn Potential> {
        match self {
            Self::Zero => Box::new(Zero),
            Self::Harmonic => Box::new(Harmonic),
            Self::Linear => Box::new(Linear),
            Self::Barrier => Box::new(Barrier),
            Self::Step => Box::new(Step),
        }
    }
}

/// `[potential]`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PotentialConfig {
    #[serde(default)]
    pub kind: PotentialKind,
    #[serde(default)]
    pub params: Params,
}

/// `[cache]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub enabled: bool,
    pub dir: PathBuf,
    pub key: CacheKey,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true, dir: PathBuf::from("cache"), key: CacheKey::Content }
    }
}

/// `[solver]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    pub parallel: bool,
    pub epsabs: f64,
    pub epsrel: f64,
    pub limit: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            epsabs: DEF_EPSABS,
            epsrel: DEF_EPSREL,
            limit: DEF_LIMIT,
        }
    }
}

/// `[output]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Number of grid points for sampled wavefunctions and potential.
    pub samples: usize,
    /// Levels whose wavefunctions are written.
    pub levels: Vec<usize>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("output"), samples: 1000, levels: vec![0, 1, 2] }
    }
}

/// `[fit]`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FitConfig {
    /// Half-open `[start, end]` level-index ranges.
    pub zones: Vec<[usize; 2]>,
}

impl FitConfig {
    pub fn ranges(&self) -> Vec<Range<usize>> {
        self.zones.iter().map(|[start, end]| *start..*end).collect()
    }

    /// Like [`Self::ranges`], but dropping (with a warning) every zone that
    /// cannot be fit against a spectrum of `len` levels.
    pub fn ranges_within(&self, len: usize) -> Vec<Range<usize>> {
        self.ranges().into_iter()
            .filter(|zone| {
                let ok = zone.end <= len && zone.len() >= 3;
                if !ok {
                    warn!(start = zone.start, end = zone.end, len, "skipping fit zone");
                }
                ok
            })
            .collect()
    }
}

/// Top-level run configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub well: WellConfig,
    #[serde(default)]
    pub potential: PotentialConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub fit: FitConfig,
}

impl FromStr for RunConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Self = toml::from_str(s)?;
        config.well()?;
        Ok(config)
    }
}

impl RunConfig {
    /// Read and validate a config file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        std::fs::read_to_string(path)?.parse()
    }

    /// Construct the well.
    pub fn well(&self) -> HResult<Well> {
        Well::new(self.well.r, self.well.n, self.well.a)
    }

    /// Instantiate the configured potential.
    pub fn potential(&self) -> Box<dyn Potential> { self.potential.kind.potential() }

    /// Get the cache, or `None` if caching is disabled.
    pub fn cache(&self) -> Option<MatrixCache> {
        self.cache.enabled
            .then(|| MatrixCache::new(&self.cache.dir).with_key(self.cache.key))
    }

    /// Collect quadrature and scheduling settings.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            quad: QuadOptions {
                epsabs: self.solver.epsabs,
                epsrel: self.solver.epsrel,
                limit: self.solver.limit,
            },
            assembly:
                if self.solver.parallel { Assembly::Parallel } else { Assembly::Serial },
        }
    }
}
