//! On-disk memoization of assembled Hamiltonian matrices.
//!
//! Matrices are stored as plain comma-separated text, one matrix row per line
//! and no header. Values are written in the shortest scientific notation that
//! parses back to the identical `f64`, so a stored matrix reloads bit-for-bit.
//!
//! There is no file locking: separate processes building the same entry at
//! the same time may race on the file.

use std::{
    fs,
    path::{ Path, PathBuf },
};
use ndarray as nd;
use serde::{ Deserialize, Serialize };
use sha2::{ Digest, Sha256 };
use tracing::debug;
use crate::{
    error::CacheError,
    potential::{ Params, Potential },
    well::Well,
};

pub type CResult<T> = Result<T, CacheError>;

/// Strategy for naming cache entries.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKey {
    /// `h{N}-{hash}.csv`, where the hash covers the basis size, well width,
    /// potential label, and all potential parameters.
    #[default]
    Content,
    /// `h{N}.csv`, keyed by basis size alone.
    ///
    /// Different potentials or widths with the same basis size share one
    /// entry; the caller is responsible for clearing the directory between
    /// distinct setups.
    Size,
}

/// A directory of cached matrices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatrixCache {
    dir: PathBuf,
    key: CacheKey,
}

impl Default for MatrixCache {
    fn default() -> Self { Self::new("cache") }
}

impl MatrixCache {
    /// Create a new content-keyed cache rooted at `dir`. The directory is only
    /// created on the first write.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf(), key: CacheKey::Content }
    }

    /// Set the naming strategy.
    pub fn with_key(mut self, key: CacheKey) -> Self {
        self.key = key;
        self
    }

    /// Get the cache directory.
    pub fn dir(&self) -> &Path { &self.dir }

    /// Get the naming strategy.
    pub fn key(&self) -> CacheKey { self.key }

    /// Return the path of the entry for a given setup.
    pub fn path_for<P>(&self, well: &Well, potential: &P, params: &Params)
        -> PathBuf
    where P: Potential + ?Sized
    {
        let n = well.n();
        match self.key {
            CacheKey::Size => self.dir.join(format!("h{n}.csv")),
            CacheKey::Content => {
                let hash = content_hash(well, potential, params);
                self.dir.join(format!("h{n}-{}.csv", &hash[..16]))
            },
        }
    }

    /// Read an `n`×`n` matrix from `path`.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn load(&self, path: &Path, n: usize) -> CResult<Option<nd::Array2<f64>>> {
        if !path.exists() { return Ok(None); }
        let content = fs::read_to_string(path)?;
        let h = parse_matrix(path, &content, n)?;
        debug!(path = %path.display(), n, "loaded cached matrix");
        Ok(Some(h))
    }

    /// Write a matrix to `path`, creating its parent directory if needed.
    pub fn store<S>(&self, path: &Path, h: &nd::ArrayBase<S, nd::Ix2>)
        -> CResult<()>
    where S: nd::Data<Elem = f64>
    {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, format_matrix(h))?;
        debug!(path = %path.display(), n = h.nrows(), "stored matrix");
        Ok(())
    }

    /// Remove every cache entry in the directory.
    pub fn clear(&self) -> CResult<usize> {
        if !self.dir.exists() { return Ok(0); }
        let mut removed: usize = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_entry
                = path.extension().is_some_and(|ext| ext == "csv")
                && path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with('h'));
            if is_entry {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// SHA-256 of everything that determines the assembled matrix, as lowercase
/// hex.
pub fn content_hash<P>(well: &Well, potential: &P, params: &Params) -> String
where P: Potential + ?Sized
{
    let mut hasher = Sha256::new();
    hasher.update(b"sqwell-h-v1");
    hasher.update((well.n() as u64).to_le_bytes());
    hasher.update(well.a().to_bits().to_le_bytes());
    hasher.update(potential.label().as_bytes());
    hasher.update([0u8]);
    for (key, val) in params.iter() {
        hasher.update(key.as_bytes());
        hasher.update([0u8]);
        hasher.update(val.to_bits().to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

fn format_matrix<S>(h: &nd::ArrayBase<S, nd::Ix2>) -> String
where S: nd::Data<Elem = f64>
{
    let mut out = String::new();
    for row in h.rows() {
        let line: Vec<String> = row.iter().map(|v| format!("{v:e}")).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

fn parse_matrix(path: &Path, content: &str, n: usize)
    -> CResult<nd::Array2<f64>>
{
    let shape_err = |rows: usize, cols: usize| {
        CacheError::Shape { path: path.to_path_buf(), expected: n, rows, cols }
    };
    let mut data: Vec<f64> = Vec::with_capacity(n * n);
    let mut rows: usize = 0;
    for (k, line) in content.lines().enumerate() {
        if line.trim().is_empty() { continue; }
        let row: Vec<f64>
            = line.split(',')
            .map(|field| field.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|err| CacheError::Parse {
                path: path.to_path_buf(),
                line: k + 1,
                msg: err.to_string(),
            })?;
        if row.len() != n { return Err(shape_err(rows + 1, row.len())); }
        data.extend(row);
        rows += 1;
    }
    if rows != n { return Err(shape_err(rows, n)); }
    nd::Array2::from_shape_vec((n, n), data).map_err(|_| shape_err(rows, n))
}
