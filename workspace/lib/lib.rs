//! Shared plumbing for the driver binaries.

use std::io::Write;
use sqwell::hamiltonian::Progress;
use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber writing to stderr, filtered by `RUST_LOG`
/// (default `info`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Terminal progress bar, redrawn in place on stdout.
///
/// ```text
/// Matrix |██████████████------------------| 43.8% (14/32)
/// ```
#[derive(Clone, Debug)]
pub struct ProgressBar {
    prefix: String,
    length: usize,
    fill: char,
}

impl ProgressBar {
    pub fn new(prefix: &str) -> Self {
        Self { prefix: prefix.to_string(), length: 50, fill: '█' }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length.max(1);
        self
    }

    pub fn with_fill(mut self, fill: char) -> Self {
        self.fill = fill;
        self
    }

    /// Render the bar at `done` out of `total`.
    pub fn render(&self, done: usize, total: usize) -> String {
        let frac = if total == 0 { 1.0 } else { done as f64 / total as f64 };
        let filled = ((self.length as f64 * frac) as usize).min(self.length);
        let bar: String
            = std::iter::repeat(self.fill).take(filled)
            .chain(std::iter::repeat('-').take(self.length - filled))
            .collect();
        format!("{} |{}| {:.1}% ({}/{})", self.prefix, bar, 100.0 * frac, done, total)
    }
}

impl Progress for ProgressBar {
    fn start(&mut self, total: usize) { self.advance(0, total); }

    fn advance(&mut self, done: usize, total: usize) {
        let mut out = std::io::stdout().lock();
        write!(out, "\r{}", self.render(done, total)).ok();
        out.flush().ok();
    }

    fn finish(&mut self) { println!(); }
}
