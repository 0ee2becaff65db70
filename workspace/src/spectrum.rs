use std::{ fs, path::PathBuf };
use anyhow::Context;
use clap::Parser;
use ndarray as nd;
use ndarray_npy::NpzWriter;
use tracing::{ info, warn };
use lib::{ init_logging, ProgressBar };
use sqwell::{
    config::RunConfig,
    hamiltonian::{ build_with, Assembly },
    potential::sample_potential,
    spectrum::fit_zones,
    utils::wf_norm,
};

/// Compute the spectrum of a potential inside an infinite square well.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Run configuration (TOML).
    #[arg(short, long, default_value = "spectrum.toml")]
    config: PathBuf,

    /// Override the basis size.
    #[arg(short)]
    n: Option<usize>,

    /// Override the well width.
    #[arg(short)]
    a: Option<f64>,

    /// Always recompute the matrix, ignoring the cache.
    #[arg(long)]
    no_cache: bool,

    /// Assemble on the calling thread only.
    #[arg(long)]
    serial: bool,

    /// Number of levels to print.
    #[arg(long, default_value_t = 10)]
    show: usize,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = RunConfig::from_path(&cli.config)
        .with_context(|| format!("reading {}", cli.config.display()))?;
    if let Some(n) = cli.n { config.well.n = n; }
    if let Some(a) = cli.a { config.well.a = a; }
    if cli.no_cache { config.cache.enabled = false; }

    let well = config.well()?;
    let potential = config.potential();
    let params = &config.potential.params;
    let cache = config.cache();
    let mut opts = config.build_options();
    if cli.serial { opts.assembly = Assembly::Serial; }
    info!(
        potential = %potential.label(),
        n = well.n(),
        a = well.a(),
        cached = cache.is_some(),
        "building hamiltonian",
    );

    let mut bar = ProgressBar::new("Matrix");
    let h = build_with(
        &well, Some(potential.as_ref()), params, cache.as_ref(), &opts, &mut bar)?;
    if h.is_cached() { info!(origin = ?h.origin(), "loaded from cache"); }

    let eig = h.diagonalize()?;
    let energies = eig.values();
    for (k, e) in energies.iter().enumerate().take(cli.show) {
        println!("E[{:>3}] = {:.6}", k, e);
    }

    anyhow::ensure!(config.output.samples >= 2, "output.samples must be at least 2");
    let x = well.grid(config.output.samples);
    let dx = x[1] - x[0];
    let v = sample_potential(potential.as_ref(), params, &x);
    let levels: Vec<usize>
        = config.output.levels.iter().copied()
        .filter(|&n| {
            let ok = n < eig.len();
            if !ok { warn!(level = n, len = eig.len(), "skipping level"); }
            ok
        })
        .collect();
    let wfs = eig.wavefunctions(&x, &levels)?;
    for (n, wf) in levels.iter().zip(wfs.rows()) {
        info!(level = n, norm = wf_norm(&wf, dx), "projected wavefunction");
    }

    let zones = config.fit.ranges_within(eig.len());
    let fits = fit_zones(energies, &zones)?;
    let mut coeffs: nd::Array2<f64> = nd::Array2::zeros((fits.len(), 3));
    for (fit, mut row) in fits.iter().zip(coeffs.rows_mut()) {
        row.assign(&nd::array![fit.c2, fit.c1, fit.c0]);
    }
    for (zone, fit) in zones.iter().zip(&fits) {
        println!(
            "zone {:>3}..{:<3} E(n) ≈ {:.6} n² + {:.6} n + {:.6}",
            zone.start, zone.end, fit.c2, fit.c1, fit.c0,
        );
    }
    let zone_bounds: nd::Array2<i64>
        = nd::Array2::from_shape_fn((zones.len(), 2), |(i, j)| {
            (if j == 0 { zones[i].start } else { zones[i].end }) as i64
        });
    let levels_arr: nd::Array1<i64> = levels.iter().map(|&n| n as i64).collect();

    let outdir = &config.output.dir;
    fs::create_dir_all(outdir)?;
    let outfile = outdir.join("spectrum.npz");
    let mut npz = NpzWriter::new(fs::File::create(&outfile)?);
    npz.add_array("x", &x)?;
    npz.add_array("v", &v)?;
    npz.add_array("e", energies)?;
    npz.add_array("levels", &levels_arr)?;
    npz.add_array("wf", &wfs)?;
    npz.add_array("zones", &zone_bounds)?;
    npz.add_array("fits", &coeffs)?;
    npz.finish()?;
    info!(path = %outfile.display(), "wrote output");
    Ok(())
}
