use std::{ fs, path::PathBuf };
use clap::Parser;
use ndarray as nd;
use ndarray_npy::NpzWriter;
use tracing::info;
use lib::{ init_logging, ProgressBar };
use sqwell::{
    cache::MatrixCache,
    hamiltonian::{ build_with, Assembly, BuildOptions },
    potential::{ sample_potential, Harmonic, Params },
    units::{ self, BoxUnits },
    well::Well,
};

const MASS: f64 = 1.0; // electron masses
const LSCALE: f64 = 20.0; // well width; Bohr radii

/// Compare the low levels of a harmonic trap inside a unit well against the
/// free oscillator ladder `E_j = (2 j + 1) √k / π`.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Basis size.
    #[arg(short, default_value_t = 60)]
    n: usize,

    /// Spring constant.
    #[arg(short, default_value_t = 1e4)]
    k: f64,

    /// Number of levels to compare.
    #[arg(long, default_value_t = 12)]
    levels: usize,

    /// Cache directory; no caching if omitted.
    #[arg(long)]
    cache: Option<PathBuf>,

    #[arg(long, default_value = "output")]
    outdir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let uu = BoxUnits::from_au(MASS, LSCALE);

    let well = Well::new(0.0, cli.n, 1.0)?;
    let params = Params::new().with("k", cli.k);
    let cache = cli.cache.as_ref().map(MatrixCache::new);
    let opts = BuildOptions { assembly: Assembly::Parallel, ..Default::default() };
    let h = build_with(
        &well,
        Some(&Harmonic),
        &params,
        cache.as_ref(),
        &opts,
        &mut ProgressBar::new("Matrix"),
    )?;
    let eig = h.diagonalize()?;

    let quantum = 2.0 * cli.k.sqrt() / std::f64::consts::PI;
    let levels = cli.levels.min(eig.len());
    let analytic: nd::Array1<f64>
        = (0..levels).map(|j| (j as f64 + 0.5) * quantum).collect();
    let computed: nd::Array1<f64>
        = eig.values().slice(nd::s![..levels]).to_owned();
    println!("  j      computed      analytic     rel. err    E (eV)");
    for (j, (ec, ea)) in computed.iter().zip(&analytic).enumerate() {
        let e_ev: f64 = uu.from_nat_energy(*ec) * units::Eh / units::e;
        println!(
            "{:>3}  {:>12.6}  {:>12.6}  {:>10.3e}  {:>8.4}",
            j, ec, ea, ((ec - ea) / ea).abs(), e_ev,
        );
    }
    // levels stay harmonic only while well below the walls at k a²/4
    info!(wall = cli.k / 4.0, quantum, "oscillator scales");

    let x = well.grid(1000);
    let v = sample_potential(&Harmonic, &params, &x);
    let wfs = eig.wavefunctions(&x, &(0..levels.min(4)).collect::<Vec<_>>())?;
    fs::create_dir_all(&cli.outdir)?;
    let outfile = cli.outdir.join("harmonic.npz");
    let mut npz = NpzWriter::new(fs::File::create(&outfile)?);
    npz.add_array("x", &x)?;
    npz.add_array("v", &v)?;
    npz.add_array("e", &computed)?;
    npz.add_array("e_analytic", &analytic)?;
    npz.add_array("enat", &nd::array![uu.e])?;
    npz.add_array("wf", &wfs)?;
    npz.finish()?;
    info!(path = %outfile.display(), "wrote output");
    Ok(())
}
