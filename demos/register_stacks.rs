//! Register two point-set files and emit the matched correspondences.
//!
//! ```text
//! register_stacks source.txt target.txt --params "minpoints=3,eps=2.0,threshold=1.0" \
//!     --output correspondences.txt
//! ```

use anyhow::Context;
use clap::Parser;
use stackalign_algorithms::register;
use stackalign_core::RegistrationParams;
use stackalign_io::{read_point_set, write_correspondences};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "Align two point sets and emit their correspondences")]
struct Args {
    /// Source point-set file (one point per line)
    source: PathBuf,

    /// Target point-set file (one point per line)
    target: PathBuf,

    /// Registration parameters as key=value pairs,
    /// e.g. "minpoints=3,eps=2.0,threshold=1.0"
    #[arg(short, long)]
    params: String,

    /// Output file for correspondence records (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let params = RegistrationParams::parse(&args.params)
        .with_context(|| format!("invalid parameter string [{}]", args.params))?;

    let source = read_point_set(&args.source)
        .with_context(|| format!("reading {}", args.source.display()))?;
    let target = read_point_set(&args.target)
        .with_context(|| format!("reading {}", args.target.display()))?;
    log::info!(
        "loaded {} source points, {} target points",
        source.len(),
        target.len()
    );

    let result = register(&source, &target, &params).context("registration failed")?;

    match &args.output {
        Some(path) => {
            stackalign_io::write_correspondence_file(path, &result.correspondences)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write_correspondences(&mut lock, &result.correspondences)?;
            lock.flush()?;
        }
    }

    eprintln!(
        "{} source clusters, {} target clusters, {} consistent transformations, {} correspondences",
        result.source_clusters,
        result.target_clusters,
        result.transformations.len(),
        result.correspondences.len()
    );

    Ok(())
}
