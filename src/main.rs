use clap::Parser;
use colored::*;
use std::io::{Result, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod bazel;
mod cmake;
mod util;

/// Convert cmake library exports into bazel cc_library rules.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Paths to cmake export files.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// TOML file replacing the built-in dependency tables.
    #[arg(short, long)]
    tables: Option<PathBuf>,

    /// Write rules to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("{} {}", "error".red(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let tables = match &args.tables {
        Some(path) => util::read_tables(path)?,
        None => bazel::Tables::default(),
    };

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => {
            info!(path = %path.display(), "writing rules");
            Box::new(std::fs::File::create(path)?)
        }
        None => Box::new(std::io::stdout().lock()),
    };

    for path in &args.files {
        out.write_all(util::convert(path, &tables)?.as_bytes())?;
    }
    out.flush()
}
