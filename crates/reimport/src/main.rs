use clap::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Fix missing, unused and misplaced imports in Python source files.
#[derive(Parser)]
#[command(name = "reimport", version)]
struct Cli {
    /// Files to fix in place; none (or `-`) reads stdin and writes
    /// the fixed source to stdout.
    files: Vec<PathBuf>,

    /// Read configuration from this file instead of the project's
    /// pyproject.toml.
    #[arg(long, value_name = "PATH")]
    config_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    use anyhow::Context;

    let config = match &cli.config_file {
        Some(path) => reimport::Config::load(path)?,
        None => {
            let cwd = std::env::current_dir().context("cannot determine working directory")?;
            reimport::Config::discover(&reimport_index::find_project_root(&cwd))?
        }
    };

    let stdin_mode =
        cli.files.is_empty() || (cli.files.len() == 1 && cli.files[0] == Path::new("-"));
    if stdin_mode {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("failed to read stdin")?;
        print!("{}", reimport::fix_code(&source, &config));
    } else {
        reimport::fix_files(&cli.files, &config)?;
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
