//! reactor - build reaction executables
//!
//! # Commands
//!
//! - `reactor build ATOMS REACTION OUTPUT`: compile the atom definitions and
//!   reaction, append them to the prebuilt executable and write OUTPUT
//! - `reactor dump FILE`: list the sections appended to a built executable
//!
//! # Logging
//!
//! `--debug` logs every quark, `--verbose` every atom and section. Without
//! either flag `RUST_LOG` applies, defaulting to warnings only. Logs go to
//! stderr.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use reactor_compiler::{build, read_prebuilt, write_executable};
use reactor_inspect::inspect;
use reactor_spec::Settings;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_PREBUILT: &str = "reaction.exe";

/// Compile atom definitions and reactions into runnable executables
#[derive(Parser, Debug)]
#[command(name = "reactor")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a reaction into an executable
    Build(BuildArgs),

    /// List the sections appended to a built executable
    Dump(DumpArgs),
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Atom definitions (JSON array)
    atoms: PathBuf,

    /// Reaction (JSON object)
    reaction: PathBuf,

    /// Output executable
    output: PathBuf,

    /// Prebuilt executable the sections are appended to
    #[arg(long, value_name = "PATH", default_value = DEFAULT_PREBUILT)]
    prebuilt: PathBuf,

    /// Do not print the banner when the reaction runs
    #[arg(long)]
    no_banner: bool,

    /// Do not apply word expansion to arguments when the reaction runs
    #[arg(long)]
    no_wordexp: bool,
}

#[derive(Args, Debug)]
struct DumpArgs {
    /// Built executable
    file: PathBuf,

    /// Byte offset where the appended sections start
    #[arg(long, conflicts_with = "prebuilt", required_unless_present = "prebuilt")]
    offset: Option<usize>,

    /// Prebuilt executable whose length gives the offset
    #[arg(long, value_name = "PATH")]
    prebuilt: Option<PathBuf>,
}

impl BuildArgs {
    fn settings(&self) -> Settings {
        Settings::DEFAULT
            .with_suppress_banner(self.no_banner)
            .with_suppress_word_expansion(self.no_wordexp)
    }
}

fn read_source(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {what} file {}", path.display()))
}

fn run_build(args: &BuildArgs) -> Result<()> {
    let prebuilt = read_prebuilt(&args.prebuilt)
        .with_context(|| format!("Cannot build {}", args.output.display()))?;
    let atoms = read_source(&args.atoms, "atom definitions")?;
    let reaction = read_source(&args.reaction, "reaction")?;
    let settings = args.settings();

    let output = build(&prebuilt, &atoms, &reaction, settings)
        .with_context(|| format!("Failed to compile {}", args.reaction.display()))?;

    write_executable(&args.output, &output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(
        output = %args.output.display(),
        bytes = output.len(),
        appended = output.len() - prebuilt.len(),
        %settings,
        "built reaction executable"
    );
    Ok(())
}

fn run_dump(args: &DumpArgs) -> Result<()> {
    let offset = match (&args.prebuilt, args.offset) {
        (Some(prebuilt), _) => fs::metadata(prebuilt)
            .with_context(|| format!("Failed to read {}", prebuilt.display()))?
            .len() as usize,
        (None, Some(offset)) => offset,
        (None, None) => bail!("either --offset or --prebuilt is required"),
    };

    let bytes = fs::read(&args.file).with_context(|| format!("Failed to read {}", args.file.display()))?;
    let listing = inspect(&bytes, offset)
        .with_context(|| format!("Failed to decode {} at offset {offset}", args.file.display()))?;
    print!("{listing}");
    Ok(())
}

fn init_tracing(cli: &Cli) {
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    match &cli.command {
        Command::Build(args) => run_build(args),
        Command::Dump(args) => run_dump(args),
    }
}
