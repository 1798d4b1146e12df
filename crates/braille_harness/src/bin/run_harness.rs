//! Run Harness
//!
//! Runs braille harness fixtures against an engine bridge and prints the
//! failure report.
//!
//! Usage:
//!   run-harness --engine <CMD> [OPTIONS] [harnessFiles]...
//!
//! Options:
//!   -c, --compact_output   One JSON record per failure
//!   --engine <CMD>         Engine bridge executable (env: LOUIS_ENGINE)
//!   --engine-arg <ARG>     Extra argument for the bridge, repeatable
//!   --harness-dir <DIR>    Fixture directory (env: HARNESS_DIR)
//!   --table-path <PATH>    Table search path (env: LOUIS_TABLEPATH)
//!   --always-succeed       Exit 0 even when cases fail
//!   -v                     More diagnostics on stderr, repeatable

use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::EnvFilter;

use braille_harness::prelude::*;

/// Braille transcription conformance harness
#[derive(Parser, Debug)]
#[command(name = "run-harness", version, about)]
struct Cli {
    /// Harness files to run, relative to the harness directory; globs allowed
    #[arg(value_name = "harnessFiles")]
    harness_files: Vec<String>,

    /// Print one JSON record per failure
    #[arg(short = 'c', long = "compact_output")]
    compact_output: bool,

    /// Engine bridge executable
    #[arg(long, env = "LOUIS_ENGINE")]
    engine: OsString,

    /// Extra argument passed to the engine bridge
    #[arg(long = "engine-arg", value_name = "ARG", allow_hyphen_values = true)]
    engine_args: Vec<OsString>,

    /// Directory the harness files are looked up in
    #[arg(long, env = "HARNESS_DIR")]
    harness_dir: Option<PathBuf>,

    /// Table search path handed to the engine
    #[arg(long, env = "LOUIS_TABLEPATH")]
    table_path: Option<String>,

    /// Exit successfully even when failures or errors were recorded
    #[arg(long)]
    always_succeed: bool,

    /// Enable verbose logging
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let style = if cli.compact_output {
        ReportStyle::Compact
    } else {
        ReportStyle::Verbose
    };
    let config = HarnessConfig::from_env_values(cli.harness_dir, cli.table_path)
        .with_patterns(cli.harness_files)
        .with_style(style);

    let mut engine = CommandEngine::new(cli.engine).with_args(cli.engine_args);
    if let Some(ref table_path) = config.table_path {
        engine = engine.with_table_path(table_path.clone());
    }

    let mut reporter = Reporter::new(config.style);
    let summary = TestRunner::new(FixtureLoader::new(config)).run(&engine, &mut reporter);

    let choice = if std::io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    reporter
        .emit(&mut stdout)
        .context("failed to write the report")?;

    if summary.is_success() || cli.always_succeed {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
