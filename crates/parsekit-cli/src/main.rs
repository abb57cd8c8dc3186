// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The `parsekit` command-line scanner.
//!
//! Discovers source files by extension under the listed paths and
//! drives one lexer/parser pair per file across a worker pool,
//! reporting counters and timings on request.

use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::{Context, IntoDiagnostic, Result};

mod discover;
mod pool;
mod scan;
mod stats;

/// Parsekit: scan source trees with a dispatch-table front end
#[derive(Debug, Parser)]
#[command(name = "parsekit")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Top-level path to the project; non-absolute scan paths are
    /// searched under here
    #[arg(short = 'P', long, default_value = ".")]
    project: Utf8PathBuf,

    /// File extension to scan for, e.g. ".pk"
    #[arg(long)]
    ext: String,

    /// Number of concurrent workers (jobs)
    #[arg(short = 'j', long, default_value_t = 8)]
    concurrency: usize,

    /// Report stats on exit
    #[arg(long)]
    stats: bool,

    /// Enable additional output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Paths to scan; defaults to the current directory
    paths: Vec<String>,
}

/// Maps the repeatable `-v` flag onto subscriber levels, deferring to
/// `RUST_LOG` when set.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> Result<()> {
    stats::init();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    // A clean, absolute path to the project directory.
    let project = std::fs::canonicalize(cli.project.as_std_path())
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot resolve project path '{}'", cli.project))?;
    let project = Utf8PathBuf::from_path_buf(project)
        .map_err(|path| miette::miette!("project path '{}' is not UTF-8", path.display()))?;

    let paths = if cli.paths.is_empty() {
        vec![".".to_owned()]
    } else {
        cli.paths.clone()
    };

    let options = scan::ScanOptions {
        sink: Arc::new(scan::StatsSink::default()),
        tracing: cli.verbose > 1,
        verbose_tracing: cli.verbose > 2,
    };

    stats::time("parsing.total", true, || {
        pool::parse_files(
            &cli.ext,
            &paths,
            &project,
            cli.concurrency,
            cli.verbose > 1,
            |path| scan::scan_file(path, &options),
        );
    });

    if cli.stats {
        stats::report_counters();
        stats::report_timings();
    }

    Ok(())
}
