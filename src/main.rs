//! tiff-inspect - list TIFF tags and report embedded XMP and vendor metadata.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiff_inspect::batch::{collect_paths, FileReport};
use tiff_inspect::config::Config;
use tiff_inspect::display::TextRenderer;
use tiff_inspect::inspect::{Inspector, Report};

fn main() -> ExitCode {
    let config = Config::parse();
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let mut failed = false;
    let mut paths = Vec::new();
    for root in &config.paths {
        match collect_paths(root, &config.extensions, config.recursive) {
            Ok(found) => paths.extend(found),
            Err(e) => {
                error!("Cannot list {}: {}", root.display(), e);
                failed = true;
            }
        }
    }
    debug!(files = paths.len(), jobs = config.jobs, "starting inspection");

    let reports = run(paths, &config.inspector(), config.jobs);
    failed |= reports.iter().any(|report| report.result.is_err());

    if let Err(e) = print_reports(&config, &reports) {
        error!("Failed to write output: {}", e);
        return ExitCode::FAILURE;
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "tiff_inspect=debug"
    } else {
        "tiff_inspect=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[cfg(feature = "tokio")]
fn run(paths: Vec<PathBuf>, inspector: &Inspector, jobs: usize) -> Vec<FileReport> {
    match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime.block_on(tiff_inspect::batch::inspect_paths_concurrent(
            paths, inspector, jobs,
        )),
        Err(e) => {
            error!("Failed to start runtime, inspecting sequentially: {}", e);
            tiff_inspect::batch::inspect_paths(&paths, inspector)
        }
    }
}

#[cfg(not(feature = "tokio"))]
fn run(paths: Vec<PathBuf>, inspector: &Inspector, _jobs: usize) -> Vec<FileReport> {
    tiff_inspect::batch::inspect_paths(&paths, inspector)
}

/// One line of `--json` output.
#[derive(Serialize)]
struct JsonLine<'a> {
    path: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn print_reports(config: &Config, reports: &[FileReport]) -> io::Result<()> {
    let renderer = TextRenderer::default()
        .with_truncate(config.truncate)
        .with_tag_names(config.verbose);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for file in reports {
        if config.json {
            let line = JsonLine {
                path: &file.path,
                report: file.result.as_ref().ok(),
                error: file.result.as_ref().err().map(ToString::to_string),
            };
            serde_json::to_writer(&mut out, &line)?;
            writeln!(out)?;
            continue;
        }
        match &file.result {
            Ok(report) => renderer.write_report(&mut out, &file.path, report)?,
            Err(e) => eprintln!("Error reading {}: {}", file.path.display(), e),
        }
    }
    out.flush()
}
