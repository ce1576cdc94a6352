use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{debug, info, warn};
use std::io::{BufWriter, Write};
use std::time::Instant;
use webdepview_tree::{Config, ReportResult, ServeConfig};

#[derive(Parser)]
#[command(name = "webdepview")]
#[command(about = "Show how much of a package-lock.json tree each dependency brings in", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the dependency report for the nearest package-lock.json
    Report(Config),
    /// Serve the dependency report as an HTML page on localhost
    Serve(ServeConfig),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    match cli.command {
        Commands::Report(cfg) => {
            info!("Running report (ignore dev: {}, sizes: {})", cfg.ignore_dev, cfg.sizes);
            let html_path = cfg.html.clone();

            let mut result = webdepview_tree::run_report(cfg).await?;
            debug!("Reporting {} packages", result.packages.len());

            if result.packages.is_empty() {
                webdepview_tree::print_no_dependencies_message(&mut stdout, &result)?;
            } else {
                webdepview_tree::print_report(&mut stdout, &result)?;
            }

            if let Some(path) = html_path {
                write_html(&path, &result)?;
                writeln!(stdout, "{} Wrote {}", "●".bright_blue(), path.display().to_string().cyan())?;
            }

            print_elapsed(&mut stdout, start)?;
            cache_result(&mut result)
        }
        Commands::Serve(cfg) => {
            info!("Running report for serving on port {}", cfg.port);
            let mut result = webdepview_tree::run_report(cfg.report).await?;
            let html = webdepview_tree::render_html(&result.packages, result.total_size.is_some());
            print_elapsed(&mut stdout, start)?;
            cache_result(&mut result)?;

            let listener = webdepview_tree::bind_with_retry(cfg.port).await?;
            let port = listener.local_addr()?.port();
            let url = format!("http://localhost:{}", port);
            writeln!(stdout, "listening to {}", url.cyan())?;
            stdout.flush()?;

            if cfg.open {
                debug!("Opening {} in the browser", url);
                if let Err(e) = open::that(&url) {
                    warn!("Could not open a browser: {}", e);
                }
            }

            webdepview_tree::serve_on(listener, html).await
        }
    }
}

fn write_html(path: &std::path::Path, result: &ReportResult) -> Result<()> {
    let html = webdepview_tree::render_html(&result.packages, result.total_size.is_some());
    std::fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))
}

fn print_elapsed<W: Write>(writer: &mut W, start: Instant) -> Result<()> {
    writeln!(
        writer,
        "\n{} Finished in {}ms.",
        "●".bright_blue(),
        start.elapsed().as_millis().to_string().cyan()
    )?;
    writer.flush()?;
    Ok(())
}

/// The report has already been printed; a cache write failure still fails the run.
fn cache_result(result: &mut ReportResult) -> Result<()> {
    match result.cache_error.take() {
        Some(e) => Err(e.context("Failed to persist the size cache")),
        None => Ok(()),
    }
}
