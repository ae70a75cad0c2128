// ██╗  ██╗ █████╗ ███╗   ██╗██████╗ ██╗     ███████╗
// ██║  ██║██╔══██╗████╗  ██║██╔══██╗██║     ██╔════╝
// ███████║███████║██╔██╗ ██║██║  ██║██║     █████╗
// ██╔══██║██╔══██║██║╚██╗██║██║  ██║██║     ██╔══╝
// ██║  ██║██║  ██║██║ ╚████║██████╔╝███████╗███████╗
// ╚═╝  ╚═╝╚═╝  ╚═╝╚═╝  ╚═══╝╚═════╝ ╚══════╝╚══════╝
//
// ██╗  ██╗██╗   ██╗███╗   ██╗████████╗███████╗██████╗
// ██║  ██║██║   ██║████╗  ██║╚══██╔══╝██╔════╝██╔══██╗
// ███████║██║   ██║██╔██╗ ██║   ██║   █████╗  ██████╔╝
// ██╔══██║██║   ██║██║╚██╗██║   ██║   ██╔══╝  ██╔══██╗
// ██║  ██║╚██████╔╝██║ ╚████║   ██║   ███████╗██║  ██║
// ╚═╝  ╚═╝ ╚═════╝ ╚═╝  ╚═══╝   ╚═╝   ╚══════╝╚═╝  ╚═╝
//
// E N G I N E
//
// The most overkill username checker ever conceived.
// Rust + Tokio + bounded queues + SIMD substring search + rayon.
// All to find out whether somebody registered "bob" on Tumblr.

mod catalog;
mod cli;
mod collector;
mod config;
mod dispatcher;
mod geo;
mod lens;
mod models;
mod prober;
mod reporter;
mod similarity;

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::catalog::Catalog;
use crate::cli::{Cli, Mode};
use crate::config::HuntConfig;

fn print_banner() {
    let banner = r#"
    ╔══════════════════════════════════════════════════════════════════╗
    ║                                                                  ║
    ║   ██╗  ██╗ █████╗ ███╗   ██╗██████╗ ██╗     ███████╗             ║
    ║   ██║  ██║██╔══██╗████╗  ██║██╔══██╗██║     ██╔════╝             ║
    ║   ███████║███████║██╔██╗ ██║██║  ██║██║     █████╗               ║
    ║   ██╔══██║██╔══██║██║╚██╗██║██║  ██║██║     ██╔══╝               ║
    ║   ██║  ██║██║  ██║██║ ╚████║██████╔╝███████╗███████╗             ║
    ║   ╚═╝  ╚═╝╚═╝  ╚═╝╚═╝  ╚═══╝╚═════╝ ╚══════╝╚══════╝             ║
    ║                                                                  ║
    ║   ██╗  ██╗██╗   ██╗███╗   ██╗████████╗███████╗██████╗            ║
    ║   ██║  ██║██║   ██║████╗  ██║╚══██╔══╝██╔════╝██╔══██╗           ║
    ║   ███████║██║   ██║██╔██╗ ██║   ██║   █████╗  ██████╔╝           ║
    ║   ██╔══██║██║   ██║██║╚██╗██║   ██║   ██╔══╝  ██╔══██╗           ║
    ║   ██║  ██║╚██████╔╝██║ ╚████║   ██║   ███████╗██║  ██║           ║
    ║   ╚═╝  ╚═╝ ╚═════╝ ╚═╝  ╚═══╝   ╚═╝   ╚══════╝╚═╝  ╚═╝           ║
    ║                                                                  ║
    ║        ⚡ USERNAME RECONNAISSANCE ENGINE ⚡                       ║
    ║                                                                  ║
    ║   Catalog:  30 services, zero mercy                              ║
    ║   Pool:     bounded workers over bounded queues                  ║
    ║   Throttle: per-worker politeness, like our mothers taught us    ║
    ║                                                                  ║
    ║   "If the handle exists, we knock on its door."                  ║
    ║                                                                  ║
    ╚══════════════════════════════════════════════════════════════════╝
    "#;
    println!("{}", banner.red());
}

/// The username mode, end to end: validate, hunt, persist, report.
async fn run_username_search(
    username: String,
    concurrency: usize,
    timeout: u64,
    output: PathBuf,
    alternate: bool,
) -> anyhow::Result<()> {
    dispatcher::validate_handle(&username)?;

    let config = HuntConfig::new(concurrency, timeout, output);
    let catalog = Catalog::builtin();
    let handles = dispatcher::queried_handles(&username, alternate);

    info!(
        username = %username,
        alternate,
        workers = config.concurrency,
        "starting hunt"
    );

    let (results, snapshot) = prober::hunt(&config, &catalog, &handles).await?;

    // Persistence failure is non-fatal: the probing work is done and the
    // summary below still prints from memory.
    let persisted = reporter::persist(&results, &config.output);
    reporter::print_summary(&results, &handles, &snapshot, &persisted, &config.output);

    Ok(())
}

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    print_banner();

    let outcome = match cli.mode {
        Mode::Username {
            username,
            concurrency,
            timeout,
            output,
            alternate,
        } => run_username_search(username, concurrency, timeout, output, alternate).await,
        Mode::Websimilarity { urls } => similarity::run(&urls).await,
        Mode::Lens { image } => lens::run(&image).await,
        Mode::Geo { image } => geo::run(&image).await,
    };

    if let Err(e) = outcome {
        eprintln!("{}", format!("error: {e:#}").red().bold());
        std::process::exit(1);
    }
}
