// =============================================================================
// reporter.rs — THE TOWN CRIER
// =============================================================================
//
// Two outputs, two audiences. The JSON artifact is for machines: the full
// result set, pretty-printed, in arrival order, every inconclusive probe
// included so nothing is ever silently dropped. The console summary is
// for the operator: just the hits, grouped per queried handle, because
// nobody runs this tool to read thirty lines of "not found".
//
// A failed report write is an inconvenience, not a catastrophe. The
// probing work is already done and lives in memory; we say so loudly and
// print the summary anyway.
// =============================================================================

use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use colored::Colorize;
use tracing::{error, info};

use crate::models::ResultSet;
use crate::prober::HuntSnapshot;

/// Serialize the result set as a pretty-printed JSON array at `path`.
/// Array order is arrival order at the collector; no ordering by site or
/// handle is promised, and none should be inferred.
pub fn persist(results: &ResultSet, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(results.as_slice())
        .context("failed to serialize results")?;
    fs::write(path, json)
        .with_context(|| format!("could not write report to {}", path.display()))?;
    info!(path = %path.display(), results = results.len(), "report persisted");
    Ok(())
}

/// Print the human half of the report: which handles were chased, where
/// they were found, and the run counters. Called after `persist`, whose
/// outcome is reported here — success gets a "saved to" line, failure a
/// loud complaint and nothing else changes.
pub fn print_summary(
    results: &ResultSet,
    handles: &[String],
    snapshot: &HuntSnapshot,
    persisted: &anyhow::Result<()>,
    output: &Path,
) {
    println!();
    println!(
        "{} {}",
        "Searching for usernames:".bold(),
        handles.join(", ").cyan()
    );

    for handle in handles {
        let hits: Vec<_> = results.found_for(handle).collect();
        if hits.is_empty() {
            println!();
            println!("{}", format!("No accounts found for '{handle}'.").yellow());
        } else {
            println!();
            println!("{}", format!("Accounts found for '{handle}':").green().bold());
            for hit in hits {
                println!("  - {:<14} {}", hit.site.bold(), hit.url);
            }
        }
    }

    println!();
    println!(
        "{}",
        format!(
            "{} probes, {} accounts found, {} transport errors, {:.1}s — finished {}",
            snapshot.probes_completed,
            snapshot.accounts_found,
            snapshot.transport_errors,
            snapshot.elapsed.as_secs_f64(),
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        )
        .dimmed()
    );

    match persisted {
        Ok(()) => {
            println!(
                "{}",
                format!("All results have been saved to '{}'.", output.display()).green()
            );
        }
        Err(e) => {
            error!(error = %e, "report write failed");
            eprintln!(
                "{}",
                format!(
                    "Could not save results to '{}': {e:#}. The summary above is complete.",
                    output.display()
                )
                .red()
            );
        }
    }
}
