// =============================================================================
// dispatcher.rs — THE JOB CANNON
// =============================================================================
//
// The dispatcher's whole job is multiplication: one handle (or two, with
// the alternate-case trick) times one catalog equals a stream of probe
// jobs. It feeds them into a *bounded* channel, which means a slow worker
// pool throttles the dispatcher for free. No semaphores, no token buckets,
// no unbounded buffering — just a queue that politely refuses to grow.
//
// When the last job is in, the dispatcher drops its sender. That closed
// channel is the one and only "no more work" signal the workers get.
// Simple protocols are the ones that survive contact with production.
// =============================================================================

use anyhow::bail;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::models::ProbeJob;

/// The one input error clap can't catch: a present-but-blank username.
/// Fatal before a single request leaves the building.
pub fn validate_handle(handle: &str) -> anyhow::Result<()> {
    if handle.trim().is_empty() {
        bail!("please provide a non-empty username with --username");
    }
    Ok(())
}

/// Swap the case of every letter in a string, leaving non-letters alone.
///
/// "Bob" becomes "bOB". "abc123" becomes "ABC123". Applying it twice gets
/// you back where you started, which the tests insist on. People who
/// register a handle on one service and its case-flipped twin on another
/// are real, and this is how we catch them.
///
/// Only letters whose counterpart is a single char get flipped. "ß" would
/// expand to "SS", and "SS" flips back to "ss", not "ß" — so multi-char
/// mappings stay as they are and the round trip holds.
pub fn invert_case(s: &str) -> String {
    s.chars().map(flip_char).collect()
}

fn flip_char(c: char) -> char {
    if c.is_uppercase() {
        single_char(c.to_lowercase()).unwrap_or(c)
    } else if c.is_lowercase() {
        single_char(c.to_uppercase()).unwrap_or(c)
    } else {
        c
    }
}

fn single_char(mut mapped: impl Iterator<Item = char>) -> Option<char> {
    match (mapped.next(), mapped.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// The handles a run will actually chase: the primary, plus the
/// case-inverted variant when `alternate` is set. Order matters — the
/// report groups by handle in this order.
pub fn queried_handles(handle: &str, alternate: bool) -> Vec<String> {
    let mut handles = vec![handle.to_string()];
    if alternate {
        handles.push(invert_case(handle));
    }
    handles
}

/// Expand handles against the catalog into the full job list, in dispatch
/// order: every site for the first handle, then every site for the next.
pub fn expand_jobs(catalog: &Catalog, handles: &[String]) -> Vec<ProbeJob> {
    handles
        .iter()
        .flat_map(|handle| {
            catalog.sites().iter().map(move |site| ProbeJob {
                site: site.clone(),
                handle: handle.clone(),
            })
        })
        .collect()
}

/// Spawn the dispatcher task. It feeds jobs into the bounded queue —
/// blocking whenever the queue is full, which is the backpressure working
/// as designed — and drops the sender when it's done. Returns the number
/// of jobs it dispatched, because the collector invariant
/// (results == jobs) is only checkable if somebody kept count.
pub fn spawn(catalog: Catalog, handles: Vec<String>, tx: mpsc::Sender<ProbeJob>) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let jobs = expand_jobs(&catalog, &handles);
        let total = jobs.len();
        info!(
            sites = catalog.len(),
            handles = handles.len(),
            jobs = total,
            "Dispatcher online — loading the job cannon"
        );

        for job in jobs {
            debug!(site = %job.site.name, handle = %job.handle, "dispatching job");
            if tx.send(job).await.is_err() {
                // Every worker is gone. Nobody left to probe anything,
                // so there is nothing useful to do but stop.
                debug!("job channel closed before dispatch finished");
                break;
            }
        }

        info!(jobs = total, "Dispatcher done — job stream closed");
        total
        // tx drops here; that close is the workers' termination signal
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SiteSpec;

    fn tiny_catalog() -> Catalog {
        Catalog::new(vec![
            SiteSpec::new("A", "https://a.example/{}", "gone"),
            SiteSpec::new("B", "https://b.example/{}", ""),
            SiteSpec::new("C", "https://c.example/u/{}", "not found"),
        ])
    }

    #[test]
    fn test_blank_handles_are_rejected() {
        assert!(validate_handle("").is_err());
        assert!(validate_handle("   ").is_err());
        assert!(validate_handle("\t\n").is_err());
        assert!(validate_handle("bob").is_ok());
    }

    #[test]
    fn test_invert_case_flips_letters_only() {
        assert_eq!(invert_case("abc123"), "ABC123");
        assert_eq!(invert_case("Bob"), "bOB");
        assert_eq!(invert_case("snake_case-99"), "SNAKE_CASE-99");
    }

    #[test]
    fn test_invert_case_is_idempotent_under_double_application() {
        for s in ["Bob", "abc123", "XyZ", "", "ALLCAPS", "nocaps"] {
            assert_eq!(invert_case(&invert_case(s)), s);
        }
    }

    #[test]
    fn test_invert_case_leaves_multi_char_mappings_alone() {
        // Uppercasing "ß" yields "SS"; a letter with no single-char
        // counterpart must pass through untouched or the round trip breaks.
        assert_eq!(invert_case("straße"), "STRAßE");
        assert_eq!(invert_case(&invert_case("straße")), "straße");
    }

    #[test]
    fn test_single_handle_yields_one_job_per_site() {
        let catalog = tiny_catalog();
        let handles = queried_handles("bob", false);
        let jobs = expand_jobs(&catalog, &handles);
        assert_eq!(jobs.len(), catalog.len());
        assert!(jobs.iter().all(|j| j.handle == "bob"));
    }

    #[test]
    fn test_alternate_doubles_the_job_count() {
        let catalog = tiny_catalog();
        let handles = queried_handles("Bob", true);
        let jobs = expand_jobs(&catalog, &handles);
        assert_eq!(jobs.len(), catalog.len() * 2);

        // First half chases the primary handle, second half the inverted one.
        let (first, second) = jobs.split_at(catalog.len());
        assert!(first.iter().all(|j| j.handle == "Bob"));
        assert!(second.iter().all(|j| j.handle == "bOB"));
    }

    #[test]
    fn test_jobs_follow_catalog_order() {
        let catalog = tiny_catalog();
        let jobs = expand_jobs(&catalog, &queried_handles("bob", false));
        let names: Vec<&str> = jobs.iter().map(|j| j.site.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_spawned_dispatcher_closes_the_stream() {
        let catalog = tiny_catalog();
        let (tx, mut rx) = tokio::sync::mpsc::channel(2);
        let handle = spawn(catalog, queried_handles("bob", false), tx);

        let mut seen = 0;
        while rx.recv().await.is_some() {
            seen += 1;
        }
        let dispatched = handle.await.unwrap();
        assert_eq!(seen, 3);
        assert_eq!(dispatched, 3);
    }
}
