// =============================================================================
// collector.rs — THE RESULT VACUUM
// =============================================================================
//
// One task, one job: drain the result queue into a ResultSet and never,
// ever lose a probe. The collector starts *before* the first probe is
// dispatched, so producers can never wedge themselves against a full,
// undrained queue — the classic pipeline deadlock, pre-empted by simply
// turning the vacuum on first.
//
// Completion protocol, in order, no shortcuts:
//   1. every worker exits and drops its result sender,
//   2. the channel reports closed (recv returns None),
//   3. the drain finishes.
// With tokio mpsc, (1) and (2) are the same event: the stream can only
// close after the last producer is gone, so a slow worker's final result
// is always still in the queue when we get the close. That ordering is
// the whole reason this module is allowed to be this short.
// =============================================================================

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::models::{ProbeResult, ResultSet};

/// Drain the result channel to exhaustion. Returns only after every
/// producer has hung up and every in-flight result has been appended.
pub async fn collect(mut rx: mpsc::Receiver<ProbeResult>) -> ResultSet {
    let mut set = ResultSet::new();

    while let Some(result) = rx.recv().await {
        debug!(result = %result, "collected");
        set.push(result);
    }

    info!(results = set.len(), "Collector done — result stream drained");
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProbeJob, SiteSpec};

    fn result_for(site: &str) -> ProbeResult {
        let job = ProbeJob {
            site: SiteSpec::new(site, "https://x.example/{}", ""),
            handle: "bob".to_string(),
        };
        ProbeResult::transport_failure(&job, format!("https://x.example/{site}"), "nope")
    }

    #[tokio::test]
    async fn test_collects_everything_then_stops_on_close() {
        let (tx, rx) = mpsc::channel(4);
        let collector = tokio::spawn(collect(rx));

        for site in ["A", "B", "C", "D", "E"] {
            tx.send(result_for(site)).await.unwrap();
        }
        drop(tx);

        let set = collector.await.unwrap();
        assert_eq!(set.len(), 5);
    }

    #[tokio::test]
    async fn test_survives_multiple_producers_hanging_up_at_different_times() {
        let (tx, rx) = mpsc::channel(2);
        let collector = tokio::spawn(collect(rx));

        let mut producers = Vec::new();
        for (i, site) in ["A", "B", "C"].into_iter().enumerate() {
            let tx = tx.clone();
            producers.push(tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(i as u64 * 20)).await;
                tx.send(result_for(site)).await.unwrap();
            }));
        }
        drop(tx);

        for p in producers {
            p.await.unwrap();
        }
        let set = collector.await.unwrap();
        assert_eq!(set.len(), 3);
    }
}
