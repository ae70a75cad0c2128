// =============================================================================
// prober.rs — THE WORKER POOL OF TRUTH
// =============================================================================
//
// This is the core of the engine: N workers pulling probe jobs off a shared
// bounded queue, firing rate-limited HTTP GETs, and classifying whatever
// comes back. Every job produces exactly one result — a timeout is a
// result, a malformed URL is a result, a 503 from a site having a bad day
// is a result. Nothing is retried, nothing is dropped, and no worker can
// take the pool down with it.
//
// The classifier is a pure function. Same status, same marker, same body:
// same verdict, every time, forever. Everything nondeterministic (the
// network) happens before it; everything opinionated happens inside it.
//
// One documented heuristic to be aware of: a 301/302 counts as evidence
// the handle exists. Sites that redirect unknown handles to a generic
// landing page will produce false positives. This is inherited behavior,
// preserved on purpose — the operator reads the reason field and judges.
// =============================================================================

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use futures::future::join_all;
use memchr::memmem;
use portable_atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use url::Url;

use crate::catalog::Catalog;
use crate::collector;
use crate::config::HuntConfig;
use crate::dispatcher;
use crate::models::{ProbeJob, ProbeResult, ResultSet};

/// What the classifier decided about one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub found: bool,
    pub reason: String,
}

impl Verdict {
    fn found(reason: &str) -> Self {
        Self { found: true, reason: reason.to_string() }
    }

    fn not_found(reason: String) -> Self {
        Self { found: false, reason }
    }
}

/// The decision procedure, in strict priority order:
///
///   1. 200 + non-empty marker + marker present in body → not found.
///      The site said "OK" but the page says the profile isn't there.
///   2. 200 otherwise → found.
///   3. 301/302 → found, reason "redirect". Heuristic, see module header.
///   4. 404 → not found, the one status code that means what it says.
///   5. anything else → not found, raw status recorded for the operator.
///      Inconclusive is not an error; it's a data point.
///
/// `body_lower` must already be lower-cased by the caller (the worker
/// lower-cases each body exactly once). The marker is lower-cased here,
/// so the comparison is case-insensitive end to end.
pub fn classify(status: u16, body_lower: &str, marker: &str) -> Verdict {
    match status {
        200 => {
            if !marker.is_empty() {
                let marker_lower = marker.to_lowercase();
                // SIMD substring search. For a one-off marker check this is
                // showing off, and we are completely at peace with that.
                if memmem::find(body_lower.as_bytes(), marker_lower.as_bytes()).is_some() {
                    return Verdict::not_found("not found marker present".to_string());
                }
            }
            Verdict::found("")
        }
        301 | 302 => Verdict::found("redirect"),
        404 => Verdict::not_found("not found".to_string()),
        other => Verdict::not_found(format!("status {other}")),
    }
}

/// Substitute the handle into the template's single `{}` slot.
pub fn build_url(template: &str, handle: &str) -> String {
    template.replacen("{}", handle, 1)
}

/// Lock-free run counters, bumped by workers and read by the reporter.
/// Atomics because mutexes are for the weak.
pub struct HuntStats {
    probes_completed: AtomicU64,
    accounts_found: AtomicU64,
    transport_errors: AtomicU64,
    started: Instant,
}

/// A point-in-time copy of the counters, safe to hand to the reporter.
#[derive(Debug, Clone)]
pub struct HuntSnapshot {
    pub probes_completed: u64,
    pub accounts_found: u64,
    pub transport_errors: u64,
    pub elapsed: Duration,
}

impl HuntStats {
    pub fn new() -> Self {
        Self {
            probes_completed: AtomicU64::new(0),
            accounts_found: AtomicU64::new(0),
            transport_errors: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    fn record(&self, result: &ProbeResult) {
        self.probes_completed.fetch_add(1, Ordering::Relaxed);
        if result.found {
            self.accounts_found.fetch_add(1, Ordering::Relaxed);
        }
        if result.status == 0 {
            self.transport_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> HuntSnapshot {
        HuntSnapshot {
            probes_completed: self.probes_completed.load(Ordering::Relaxed),
            accounts_found: self.accounts_found.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            elapsed: self.started.elapsed(),
        }
    }
}

impl Default for HuntStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Execute one probe: build the URL, fire the GET, classify the response.
/// Always returns a result. A probe that never got a response comes back
/// with status 0 and the transport error as its reason — recorded, not
/// retried, and no concern of any other job.
pub async fn probe(client: &reqwest::Client, job: &ProbeJob) -> ProbeResult {
    let start = Instant::now();
    let url = build_url(&job.site.url_template, &job.handle);

    // A template slot can produce garbage (empty handle fragments, spaces,
    // a handle full of slashes). Catch it here instead of letting reqwest
    // produce a less helpful error later.
    if let Err(e) = Url::parse(&url) {
        return ProbeResult::transport_failure(job, url, format!("invalid url: {e}"));
    }

    let response = match client.get(&url).send().await {
        Ok(resp) => resp,
        Err(e) => {
            let mut result = ProbeResult::transport_failure(job, url, e.to_string());
            result.duration_ms = start.elapsed().as_millis() as u64;
            return result;
        }
    };

    let status = response.status().as_u16();
    // A body that fails mid-read classifies as an empty body. For marker
    // matching that errs on the side of "found", same as a marker the
    // site forgot to serve.
    let body = response.text().await.unwrap_or_default();
    let body_lower = body.to_lowercase();

    let verdict = classify(status, &body_lower, &job.site.not_found_marker);

    ProbeResult {
        site: job.site.name.clone(),
        username: job.handle.clone(),
        url,
        found: verdict.found,
        status,
        reason: verdict.reason,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

/// Spawn the worker pool. Workers share one receiver behind an async
/// mutex — each worker locks just long enough to pull one job, probes it
/// with the mutex released, and loops until the job stream closes.
fn spawn_workers(
    config: &HuntConfig,
    client: reqwest::Client,
    jobs: Arc<Mutex<mpsc::Receiver<ProbeJob>>>,
    results: mpsc::Sender<ProbeResult>,
    stats: Arc<HuntStats>,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::with_capacity(config.concurrency);

    for worker_id in 0..config.concurrency {
        let client = client.clone();
        let jobs = Arc::clone(&jobs);
        let results = results.clone();
        let stats = Arc::clone(&stats);
        let delay = config.politeness_delay;

        handles.push(tokio::spawn(async move {
            debug!(worker_id, "worker online");
            loop {
                // Hold the lock only for the dequeue. Probing with the
                // receiver locked would serialize the whole pool.
                let job = {
                    let mut rx = jobs.lock().await;
                    rx.recv().await
                };

                let Some(job) = job else {
                    debug!(worker_id, "job stream exhausted — worker exiting");
                    break;
                };

                let result = probe(&client, &job).await;
                debug!(worker_id, result = %result, "probe complete");
                stats.record(&result);

                if results.send(result).await.is_err() {
                    // Collector is gone. That only happens on a run that
                    // is already being torn down.
                    break;
                }

                // The politeness throttle: per worker, not global. Thirty
                // sites will survive us; we'd like to keep it that way.
                tokio::time::sleep(delay).await;
            }
        }));
    }

    handles
}

/// Run a complete hunt: dispatcher → bounded job queue → worker pool →
/// result queue → collector. Returns the completed ResultSet plus the run
/// counters.
///
/// Startup and shutdown order is the entire trick here:
///   - the collector is spawned FIRST, so the result queue is being
///     drained before anything can produce into it;
///   - workers are joined before the collector is awaited — that's the
///     producers-finished barrier. Their exit drops the last result
///     senders, which closes the stream, which ends the drain. A slow
///     worker's final result is therefore always collected.
pub async fn hunt(
    config: &HuntConfig,
    catalog: &Catalog,
    handles: &[String],
) -> anyhow::Result<(ResultSet, HuntSnapshot)> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(&config.user_agent)
        // We classify 301/302 ourselves; a client that chases redirects
        // behind our back would hide them from the classifier.
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("failed to build HTTP client")?;

    let (job_tx, job_rx) = mpsc::channel::<ProbeJob>(config.job_queue_capacity);
    let (result_tx, result_rx) = mpsc::channel::<ProbeResult>(config.result_queue_capacity);
    let stats = Arc::new(HuntStats::new());

    info!(
        workers = config.concurrency,
        timeout_secs = config.timeout.as_secs(),
        politeness_ms = config.politeness_delay.as_millis() as u64,
        sites = catalog.len(),
        "Engine spinning up"
    );

    // Vacuum on first.
    let collector_handle = tokio::spawn(collector::collect(result_rx));

    let jobs = Arc::new(Mutex::new(job_rx));
    let worker_handles = spawn_workers(config, client, jobs, result_tx, stats.clone());
    // Our copy of the result sender must die here, or the stream never
    // closes and the collector waits for a ghost.

    let dispatcher_handle = dispatcher::spawn(catalog.clone(), handles.to_vec(), job_tx);

    // Producers-finished barrier: every worker has exited (and dropped its
    // result sender) before we wait on the drain.
    join_all(worker_handles).await;

    let dispatched = dispatcher_handle
        .await
        .context("dispatcher task panicked")?;
    let results = collector_handle
        .await
        .context("collector task panicked")?;

    if results.len() != dispatched {
        // The completion protocol makes this unreachable; if it ever
        // fires, the report is incomplete and the operator must know.
        error!(
            dispatched,
            collected = results.len(),
            "result set does not match dispatched jobs"
        );
    }

    Ok((results, stats.snapshot()))
}
