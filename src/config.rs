// =============================================================================
// config.rs — THE GRAND CONFIGURATION CATHEDRAL
// =============================================================================
//
// The interesting knobs (handle, worker count, timeout, output path) come
// from the CLI, because this is an interactive tool and operators should
// not need a .env file to ask a question. The ambient knobs — the ones you
// only touch when a service starts rate-limiting you, or when you need to
// aim the collaborators at a mirror endpoint — come from environment
// variables prefixed with HANDLE_HUNTER_, loaded via dotenvy for people
// who can't be bothered to export things manually.
//
// Default values have been carefully chosen through a rigorous process of
// "that seems about right" and "the sites will probably rate-limit us if
// we go faster than this."
// =============================================================================

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Everything the probing pipeline needs to know before the first request
/// leaves the building. Built once per run, passed around by reference.
#[derive(Debug, Clone)]
pub struct HuntConfig {
    /// Number of concurrent workers. Each worker self-throttles, so the
    /// aggregate request rate scales linearly with this number. Six is
    /// polite. Sixty is a statement.
    pub concurrency: usize,

    /// Per-request timeout. A site that can't answer in this long gets a
    /// status-0 result and we move on with our lives.
    pub timeout: Duration,

    /// Fixed pause each worker takes after every probe. Per worker, not
    /// global — this is a politeness throttle, not a rate limiter.
    pub politeness_delay: Duration,

    /// Capacity of the bounded job queue. Small on purpose: a full queue
    /// blocks the dispatcher, which is exactly the backpressure we want.
    pub job_queue_capacity: usize,

    /// Capacity of the bounded result queue. The collector drains this
    /// continuously, so it only needs enough slack to absorb bursts.
    pub result_queue_capacity: usize,

    /// The User-Agent we announce ourselves with. We identify honestly
    /// because we were raised right.
    pub user_agent: String,

    /// Where the JSON report lands.
    pub output: PathBuf,
}

impl HuntConfig {
    /// Merge CLI arguments with HANDLE_HUNTER_* environment overrides.
    pub fn new(concurrency: usize, timeout_secs: u64, output: PathBuf) -> Self {
        let _ = dotenvy::dotenv();

        Self {
            concurrency: concurrency.max(1),
            timeout: Duration::from_secs(timeout_secs.max(1)),
            politeness_delay: Duration::from_millis(
                env_or_default("HANDLE_HUNTER_POLITENESS_MS", "300")
                    .parse()
                    .unwrap_or(300),
            ),
            job_queue_capacity: env_or_default("HANDLE_HUNTER_JOB_QUEUE_CAPACITY", "16")
                .parse()
                .unwrap_or(16)
                .max(1),
            result_queue_capacity: env_or_default("HANDLE_HUNTER_RESULT_QUEUE_CAPACITY", "64")
                .parse()
                .unwrap_or(64)
                .max(1),
            user_agent: env_or_default(
                "HANDLE_HUNTER_USER_AGENT",
                "handle-hunter/1.0 (username reconnaissance; interactive)",
            ),
            output,
        }
    }
}

/// Endpoints the collaborator modes talk to. Overridable so the lens and
/// geo collaborators can be pointed at mirrors, proxies, or test servers.
#[derive(Debug, Clone)]
pub struct CollaboratorEndpoints {
    /// Where the lens collaborator uploads images. The public endpoint is
    /// best-effort at the best of times.
    pub lens_upload_url: String,

    /// Nominatim reverse-geocoding endpoint. They're a non-profit. Be nice
    /// to their servers.
    pub nominatim_reverse_url: String,
}

impl CollaboratorEndpoints {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            lens_upload_url: env_or_default(
                "HANDLE_HUNTER_LENS_URL",
                "https://lens.google.com/uploadbyurl?url=",
            ),
            nominatim_reverse_url: env_or_default(
                "HANDLE_HUNTER_NOMINATIM_URL",
                "https://nominatim.openstreetmap.org/reverse",
            ),
        }
    }
}

/// Helper to read an environment variable with a default fallback.
/// Because unwrap_or on env::var is ugly and we have standards.
fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
