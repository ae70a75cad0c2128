// =============================================================================
// models.rs — THE SACRED DATA STRUCTURES OF USERNAME RECONNAISSANCE
// =============================================================================
//
// These structs are everything that flows through the probing pipeline.
// A site spec goes in one end, a probe result comes out the other, and
// absolutely nothing in between is allowed to be shared mutable state.
//
// Is it overkill to have a custom serde codec so a duration serializes as
// a *string* of milliseconds? Yes. Is the report format sacred? Also yes.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// One target service in the catalog. Immutable after construction —
/// the registry is built once at startup and then treated like a museum
/// exhibit: look, don't touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSpec {
    /// Display name of the service ("GitHub", "Reddit", ...).
    pub name: String,

    /// Profile URL template with exactly one `{}` substitution slot.
    /// The handle goes in the slot. That's it. That's the templating engine.
    pub url_template: String,

    /// A substring whose presence in a 200 response body means the handle
    /// does NOT exist there. Empty means "trust the status code alone",
    /// which some services have earned and most have not.
    pub not_found_marker: String,
}

impl SiteSpec {
    pub fn new(
        name: impl Into<String>,
        url_template: impl Into<String>,
        not_found_marker: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            not_found_marker: not_found_marker.into(),
        }
    }
}

/// One unit of work: probe one site for one handle.
/// Created by the dispatcher, owned by exactly one worker, consumed exactly
/// once. Jobs move through the queue by value — there is no shared job state
/// to corrupt, which is the cheapest concurrency bug fix known to science.
#[derive(Debug, Clone)]
pub struct ProbeJob {
    pub site: SiteSpec,
    pub handle: String,
}

/// The outcome of a single probe. Exactly one of these exists per job,
/// immutable after creation. This is also the persisted report record,
/// so the serde attributes below are load-bearing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Which service we probed.
    pub site: String,

    /// Which handle we probed it for. The report groups on this, because
    /// with the alternate-case flag one run can chase two handles at once.
    pub username: String,

    /// The fully substituted URL we actually requested.
    pub url: String,

    /// The verdict. `true` means "an account with this handle appears to
    /// exist", with all the epistemic confidence a status code and a
    /// substring search can buy. Which is to say: some.
    pub found: bool,

    /// HTTP status code, or 0 when the request never produced a response
    /// (malformed URL, connect failure, timeout).
    pub status: u16,

    /// Why the classifier ruled the way it did. Empty for the happy
    /// 200-and-no-marker case, and omitted from the report when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,

    /// Wall-clock probe duration. Serialized as a string of milliseconds
    /// because that is the report format, and the report format is law.
    #[serde(with = "ms_string")]
    pub duration_ms: u64,
}

impl ProbeResult {
    /// Build a result for a probe that failed before producing any HTTP
    /// response. Status 0, found false, reason tells the operator why.
    pub fn transport_failure(job: &ProbeJob, url: String, reason: impl Into<String>) -> Self {
        Self {
            site: job.site.name.clone(),
            username: job.handle.clone(),
            url,
            found: false,
            status: 0,
            reason: reason.into(),
            duration_ms: 0,
        }
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.found { "FOUND" } else { "not found" };
        write!(
            f,
            "{} @ {} — {} (status {}, {}ms)",
            self.username, self.site, verdict, self.status, self.duration_ms
        )
    }
}

/// Serde codec for the `duration_ms` field: u64 in memory, decimal string
/// on the wire. Blame the original report consumers, not us.
mod ms_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ms: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ms.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The complete, unordered answer to a hunt. Append-only: the collector
/// pushes results in arrival order and nobody else writes to it, ever.
///
/// Invariant at completion: one entry per dispatched job. No duplicates,
/// no stragglers, no excuses.
#[derive(Debug, Default)]
pub struct ResultSet {
    results: Vec<ProbeResult>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: ProbeResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter()
    }

    /// All the places a given handle was found, in arrival order.
    pub fn found_for<'a>(&'a self, handle: &'a str) -> impl Iterator<Item = &'a ProbeResult> {
        self.results
            .iter()
            .filter(move |r| r.found && r.username == handle)
    }

    pub fn as_slice(&self) -> &[ProbeResult] {
        &self.results
    }
}
