//! Classification of one remote fetch attempt

use roster_core::EntryRecord;

/// Outcome of fetching a single ID from the remote endpoint.
///
/// Exactly one outcome is produced per attempt; retry policy lives in the
/// crawl layer, never here.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Success status and the body parsed into a record with its identity set
    Found(EntryRecord),
    /// The endpoint confirmed the ID is absent (HTTP 404)
    NotFound,
    /// The endpoint is shedding load (HTTP 429)
    RateLimited,
    /// Network failure, timeout, or an unexpected status (5xx and friends)
    TransientError(String),
    /// Success status but the body is not a well-formed entry object.
    ///
    /// Distinct from `NotFound`: a maintenance placeholder or truncated body
    /// is an ambiguous server response, not a confirmed absence, so it stays
    /// retryable.
    MalformedResponse(String),
}

impl FetchOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            FetchOutcome::Found(_) => OutcomeKind::Found,
            FetchOutcome::NotFound => OutcomeKind::NotFound,
            FetchOutcome::RateLimited => OutcomeKind::RateLimited,
            FetchOutcome::TransientError(_) => OutcomeKind::TransientError,
            FetchOutcome::MalformedResponse(_) => OutcomeKind::MalformedResponse,
        }
    }
}

/// Payload-free outcome discriminant, used for counters and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Found,
    NotFound,
    RateLimited,
    TransientError,
    MalformedResponse,
}

impl OutcomeKind {
    /// Stable lowercase label for log fields and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Found => "found",
            OutcomeKind::NotFound => "not_found",
            OutcomeKind::RateLimited => "rate_limited",
            OutcomeKind::TransientError => "transient_error",
            OutcomeKind::MalformedResponse => "malformed_response",
        }
    }
}
