//! roster-seed — one-shot bootstrap seeding for the candidate store.
//!
//! Seeding is strictly a bootstrap-once operation: a store that already
//! contains any candidate is left untouched. The seed document is
//! best-effort — a missing file, unreadable content, or individual
//! malformed entries degrade to warnings, never to startup failures.

use std::path::Path;

use roster_core::Candidate;
use roster_store::CandidateStore;
use tracing::{info, warn};

/// Outcome of a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Entries found in the seed document, including ones that failed to
    /// parse.
    pub attempted: usize,
    /// Entries actually inserted into the store.
    pub added: usize,
}

/// Seed the store from a JSON document iff the store is empty.
///
/// Each entry is parsed and added independently; one bad entry never
/// aborts the rest. Duplicate emails within the document insert once.
pub fn seed_if_empty(store: &CandidateStore, path: &Path) -> SeedReport {
    let existing = match store.list_all() {
        Ok(existing) => existing,
        Err(e) => {
            warn!(error = %e, "seeding skipped: store unavailable");
            return SeedReport::default();
        }
    };
    if !existing.is_empty() {
        info!(count = existing.len(), "store already populated, skipping seeding");
        return SeedReport::default();
    }

    info!(path = %path.display(), "store is empty, seeding initial candidates");

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "seed document unreadable");
            return SeedReport::default();
        }
    };
    let entries: Vec<serde_json::Value> = match serde_json::from_str(&content) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "seed document is not a JSON array");
            return SeedReport::default();
        }
    };
    if entries.is_empty() {
        warn!(path = %path.display(), "seed document contains no candidates");
        return SeedReport::default();
    }

    let mut report = SeedReport {
        attempted: entries.len(),
        added: 0,
    };
    for (index, entry) in entries.into_iter().enumerate() {
        let candidate: Candidate = match serde_json::from_value(entry) {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!(index, error = %e, "seed entry failed to parse");
                continue;
            }
        };
        match store.add(&candidate) {
            Ok(true) => report.added += 1,
            Ok(false) => warn!(email = %candidate.email, "seed entry already present"),
            Err(e) => warn!(email = %candidate.email, error = %e, "seed entry rejected"),
        }
    }

    info!(added = report.added, attempted = report.attempted, "seeding finished");
    report
}
