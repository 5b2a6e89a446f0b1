//! The candidate store: CRUD and substring search over the candidates table.

use std::path::Path;
use std::sync::Arc;

use redb::Database;
use roster_core::Candidate;
use tracing::{debug, info, warn};

use crate::client::TableClient;
use crate::error::{StoreError, StoreResult, store_err};
use crate::record::CandidateRecord;
use crate::tables::{CANDIDATES, CANDIDATE_PARTITION};

/// Thread-safe candidate store backed by redb.
#[derive(Clone)]
pub struct CandidateStore {
    client: TableClient,
}

impl std::fmt::Debug for CandidateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateStore").finish_non_exhaustive()
    }
}

impl CandidateStore {
    /// Open a store from a connection string.
    ///
    /// `memory:` selects the ephemeral backend; `file://` URIs and plain
    /// paths open (or create) an on-disk database.
    pub fn open(conn: &str) -> StoreResult<Self> {
        let conn = conn.trim();
        if conn.is_empty() {
            return Err(StoreError::InvalidArgument(
                "connection string is empty".to_string(),
            ));
        }
        if conn == "memory:" {
            return Self::open_in_memory();
        }
        let path = conn.strip_prefix("file://").unwrap_or(conn);
        let db = Database::create(Path::new(path)).map_err(store_err!("open database"))?;
        Self::from_database(db)
    }

    /// Ephemeral in-memory store (`memory:` connections and tests).
    pub fn open_in_memory() -> StoreResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(store_err!("open database"))?;
        Self::from_database(db)
    }

    fn from_database(db: Database) -> StoreResult<Self> {
        let store = Self {
            client: TableClient::new(Arc::new(db), CANDIDATES),
        };
        store.ensure_ready()?;
        debug!("candidate store opened");
        Ok(store)
    }

    /// Create the backing table if absent. Idempotent; every public
    /// operation calls this first (read-through initialization, not a
    /// separate startup phase).
    pub fn ensure_ready(&self) -> StoreResult<()> {
        self.client.ensure_table()
    }

    /// All candidates in the partition, in store-enumeration order.
    pub fn list_all(&self) -> StoreResult<Vec<Candidate>> {
        self.ensure_ready()?;
        let records: Vec<CandidateRecord> = self.client.scan(CANDIDATE_PARTITION)?;
        let candidates: Vec<Candidate> =
            records.iter().map(|record| self.decode(record)).collect();
        debug!(count = candidates.len(), "listed candidates");
        Ok(candidates)
    }

    /// Conditional, non-overwriting insert keyed by email.
    ///
    /// Returns `false` when a record for the email already exists —
    /// including when a concurrent add wins the race between the existence
    /// check and the insert; the backend's rejection is the authoritative
    /// answer there.
    pub fn add(&self, candidate: &Candidate) -> StoreResult<bool> {
        if candidate.email.trim().is_empty() {
            return Err(StoreError::InvalidArgument("email is empty".to_string()));
        }
        self.ensure_ready()?;
        let existing: Option<CandidateRecord> =
            self.client.get(CANDIDATE_PARTITION, &candidate.email)?;
        if existing.is_some() {
            warn!(email = %candidate.email, "candidate already exists");
            return Ok(false);
        }
        let mut record = CandidateRecord::from_candidate(candidate);
        if !self.client.insert(&mut record)? {
            warn!(email = %candidate.email, "candidate already exists");
            return Ok(false);
        }
        info!(name = %candidate.full_name(), email = %candidate.email, "candidate added");
        Ok(true)
    }

    /// Read-modify-write conditioned on the version captured at read time.
    ///
    /// Returns `false` when no record exists for the email. A concurrent
    /// writer between the read and the write surfaces as
    /// [`StoreError::Conflict`]; callers retry the whole cycle.
    pub fn update<F>(&self, email: &str, mutate: F) -> StoreResult<bool>
    where
        F: FnOnce(&mut Candidate),
    {
        if email.trim().is_empty() {
            return Err(StoreError::InvalidArgument("email is empty".to_string()));
        }
        self.ensure_ready()?;
        let Some(record) = self.client.get::<CandidateRecord>(CANDIDATE_PARTITION, email)?
        else {
            warn!(%email, "candidate not found for update");
            return Ok(false);
        };
        let snapshot = record.version;
        let mut candidate = self.decode(&record);
        mutate(&mut candidate);
        if candidate.email != email {
            // The row key is the identity; an update cannot re-key a record.
            warn!(%email, rewritten = %candidate.email, "email change ignored by update");
            candidate.email = email.to_string();
        }
        let mut updated = CandidateRecord::from_candidate(&candidate);
        self.client.write_if(&mut updated, snapshot)?;
        info!(%email, version = %updated.version, "candidate updated");
        Ok(true)
    }

    /// Idempotent delete with no version check (last writer wins).
    ///
    /// Returns `false` when no record exists for the email.
    pub fn remove(&self, email: &str) -> StoreResult<bool> {
        if email.trim().is_empty() {
            return Err(StoreError::InvalidArgument("email is empty".to_string()));
        }
        self.ensure_ready()?;
        let removed = self.client.delete(CANDIDATE_PARTITION, email)?;
        if removed {
            info!(%email, "candidate removed");
        } else {
            warn!(%email, "candidate not found for removal");
        }
        Ok(removed)
    }

    /// Case-insensitive substring scan across every text field.
    ///
    /// An empty or whitespace term behaves as [`CandidateStore::list_all`].
    /// Linear over all records and all their strings; not indexed.
    pub fn search(&self, term: &str) -> StoreResult<Vec<Candidate>> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.list_all();
        }
        let matches: Vec<Candidate> = self
            .list_all()?
            .into_iter()
            .filter(|candidate| matches_term(candidate, &needle))
            .collect();
        debug!(%term, count = matches.len(), "search finished");
        Ok(matches)
    }

    fn decode(&self, record: &CandidateRecord) -> Candidate {
        let (candidate, warnings) = record.to_candidate();
        for warning in warnings {
            warn!(
                row_key = %record.row_key,
                field = warning.field,
                detail = %warning.detail,
                "malformed list column replaced with empty list"
            );
        }
        candidate
    }
}

/// `needle` must already be trimmed and lowercased.
fn matches_term(candidate: &Candidate, needle: &str) -> bool {
    candidate.first_name.to_lowercase().contains(needle)
        || candidate.last_name.to_lowercase().contains(needle)
        || candidate.email.to_lowercase().contains(needle)
        || candidate.current_role.to_lowercase().contains(needle)
        || candidate
            .skills
            .iter()
            .any(|skill| skill.to_lowercase().contains(needle))
        || candidate
            .spoken_languages
            .iter()
            .any(|lang| lang.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TableRow;

    fn candidate(first: &str, last: &str, email: &str, role: &str) -> Candidate {
        Candidate {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            current_role: role.to_string(),
            skills: vec!["Rust".to_string()],
            spoken_languages: vec!["English".to_string()],
        }
    }

    fn populated_store() -> CandidateStore {
        let store = CandidateStore::open_in_memory().unwrap();
        store
            .add(&candidate("Ada", "Lovelace", "ada@example.com", "Engineer"))
            .unwrap();
        store
            .add(&candidate("Grace", "Hopper", "grace@example.com", "Manager"))
            .unwrap();
        store
    }

    // ── Add ────────────────────────────────────────────────────────

    #[test]
    fn add_then_list_round_trips() {
        let store = CandidateStore::open_in_memory().unwrap();
        let ada = candidate("Ada", "Lovelace", "ada@example.com", "Engineer");

        assert!(store.add(&ada).unwrap());
        let all = store.list_all().unwrap();
        assert_eq!(all, vec![ada]);
    }

    #[test]
    fn add_duplicate_email_returns_false() {
        let store = CandidateStore::open_in_memory().unwrap();
        let ada = candidate("Ada", "Lovelace", "ada@example.com", "Engineer");

        assert!(store.add(&ada).unwrap());
        let mut imposter = ada.clone();
        imposter.first_name = "Not Ada".to_string();
        assert!(!store.add(&imposter).unwrap());

        // Exactly one record, and it is the original.
        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].first_name, "Ada");
    }

    #[test]
    fn add_empty_email_is_invalid() {
        let store = CandidateStore::open_in_memory().unwrap();
        let nobody = Candidate::default();
        let err = store.add(&nobody).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
        assert!(store.list_all().unwrap().is_empty());
    }

    // ── Update ─────────────────────────────────────────────────────

    #[test]
    fn update_applies_mutation() {
        let store = populated_store();

        let updated = store
            .update("ada@example.com", |c| {
                c.current_role = "Staff Engineer".to_string();
                c.skills.push("Analysis".to_string());
            })
            .unwrap();
        assert!(updated);

        let all = store.list_all().unwrap();
        let ada = all.iter().find(|c| c.email == "ada@example.com").unwrap();
        assert_eq!(ada.current_role, "Staff Engineer");
        assert_eq!(ada.skills, vec!["Rust", "Analysis"]);
    }

    #[test]
    fn update_absent_returns_false_and_creates_nothing() {
        let store = CandidateStore::open_in_memory().unwrap();
        let updated = store
            .update("ghost@example.com", |c| c.first_name = "Ghost".to_string())
            .unwrap();
        assert!(!updated);
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn update_empty_email_is_invalid() {
        let store = CandidateStore::open_in_memory().unwrap();
        let err = store.update("  ", |_| {}).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }

    #[test]
    fn update_advances_version() {
        let store = populated_store();
        let before: CandidateRecord = store
            .client
            .get(CANDIDATE_PARTITION, "ada@example.com")
            .unwrap()
            .unwrap();

        store
            .update("ada@example.com", |c| c.last_name = "Byron".to_string())
            .unwrap();

        let after: CandidateRecord = store
            .client
            .get(CANDIDATE_PARTITION, "ada@example.com")
            .unwrap()
            .unwrap();
        assert_ne!(after.version, before.version);
    }

    #[test]
    fn update_cannot_rekey_record() {
        let store = populated_store();
        let updated = store
            .update("ada@example.com", |c| {
                c.email = "hijack@example.com".to_string();
                c.current_role = "Architect".to_string();
            })
            .unwrap();
        assert!(updated);

        let all = store.list_all().unwrap();
        assert!(all.iter().all(|c| c.email != "hijack@example.com"));
        let ada = all.iter().find(|c| c.email == "ada@example.com").unwrap();
        assert_eq!(ada.current_role, "Architect");
    }

    #[test]
    fn stale_snapshot_conflicts_and_loses() {
        let store = populated_store();
        let stale: CandidateRecord = store
            .client
            .get(CANDIDATE_PARTITION, "ada@example.com")
            .unwrap()
            .unwrap();

        // First writer commits through the normal path.
        store
            .update("ada@example.com", |c| {
                c.current_role = "Staff Engineer".to_string();
            })
            .unwrap();

        // Second writer replays against the pre-update snapshot.
        let (mut candidate, _) = stale.to_candidate();
        candidate.current_role = "Principal Engineer".to_string();
        let mut replay = CandidateRecord::from_candidate(&candidate);
        let err = store.client.write_if(&mut replay, stale.version()).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // The stored value reflects exactly the first mutation.
        let all = store.list_all().unwrap();
        let ada = all.iter().find(|c| c.email == "ada@example.com").unwrap();
        assert_eq!(ada.current_role, "Staff Engineer");
    }

    // ── Remove ─────────────────────────────────────────────────────

    #[test]
    fn remove_is_idempotent() {
        let store = populated_store();

        assert!(store.remove("ada@example.com").unwrap());
        assert!(!store.remove("ada@example.com").unwrap());

        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].email, "grace@example.com");
    }

    #[test]
    fn remove_empty_email_is_invalid() {
        let store = CandidateStore::open_in_memory().unwrap();
        let err = store.remove("").unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }

    // ── Search ─────────────────────────────────────────────────────

    #[test]
    fn search_matches_role_case_insensitively() {
        let store = populated_store();

        let hits = store.search("eng").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].email, "ada@example.com");

        let hits = store.search("ENG").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].email, "ada@example.com");
    }

    #[test]
    fn search_matches_skills_and_languages() {
        let store = populated_store();
        store
            .update("grace@example.com", |c| {
                c.skills = vec!["COBOL".to_string()];
                c.spoken_languages = vec!["Latin".to_string()];
            })
            .unwrap();

        let hits = store.search("cobol").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].email, "grace@example.com");

        let hits = store.search("latin").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].email, "grace@example.com");
    }

    #[test]
    fn blank_search_term_lists_everything() {
        let store = populated_store();
        assert_eq!(store.search("").unwrap().len(), 2);
        assert_eq!(store.search("   ").unwrap().len(), 2);
    }

    #[test]
    fn search_trims_the_term() {
        let store = populated_store();
        let hits = store.search("  ada  ").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].email, "ada@example.com");
    }

    #[test]
    fn search_without_match_is_empty() {
        let store = populated_store();
        assert!(store.search("astronaut").unwrap().is_empty());
    }

    // ── Tolerant decode through the store ──────────────────────────

    #[test]
    fn corrupted_list_column_does_not_drop_the_record() {
        let store = populated_store();
        let mut record: CandidateRecord = store
            .client
            .get(CANDIDATE_PARTITION, "ada@example.com")
            .unwrap()
            .unwrap();
        let version = record.version();
        record.skills_json = "{broken".to_string();
        store.client.write_if(&mut record, version).unwrap();

        let all = store.list_all().unwrap();
        let ada = all.iter().find(|c| c.email == "ada@example.com").unwrap();
        assert!(ada.skills.is_empty());
        assert_eq!(ada.first_name, "Ada");
    }

    // ── Connection strings and persistence ─────────────────────────

    #[test]
    fn empty_connection_string_is_invalid() {
        let err = CandidateStore::open("   ").unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }

    #[test]
    fn memory_connection_string_opens_ephemeral_store() {
        let store = CandidateStore::open("memory:").unwrap();
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let conn = dir.path().join("roster.redb").display().to_string();

        {
            let store = CandidateStore::open(&conn).unwrap();
            store
                .add(&candidate("Ada", "Lovelace", "ada@example.com", "Engineer"))
                .unwrap();
        }

        let store = CandidateStore::open(&conn).unwrap();
        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].email, "ada@example.com");
    }

    #[test]
    fn file_uri_connection_string_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let conn = format!("file://{}", dir.path().join("roster.redb").display());
        let store = CandidateStore::open(&conn).unwrap();
        assert!(store.list_all().unwrap().is_empty());
    }
}
