//! redb table layout for the candidate store.

use redb::TableDefinition;

/// Candidate rows, keyed by `{partition}/{row_key}` composite keys.
/// Values are JSON-serialized [`CandidateRecord`](crate::CandidateRecord)s.
pub const CANDIDATES: TableDefinition<&str, &[u8]> = TableDefinition::new("candidates");

/// The single logical partition shared by every candidate row.
pub const CANDIDATE_PARTITION: &str = "Candidate";
