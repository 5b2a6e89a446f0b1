//! roster-store — the candidate storage service.
//!
//! Backed by [redb](https://docs.rs/redb), stores candidate records in a
//! single partition of one table, keyed by email.
//!
//! # Architecture
//!
//! Rows are JSON-serialized into redb's `&[u8]` value columns under
//! `{partition}/{row_key}` composite keys. Every row carries an opaque
//! version token stamped by the table client on each successful write; the
//! conditional-write path rejects stale tokens, which is what gives updates
//! optimistic concurrency without client-side locking.
//!
//! The `CandidateStore` is `Clone` + `Send` + `Sync` (backed by
//! `Arc<Database>`) and can be shared across async tasks.

pub mod client;
pub mod error;
pub mod record;
pub mod store;
pub mod tables;

pub use client::{TableClient, TableRow, Version};
pub use error::{StoreError, StoreResult};
pub use record::{CandidateRecord, DecodeWarning};
pub use store::CandidateStore;
