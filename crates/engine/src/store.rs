//! The persistence boundary of the engine.
//!
//! Every entity the engine owns lives in a process-wide, string-keyed store.
//! The store is an injected capability ([`KvStore`]), never a hidden
//! singleton: components receive an `Arc<dyn KvStore>` and re-fetch on every
//! read. Two implementations are provided, an in-memory one for tests and
//! tooling and a sqlite-backed one for real deployments.

use async_trait::async_trait;

use crate::ResultEngine;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

mod memory;
mod sqlite;

/// Key layout of the store.
///
/// Kept in one place so the ledger, the wallet and the sync bridge never
/// disagree on how an entity is addressed.
pub mod keys {
    /// Prefix of day-bucket keys: `event_<YYYY-MM-DD>`.
    pub const EVENT_PREFIX: &str = "event_";
    /// Prefix of wallet month-history keys: `wallet_history_<YYYY-MM>`.
    pub const WALLET_HISTORY_PREFIX: &str = "wallet_history_";
    /// Stringified integer wallet balance.
    pub const WALLET_BALANCE: &str = "wallet_balance";
    /// JSON array of sync records, newest first.
    pub const SYNC_HISTORY: &str = "sync_history";
    /// Plain string base URL of the remote sync endpoint.
    pub const SYNC_ENDPOINT: &str = "sync_endpoint";
    /// Plain string profile name stamped on appended events.
    pub const PROFILE_NAME: &str = "profile_name";
    /// JSON wallet snapshot used by the export/import sync mock.
    pub const WALLET_SYNC_DATA: &str = "wallet_sync_data";

    pub fn event_key(date: &str) -> String {
        format!("{EVENT_PREFIX}{date}")
    }

    /// The day part of a day-bucket key.
    pub fn event_date(key: &str) -> &str {
        key.strip_prefix(EVENT_PREFIX).unwrap_or(key)
    }

    pub fn wallet_history_key(month: &str) -> String {
        format!("{WALLET_HISTORY_PREFIX}{month}")
    }
}

/// Asynchronous string-keyed persistent store.
///
/// Operations are atomic only at single-key granularity. The ledger's
/// read-modify-write append is deliberately not serialized here: concurrent
/// appends to the same day can race with last-write-wins semantics, matching
/// the store this engine replaces.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> ResultEngine<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> ResultEngine<()>;
    async fn remove(&self, key: &str) -> ResultEngine<()>;
    /// Every key currently present, in unspecified order.
    async fn keys(&self) -> ResultEngine<Vec<String>>;
    /// Values for the requested keys, in request order, `None` where absent.
    async fn multi_get(&self, keys: &[String]) -> ResultEngine<Vec<(String, Option<String>)>>;
    async fn multi_remove(&self, keys: &[String]) -> ResultEngine<()>;
}
