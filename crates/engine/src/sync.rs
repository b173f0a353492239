//! Mapping between the ledger's stored shape and the remote wire shape,
//! plus the local sync bookkeeping (history log, endpoint/profile settings,
//! wallet snapshot export/import).
//!
//! The HTTP transport itself is owned by an external collaborator; this
//! module owns only the payload contract (see [`api_types::sync`]).

use std::collections::HashMap;
use std::sync::Arc;

use api_types::sync::RemoteEvent;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::ResultEngine;
use crate::events::{DayEvents, Event, EventLedger};
use crate::store::{KvStore, keys};

/// Direction of a recorded synchronization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncKind {
    #[serde(rename = "DB_UP")]
    Up,
    #[serde(rename = "DB_DOWN")]
    Down,
}

impl SyncKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "DB_UP",
            Self::Down => "DB_DOWN",
        }
    }
}

/// One entry of the sync history log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyncRecord {
    #[serde(rename = "type")]
    pub kind: SyncKind,
    /// `DD/MM/YYYY HH:MM:SS`, local clock at record time.
    pub time: String,
}

/// Translates ledger records to and from the remote wire shape.
#[derive(Clone)]
pub struct SyncBridge {
    store: Arc<dyn KvStore>,
    ledger: EventLedger,
}

impl SyncBridge {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            ledger: EventLedger::new(store.clone()),
            store,
        }
    }

    /// The upload payload: every stored event mapped to the wire shape.
    pub async fn outbound(&self) -> ResultEngine<Vec<RemoteEvent>> {
        let events = self.ledger.all_events().await?;
        Ok(events.iter().map(to_remote).collect())
    }

    /// Decode a download response body. The body must be a JSON array of
    /// wire records or the whole operation is a failure; local state is
    /// only touched by [`apply_download`](Self::apply_download).
    pub fn parse_download(body: &str) -> ResultEngine<Vec<RemoteEvent>> {
        Ok(serde_json::from_str(body)?)
    }

    /// Apply downloaded records: group them into day buckets and replace
    /// every local bucket with them.
    ///
    /// This is a destructive overwrite by contract, not a merge: events
    /// recorded locally since the last upload are discarded.
    pub async fn apply_download(&self, records: &[RemoteEvent]) -> ResultEngine<()> {
        let mut buckets: Vec<DayEvents> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for record in records {
            let event = from_remote(record);
            let slot = *index.entry(record.date.clone()).or_insert_with(|| {
                buckets.push(DayEvents {
                    date: record.date.clone(),
                    events: Vec::new(),
                });
                buckets.len() - 1
            });
            buckets[slot].events.push(event);
        }
        self.ledger.replace_all(buckets).await
    }

    /// Write the `wallet_sync_data` snapshot (balance plus every raw
    /// month-history entry) and return it.
    pub async fn export_wallet(&self) -> ResultEngine<WalletSnapshot> {
        let balance = self
            .store
            .get(keys::WALLET_BALANCE)
            .await?
            .as_deref()
            .map(crate::util::leading_int)
            .unwrap_or(0);

        let history_keys: Vec<String> = self
            .store
            .keys()
            .await?
            .into_iter()
            .filter(|key| key.starts_with(keys::WALLET_HISTORY_PREFIX))
            .collect();
        let mut wallet_history = Vec::with_capacity(history_keys.len());
        for (key, value) in self.store.multi_get(&history_keys).await? {
            if let Some(value) = value {
                wallet_history.push(SnapshotEntry { key, value });
            }
        }

        let snapshot = WalletSnapshot {
            balance,
            wallet_history,
        };
        self.store
            .set(keys::WALLET_SYNC_DATA, &serde_json::to_string(&snapshot)?)
            .await?;
        Ok(snapshot)
    }

    /// Restore balance and month-history entries from the stored snapshot.
    /// Returns `false` when no usable snapshot exists; a malformed one
    /// degrades like any other stored blob, leaving local state untouched.
    pub async fn import_wallet(&self) -> ResultEngine<bool> {
        let Some(raw) = self.store.get(keys::WALLET_SYNC_DATA).await? else {
            return Ok(false);
        };
        let snapshot: WalletSnapshot = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!("malformed wallet snapshot, skipping import: {err}");
                return Ok(false);
            }
        };
        self.store
            .set(keys::WALLET_BALANCE, &snapshot.balance.to_string())
            .await?;
        for entry in &snapshot.wallet_history {
            self.store.set(&entry.key, &entry.value).await?;
        }
        Ok(true)
    }
}

/// The `wallet_sync_data` snapshot used by the export/import sync mock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSnapshot {
    pub balance: i64,
    pub wallet_history: Vec<SnapshotEntry>,
}

/// One raw key/value pair of the snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub key: String,
    pub value: String,
}

/// Append-only log of performed synchronizations, newest first, unbounded.
#[derive(Clone)]
pub struct SyncLog {
    store: Arc<dyn KvStore>,
}

impl SyncLog {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Prepend a record stamped with the current local time.
    pub async fn record(&self, kind: SyncKind) -> ResultEngine<SyncRecord> {
        self.record_at(kind, Local::now().naive_local()).await
    }

    /// Prepend a record with an explicit timestamp.
    pub async fn record_at(&self, kind: SyncKind, at: NaiveDateTime) -> ResultEngine<SyncRecord> {
        let record = SyncRecord {
            kind,
            time: at.format("%d/%m/%Y %H:%M:%S").to_string(),
        };
        let mut history = self.history().await?;
        history.insert(0, record.clone());
        self.store
            .set(keys::SYNC_HISTORY, &serde_json::to_string(&history)?)
            .await?;
        Ok(record)
    }

    /// The recorded history, newest first. A malformed stored log degrades
    /// to an empty one.
    pub async fn history(&self) -> ResultEngine<Vec<SyncRecord>> {
        let Some(raw) = self.store.get(keys::SYNC_HISTORY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(history) => Ok(history),
            Err(err) => {
                tracing::warn!("malformed sync history, treating as empty: {err}");
                Ok(Vec::new())
            }
        }
    }
}

/// Plain-string settings the sync flow depends on.
#[derive(Clone)]
pub struct SyncSettings {
    store: Arc<dyn KvStore>,
}

impl SyncSettings {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub async fn endpoint(&self) -> ResultEngine<Option<String>> {
        self.store.get(keys::SYNC_ENDPOINT).await
    }

    pub async fn set_endpoint(&self, url: &str) -> ResultEngine<()> {
        self.store.set(keys::SYNC_ENDPOINT, url.trim()).await
    }

    pub async fn profile_name(&self) -> ResultEngine<Option<String>> {
        self.store.get(keys::PROFILE_NAME).await
    }

    pub async fn set_profile_name(&self, name: &str) -> ResultEngine<()> {
        self.store.set(keys::PROFILE_NAME, name).await
    }
}

/// Outbound mapping: stored event plus its owning date to the flat wire
/// record; `category` is the ledger's `tag` renamed.
fn to_remote(event: &Event) -> RemoteEvent {
    RemoteEvent {
        name: event.name.clone(),
        amount: event.amount_value(),
        category: event.tag.clone().unwrap_or_default(),
        time: event.time.clone(),
        date: event.date.clone().unwrap_or_default(),
        formatted_time: event.formatted_time.clone(),
        user_pay: event.user_pay.clone(),
    }
}

/// Inbound mapping: wire record to a stored event with `tag` taken from
/// `category` and a regenerated display amount.
fn from_remote(record: &RemoteEvent) -> Event {
    Event {
        name: record.name.clone(),
        tag: Some(record.category.clone()),
        amount: Some(record.amount),
        formatted_amount: Some(format!("{}đ", record.amount)),
        time: record.time.clone(),
        user_pay: record.user_pay.clone(),
        ..Event::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_event() -> Event {
        Event {
            tag: Some("Food".to_string()),
            amount: Some(30000),
            time: "0730".to_string(),
            date: Some("2025-10-30".to_string()),
            formatted_time: Some("30/10/2025 07:30".to_string()),
            user_pay: Some("Duong".to_string()),
            ..Event::default()
        }
    }

    #[test]
    fn mapping_round_trips_tag_amount_time() {
        let original = stored_event();
        let back = from_remote(&to_remote(&original));

        assert_eq!(back.tag, original.tag);
        assert_eq!(back.amount, original.amount);
        assert_eq!(back.time, original.time);
        assert_eq!(back.user_pay, original.user_pay);
    }

    #[test]
    fn inbound_regenerates_display_amount() {
        let record = to_remote(&stored_event());
        let event = from_remote(&record);
        assert_eq!(event.formatted_amount.as_deref(), Some("30000đ"));
    }

    #[test]
    fn download_body_must_be_an_array() {
        assert!(SyncBridge::parse_download("{\"oops\": 1}").is_err());
        assert!(SyncBridge::parse_download("not json").is_err());
        let parsed = SyncBridge::parse_download("[]").unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn sync_kind_serializes_as_wire_tokens() {
        assert_eq!(serde_json::to_string(&SyncKind::Up).unwrap(), "\"DB_UP\"");
        assert_eq!(SyncKind::Down.as_str(), "DB_DOWN");
    }
}
