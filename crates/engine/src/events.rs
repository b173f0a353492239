//! Day-bucketed event storage.
//!
//! One key per calendar day (`event_<YYYY-MM-DD>`) holds a JSON array of
//! events in append order. Buckets are created implicitly on first append,
//! mutated only by append, and destroyed only by the full reset a down-sync
//! performs. Reads re-fetch and re-derive; nothing in memory is
//! authoritative.

use std::sync::Arc;

use chrono::{Local, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::ResultEngine;
use crate::store::{KvStore, keys};
use crate::util;

/// One discrete spending record, stored with camelCase field names to stay
/// byte-compatible with the historical on-device blobs.
///
/// `date`, `dateTimePay` and `formattedTime` are display fields attached on
/// reads; appended events never carry them, so they are never persisted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Free label; present on records that came in through a down-sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Category label; locally recorded events always carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Amount in the smallest currency unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    /// Display string; fallback source for the amount when `amount` is
    /// absent or zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// 4-digit zero-padded `HHMM`, stamped at append time.
    #[serde(default)]
    pub time: String,
    /// Profile name stamped at append time, empty when no profile is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_pay: Option<String>,
    /// Owning day key, attached by month/all-time reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// `DD/MM/YYYY HH:MM`, attached by single-day reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time_pay: Option<String>,
    /// `DD/MM/YYYY HH:MM`, attached by month/all-time reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_time: Option<String>,
}

impl Event {
    /// The normalized amount of this event. See [`util::lenient_amount`] for
    /// the fallback rules.
    pub fn amount_value(&self) -> i64 {
        util::lenient_amount(self.amount, self.formatted_amount.as_deref())
    }
}

/// All events of one calendar day.
///
/// Single-day queries always return a one-element `Vec` of this wrapper;
/// callers iterate groupings without caring how many days a query covered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayEvents {
    pub date: String,
    pub events: Vec<Event>,
}

/// Durable append-only storage of [`Event`]s, partitioned by day.
#[derive(Clone)]
pub struct EventLedger {
    store: Arc<dyn KvStore>,
}

impl EventLedger {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Append an event to the bucket of `date`, stamping `time` from the
    /// local wall clock and `userPay` from the stored profile name.
    ///
    /// Returns the stamped record. Callers that treat saving as
    /// fire-and-forget may drop the result; the error stays observable for
    /// those who check.
    pub async fn append(&self, date: &str, event: Event) -> ResultEngine<Event> {
        self.append_at(date, event, Local::now().time()).await
    }

    /// Append with an explicit wall-clock time.
    pub async fn append_at(&self, date: &str, mut event: Event, at: NaiveTime) -> ResultEngine<Event> {
        event.time = util::hhmm(at);
        event.user_pay = Some(self.profile_name().await);

        // Read-modify-write on the whole bucket. Not atomic: two in-flight
        // appends to the same day race with last-write-wins, an accepted
        // limitation of the store contract.
        let key = keys::event_key(date);
        let mut bucket = self.read_bucket(&key).await?;
        bucket.push(event.clone());
        let payload = serde_json::to_string(&bucket)?;
        self.store.set(&key, &payload).await?;

        tracing::debug!(date, time = %event.time, "event appended");
        Ok(event)
    }

    /// The events of one day, newest time first, each annotated with its
    /// `dateTimePay` display string.
    pub async fn events_for_day(&self, date: &str) -> ResultEngine<Vec<DayEvents>> {
        let mut events = self.read_bucket(&keys::event_key(date)).await?;
        // Stable sort: events sharing a time keep their append order.
        events.sort_by(|a, b| b.time.cmp(&a.time));
        for event in &mut events {
            event.date_time_pay = Some(util::display_date_time(date, &event.time));
        }
        Ok(vec![DayEvents {
            date: date.to_string(),
            events,
        }])
    }

    /// Every event of the month (`YYYY-MM`), flattened across its day
    /// buckets and sorted newest first.
    pub async fn events_for_month(&self, month: &str) -> ResultEngine<Vec<Event>> {
        self.flattened(Some(month)).await
    }

    /// Every stored event, flattened and sorted newest first.
    pub async fn all_events(&self) -> ResultEngine<Vec<Event>> {
        self.flattened(None).await
    }

    async fn flattened(&self, month: Option<&str>) -> ResultEngine<Vec<Event>> {
        let event_keys = self.event_keys().await?;
        let pairs = self.store.multi_get(&event_keys).await?;

        let mut out = Vec::new();
        for (key, value) in pairs {
            let date = keys::event_date(&key).to_string();
            if let Some(month) = month
                && !date.starts_with(month)
            {
                continue;
            }
            for mut event in decode_bucket(&key, value.as_deref()) {
                event.formatted_time = Some(util::display_date_time(&date, &event.time));
                event.date = Some(date.clone());
                out.push(event);
            }
        }
        // Descending string compare over the fixed-width display time.
        // Day-first formatting makes this chronological within one month
        // only; the all-time listing keeps the same order regardless.
        out.sort_by(|a, b| b.formatted_time.cmp(&a.formatted_time));
        Ok(out)
    }

    /// Replace every stored bucket with the given ones.
    ///
    /// This is the full destructive overwrite a down-sync performs: events
    /// recorded locally since the last upload are gone afterwards.
    pub async fn replace_all(&self, buckets: Vec<DayEvents>) -> ResultEngine<()> {
        let existing = self.event_keys().await?;
        self.store.multi_remove(&existing).await?;
        for bucket in &buckets {
            let payload = serde_json::to_string(&bucket.events)?;
            self.store.set(&keys::event_key(&bucket.date), &payload).await?;
        }
        tracing::debug!(buckets = buckets.len(), "event buckets replaced");
        Ok(())
    }

    pub(crate) async fn event_keys(&self) -> ResultEngine<Vec<String>> {
        Ok(self
            .store
            .keys()
            .await?
            .into_iter()
            .filter(|key| key.starts_with(keys::EVENT_PREFIX))
            .collect())
    }

    async fn read_bucket(&self, key: &str) -> ResultEngine<Vec<Event>> {
        let raw = self.store.get(key).await?;
        Ok(decode_bucket(key, raw.as_deref()))
    }

    async fn profile_name(&self) -> String {
        match self.store.get(keys::PROFILE_NAME).await {
            Ok(Some(name)) => name,
            Ok(None) => String::new(),
            Err(err) => {
                tracing::warn!("failed to read profile name: {err}");
                String::new()
            }
        }
    }
}

/// Decode a stored bucket value. Missing or malformed values are an empty
/// bucket, never an error.
fn decode_bucket(key: &str, raw: Option<&str>) -> Vec<Event> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str(raw) {
        Ok(events) => events,
        Err(err) => {
            tracing::warn!(key, "malformed event bucket, treating as empty: {err}");
            Vec::new()
        }
    }
}
