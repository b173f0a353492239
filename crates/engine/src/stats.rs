//! Chart-ready aggregation over the event ledger.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::ResultEngine;
use crate::events::EventLedger;
use crate::store::{KvStore, keys};
use crate::wallet;

/// Derived, read-only views: cumulative series, month totals, and the month
/// index the statistics screen is driven by.
#[derive(Clone)]
pub struct Statistics {
    store: Arc<dyn KvStore>,
    ledger: EventLedger,
}

impl Statistics {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            ledger: EventLedger::new(store.clone()),
            store,
        }
    }

    /// Running total of spend per day of `month`, as `(labels, values)`.
    ///
    /// Days are walked ascending, independent of the ledger's own descending
    /// order. Labels are day numbers without a leading zero. Days with no
    /// events are omitted entirely: the series is sparse, not zero-filled,
    /// which the statistics chart relies on.
    pub async fn cumulative_spend_by_day(
        &self,
        month: &str,
    ) -> ResultEngine<(Vec<String>, Vec<i64>)> {
        let events = self.ledger.events_for_month(month).await?;

        let mut per_day: BTreeMap<String, i64> = BTreeMap::new();
        for event in &events {
            let Some(date) = event.date.as_deref() else {
                continue;
            };
            let day = date.get(8..10).unwrap_or_default().to_string();
            *per_day.entry(day).or_insert(0) += event.amount_value();
        }

        let mut labels = Vec::with_capacity(per_day.len());
        let mut values = Vec::with_capacity(per_day.len());
        let mut running = 0;
        for (day, total) in per_day {
            running += total;
            labels.push(day.trim_start_matches('0').to_string());
            values.push(running);
        }
        Ok((labels, values))
    }

    /// Total spend across every event of `month`, leniently parsed.
    pub async fn total_spent_in_month(&self, month: &str) -> ResultEngine<i64> {
        let events = self.ledger.events_for_month(month).await?;
        Ok(events.iter().map(|event| event.amount_value()).sum())
    }

    /// Distinct `YYYY-MM` prefixes of the stored day buckets, most recent
    /// month first.
    pub async fn months_with_data(&self) -> ResultEngine<Vec<String>> {
        let event_keys = self.ledger.event_keys().await?;
        let mut months: Vec<String> = event_keys
            .iter()
            .filter_map(|key| keys::event_date(key).get(0..7))
            .map(str::to_string)
            .collect();
        months.sort_unstable();
        months.dedup();
        months.reverse();
        Ok(months)
    }

    /// Per-month added/spent pairs from the wallet month-history records, as
    /// `(labels, added, spent)`.
    ///
    /// `months` is expected newest-first (the shape of
    /// [`months_with_data`](Self::months_with_data)); the series itself runs
    /// oldest-first with one `MM` label per month.
    pub async fn wallet_series(
        &self,
        months: &[String],
    ) -> ResultEngine<(Vec<String>, Vec<i64>, Vec<i64>)> {
        let mut labels = Vec::with_capacity(months.len());
        let mut added = Vec::with_capacity(months.len());
        let mut spent = Vec::with_capacity(months.len());
        for month in months.iter().rev() {
            let history = wallet::load_history(&self.store, month).await?;
            labels.push(month.get(5..7).unwrap_or(month).to_string());
            added.push(history.total_added);
            spent.push(history.total_spent);
        }
        Ok((labels, added, spent))
    }
}
