//! Manually adjusted cash balance plus per-month added/spent snapshots.
//!
//! The balance is the sole persisted source of truth and only ever grows by
//! explicit top-up; spend is tracked in the ledger and subtracted at display
//! time, so the remaining figure can never drift from the events as long as
//! both underlying values are correct (and it may legitimately go negative).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::store::{KvStore, keys};
use crate::util;
use crate::{EngineError, ResultEngine, Statistics};

/// Persisted per-month snapshot, stored under `wallet_history_<YYYY-MM>`.
///
/// `totalBalance` is computed and persisted on demand, not kept in sync
/// automatically; records written before the last refresh may not carry it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletHistory {
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub total_added: i64,
    #[serde(default)]
    pub total_spent: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_balance: Option<i64>,
}

impl WalletHistory {
    fn empty(month: &str) -> Self {
        Self {
            month: month.to_string(),
            total_added: 0,
            total_spent: 0,
            total_balance: None,
        }
    }
}

/// The wallet reconciler.
///
/// Top-ups are not ledger events and do not touch the month history; the
/// three month-history operations below are deliberately independent of
/// [`top_up`](Self::top_up) and of each other, matching the update pattern
/// of the application this engine backs.
#[derive(Clone)]
pub struct Wallet {
    store: Arc<dyn KvStore>,
    stats: Statistics,
}

impl Wallet {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            stats: Statistics::new(store.clone()),
            store,
        }
    }

    /// Current balance, 0 when nothing was ever topped up.
    pub async fn balance(&self) -> ResultEngine<i64> {
        let raw = self.store.get(keys::WALLET_BALANCE).await?;
        Ok(raw.as_deref().map(util::leading_int).unwrap_or(0))
    }

    /// Add `amount` to the balance and return the new balance.
    ///
    /// Rejects non-positive amounts before any write.
    pub async fn top_up(&self, amount: i64) -> ResultEngine<i64> {
        if amount <= 0 {
            return Err(EngineError::InvalidAmount(
                "top-up amount must be > 0".to_string(),
            ));
        }
        let new_balance = self.balance().await? + amount;
        self.store
            .set(keys::WALLET_BALANCE, &new_balance.to_string())
            .await?;
        tracing::debug!(amount, new_balance, "wallet topped up");
        Ok(new_balance)
    }

    /// `balance − total spent in month`, recomputed on every read and never
    /// persisted. May go negative; that is accepted input-domain behavior.
    pub async fn remaining_balance(&self, month: &str) -> ResultEngine<i64> {
        Ok(self.balance().await? - self.stats.total_spent_in_month(month).await?)
    }

    /// The month-history record, every field defaulted to 0 when absent.
    pub async fn month_history(&self, month: &str) -> ResultEngine<WalletHistory> {
        let mut history = load_history(&self.store, month).await?;
        history.total_balance.get_or_insert(0);
        Ok(history)
    }

    /// Add `amount` to the month's `totalAdded`.
    pub async fn add_to_month_added(&self, amount: i64, month: &str) -> ResultEngine<()> {
        let mut history = load_history(&self.store, month).await?;
        history.total_added += amount;
        self.write_history(&history).await
    }

    /// Update the month's `totalSpent`: with `Some(delta)` incrementally,
    /// with `None` re-derived wholesale from the ledger. Callers use either
    /// depending on context, so both paths are kept.
    pub async fn record_month_spent(&self, delta: Option<i64>, month: &str) -> ResultEngine<()> {
        let mut history = load_history(&self.store, month).await?;
        history.total_spent = match delta {
            Some(delta) => history.total_spent + delta,
            None => self.stats.total_spent_in_month(month).await?,
        };
        self.write_history(&history).await
    }

    /// Persist `totalBalance = totalAdded − totalSpent` for the month.
    pub async fn refresh_month_balance(&self, month: &str) -> ResultEngine<()> {
        let mut history = load_history(&self.store, month).await?;
        history.total_balance = Some(history.total_added - history.total_spent);
        self.write_history(&history).await
    }

    async fn write_history(&self, history: &WalletHistory) -> ResultEngine<()> {
        let payload = serde_json::to_string(history)?;
        self.store
            .set(&keys::wallet_history_key(&history.month), &payload)
            .await
    }
}

/// Read a month-history record; missing or malformed values degrade to an
/// empty record for that month.
pub(crate) async fn load_history(
    store: &Arc<dyn KvStore>,
    month: &str,
) -> ResultEngine<WalletHistory> {
    let key = keys::wallet_history_key(month);
    let Some(raw) = store.get(&key).await? else {
        return Ok(WalletHistory::empty(month));
    };
    match serde_json::from_str::<WalletHistory>(&raw) {
        Ok(mut history) => {
            if history.month.is_empty() {
                history.month = month.to_string();
            }
            Ok(history)
        }
        Err(err) => {
            tracing::warn!(key, "malformed wallet history, treating as empty: {err}");
            Ok(WalletHistory::empty(month))
        }
    }
}
