pub use error::EngineError;
pub use events::{DayEvents, Event, EventLedger};
pub use stats::Statistics;
pub use store::{KvStore, MemoryStore, SqliteStore, keys};
pub use sync::{SnapshotEntry, SyncBridge, SyncKind, SyncLog, SyncRecord, SyncSettings, WalletSnapshot};
pub use wallet::{Wallet, WalletHistory};

mod error;
mod events;
mod stats;
mod store;
mod sync;
mod util;
mod wallet;

type ResultEngine<T> = Result<T, EngineError>;
