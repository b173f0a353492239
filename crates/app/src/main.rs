use std::io::Read;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use engine::{
    Event, EventLedger, KvStore, MemoryStore, SqliteStore, Statistics, SyncBridge, SyncKind,
    SyncLog, SyncSettings, Wallet,
};
use migration::{Migrator, MigratorTrait};

mod settings;

#[derive(Parser, Debug)]
#[command(name = "spendbook")]
#[command(about = "Expense event ledger over a key-value store")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Use an in-memory store; data is lost on exit.
    #[arg(long)]
    memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a spending event for a day.
    Add {
        /// Day key, `YYYY-MM-DD`.
        #[arg(long)]
        date: String,
        /// Category label.
        #[arg(long)]
        tag: String,
        /// Amount in the smallest currency unit.
        #[arg(long)]
        amount: i64,
        /// Free-text note.
        #[arg(long)]
        detail: Option<String>,
    },
    /// List the events recorded on a day, newest first.
    Day { date: String },
    /// List the events of a month (`YYYY-MM`), newest first.
    Month { month: String },
    /// List every stored event, newest first.
    All,
    /// Months that have at least one event, most recent first.
    Months,
    /// Cumulative spend-per-day series of a month.
    Chart { month: String },
    /// Wallet balance, month spend and remaining balance.
    Wallet { month: Option<String> },
    /// Add money to the wallet.
    TopUp { amount: i64 },
    /// Per-month wallet history record.
    WalletHistory { month: Option<String> },
    /// Print the upload payload and record a sync-up entry.
    SyncUp,
    /// Read a download body from stdin, overwrite local buckets, record a
    /// sync-down entry.
    SyncDown,
    /// Show the recorded sync history, newest first.
    SyncHistory,
    /// Set the remote sync endpoint base URL.
    SetEndpoint { url: String },
    /// Set the profile name stamped on new events.
    SetProfile { name: String },
    /// Write the wallet snapshot used by the local wallet sync.
    ExportWallet,
    /// Restore the wallet from the stored snapshot.
    ImportWallet,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "spendbook={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let store: Arc<dyn KvStore> = if cli.memory {
        tracing::info!("Using in-memory store, data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let url = cli
            .database_url
            .unwrap_or_else(|| settings.database.url());
        tracing::info!("Connecting to {url}...");
        let database = match sea_orm::Database::connect(&url).await {
            Ok(database) => database,
            Err(err) => {
                tracing::error!("failed to initialize database: {err}");
                return Err(err.into());
            }
        };
        Migrator::up(&database, None).await?;
        Arc::new(SqliteStore::new(database))
    };

    run(cli.command, store).await
}

async fn run(
    command: Command,
    store: Arc<dyn KvStore>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ledger = EventLedger::new(store.clone());
    let stats = Statistics::new(store.clone());
    let wallet = Wallet::new(store.clone());
    let bridge = SyncBridge::new(store.clone());
    let log = SyncLog::new(store.clone());
    let sync_settings = SyncSettings::new(store);

    match command {
        Command::Add {
            date,
            tag,
            amount,
            detail,
        } => {
            let event = Event {
                tag: Some(tag),
                amount: Some(amount),
                detail,
                ..Event::default()
            };
            let saved = ledger.append(&date, event).await?;
            println!(
                "saved {} ({}) for {date} at {}",
                saved.tag.clone().unwrap_or_default(),
                saved.amount_value(),
                saved.time
            );
        }
        Command::Day { date } => {
            for group in ledger.events_for_day(&date).await? {
                println!("{}", group.date);
                for event in group.events {
                    println!(
                        "  {}  {:>12}  {}",
                        event.date_time_pay.as_deref().unwrap_or(""),
                        event.amount_value(),
                        event.tag.or(event.name).unwrap_or_default()
                    );
                }
            }
        }
        Command::Month { month } => print_events(ledger.events_for_month(&month).await?),
        Command::All => print_events(ledger.all_events().await?),
        Command::Months => {
            for month in stats.months_with_data().await? {
                println!("{month}");
            }
        }
        Command::Chart { month } => {
            let (labels, values) = stats.cumulative_spend_by_day(&month).await?;
            for (label, value) in labels.iter().zip(&values) {
                println!("{label:>2}  {value}");
            }
        }
        Command::Wallet { month } => {
            let month = month.unwrap_or_else(current_month);
            let balance = wallet.balance().await?;
            let spent = stats.total_spent_in_month(&month).await?;
            println!("balance    + {balance}");
            println!("spent {month}  - {spent}");
            println!("remaining  = {}", wallet.remaining_balance(&month).await?);
        }
        Command::TopUp { amount } => {
            let new_balance = wallet.top_up(amount).await?;
            println!("balance is now {new_balance}");
        }
        Command::WalletHistory { month } => {
            let month = month.unwrap_or_else(current_month);
            let history = wallet.month_history(&month).await?;
            println!(
                "{}: added {} spent {} balance {}",
                history.month,
                history.total_added,
                history.total_spent,
                history.total_balance.unwrap_or(0)
            );
        }
        Command::SyncUp => {
            let payload = bridge.outbound().await?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
            log.record(SyncKind::Up).await?;
        }
        Command::SyncDown => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            let records = SyncBridge::parse_download(&body)?;
            bridge.apply_download(&records).await?;
            log.record(SyncKind::Down).await?;
            println!("replaced local data with {} remote events", records.len());
        }
        Command::SyncHistory => {
            for record in log.history().await? {
                println!("{}  {}", record.kind.as_str(), record.time);
            }
        }
        Command::SetEndpoint { url } => sync_settings.set_endpoint(&url).await?,
        Command::SetProfile { name } => sync_settings.set_profile_name(&name).await?,
        Command::ExportWallet => {
            let snapshot = bridge.export_wallet().await?;
            println!(
                "exported balance {} and {} history records",
                snapshot.balance,
                snapshot.wallet_history.len()
            );
        }
        Command::ImportWallet => {
            if bridge.import_wallet().await? {
                println!("wallet restored from snapshot");
            } else {
                println!("no snapshot found");
            }
        }
    }

    Ok(())
}

fn print_events(events: Vec<Event>) {
    for event in events {
        println!(
            "{}  {:>12}  {}",
            event.formatted_time.as_deref().unwrap_or(""),
            event.amount_value(),
            event.tag.or(event.name).unwrap_or_default()
        );
    }
}

fn current_month() -> String {
    chrono::Local::now().format("%Y-%m").to_string()
}
