//! # Kade POS Entry Point
//!
//! Boots the application headless: loads configuration, opens the
//! database, unlocks with the PIN given on the command line, and logs a
//! summary of today's trading and the credit book.
//!
//! ## Usage
//! ```bash
//! cargo run -p kade-app --bin kade
//!
//! # Custom database and config file
//! KADE_DB_PATH=./kade_dev.db cargo run -p kade-app --bin kade -- --config ./kade.toml --pin 2580
//! ```

use std::env;
use std::path::PathBuf;

use chrono::Utc;
use tracing::{info, warn};

use kade_app::commands::{credit, reports, session};
use kade_app::state::{ConfigState, SystemLauncher};
use kade_app::{init_tracing, App};
use kade_core::ledger::LedgerFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<PathBuf> = None;
    let mut pin = String::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--pin" | "-p" => {
                if i + 1 < args.len() {
                    pin = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kade POS");
                println!();
                println!("Usage: kade [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("  -p, --pin <PIN>      PIN that unlocks the session");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!("Starting Kade POS");

    let config = ConfigState::load_or_default(config_path);
    let app = App::open(config, Box::new(SystemLauncher)).await?;

    if let Err(e) = session::login(&app.auth, &app.db, &app.views, pin).await {
        warn!(error = %e, "Session stays locked; pass --pin to unlock");
        app.db.inner().close().await;
        return Ok(());
    }

    let today = Utc::now().date_naive();
    let report = reports::sales_report(&app.auth, &app.views, Some(today), None)?;
    let ledger = credit::list_credit_accounts(&app.auth, &app.views, LedgerFilter::default())?;

    info!(
        sales = report.summary.sale_count,
        revenue = %report.summary.paid_revenue(),
        low_stock = report.low_stock.len(),
        "Today"
    );
    info!(
        customers = ledger.accounts.len(),
        outstanding_cents = ledger.total_outstanding_cents,
        "Credit book"
    );
    println!("{}", serde_json::to_string_pretty(&report.summary)?);

    app.db.inner().close().await;
    Ok(())
}
