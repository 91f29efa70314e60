//! Shared harness: an unlocked app on an in-memory database with a small
//! print-shop catalog, and a launcher that records links instead of
//! opening them.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use kade_app::commands::session;
use kade_app::state::{ConfigState, Launcher};
use kade_app::App;
use kade_core::Product;
use kade_db::{Database, DbConfig};

pub type Opened = Arc<Mutex<Vec<String>>>;

pub struct RecordingLauncher {
    pub opened: Opened,
    pub fail: bool,
}

impl Launcher for RecordingLauncher {
    fn open(&self, url: &str) -> io::Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        if self.fail {
            Err(io::Error::new(io::ErrorKind::NotFound, "no opener"))
        } else {
            Ok(())
        }
    }
}

pub fn product(id: &str, name: &str, category: &str, price_cents: i64, stock: i64) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        price_cents,
        cost_cents: price_cents / 2,
        stock,
        min_stock_level: 5,
    }
}

pub fn catalog() -> Vec<Product> {
    vec![
        product("copy", "Photocopy A4", "Print", 10000, 500),
        product("pen", "Blue Pen", "Stationery", 5000, 3),
        product("ream", "A4 Paper Ream", "Paper", 180000, 20),
    ]
}

/// App built around a fresh in-memory database; still locked.
pub async fn locked_app(config: ConfigState, fail_launch: bool) -> (App, Opened) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    for p in catalog() {
        db.products().insert(&p).await.unwrap();
    }

    let opened: Opened = Arc::new(Mutex::new(Vec::new()));
    let launcher = RecordingLauncher {
        opened: opened.clone(),
        fail: fail_launch,
    };
    (App::with_database(config, db, Box::new(launcher)), opened)
}

/// Same, logged in and with the views loaded.
pub async fn app_with(config: ConfigState) -> (App, Opened) {
    let pin = config.pin.clone().unwrap_or_default();
    let (app, opened) = locked_app(config, false).await;
    session::login(&app.auth, &app.db, &app.views, pin)
        .await
        .unwrap();
    (app, opened)
}

pub async fn app() -> App {
    app_with(ConfigState::default()).await.0
}
