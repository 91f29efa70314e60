//! # Seed Data Generator
//!
//! Populates a database with a print-and-stationery catalog and a shop
//! profile for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p kade-db --bin seed
//!
//! # Specify database path
//! cargo run -p kade-db --bin seed -- --db ./data/kade.db
//! ```

use std::env;

use kade_core::{Product, ShopProfile};
use kade_db::repository::product::generate_product_id;
use kade_db::{Database, DbConfig};

/// (category, name, price cents, cost cents, stock, min stock)
const CATALOG: &[(&str, &str, i64, i64, i64, i64)] = &[
    ("Print", "Photocopy B/W A4", 1000, 300, 5000, 500),
    ("Print", "Photocopy B/W A3", 2000, 700, 2000, 200),
    ("Print", "Colour Print A4", 5000, 1800, 1500, 200),
    ("Print", "Photo Print 4R", 6000, 2500, 400, 50),
    ("Finishing", "Lamination A4", 15000, 6000, 300, 30),
    ("Finishing", "Spiral Binding", 25000, 9000, 120, 20),
    ("Finishing", "Tape Binding", 12000, 4000, 150, 20),
    ("Paper", "A4 Paper Ream", 180000, 150000, 25, 10),
    ("Paper", "A3 Paper Ream", 320000, 270000, 8, 5),
    ("Paper", "Bristol Board", 8000, 5000, 60, 15),
    ("Stationery", "Blue Pen", 3000, 1800, 200, 40),
    ("Stationery", "CR Book 80pg", 22000, 16000, 45, 10),
    ("Stationery", "Glue Stick", 9000, 6000, 4, 10),
    ("Services", "Scanning per page", 2000, 0, 0, 0),
    ("Services", "Typesetting per page", 10000, 0, 0, 0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./kade_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kade POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./kade_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Kade POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut generated = 0;
    for &(category, name, price_cents, cost_cents, stock, min_stock_level) in CATALOG {
        let product = Product {
            id: generate_product_id(),
            name: name.to_string(),
            category: category.to_string(),
            price_cents,
            cost_cents,
            stock,
            min_stock_level,
        };

        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.name, e);
            continue;
        }
        generated += 1;
    }

    println!("✓ Generated {} products", generated);

    let profile = ShopProfile {
        name: "Kade Print & Copy".to_string(),
        address: "12 Temple Road, Colombo".to_string(),
        phone: "0112345678".to_string(),
        email: "hello@kade.lk".to_string(),
        website: None,
        footer_note: "Thank you, come again!".to_string(),
        logo: None,
    };
    db.profile().save(&profile).await?;
    println!("✓ Shop profile saved");

    let snapshot = db.load_snapshot().await?;
    let low = kade_core::catalog::low_stock(&snapshot.products);
    println!("  Low stock items: {}", low.len());

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
