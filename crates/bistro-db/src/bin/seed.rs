//! # Seed Data Generator
//!
//! Populates the database with a demo menu and currency settings.
//!
//! ## Usage
//! ```bash
//! cargo run -p bistro-db --bin seed
//!
//! # Specify database path
//! cargo run -p bistro-db --bin seed -- --db ./data/bistro.db
//! ```

use std::env;

use bistro_core::{Currency, ExchangeRate};
use bistro_db::{Database, DbConfig, NewMenuItem};
use rust_decimal::Decimal;

/// (category, name, description, price in cents)
const MENU: &[(&str, &str, &str, i64)] = &[
    ("Starters", "Bruschetta", "Grilled bread, tomato, garlic, basil", 650),
    ("Starters", "Arancini", "Fried risotto balls with mozzarella", 750),
    ("Starters", "Burrata", "Creamy burrata, heirloom tomatoes", 1100),
    ("Pizza", "Margherita", "Tomato, mozzarella, basil", 1000),
    ("Pizza", "Diavola", "Spicy salami, chili oil", 1250),
    ("Pizza", "Quattro Formaggi", "Four cheeses", 1300),
    ("Pasta", "Spaghetti Carbonara", "Guanciale, egg yolk, pecorino", 1400),
    ("Pasta", "Lasagna", "Slow-cooked ragù, béchamel", 1500),
    ("Pasta", "Penne Arrabbiata", "Tomato, garlic, chili", 1150),
    ("Desserts", "Tiramisu", "Mascarpone, espresso, cocoa", 550),
    ("Desserts", "Panna Cotta", "Vanilla cream, berry coulis", 500),
    ("Drinks", "Espresso", "Double shot", 275),
    ("Drinks", "San Pellegrino", "Sparkling water 500ml", 300),
];

/// (code, symbol, rate as a decimal string, is_default)
const CURRENCIES: &[(&str, &str, &str, bool)] = &[
    ("USD", "$", "1", true),
    ("EUR", "€", "0.92", false),
    ("GBP", "£", "0.79", false),
    ("MXN", "MX$", "17.05", false),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./bistro_dev.db");

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
                println!("Bistro Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./bistro_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Bistro Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    for (order, (code, symbol, rate, is_default)) in CURRENCIES.iter().enumerate() {
        let rate = ExchangeRate::new(rate.parse::<Decimal>()?)?;
        let currency = Currency::new(*code, *symbol, rate, *is_default);
        db.currencies().upsert(&currency, order as i64).await?;
    }
    println!("✓ {} currencies", CURRENCIES.len());

    let existing = db.menu().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} menu items", existing);
        println!("  Skipping menu seed to avoid duplicates.");
        return Ok(());
    }

    for (category, name, description, price) in MENU {
        let item = NewMenuItem::new(*name, *category, *price).description(*description);
        if let Err(e) = db.menu().insert(&item).await {
            eprintln!("Failed to insert {}: {}", name, e);
        }
    }
    println!("✓ {} menu items", db.menu().count().await?);

    db.close().await;
    Ok(())
}
