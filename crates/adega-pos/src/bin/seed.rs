//! # Seed Data Generator
//!
//! Populates a development database with a liquor-store catalog and an
//! operator profile.
//!
//! ## Usage
//! ```bash
//! # Use the configured database (adega.toml / ADEGA_DB_PATH)
//! cargo run -p adega-pos --bin seed
//!
//! # Specify database path
//! cargo run -p adega-pos --bin seed -- --db ./data/adega_dev.db
//!
//! # Name the operator profile
//! cargo run -p adega-pos --bin seed -- --operator 3f1c... --name "Ana"
//! ```
//!
//! ## Generated Catalog
//! One category per block below, every product in every listed size.
//! Prices are deterministic so repeated seeds produce the same catalog.

use std::env;
use std::path::PathBuf;

use adega_core::ProductInput;
use adega_db::{Database, DbConfig};
use adega_pos::{telemetry, AppConfig};
use uuid::Uuid;

/// Categories, products and base price in centavos.
const CATALOG: &[(&str, &[(&str, i64)])] = &[
    (
        "Cervejas",
        &[
            ("Skol", 450),
            ("Brahma", 480),
            ("Heineken", 790),
            ("Budweiser", 650),
            ("Original", 700),
            ("Stella Artois", 820),
        ],
    ),
    (
        "Destilados",
        &[
            ("Cachaça 51", 1990),
            ("Vodka Smirnoff", 4490),
            ("Gin Tanqueray", 12990),
            ("Whisky Red Label", 9990),
            ("Rum Montilla", 3290),
        ],
    ),
    (
        "Vinhos",
        &[
            ("Vinho Tinto Suave", 2490),
            ("Vinho Tinto Seco", 3990),
            ("Vinho Branco", 3490),
            ("Espumante Brut", 5490),
        ],
    ),
    (
        "Sem Álcool",
        &[
            ("Água Mineral", 300),
            ("Refrigerante Cola", 900),
            ("Energético", 1200),
            ("Gelo 5kg", 1500),
        ],
    ),
];

/// Size label and price multiplier in percent.
const SIZES: &[(&str, i64)] = &[("", 100), ("600ml", 160), ("Fardo 12un", 1050)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut operator_id = Uuid::new_v4().to_string();
    let mut operator_name = String::from("Operador Dev");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" if i + 1 < args.len() => {
                db_path = Some(PathBuf::from(&args[i + 1]));
                i += 1;
            }
            "--operator" | "-o" if i + 1 < args.len() => {
                operator_id = args[i + 1].clone();
                i += 1;
            }
            "--name" | "-n" if i + 1 < args.len() => {
                operator_name = args[i + 1].clone();
                i += 1;
            }
            "--help" | "-h" => {
                println!("Adega POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>        Database file (default: from config)");
                println!("  -o, --operator <ID>    Operator id for the profile (default: random)");
                println!("  -n, --name <NAME>      Operator display name");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let config = AppConfig::load_or_default(None);
    telemetry::init_tracing(&config.log_filter);

    let db_config = match db_path {
        Some(path) => DbConfig::new(path),
        None => config.db_config()?,
    };

    println!("Adega POS Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_config.database_path.display());
    println!();

    let db = Database::new(db_config).await?;
    println!("✓ Connected to database, migrations applied");

    let (existing, _) = db.products().stock_totals().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping catalog to avoid duplicates.");
    } else {
        let start = std::time::Instant::now();
        let generated = seed_catalog(&db).await?;
        println!(
            "✓ Generated {} products in {:?}",
            generated,
            start.elapsed()
        );
    }

    let profile = db.profiles().upsert(&operator_id, &operator_name).await?;
    println!("✓ Operator profile: {} ({})", profile.display_name, profile.id);

    println!();
    println!("✓ Seed complete!");
    Ok(())
}

async fn seed_catalog(db: &Database) -> Result<usize, Box<dyn std::error::Error>> {
    let mut generated = 0;

    for (category_idx, (category_name, products)) in CATALOG.iter().enumerate() {
        let category = db.categories().create(category_name).await?;

        for (product_idx, (name, base_price)) in products.iter().enumerate() {
            for (size_idx, (size, multiplier)) in SIZES.iter().enumerate() {
                let input = product_input(
                    &category.id,
                    name,
                    size,
                    base_price * multiplier / 100,
                    category_idx * 100 + product_idx * 10 + size_idx,
                );

                if let Err(e) = db.products().create(&input).await {
                    eprintln!("Failed to insert {}: {}", input.name, e);
                    continue;
                }
                generated += 1;
            }
        }
    }

    Ok(generated)
}

/// Builds one product. `seed` spreads stock and margin deterministically.
fn product_input(
    category_id: &str,
    name: &str,
    size: &str,
    price_cents: i64,
    seed: usize,
) -> ProductInput {
    let full_name = if size.is_empty() {
        name.to_string()
    } else {
        format!("{} {}", name, size)
    };

    // Cost between 55% and 75% of the sale price
    let margin_pct = 55 + (seed * 7 % 21) as i64;
    let stock = (seed * 37 % 120) as i64;

    ProductInput {
        name: full_name,
        category_id: Some(category_id.to_string()),
        cost_cents: price_cents * margin_pct / 100,
        price_cents,
        stock,
    }
}
