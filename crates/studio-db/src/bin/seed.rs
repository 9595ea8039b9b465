//! # Seed Data Generator
//!
//! Populates the database with a demo salon catalog and a few comandas
//! for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p studio-db --bin seed
//!
//! # Cap the number of catalog items
//! cargo run -p studio-db --bin seed -- --count 12
//!
//! # Specify database path
//! cargo run -p studio-db --bin seed -- --db ./data/studio.db
//! ```
//!
//! ## Generated Data
//! - A realistic salon catalog: services (cuts, color, styling) and
//!   retail products
//! - One open comanda mid-visit
//! - One settled comanda with its revenue transaction
//! - One manual dashboard entry

use std::env;
use std::sync::Arc;

use studio_core::validation::{validate_item_name, validate_unit_price, RawTransactionForm};
use studio_core::{ItemKind, Money, SystemClock, TenderBreakdown};
use studio_db::{Database, DbConfig};

/// Salon services with list prices in centavos.
const SERVICES: &[(&str, i64)] = &[
    ("Corte Feminino", 8_000),
    ("Corte Masculino", 5_000),
    ("Escova", 4_500),
    ("Escova Progressiva", 25_000),
    ("Coloração", 18_000),
    ("Mechas", 22_000),
    ("Hidratação", 7_000),
    ("Manicure", 3_500),
    ("Pedicure", 4_000),
    ("Sobrancelha", 2_500),
    ("Maquiagem", 12_000),
    ("Penteado", 15_000),
];

/// Retail products sold over the counter.
const PRODUCTS: &[(&str, i64)] = &[
    ("Shampoo Profissional", 6_500),
    ("Condicionador Profissional", 6_900),
    ("Máscara Capilar", 8_900),
    ("Óleo Reparador", 5_400),
    ("Leave-in", 4_800),
    ("Esmalte", 1_500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = SERVICES.len() + PRODUCTS.len();
    let mut db_path = String::from("./studio_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(count);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Studio POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Max catalog items to generate (default: all)");
                println!("  -d, --db <PATH>    Database file path (default: ./studio_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Studio POS Seed Data Generator");
    println!("=================================");
    println!("Database: {db_path}");
    println!();

    // Connect to database (runs migrations)
    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing catalog
    let existing = db.catalog().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {existing} catalog items");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Generate catalog
    println!();
    println!("Generating catalog...");

    let catalog = db.catalog();
    let mut created = Vec::new();

    let entries = SERVICES
        .iter()
        .map(|&(name, price)| (ItemKind::Service, name, price))
        .chain(
            PRODUCTS
                .iter()
                .map(|&(name, price)| (ItemKind::Product, name, price)),
        )
        .take(count);

    for (kind, name, price_cents) in entries {
        let price = Money::from_cents(price_cents);
        validate_item_name(name)?;
        validate_unit_price(price)?;

        let item = catalog.create(kind, name, price).await?;
        created.push(item);
    }

    println!("✓ {} catalog items created", created.len());

    // One open comanda mid-visit
    let comandas = db.comandas();
    let open = comandas.open(Some("Ana Souza"), Some("Bianca")).await?;
    comandas.add_item(&open.id, &created[0], 1, None).await?;
    if let Some(extra) = created.get(6) {
        comandas.add_item(&open.id, extra, 1, None).await?;
    }
    println!("✓ Comanda nº {} left open", open.number);

    // One settled comanda, paid half cash half pix
    let settled = comandas.open(Some("Carla Lima"), Some("Bianca")).await?;
    comandas.add_item(&settled.id, &created[2], 2, None).await?;
    let current = comandas
        .get_by_id(&settled.id)
        .await?
        .expect("comanda just created");

    let clock = Arc::new(SystemClock);
    let half = current.net_total_cents / 2;
    let outcome = db
        .settlement(clock.clone())
        .settle(
            &settled.id,
            TenderBreakdown {
                cash: Money::from_cents(half),
                pix: Money::from_cents(current.net_total_cents - half),
                ..TenderBreakdown::default()
            },
        )
        .await?;
    println!(
        "✓ Comanda nº {} settled → transaction {}",
        outcome.comanda.number, outcome.transaction.id
    );

    // One manual dashboard entry
    let manual = db
        .transactions(clock)
        .record_entry(&RawTransactionForm {
            cash: Some("150,00".to_string()),
            credit_card: Some("320,00".to_string()),
            ..RawTransactionForm::default()
        })
        .await?;
    println!(
        "✓ Manual entry recorded: gross {} centavos, net {} centavos",
        manual.gross_total_cents, manual.net_total_cents
    );

    println!();
    println!("Done.");

    Ok(())
}
