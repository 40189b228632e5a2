//! # Seed Data Generator
//!
//! Populates a development database with staff, an open shift per
//! front-of-house staff member, a small menu and dining tables.
//!
//! ## Usage
//! ```bash
//! # Seed ./mesa_dev.db
//! cargo run -p mesa-db --bin seed
//!
//! # Specify database path and table count
//! cargo run -p mesa-db --bin seed -- --db ./data/mesa.db --tables 20
//! ```

use chrono::Utc;
use std::env;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use mesa_core::{DiningTable, Money, Product, Shift, Staff, StaffRole, TableStatus};
use mesa_db::{Database, DbConfig};

/// Staff accounts: (id, name, role)
const STAFF: &[(&str, &str, StaffRole)] = &[
    ("staff-admin", "Grace Nakato", StaffRole::Admin),
    ("staff-manager", "Peter Okello", StaffRole::Manager),
    ("staff-cashier", "Amina Namubiru", StaffRole::Cashier),
    ("staff-waiter", "Joseph Ssali", StaffRole::Waiter),
    ("staff-kitchen", "Sarah Achieng", StaffRole::Kitchen),
];

/// Menu: (name, price in UGX)
const MENU: &[(&str, i64)] = &[
    ("Rolex", 5_000),
    ("Luwombo Chicken", 30_000),
    ("Matooke & Beef Stew", 20_000),
    ("Tilapia Fry", 35_000),
    ("Pilau", 15_000),
    ("Chapati", 1_500),
    ("Samosa", 1_000),
    ("Nile Special", 6_000),
    ("Club Pilsener", 6_000),
    ("Passion Juice", 4_000),
    ("African Tea", 3_000),
    ("Soda 500ml", 2_500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./mesa_dev.db");
    let mut table_count: usize = 12;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--tables" | "-t" => {
                if i + 1 < args.len() {
                    table_count = args[i + 1].parse().unwrap_or(12);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Mesa POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: ./mesa_dev.db)");
                println!("  -t, --tables <N>     Number of dining tables (default: 12)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Mesa POS Seed Data Generator");
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

    let now = Utc::now();

    for (id, name, role) in STAFF {
        db.staff()
            .insert(&Staff {
                id: id.to_string(),
                name: name.to_string(),
                role: *role,
                is_active: true,
            })
            .await?;

        if *role != StaffRole::Kitchen {
            db.shifts()
                .open(&Shift {
                    id: Uuid::new_v4().to_string(),
                    staff_id: id.to_string(),
                    terminal_id: "till-1".to_string(),
                    start_time: now,
                    end_time: None,
                })
                .await?;
        }
    }
    println!("✓ {} staff members, open shifts on till-1", STAFF.len());

    for (name, price) in MENU {
        db.products()
            .insert(&Product {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                price: Money::from_units(*price),
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }
    println!("✓ {} menu products", MENU.len());

    for n in 1..=table_count {
        db.tables()
            .insert(&DiningTable {
                id: Uuid::new_v4().to_string(),
                label: format!("T{}", n),
                status: TableStatus::Available,
                current_order_id: None,
            })
            .await?;
    }
    println!("✓ {} dining tables", table_count);

    println!();
    println!("🎉 Seed complete!");

    Ok(())
}
