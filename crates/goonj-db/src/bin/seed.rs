//! # Seed Data Generator
//!
//! Populates a storefront database with demo users and orders.
//!
//! ## Usage
//! ```bash
//! # 12 orders (default) against ./goonj_dev.db using data/books.json
//! cargo run -p goonj-db --bin seed
//!
//! # Custom amount, database and catalog
//! cargo run -p goonj-db --bin seed -- --orders 40 --db ./data/goonj.db --catalog ./data/books.json
//! ```
//!
//! ## Generated Data
//! - Five demo readers in the user directory
//! - Orders built from the catalog through the real cart reducer, so every
//!   total carries the storewide markdown
//! - Payment methods rotate through all four variants
//! - Statuses are advanced with `update_status` so the operator views have
//!   something other than `pending` to show

use std::env;
use std::fs;

use goonj_core::{
    Address, Book, Cart, GatewayReference, NewOrder, OrderStatus, PaymentMethod, User,
};
use goonj_db::{Database, DbConfig, OrderRepository};
use tracing_subscriber::EnvFilter;

/// (uid, display name, city, state, pincode)
const READERS: &[(&str, &str, &str, &str, &str)] = &[
    ("demo-asha", "Asha Rao", "Pune", "Maharashtra", "411001"),
    ("demo-kabir", "Kabir Sethi", "Delhi", "Delhi", "110001"),
    ("demo-meera", "Meera Iyer", "Chennai", "Tamil Nadu", "600002"),
    ("demo-farhan", "Farhan Ali", "Lucknow", "Uttar Pradesh", "226001"),
    ("demo-ira", "Ira Das", "Kolkata", "West Bengal", "700016"),
];

/// Status each generated order ends up in, cycled by index.
const STATUS_CYCLE: &[OrderStatus] = &[
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Pending,
    OrderStatus::Cancelled,
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 12;
    let mut db_path = String::from("./goonj_dev.db");
    let mut catalog_path = String::from("data/books.json");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--orders" | "-n" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(12);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--catalog" | "-c" => {
                if i + 1 < args.len() {
                    catalog_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Goonj Storefront Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --orders <N>      Number of orders to generate (default: 12)");
                println!("  -d, --db <PATH>       Database file path (default: ./goonj_dev.db)");
                println!("  -c, --catalog <PATH>  Catalog JSON (default: data/books.json)");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Goonj Storefront Seed Data Generator");
    println!("======================================");
    println!("Database: {}", db_path);
    println!("Catalog:  {}", catalog_path);
    println!("Orders:   {}", count);
    println!();

    let books: Vec<Book> = serde_json::from_str(&fs::read_to_string(&catalog_path)?)?;
    if books.is_empty() {
        println!("⚠ Catalog is empty, nothing to seed");
        return Ok(());
    }
    println!("✓ Loaded {} books", books.len());

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let orders = db.orders();
    let existing = orders.count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} orders", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let users: Vec<User> = READERS.iter().map(|r| demo_user(r.0, r.1)).collect();
    for user in &users {
        db.users().upsert(user).await?;
    }
    println!("✓ Added {} readers", users.len());

    let start = std::time::Instant::now();
    let mut generated = 0;

    for seed in 0..count {
        let reader = READERS[seed % READERS.len()];
        let new_order = generate_order(&books, reader, seed);
        let is_gateway = new_order.gateway.is_some();

        let id = match orders.create(new_order).await {
            Ok(id) => id,
            Err(e) => {
                eprintln!("Failed to insert order {}: {}", seed, e);
                continue;
            }
        };

        let status = STATUS_CYCLE[seed % STATUS_CYCLE.len()];
        if status != OrderStatus::Pending {
            let tracking = matches!(status, OrderStatus::Shipped | OrderStatus::Delivered)
                .then(|| format!("GJ{:08}", seed));
            orders.update_status(&id, status, tracking).await?;
        } else if is_gateway {
            orders
                .attach_payment(&id, &format!("order_seed{}", seed), &format!("pay_seed{}", seed))
                .await?;
        }

        generated += 1;
    }

    println!();
    println!("✓ Generated {} orders in {:?}", generated, start.elapsed());
    println!("✓ Seed complete!");

    Ok(())
}

fn demo_user(uid: &str, name: &str) -> User {
    User {
        uid: uid.to_string(),
        email: format!("{}@goonj.example", uid.trim_start_matches("demo-")),
        display_name: name.to_string(),
        photo_url: None,
    }
}

/// Builds one order deterministically from `seed`.
fn generate_order(books: &[Book], reader: (&str, &str, &str, &str, &str), seed: usize) -> NewOrder {
    let (uid, name, city, state, pincode) = reader;

    let mut cart = Cart::new();
    let line_count = 1 + seed % 3;
    for offset in 0..line_count {
        let book = &books[(seed * 7 + offset * 3) % books.len()];
        cart.add(book.clone());
        if (seed + offset) % 4 == 0 {
            cart.add(book.clone());
        }
    }

    let payment_method = match seed % 4 {
        0 => PaymentMethod::CashOnDelivery,
        1 => PaymentMethod::GatewayRedirect,
        2 => PaymentMethod::Upi {
            upi_id: format!("{}@okbank", uid.trim_start_matches("demo-")),
        },
        _ => PaymentMethod::Card {
            card_number: format!("4111 1111 1111 {:04}", seed % 10_000),
            expiry_date: "12/29".to_string(),
            cvv: "000".to_string(),
        },
    };

    let gateway = payment_method.is_gateway().then(|| GatewayReference {
        gateway_order_id: format!("order_seed{}", seed),
        gateway_payment_id: format!("pay_seed{}", seed),
    });

    NewOrder {
        user_id: uid.to_string(),
        items: cart.snapshot(),
        total: cart.total(),
        address: Address {
            full_name: name.to_string(),
            phone: format!("98{:08}", seed),
            house_number: format!("{}", 10 + seed),
            street_name: "Library Road".to_string(),
            city: city.to_string(),
            state: state.to_string(),
            pincode: pincode.to_string(),
        },
        payment_method,
        gateway,
    }
}
