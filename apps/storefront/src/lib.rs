//! # Goonj Storefront
//!
//! Orchestration layer: checkout sessions, the payment gateway boundary,
//! operator order management and the `goonj` CLI.
//!
//! ## Module Structure
//! ```text
//! src/
//! ├── lib.rs          ◄── You are here (startup, tracing)
//! ├── main.rs         ◄── `goonj` binary
//! ├── cli.rs          ◄── clap commands
//! ├── config.rs       ◄── Environment configuration
//! ├── error.rs        ◄── ApiError / ErrorCode
//! ├── catalog.rs      ◄── Catalog JSON loader
//! ├── identity.rs     ◄── Operator policy
//! ├── orders.rs       ◄── OrderStatusManager
//! └── checkout/
//!     ├── workflow.rs ◄── CheckoutWorkflow (step machine + placement)
//!     ├── attempt.rs  ◄── Gateway attempts and idempotent callbacks
//!     └── gateway.rs  ◄── PaymentGateway trait, SimulatedGateway
//! ```

pub mod catalog;
pub mod checkout;
pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod orders;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use goonj_db::{Database, DbConfig};

use crate::cli::Cli;
use crate::config::StorefrontConfig;
use crate::error::ApiError;
use crate::identity::AdminPolicy;
use crate::orders::OrderStatusManager;

/// Everything a command needs, opened once per process.
pub struct Storefront {
    pub config: StorefrontConfig,
    pub db: Database,
    pub policy: AdminPolicy,
}

impl Storefront {
    /// Opens the order store named by `config`, creating it if needed.
    pub async fn open(config: StorefrontConfig) -> Result<Self, ApiError> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ApiError::internal(format!("Cannot create {}: {}", parent.display(), e))
                })?;
            }
        }

        let db = Database::new(DbConfig::new(config.db_path.clone())).await?;
        info!(db_path = ?config.db_path, "Order store ready");

        let policy = AdminPolicy::from_emails(&config.admin_emails);
        Ok(Storefront { config, db, policy })
    }

    pub fn status_manager(&self) -> OrderStatusManager {
        OrderStatusManager::new(Arc::new(self.db.orders()), self.policy.clone())
            .with_directory(self.db.users())
    }
}

/// Loads configuration, opens the store and runs one command.
pub async fn run(cli: Cli) -> Result<(), ApiError> {
    let config = StorefrontConfig::load()?;
    let store = Storefront::open(config).await?;
    let result = cli.execute(&store).await;
    store.db.close().await;
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` overrides the default filter. Logs go to stderr so command
/// output on stdout stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,goonj=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
