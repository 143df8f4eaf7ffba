//! # goonj-db: Database Layer for the Goonj Storefront
//!
//! SQLite persistence for placed orders and the signed-in user directory,
//! using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Data Flow                             │
//! │                                                                         │
//! │  CheckoutWorkflow.place_order / OrderStatusManager.update_status        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     goonj-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │   Repositories     │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │    │                    │  │ (embedded) │  │   │
//! │  │   │               │    │ OrderRepository    │  │            │  │   │
//! │  │   │ SqlitePool    │◄───│  └ SqliteOrderRepo │  │ 001_init   │  │   │
//! │  │   │               │    │ UserRepository     │  │            │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <platform data dir>/goonj.db   or   :memory: in tests         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - The `OrderRepository` contract and implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use goonj_db::{Database, DbConfig, OrderRepository};
//!
//! let db = Database::new(DbConfig::new("goonj.db")).await?;
//! let orders = db.orders().list_by_user("uid-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::order::SqliteOrderRepository;
pub use repository::user::UserRepository;
pub use repository::OrderRepository;
