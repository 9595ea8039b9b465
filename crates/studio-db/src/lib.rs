//! # studio-db: Database Layer for Studio POS
//!
//! This crate provides database access for the Studio POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                     Studio POS Data Flow                          │
//! │                                                                   │
//! │  API handler (close_comanda)                                      │
//! │       │                                                           │
//! │       ▼                                                           │
//! │  ┌─────────────────────────────────────────────────────────────┐ │
//! │  │                  studio-db (THIS CRATE)                     │ │
//! │  │                                                             │ │
//! │  │  ┌────────────┐  ┌──────────────┐  ┌─────────────────────┐ │ │
//! │  │  │  Database  │  │ Repositories │  │  SettlementService  │ │ │
//! │  │  │ (pool.rs)  │  │ catalog /    │  │  one transaction:   │ │ │
//! │  │  │ SqlitePool │◄─│ comanda /    │  │  insert revenue +   │ │ │
//! │  │  │ migrations │  │ transaction  │  │  close comanda      │ │ │
//! │  │  └────────────┘  └──────────────┘  └─────────────────────┘ │ │
//! │  └─────────────────────────────────────────────────────────────┘ │
//! │       │                                                           │
//! │       ▼                                                           │
//! │  SQLite database (WAL mode)                                       │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (catalog, comanda, transaction)
//! - [`settlement`] - The atomic comanda-closing service
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use studio_core::SystemClock;
//! use studio_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("studio.db")).await?;
//!
//! let comanda = db.comandas().open(Some("Ana"), Some("Bia")).await?;
//! // ... add items ...
//! let outcome = db
//!     .settlement(Arc::new(SystemClock))
//!     .settle(&comanda.id, tender)
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod settlement;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};
pub use settlement::{SettledComanda, SettlementError, SettlementService};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::comanda::ComandaRepository;
pub use repository::transaction::{EntryError, PeriodSummary, TransactionRepository};
