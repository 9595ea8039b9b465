//! # Repository Module
//!
//! Database repository implementations for Studio POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                 Repository Pattern Explained                      │
//! │                                                                   │
//! │  Caller (API handler, seed tool, settlement service)              │
//! │       │                                                           │
//! │       │  db.comandas().add_item(id, &item, 1, None)               │
//! │       ▼                                                           │
//! │  ComandaRepository                                                │
//! │  ├── open(...)                                                    │
//! │  ├── add_item(...)      ← recomputes totals in the same           │
//! │  ├── set_discount(...)    SQL transaction                         │
//! │  └── cancel(...)                                                  │
//! │       │                                                           │
//! │       ▼                                                           │
//! │  SQLite database                                                  │
//! │                                                                   │
//! │  Benefits:                                                        │
//! │  • SQL is isolated in one place per entity                        │
//! │  • Status guards live in the WHERE clause, so a closed comanda    │
//! │    is immutable even under concurrent callers                     │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Service/product catalog CRUD and search
//! - [`comanda::ComandaRepository`] - Comanda and line item operations
//! - [`transaction::TransactionRepository`] - Revenue record operations

pub mod catalog;
pub mod comanda;
pub mod transaction;
