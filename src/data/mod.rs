//! Persistence and import/export around the ledger core

pub mod store;
pub mod transfer;

// Re-export commonly used types
pub use store::LedgerStore;
pub use transfer::{export_json, import_into, parse_import};
