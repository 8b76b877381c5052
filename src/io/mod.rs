//! Input/output helpers.
//!
//! - CSV ingest + cleaning (`ingest`)
//! - derived-table exports (CSV) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
