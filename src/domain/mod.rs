//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - column selectors (`Dimension`, `Measure`)
//! - the ordered `DiscountBand` domain and `CategoryKey` grouping keys
//! - cleaned rows (`Record`) and the immutable `FinanceTable`

pub mod types;

pub use types::*;

#[cfg(test)]
pub(crate) use types::fixtures;
