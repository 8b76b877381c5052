//! Grouping and reshaping over the immutable table.
//!
//! Responsibilities:
//!
//! - group-by sums keyed by a categorical column (`group`)
//! - row x column pivots for stacked and time-series views (`pivot`)
//! - filtered point projections for the relationship view (`scatter`)
//!
//! Every operation is a pure function of its arguments. Selections that
//! cannot produce a table come back as a `Selection` sentinel, not an error.

pub mod group;
pub mod pivot;
pub mod scatter;

pub use group::*;
pub use pivot::*;
pub use scatter::*;

use crate::domain::Dimension;

/// Outcome of a query that depends on user selections.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<T> {
    /// The derived table/series.
    Ready(T),
    /// A required selection set was empty; the caller should prompt the user.
    NothingSelected(EmptySelection),
    /// The same column was chosen for both axes; the view is undefined.
    SameAxes,
}

/// Which selection set was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptySelection {
    Years,
    Categories(Dimension),
}

impl<T> Selection<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Selection<U> {
        match self {
            Selection::Ready(v) => Selection::Ready(f(v)),
            Selection::NothingSelected(e) => Selection::NothingSelected(e),
            Selection::SameAxes => Selection::SameAxes,
        }
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Selection::Ready(v) => Some(v),
            _ => None,
        }
    }
}
