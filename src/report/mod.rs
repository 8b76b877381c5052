//! Reporting utilities: extremal (max/min) reports and formatted output.

pub mod format;

pub use format::*;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregate::Aggregate;
use crate::domain::CategoryKey;

/// Highest and lowest category of an aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremalReport {
    pub max_key: CategoryKey,
    pub max_value: Decimal,
    pub min_key: CategoryKey,
    pub min_value: Decimal,
    /// Every category has the same total.
    pub tie: bool,
}

/// Role of a single value relative to an `ExtremalReport`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    Max,
    Min,
    Neutral,
}

impl ExtremalReport {
    /// Max wins over min, so a uniform aggregate highlights every bar as max.
    pub fn highlight(&self, value: Decimal) -> Highlight {
        if value == self.max_value {
            Highlight::Max
        } else if value == self.min_value {
            Highlight::Min
        } else {
            Highlight::Neutral
        }
    }
}

/// Find the extremal categories of `agg`; `None` when it has no rows.
///
/// When several keys share the max (or min) value, the first in key order wins.
pub fn extremes(agg: &Aggregate) -> Option<ExtremalReport> {
    let mut iter = agg.iter();
    let (first_key, first_value) = iter.next()?;

    let (mut max_key, mut max_value) = (first_key, *first_value);
    let (mut min_key, mut min_value) = (first_key, *first_value);
    for (key, value) in iter {
        if *value > max_value {
            max_key = key;
            max_value = *value;
        }
        if *value < min_value {
            min_key = key;
            min_value = *value;
        }
    }

    Some(ExtremalReport {
        max_key: max_key.clone(),
        max_value,
        min_key: min_key.clone(),
        min_value,
        tie: max_value == min_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::aggregate::aggregate;
    use crate::domain::fixtures::{dec, sample_table};
    use crate::domain::{Dimension, Measure};

    fn agg_of(values: &[(&str, &str)]) -> Aggregate {
        Aggregate {
            key: Dimension::Segment,
            value: Measure::Sales,
            totals: values
                .iter()
                .map(|(k, v)| (CategoryKey::text(*k), dec(v)))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn equal_totals_are_a_tie() {
        let report = extremes(&agg_of(&[("A", "100"), ("B", "100")])).unwrap();
        assert!(report.tie);
        assert_eq!(report.max_key, CategoryKey::text("A"));
        assert_eq!(report.min_key, CategoryKey::text("A"));
    }

    #[test]
    fn single_category_is_a_tie() {
        let report = extremes(&agg_of(&[("A", "5")])).unwrap();
        assert!(report.tie);
    }

    #[test]
    fn reports_max_and_min() {
        let agg = aggregate(&sample_table(), Dimension::Segment, Measure::Sales);
        let report = extremes(&agg).unwrap();
        assert!(!report.tie);
        assert_eq!(report.max_key, CategoryKey::text("Government"));
        assert_eq!(report.max_value, dec("150"));
        assert_eq!(report.min_key, CategoryKey::text("Enterprise"));
        assert_eq!(report.min_value, dec("-10"));

        for (_, v) in agg.iter() {
            assert!(report.max_value >= *v);
            assert!(report.min_value <= *v);
        }
    }

    #[test]
    fn tie_iff_single_distinct_value() {
        let cases: [&[(&str, &str)]; 4] = [
            &[("A", "1"), ("B", "1"), ("C", "1")],
            &[("A", "1"), ("B", "2")],
            &[("A", "-3"), ("B", "-3.00")],
            &[("A", "0"), ("B", "0"), ("C", "0.01")],
        ];
        for values in cases {
            let agg = agg_of(values);
            let distinct: std::collections::BTreeSet<Decimal> = agg.iter().map(|(_, v)| v.normalize()).collect();
            let report = extremes(&agg).unwrap();
            assert_eq!(report.tie, distinct.len() == 1, "{values:?}");
        }
    }

    #[test]
    fn first_key_wins_on_duplicate_extremes() {
        let report = extremes(&agg_of(&[("A", "1"), ("B", "9"), ("C", "9"), ("D", "1")])).unwrap();
        assert_eq!(report.max_key, CategoryKey::text("B"));
        assert_eq!(report.min_key, CategoryKey::text("A"));
    }

    #[test]
    fn highlight_roles() {
        let report = extremes(&agg_of(&[("A", "1"), ("B", "5"), ("C", "9")])).unwrap();
        assert_eq!(report.highlight(dec("9")), Highlight::Max);
        assert_eq!(report.highlight(dec("1")), Highlight::Min);
        assert_eq!(report.highlight(dec("5")), Highlight::Neutral);
    }

    #[test]
    fn empty_aggregate_has_no_report() {
        assert_eq!(extremes(&agg_of(&[])), None);
    }
}
