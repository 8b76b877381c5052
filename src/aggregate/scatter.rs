//! Measure-vs-measure point sets for the relationship view.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use crate::aggregate::{EmptySelection, Selection};
use crate::domain::{CategoryKey, Dimension, FinanceTable, Measure};

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSpec {
    pub x: Measure,
    pub y: Measure,
    pub category: Dimension,
    pub included: Vec<CategoryKey>,
}

/// Points belonging to one category value, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterGroup {
    pub key: CategoryKey,
    pub points: Vec<(Decimal, Decimal)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSet {
    pub x: Measure,
    pub y: Measure,
    pub category: Dimension,
    /// One group per included category present in the data, in key order.
    pub groups: Vec<ScatterGroup>,
}

impl ScatterSet {
    pub fn point_count(&self) -> usize {
        self.groups.iter().map(|g| g.points.len()).sum()
    }
}

/// Project rows whose `category` is included onto `(x, y)`.
pub fn scatter(table: &FinanceTable, spec: &ScatterSpec) -> Selection<ScatterSet> {
    if spec.x == spec.y {
        return Selection::SameAxes;
    }
    if spec.included.is_empty() {
        return Selection::NothingSelected(EmptySelection::Categories(spec.category));
    }

    let included: BTreeSet<&CategoryKey> = spec.included.iter().collect();
    let mut grouped: BTreeMap<CategoryKey, Vec<(Decimal, Decimal)>> = BTreeMap::new();
    for record in table.records() {
        let key = record.key(spec.category);
        if included.contains(&key) {
            grouped
                .entry(key)
                .or_default()
                .push((record.measure(spec.x), record.measure(spec.y)));
        }
    }

    Selection::Ready(ScatterSet {
        x: spec.x,
        y: spec.y,
        category: spec.category,
        groups: grouped
            .into_iter()
            .map(|(key, points)| ScatterGroup { key, points })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DiscountBand;
    use crate::domain::fixtures::{dec, sample_table};

    #[test]
    fn identical_axes_are_rejected() {
        let out = scatter(
            &sample_table(),
            &ScatterSpec {
                x: Measure::Profit,
                y: Measure::Profit,
                category: Dimension::Segment,
                included: vec![CategoryKey::text("Government")],
            },
        );
        assert_eq!(out, Selection::SameAxes);
    }

    #[test]
    fn empty_subcategory_prompts() {
        let out = scatter(
            &sample_table(),
            &ScatterSpec {
                x: Measure::Sales,
                y: Measure::Profit,
                category: Dimension::Country,
                included: vec![],
            },
        );
        assert_eq!(
            out,
            Selection::NothingSelected(EmptySelection::Categories(Dimension::Country))
        );
    }

    #[test]
    fn groups_follow_category_order() {
        let out = scatter(
            &sample_table(),
            &ScatterSpec {
                x: Measure::GrossSales,
                y: Measure::UnitsSold,
                category: Dimension::DiscountBand,
                included: vec![
                    CategoryKey::Band(DiscountBand::High),
                    CategoryKey::Band(DiscountBand::None),
                ],
            },
        )
        .ready()
        .unwrap();

        let keys: Vec<String> = out.groups.iter().map(|g| g.key.to_string()).collect();
        assert_eq!(keys, vec!["None", "High"]);
        assert_eq!(out.groups[0].points, vec![(dec("100"), dec("10")), (dec("40"), dec("10"))]);
        assert_eq!(out.point_count(), 3);
    }
}
