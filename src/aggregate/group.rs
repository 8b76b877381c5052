//! Group-by sums.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::domain::{CategoryKey, Dimension, FinanceTable, Measure};

/// Per-category totals of one measure.
///
/// Keys iterate in ascending order; `Discount Band` keys follow the band
/// domain order because of how `CategoryKey` orders.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub key: Dimension,
    pub value: Measure,
    pub totals: BTreeMap<CategoryKey, Decimal>,
}

impl Aggregate {
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn get(&self, key: &CategoryKey) -> Option<Decimal> {
        self.totals.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CategoryKey, &Decimal)> {
        self.totals.iter()
    }
}

/// Group `table` by `key` and sum `value`.
pub fn aggregate(table: &FinanceTable, key: Dimension, value: Measure) -> Aggregate {
    let mut totals: BTreeMap<CategoryKey, Decimal> = BTreeMap::new();
    for record in table.records() {
        *totals.entry(record.key(key)).or_default() += record.measure(value);
    }
    Aggregate { key, value, totals }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{date, dec, record, sample_table};
    use crate::domain::DiscountBand;

    #[test]
    fn sums_rows_per_key() {
        let table = FinanceTable::new(vec![
            record("A", "Carretera", DiscountBand::None, "100", date(2014, 1, 1)),
            record("A", "Carretera", DiscountBand::None, "50", date(2014, 2, 1)),
        ]);
        let agg = aggregate(&table, Dimension::Segment, Measure::Sales);
        assert_eq!(agg.len(), 1);
        assert_eq!(agg.get(&CategoryKey::text("A")), Some(dec("150")));
    }

    #[test]
    fn discount_band_follows_domain_order() {
        let agg = aggregate(&sample_table(), Dimension::DiscountBand, Measure::Sales);
        let keys: Vec<String> = agg.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["None", "Low", "Medium", "High"]);
        assert_eq!(agg.get(&CategoryKey::Band(DiscountBand::None)), Some(dec("140")));
    }

    #[test]
    fn text_keys_ascend() {
        let agg = aggregate(&sample_table(), Dimension::Product, Measure::Profit);
        let keys: Vec<String> = agg.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["Carretera", "Montana", "Paseo"]);
        assert_eq!(agg.get(&CategoryKey::text("Paseo")), Some(dec("30")));
    }

    #[test]
    fn units_are_summed_as_integers() {
        let agg = aggregate(&sample_table(), Dimension::Segment, Measure::UnitsSold);
        assert_eq!(agg.get(&CategoryKey::text("Midmarket")), Some(dec("20")));
    }

    #[test]
    fn merging_partition_aggregates_matches_whole() {
        let table = sample_table();
        let records = table.records();

        for split in 0..=records.len() {
            let left = FinanceTable::new(records[..split].to_vec());
            let right = FinanceTable::new(records[split..].to_vec());

            for dim in [Dimension::Segment, Dimension::DiscountBand, Dimension::Date] {
                let whole = aggregate(&table, dim, Measure::Sales);

                let mut merged = aggregate(&left, dim, Measure::Sales).totals;
                for (k, v) in aggregate(&right, dim, Measure::Sales).totals {
                    *merged.entry(k).or_default() += v;
                }
                assert_eq!(merged, whole.totals, "split={split} dim={dim}");
            }
        }
    }

    #[test]
    fn empty_table_gives_empty_aggregate() {
        let agg = aggregate(&FinanceTable::default(), Dimension::Country, Measure::Sales);
        assert!(agg.is_empty());
    }
}
