//! Row x column pivots (stacked bars and per-category time series).

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use crate::aggregate::{EmptySelection, Selection};
use crate::domain::{CategoryKey, Dimension, FinanceTable, Measure};

/// What to pivot.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotSpec {
    pub row_key: Dimension,
    pub column_key: Dimension,
    pub value: Measure,
    /// Column-key values to keep; everything else is dropped before reshaping.
    pub included: Vec<CategoryKey>,
    /// Optional year filter on `Date`, applied before grouping.
    pub years: Option<BTreeSet<i32>>,
}

/// Dense row x column matrix of sums. Missing combinations are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub row_key: Dimension,
    pub column_key: Dimension,
    pub value: Measure,
    pub rows: Vec<CategoryKey>,
    pub columns: Vec<CategoryKey>,
    /// Row-major cells: `cells[row][column]`.
    pub cells: Vec<Vec<Decimal>>,
}

impl PivotTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: usize) -> Decimal {
        self.cells
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .unwrap_or_default()
    }

    /// One column as a series aligned with `rows`.
    pub fn column(&self, column: usize) -> Vec<Decimal> {
        (0..self.rows.len()).map(|row| self.cell(row, column)).collect()
    }

    /// Sum across columns for every row key.
    pub fn row_totals(&self) -> BTreeMap<CategoryKey, Decimal> {
        self.rows
            .iter()
            .zip(&self.cells)
            .map(|(key, row)| (key.clone(), row.iter().copied().sum()))
            .collect()
    }
}

/// Group by `(row_key, column_key)`, sum `value`, and reshape into a matrix.
///
/// Sentinels, checked in this order:
/// - same column on both axes -> `SameAxes`
/// - an empty year set -> `NothingSelected(Years)`
/// - an empty `included` set -> `NothingSelected(Categories(column_key))`
pub fn pivot(table: &FinanceTable, spec: &PivotSpec) -> Selection<PivotTable> {
    if spec.row_key == spec.column_key {
        return Selection::SameAxes;
    }
    if spec.years.as_ref().is_some_and(BTreeSet::is_empty) {
        return Selection::NothingSelected(EmptySelection::Years);
    }
    if spec.included.is_empty() {
        return Selection::NothingSelected(EmptySelection::Categories(spec.column_key));
    }

    let included: BTreeSet<&CategoryKey> = spec.included.iter().collect();

    let mut sums: BTreeMap<(CategoryKey, CategoryKey), Decimal> = BTreeMap::new();
    for record in table.records() {
        if let Some(years) = &spec.years {
            if !years.contains(&record.year()) {
                continue;
            }
        }
        let column = record.key(spec.column_key);
        if !included.contains(&column) {
            continue;
        }
        *sums.entry((record.key(spec.row_key), column)).or_default() += record.measure(spec.value);
    }

    let rows: Vec<CategoryKey> = sums.keys().map(|(r, _)| r.clone()).collect::<BTreeSet<_>>().into_iter().collect();
    let columns: Vec<CategoryKey> = sums.keys().map(|(_, c)| c.clone()).collect::<BTreeSet<_>>().into_iter().collect();

    let column_index: BTreeMap<&CategoryKey, usize> = columns.iter().enumerate().map(|(i, c)| (c, i)).collect();

    let mut cells = vec![vec![Decimal::ZERO; columns.len()]; rows.len()];
    let mut row_idx = 0usize;
    for ((row, column), sum) in &sums {
        // `sums` iterates row-major, so rows advance monotonically.
        while rows[row_idx] != *row {
            row_idx += 1;
        }
        cells[row_idx][column_index[column]] = *sum;
    }

    Selection::Ready(PivotTable {
        row_key: spec.row_key,
        column_key: spec.column_key,
        value: spec.value,
        rows,
        columns,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::domain::fixtures::{date, dec, sample_table};

    fn spec(row_key: Dimension, column_key: Dimension, included: Vec<CategoryKey>) -> PivotSpec {
        PivotSpec {
            row_key,
            column_key,
            value: Measure::Sales,
            included,
            years: None,
        }
    }

    #[test]
    fn empty_included_is_nothing_selected() {
        let out = pivot(&sample_table(), &spec(Dimension::Segment, Dimension::Product, vec![]));
        assert_eq!(
            out,
            Selection::NothingSelected(EmptySelection::Categories(Dimension::Product))
        );
    }

    #[test]
    fn same_axes_never_pivots() {
        let table = sample_table();
        let domain = table.domain(Dimension::Product);
        let out = pivot(&table, &spec(Dimension::Product, Dimension::Product, domain));
        assert_eq!(out, Selection::SameAxes);
    }

    #[test]
    fn empty_year_set_is_reported_before_categories() {
        let mut s = spec(Dimension::Date, Dimension::Product, vec![]);
        s.years = Some(BTreeSet::new());
        assert_eq!(
            pivot(&sample_table(), &s),
            Selection::NothingSelected(EmptySelection::Years)
        );
    }

    #[test]
    fn missing_cells_are_zero_filled() {
        let table = sample_table();
        let out = pivot(
            &table,
            &spec(Dimension::Segment, Dimension::Product, table.domain(Dimension::Product)),
        )
        .ready()
        .unwrap();

        let segments: Vec<String> = out.rows.iter().map(|k| k.to_string()).collect();
        let products: Vec<String> = out.columns.iter().map(|k| k.to_string()).collect();
        assert_eq!(segments, vec!["Enterprise", "Government", "Midmarket"]);
        assert_eq!(products, vec!["Carretera", "Montana", "Paseo"]);

        // Enterprise only sold Paseo.
        assert_eq!(out.cells[0], vec![Decimal::ZERO, Decimal::ZERO, dec("-10")]);
        // Midmarket: Carretera 25.50, Paseo 40.
        assert_eq!(out.cells[2], vec![dec("25.50"), Decimal::ZERO, dec("40")]);
    }

    #[test]
    fn only_included_columns_survive() {
        let out = pivot(
            &sample_table(),
            &spec(Dimension::Segment, Dimension::Product, vec![CategoryKey::text("Montana")]),
        )
        .ready()
        .unwrap();
        assert_eq!(out.columns, vec![CategoryKey::text("Montana")]);
        assert_eq!(out.rows, vec![CategoryKey::text("Government")]);
        assert_eq!(out.column(0), vec![dec("50")]);
    }

    #[test]
    fn full_domain_row_totals_match_aggregate() {
        let table = sample_table();
        for row_key in [Dimension::Segment, Dimension::Country, Dimension::DiscountBand, Dimension::Date] {
            let out = pivot(&table, &spec(row_key, Dimension::Product, table.domain(Dimension::Product)))
                .ready()
                .unwrap();
            assert_eq!(out.row_totals(), aggregate(&table, row_key, Measure::Sales).totals);
        }
    }

    #[test]
    fn year_filter_limits_time_series() {
        let table = sample_table();
        let mut s = spec(Dimension::Date, Dimension::Segment, table.domain(Dimension::Segment));
        s.years = Some(BTreeSet::from([2014]));

        let out = pivot(&table, &s).ready().unwrap();
        assert_eq!(
            out.rows,
            vec![CategoryKey::Date(date(2014, 1, 1)), CategoryKey::Date(date(2014, 6, 1))]
        );
        // 2014-06-01: Enterprise -10, Midmarket 40; Government has no row that day.
        let totals = out.row_totals();
        assert_eq!(totals[&CategoryKey::Date(date(2014, 6, 1))], dec("30"));
        assert_eq!(out.cell(1, 1), Decimal::ZERO);
    }

    #[test]
    fn filter_can_leave_an_empty_matrix() {
        let table = sample_table();
        let mut s = spec(Dimension::Date, Dimension::Segment, table.domain(Dimension::Segment));
        s.years = Some(BTreeSet::from([1999]));
        let out = pivot(&table, &s).ready().unwrap();
        assert!(out.is_empty());
        assert!(out.columns.is_empty());
    }
}
