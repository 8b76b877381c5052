//! Formatted terminal output: narrative sentences, money, and tables.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - wording changes are localized (the golden tests below pin them)

use rust_decimal::{Decimal, RoundingStrategy};

use crate::aggregate::{Aggregate, PivotTable};
use crate::domain::{CategoryKey, Dimension, Measure};
use crate::report::ExtremalReport;

/// Group the integer digits of `value` with commas (`1234567.5` -> `1,234,567.5`).
///
/// Values are rounded to cents first, halves away from zero.
pub fn format_thousands(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().to_string();
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits.as_str(), None),
    };

    let mut out = String::new();
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Money gets a `$` (after the sign); units are plain counts.
pub fn format_measure_value(value: Decimal, measure: Measure) -> String {
    let grouped = format_thousands(value);
    if !measure.is_currency() {
        return grouped;
    }
    match grouped.strip_prefix('-') {
        Some(rest) => format!("-${rest}"),
        None => format!("${grouped}"),
    }
}

/// Title used above the bar chart.
pub fn chart_title(by: Dimension, total: Measure) -> String {
    format!("Total {total} per {by}")
}

/// The highest/lowest sentence shown next to the bar chart.
pub fn format_extremal_narrative(agg: &Aggregate, report: &ExtremalReport) -> String {
    let by = agg.key;
    let total = agg.value;

    if report.tie {
        return format!(
            "The Total {total} is the same across all {by} values with a value of {}.",
            format_measure_value(report.min_value, total)
        );
    }

    let suffix = if total.is_currency() { "" } else { " units" };
    format!(
        "The {by} \"{}\" has the highest Total {total} value of {}{suffix}.\nThe lowest is \"{}\" with a value of {}{suffix}.",
        report.max_key,
        format_measure_value(report.max_value, total),
        report.min_key,
        format_measure_value(report.min_value, total),
    )
}

/// Two-column table of an aggregate.
pub fn format_aggregate_table(agg: &Aggregate) -> String {
    let mut out = String::new();
    let key_header = agg.key.header();
    let value_header = agg.value.header();

    out.push_str(format!("{key_header:<24} {value_header:>18}").trim_end());
    out.push('\n');
    out.push_str(&format!("{:-<24} {:-<18}\n", "", ""));

    for (key, value) in agg.iter() {
        out.push_str(&format!(
            "{:<24} {:>18}\n",
            truncate(&key.to_string(), 24),
            format_measure_value(*value, agg.value)
        ));
    }
    out
}

/// Matrix view of a pivot, one line per row key.
pub fn format_pivot_table(pivot: &PivotTable) -> String {
    let mut out = String::new();

    let mut header = format!("{:<14}", truncate(pivot.row_key.header(), 14));
    for column in &pivot.columns {
        header.push_str(&format!(" {:>14}", truncate(&column.to_string(), 14)));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    for (row_idx, row) in pivot.rows.iter().enumerate() {
        let mut line = format!("{:<14}", truncate(&format_row_label(row), 14));
        for column_idx in 0..pivot.columns.len() {
            line.push_str(&format!(" {:>14}", format_thousands(pivot.cell(row_idx, column_idx))));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Axis label for a row key; dates use the compact `DD-MM YYYY` form.
pub fn format_row_label(key: &CategoryKey) -> String {
    match key {
        CategoryKey::Date(d) => d.format("%d-%m %Y").to_string(),
        other => other.to_string(),
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{PivotSpec, aggregate, pivot};
    use crate::domain::fixtures::{date, dec, sample_table};
    use crate::report::extremes;

    #[test]
    fn thousands_grouping() {
        assert_eq!(format_thousands(dec("0")), "0");
        assert_eq!(format_thousands(dec("999")), "999");
        assert_eq!(format_thousands(dec("1000")), "1,000");
        assert_eq!(format_thousands(dec("52504260.67")), "52,504,260.67");
        assert_eq!(format_thousands(dec("-1234.5")), "-1,234.5");
        assert_eq!(format_thousands(dec("1234.5678")), "1,234.57");
        assert_eq!(format_thousands(dec("1234.565")), "1,234.57");
        assert_eq!(format_thousands(dec("-0.125")), "-0.13");
    }

    #[test]
    fn measure_values_carry_currency_symbol() {
        assert_eq!(format_measure_value(dec("1500"), Measure::Sales), "$1,500");
        assert_eq!(format_measure_value(dec("-1500"), Measure::Profit), "-$1,500");
        assert_eq!(format_measure_value(dec("1500"), Measure::UnitsSold), "1,500");
    }

    #[test]
    fn narrative_names_highest_and_lowest() {
        let agg = aggregate(&sample_table(), Dimension::Segment, Measure::Sales);
        let report = extremes(&agg).unwrap();
        assert_eq!(
            format_extremal_narrative(&agg, &report),
            "The Segment \"Government\" has the highest Total Sales value of $150.\nThe lowest is \"Enterprise\" with a value of -$10."
        );
    }

    #[test]
    fn narrative_for_units_has_no_dollar_sign() {
        let agg = aggregate(&sample_table(), Dimension::Product, Measure::UnitsSold);
        let report = extremes(&agg).unwrap();
        let text = format_extremal_narrative(&agg, &report);
        assert!(text.contains("value of 20 units"), "{text}");
        assert!(!text.contains('$'));
    }

    #[test]
    fn uniform_totals_use_single_sentence() {
        let agg = aggregate(&sample_table(), Dimension::Country, Measure::UnitsSold);
        let report = extremes(&agg).unwrap();
        assert_eq!(
            format_extremal_narrative(&agg, &report),
            "The Total Units Sold is the same across all Country values with a value of 50."
        );
    }

    #[test]
    fn aggregate_table_golden() {
        let agg = aggregate(&sample_table(), Dimension::DiscountBand, Measure::Sales);
        let expected = concat!(
            "Discount Band                         Sales\n",
            "------------------------ ------------------\n",
            "None                                   $140\n",
            "Low                                  $25.50\n",
            "Medium                                 -$10\n",
            "High                                    $50\n",
        );
        assert_eq!(format_aggregate_table(&agg), expected);
    }

    #[test]
    fn pivot_rows_use_compact_dates() {
        let table = sample_table();
        let out = pivot(
            &table,
            &PivotSpec {
                row_key: Dimension::Date,
                column_key: Dimension::Segment,
                value: Measure::Sales,
                included: vec![CategoryKey::text("Government")],
                years: None,
            },
        )
        .ready()
        .unwrap();
        let text = format_pivot_table(&out);
        assert!(text.starts_with("Date               Government\n"), "{text}");
        assert!(text.contains("01-10 2013                100\n"), "{text}");
        assert_eq!(format_row_label(&CategoryKey::Date(date(2014, 6, 1))), "01-06 2014");
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("Government", 24), "Government");
        assert_eq!(truncate("United States of America", 10), "United St.");
    }
}
