//! CSV ingest and cleaning.
//!
//! This module turns the raw financial records export into a typed,
//! immutable `FinanceTable`.
//!
//! Design goals:
//! - **Strict schema**: the fixed header set, nothing else
//! - **All-or-nothing**: the first malformed cell aborts the load
//! - **Exact money**: currency cells become `Decimal`, never `f64`

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, info};

use crate::domain::{Dimension, DiscountBand, FinanceTable, Measure, Record};
use crate::error::LoadError;

/// Columns that only restate `Date`; accepted in the header, then dropped.
const DERIVED_DATE_COLUMNS: [&str; 3] = ["Month Number", "Month Name", "Year"];

/// Date formats accepted in the `Date` column, tried in order.
const DATE_FORMATS: [&str; 5] = ["%m/%d/%Y", "%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%b-%y"];

/// Load and clean the records file at `path`.
pub fn load_table(path: &Path) -> Result<FinanceTable, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let table = load_from_reader(file)?;
    info!(records = table.len(), path = %path.display(), "loaded financial records");
    Ok(table)
}

/// Load and clean records from any reader (file, stdin, in-memory bytes).
pub fn load_from_reader<R: Read>(reader: R) -> Result<FinanceTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        // Quoted cells may span lines, so take the line from the parser.
        let line = row.position().map_or(0, |p| p.line() as usize);
        records.push(columns.parse_row(&row, line)?);
    }

    if records.is_empty() {
        return Err(LoadError::Empty);
    }

    debug!(rows = records.len(), "cleaned all rows");
    Ok(FinanceTable::new(records))
}

/// Check only the header row of `path` against the records schema.
pub fn check_schema(path: &Path) -> Result<(), LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    ColumnIndex::from_headers(reader.headers()?).map(|_| ())
}

/// Resolved position of every schema column in the header row.
struct ColumnIndex {
    positions: HashMap<&'static str, usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self, LoadError> {
        let required: Vec<&'static str> = Dimension::FACTS
            .iter()
            .map(|d| d.header())
            .chain(Measure::ALL.iter().map(|m| m.header()))
            .chain(std::iter::once(Dimension::Date.header()))
            .collect();

        let mut positions = HashMap::new();
        for (idx, raw) in headers.iter().enumerate() {
            let name = normalize_header_name(raw);
            if let Some(known) = required.iter().find(|h| h.eq_ignore_ascii_case(&name)) {
                if positions.insert(*known, idx).is_some() {
                    return Err(LoadError::DuplicateColumn((*known).to_string()));
                }
            } else if DERIVED_DATE_COLUMNS.iter().any(|h| h.eq_ignore_ascii_case(&name)) {
                debug!(column = %name, "dropping derived date column");
            } else {
                return Err(LoadError::UnexpectedColumn(name));
            }
        }

        if let Some(missing) = required.iter().find(|h| !positions.contains_key(*h)) {
            return Err(LoadError::MissingColumn((*missing).to_string()));
        }

        Ok(Self { positions })
    }

    fn cell<'a>(&self, row: &'a StringRecord, column: &'static str) -> &'a str {
        self.positions
            .get(column)
            .and_then(|idx| row.get(*idx))
            .map(str::trim)
            .unwrap_or("")
    }

    fn text(&self, row: &StringRecord, dim: Dimension) -> String {
        self.cell(row, dim.header()).to_string()
    }

    fn currency(&self, row: &StringRecord, measure: Measure, line: usize) -> Result<Decimal, LoadError> {
        let raw = self.cell(row, measure.header());
        parse_currency(raw).ok_or_else(|| malformed(line, measure.header(), raw))
    }

    fn parse_row(&self, row: &StringRecord, line: usize) -> Result<Record, LoadError> {
        let band_raw = self.cell(row, Dimension::DiscountBand.header());
        let discount_band = DiscountBand::parse(band_raw)
            .ok_or_else(|| malformed(line, Dimension::DiscountBand.header(), band_raw))?;

        let units_raw = self.cell(row, Measure::UnitsSold.header());
        let units_sold = parse_units(units_raw).ok_or_else(|| malformed(line, Measure::UnitsSold.header(), units_raw))?;

        let date_raw = self.cell(row, Dimension::Date.header());
        let date = parse_date(date_raw).ok_or_else(|| LoadError::MalformedDate {
            line,
            value: date_raw.to_string(),
        })?;

        Ok(Record {
            segment: self.text(row, Dimension::Segment),
            country: self.text(row, Dimension::Country),
            product: self.text(row, Dimension::Product),
            discount_band,
            units_sold,
            manufacturing_price: self.currency(row, Measure::ManufacturingPrice, line)?,
            sale_price: self.currency(row, Measure::SalePrice, line)?,
            gross_sales: self.currency(row, Measure::GrossSales, line)?,
            discounts: self.currency(row, Measure::Discounts, line)?,
            sales: self.currency(row, Measure::Sales, line)?,
            cogs: self.currency(row, Measure::Cogs, line)?,
            profit: self.currency(row, Measure::Profit, line)?,
            date,
        })
    }
}

fn malformed(line: usize, column: &str, value: &str) -> LoadError {
    LoadError::MalformedValue {
        line,
        column: column.to_string(),
        value: value.to_string(),
    }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a BOM and pad
    // names with spaces (" Sales ").
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

/// Strip currency formatting and return the bare numeric text.
///
/// `$`, thousands commas and spaces are removed, a lone `-` placeholder
/// becomes `0`, and accounting negatives `(x)` become `-x`.
pub fn clean_numeric(raw: &str) -> String {
    let stripped: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();

    if stripped == "-" {
        return "0".to_string();
    }

    match stripped.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => format!("-{inner}"),
        None => stripped,
    }
}

/// Parse a currency cell such as `" $1,234.50 "`, `"$(12.00)"` or `" $-   "`.
pub fn parse_currency(raw: &str) -> Option<Decimal> {
    let cleaned = clean_numeric(raw);
    if !is_plain_number(&cleaned) {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// `-?digits[.digits]`; `Decimal::from_str` alone also takes `+` and `_`.
fn is_plain_number(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    all_digits(int_part) && frac_part.is_none_or(all_digits)
}

/// Parse a `Units Sold` cell.
///
/// The cleaned value is read as a number and truncated toward zero, so an
/// export that writes `1,618.50` yields `1618`.
pub fn parse_units(raw: &str) -> Option<i64> {
    parse_currency(raw)?.trunc().to_i64()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{date, dec};
    use std::io::Write;

    const HEADER: &str = "Segment,Country, Product ,Discount Band,Units Sold,Manufacturing Price,Sale Price,Gross Sales,Discounts, Sales ,COGS,Profit,Date,Month Number,Month Name,Year";

    fn csv_with(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    /// Accounting-style rendering, the inverse of `clean_numeric`.
    fn accounting(v: Decimal) -> String {
        let digits = v.abs().to_string();
        let (int_part, frac) = match digits.split_once('.') {
            Some((i, f)) => (i.to_string(), format!(".{f}")),
            None => (digits.clone(), String::new()),
        };
        let mut grouped = String::new();
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        if v.is_sign_negative() && !v.is_zero() {
            format!(" $({grouped}{frac}) ")
        } else {
            format!(" ${grouped}{frac} ")
        }
    }

    #[test]
    fn parenthesized_units_are_negative() {
        assert_eq!(parse_units("(1,234)"), Some(-1234));
    }

    #[test]
    fn currency_cleaning_handles_export_quirks() {
        assert_eq!(parse_currency(" $1,618.50 "), Some(dec("1618.50")));
        assert_eq!(parse_currency(" $(4,533.75)"), Some(dec("-4533.75")));
        assert_eq!(parse_currency(" $-   "), Some(Decimal::ZERO));
        assert_eq!(parse_currency("$ 1 000"), Some(dec("1000")));
        assert_eq!(parse_currency("-$12"), Some(dec("-12")));
        assert_eq!(parse_currency("twelve"), None);
        assert_eq!(parse_currency("12_34"), None);
        assert_eq!(parse_currency("1__0"), None);
        assert_eq!(parse_currency("+5"), None);
        assert_eq!(parse_currency("1.2.3"), None);
        assert_eq!(parse_currency("5."), None);
        assert_eq!(parse_units("+5"), None);
        assert_eq!(parse_currency(""), None);
    }

    #[test]
    fn fractional_units_truncate_toward_zero() {
        assert_eq!(parse_units(" 1,618.50 "), Some(1618));
        assert_eq!(parse_units("(2.9)"), Some(-2));
        assert_eq!(parse_units("abc"), None);
    }

    #[test]
    fn accounting_format_round_trips() {
        for s in ["0", "1", "999", "1000", "1234.5", "-1234.5", "-0.01", "987654321.99", "-1000000"] {
            let v = dec(s);
            assert_eq!(parse_currency(&accounting(v)), Some(v), "value {s}");
        }
    }

    #[test]
    fn parses_supported_date_formats() {
        assert_eq!(parse_date("01/06/2014"), Some(date(2014, 1, 6)));
        assert_eq!(parse_date("2014-06-01"), Some(date(2014, 6, 1)));
        assert_eq!(parse_date("25/12/2013"), Some(date(2013, 12, 25)));
        assert_eq!(parse_date("01-Dec-14"), Some(date(2014, 12, 1)));
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn loads_and_cleans_rows() {
        let data = csv_with(&[
            r#"Government ,Canada, Carretera ,None," $1,618.50 "," $3.00 "," $20.00 "," $32,370.00 "," $-   "," $32,370.00 "," $16,185.00 "," $16,185.00 ",01/01/2014,1,January,2014"#,
            r#"Midmarket,France,Paseo,High,"(1,234)"," $10.00 "," $15.00 "," $18,510.00 "," $(2,776.50)"," $15,733.50 "," $12,340.00 "," $(3,393.50)",06/01/2014,6,June,2014"#,
        ]);
        let table = load_from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);

        let first = &table.records()[0];
        assert_eq!(first.segment, "Government");
        assert_eq!(first.product, "Carretera");
        assert_eq!(first.units_sold, 1618);
        assert_eq!(first.discounts, Decimal::ZERO);
        assert_eq!(first.gross_sales, dec("32370.00"));
        assert_eq!(first.date, date(2014, 1, 1));

        let second = &table.records()[1];
        assert_eq!(second.discount_band, DiscountBand::High);
        assert_eq!(second.units_sold, -1234);
        assert_eq!(second.profit, dec("-3393.50"));
    }

    #[test]
    fn malformed_currency_aborts_load() {
        let data = csv_with(&[
            "Government,Canada,Carretera,None,10,3,20,200,0,200,30,170,01/01/2014,1,January,2014",
            "Government,Canada,Carretera,None,10,3,20,2x0,0,200,30,170,01/01/2014,1,January,2014",
        ]);
        let err = load_from_reader(data.as_bytes()).unwrap_err();
        match err {
            LoadError::MalformedValue { line, column, value } => {
                assert_eq!(line, 3);
                assert_eq!(column, "Gross Sales");
                assert_eq!(value, "2x0");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn multiline_cells_keep_error_lines_accurate() {
        let data = csv_with(&[
            "\"Government\nSector\",Canada,Carretera,None,10,3,20,200,0,200,30,170,01/01/2014,1,January,2014",
            "Government,Canada,Carretera,None,10,3,20,2x0,0,200,30,170,01/01/2014,1,January,2014",
        ]);
        assert!(matches!(
            load_from_reader(data.as_bytes()),
            Err(LoadError::MalformedValue { line: 4, .. })
        ));
    }

    #[test]
    fn ragged_row_aborts_load() {
        let data = csv_with(&[
            "Government,Canada,Carretera,None,10,3,20,200,0,200,30,170,01/01/2014,1,January,2014",
            "Government,Canada,Carretera,None,10",
        ]);
        assert!(matches!(load_from_reader(data.as_bytes()), Err(LoadError::Csv(_))));
    }

    #[test]
    fn malformed_date_aborts_load() {
        let data = csv_with(&["Government,Canada,Carretera,None,10,3,20,200,0,200,30,170,sometime,1,January,2014"]);
        assert!(matches!(
            load_from_reader(data.as_bytes()),
            Err(LoadError::MalformedDate { line: 2, .. })
        ));
    }

    #[test]
    fn unknown_discount_band_is_malformed() {
        let data = csv_with(&["Government,Canada,Carretera,Huge,10,3,20,200,0,200,30,170,01/01/2014,1,January,2014"]);
        assert!(matches!(
            load_from_reader(data.as_bytes()),
            Err(LoadError::MalformedValue { ref column, .. }) if column == "Discount Band"
        ));
    }

    #[test]
    fn schema_is_strict() {
        let missing = "Segment,Country,Product,Discount Band,Units Sold\nA,B,C,None,1";
        assert!(matches!(
            load_from_reader(missing.as_bytes()),
            Err(LoadError::MissingColumn(_))
        ));

        let extra = format!("{HEADER},Region\n");
        assert!(matches!(
            load_from_reader(extra.as_bytes()),
            Err(LoadError::UnexpectedColumn(ref c)) if c == "Region"
        ));

        let duplicate = format!(
            "{HEADER},Sales\nGovernment,Canada,Carretera,None,10,3,20,200,0,200,30,170,2014-01-01,1,January,2014,999"
        );
        assert!(matches!(
            load_from_reader(duplicate.as_bytes()),
            Err(LoadError::DuplicateColumn(ref c)) if c == "Sales"
        ));
    }

    #[test]
    fn derived_date_columns_are_optional() {
        let data = "\u{feff}Segment,Country,Product,Discount Band,Units Sold,Manufacturing Price,Sale Price,Gross Sales,Discounts,Sales,COGS,Profit,Date\n\
                    Government,Canada,Carretera,Low,10,3,20,200,0,200,30,170,2014-01-01";
        let table = load_from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.records()[0].discount_band, DiscountBand::Low);
    }

    #[test]
    fn empty_file_is_an_error() {
        assert!(matches!(load_from_reader(HEADER.as_bytes()), Err(LoadError::Empty)));
    }

    #[test]
    fn load_table_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            csv_with(&["Enterprise,Mexico,VTT,Medium,5,250,300,1500,0,1500,1250,250,12/01/2013,12,December,2013"])
        )
        .unwrap();

        let table = load_table(file.path()).unwrap();
        assert_eq!(table.years(), vec![2013]);

        let missing = load_table(Path::new("/definitely/not/here.csv"));
        assert!(matches!(missing, Err(LoadError::Io { .. })));
    }

    #[test]
    fn schema_check_reads_only_the_header() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.csv");
        let other = dir.path().join("other.csv");
        std::fs::write(&good, format!("{HEADER}\n")).unwrap();
        std::fs::write(&other, "name,amount\nx,1\n").unwrap();

        assert!(check_schema(&good).is_ok());
        assert!(matches!(check_schema(&other), Err(LoadError::UnexpectedColumn(ref c)) if c == "name"));
    }
}
