//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - held in the immutable in-memory table
//! - used as grouping keys during aggregation
//! - serialized into chart descriptions and exports

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Categorical columns that can be used as a grouping key.
///
/// `Date` groups by calendar day; it is the row key of the time-series view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    Segment,
    Country,
    Product,
    DiscountBand,
    Date,
}

impl Dimension {
    /// The "fact" columns offered by the dashboard selectors.
    pub const FACTS: [Dimension; 4] = [
        Dimension::Segment,
        Dimension::Country,
        Dimension::Product,
        Dimension::DiscountBand,
    ];

    /// Column header as it appears in the source file.
    pub fn header(self) -> &'static str {
        match self {
            Dimension::Segment => "Segment",
            Dimension::Country => "Country",
            Dimension::Product => "Product",
            Dimension::DiscountBand => "Discount Band",
            Dimension::Date => "Date",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Numeric columns that can be summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Measure {
    UnitsSold,
    ManufacturingPrice,
    SalePrice,
    GrossSales,
    Discounts,
    Sales,
    Cogs,
    Profit,
}

impl Measure {
    pub const ALL: [Measure; 8] = [
        Measure::UnitsSold,
        Measure::ManufacturingPrice,
        Measure::SalePrice,
        Measure::GrossSales,
        Measure::Discounts,
        Measure::Sales,
        Measure::Cogs,
        Measure::Profit,
    ];

    /// Measures that vary per transaction (offered on scatter axes).
    pub const VARYING: [Measure; 5] = [
        Measure::GrossSales,
        Measure::Discounts,
        Measure::Sales,
        Measure::Cogs,
        Measure::Profit,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Measure::UnitsSold => "Units Sold",
            Measure::ManufacturingPrice => "Manufacturing Price",
            Measure::SalePrice => "Sale Price",
            Measure::GrossSales => "Gross Sales",
            Measure::Discounts => "Discounts",
            Measure::Sales => "Sales",
            Measure::Cogs => "COGS",
            Measure::Profit => "Profit",
        }
    }

    pub fn is_currency(self) -> bool {
        self != Measure::UnitsSold
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Discount band with its fixed natural order (`None < Low < Medium < High`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiscountBand {
    None,
    Low,
    Medium,
    High,
}

impl DiscountBand {
    pub const ALL: [DiscountBand; 4] = [
        DiscountBand::None,
        DiscountBand::Low,
        DiscountBand::Medium,
        DiscountBand::High,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|band| band.label().eq_ignore_ascii_case(s))
    }

    pub fn label(self) -> &'static str {
        match self {
            DiscountBand::None => "None",
            DiscountBand::Low => "Low",
            DiscountBand::Medium => "Medium",
            DiscountBand::High => "High",
        }
    }
}

/// A grouping key value.
///
/// All keys produced for one column share a variant, so the derived ordering
/// gives ascending text, the band domain order, or chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum CategoryKey {
    Text(String),
    Band(DiscountBand),
    Date(NaiveDate),
}

impl CategoryKey {
    pub fn text(s: impl Into<String>) -> Self {
        CategoryKey::Text(s.into())
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKey::Text(s) => f.write_str(s),
            CategoryKey::Band(b) => f.write_str(b.label()),
            CategoryKey::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// One cleaned row of the financial records file.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub segment: String,
    pub country: String,
    pub product: String,
    pub discount_band: DiscountBand,
    pub units_sold: i64,
    pub manufacturing_price: Decimal,
    pub sale_price: Decimal,
    pub gross_sales: Decimal,
    pub discounts: Decimal,
    pub sales: Decimal,
    pub cogs: Decimal,
    pub profit: Decimal,
    pub date: NaiveDate,
}

impl Record {
    /// Grouping key of this row for `dim`.
    pub fn key(&self, dim: Dimension) -> CategoryKey {
        match dim {
            Dimension::Segment => CategoryKey::Text(self.segment.clone()),
            Dimension::Country => CategoryKey::Text(self.country.clone()),
            Dimension::Product => CategoryKey::Text(self.product.clone()),
            Dimension::DiscountBand => CategoryKey::Band(self.discount_band),
            Dimension::Date => CategoryKey::Date(self.date),
        }
    }

    /// Value of `measure` as an exact decimal (units are widened losslessly).
    pub fn measure(&self, measure: Measure) -> Decimal {
        match measure {
            Measure::UnitsSold => Decimal::from(self.units_sold),
            Measure::ManufacturingPrice => self.manufacturing_price,
            Measure::SalePrice => self.sale_price,
            Measure::GrossSales => self.gross_sales,
            Measure::Discounts => self.discounts,
            Measure::Sales => self.sales,
            Measure::Cogs => self.cogs,
            Measure::Profit => self.profit,
        }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// The immutable, fully cleaned dataset.
///
/// Built once at startup by the loader and then only borrowed.
#[derive(Debug, Clone, Default)]
pub struct FinanceTable {
    records: Vec<Record>,
}

impl FinanceTable {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted unique values of `dim` (band order for `Discount Band`).
    pub fn domain(&self, dim: Dimension) -> Vec<CategoryKey> {
        self.records
            .iter()
            .map(|r| r.key(dim))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted unique years present in `Date`.
    pub fn years(&self) -> Vec<i32> {
        self.records
            .iter()
            .map(Record::year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Interpret user input as a key of `dim`.
    ///
    /// Text columns accept anything (unknown values simply match no rows);
    /// bands and dates must parse.
    pub fn parse_key(dim: Dimension, s: &str) -> Option<CategoryKey> {
        let s = s.trim();
        match dim {
            Dimension::Segment | Dimension::Country | Dimension::Product => Some(CategoryKey::text(s)),
            Dimension::DiscountBand => DiscountBand::parse(s).map(CategoryKey::Band),
            Dimension::Date => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(CategoryKey::Date),
        }
    }
}
