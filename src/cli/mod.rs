//! Command-line parsing for the finances dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the aggregation and charting code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Dimension, Measure};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "findash", version, about = "Company finances dashboard (CSV-based)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Total of a measure per category, with the highest and lowest called out.
    Bar(BarArgs),
    /// The bar view subdivided by a second column (products by default).
    Stacked(StackedArgs),
    /// Daily totals per category over the selected years.
    Bump(BumpArgs),
    /// Relationship between two measures, one series per category.
    Scatter(ScatterArgs),
    /// List the selectable values of a column (years for Date).
    Values(ValuesArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same request pipeline as the one-shot commands, but renders
    /// results in a terminal UI using Ratatui.
    Tui(InputArgs),
}

/// Where to read records from, and how to log.
#[derive(Debug, Args, Clone, Default)]
pub struct InputArgs {
    /// Financial records CSV (falls back to FINDASH_CSV, then an interactive picker).
    #[arg(short = 'f', long, value_name = "CSV")]
    pub file: Option<PathBuf>,

    /// Log level filter (e.g. `info`, `findash=debug`); overrides RUST_LOG.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Write logs to this file instead of stderr (the TUI only logs to a file).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Output options shared by the chart commands.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Print the chart description as JSON instead of drawing it.
    #[arg(long)]
    pub json: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the derived table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct BarArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub output: OutputArgs,

    /// Category column ("For each").
    #[arg(long, value_enum, default_value_t = Dimension::Segment)]
    pub by: Dimension,

    /// Measure to total.
    #[arg(long, value_enum, default_value_t = Measure::Sales)]
    pub total: Measure,

    /// Do not mark the highest and lowest bars.
    #[arg(long)]
    pub plain: bool,
}

#[derive(Debug, Args, Clone)]
pub struct StackedArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub output: OutputArgs,

    #[arg(long, value_enum, default_value_t = Dimension::Segment)]
    pub by: Dimension,

    #[arg(long, value_enum, default_value_t = Measure::Sales)]
    pub total: Measure,

    /// Column whose values become the stacked segments.
    #[arg(long, value_enum, default_value_t = Dimension::Product)]
    pub stack_by: Dimension,

    /// Stack values to keep (repeatable); all when omitted.
    #[arg(long = "include", value_name = "VALUE")]
    pub include: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct BumpArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub output: OutputArgs,

    /// One line per value of this column.
    #[arg(long, value_enum, default_value_t = Dimension::Segment)]
    pub by: Dimension,

    #[arg(long, value_enum, default_value_t = Measure::Sales)]
    pub total: Measure,

    /// Years to show (repeatable); the earliest year in the data when omitted.
    #[arg(long = "year", value_name = "YEAR")]
    pub years: Vec<i32>,

    /// Category values to keep (repeatable); all when omitted.
    #[arg(long = "include", value_name = "VALUE")]
    pub include: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ScatterArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub output: OutputArgs,

    /// Horizontal measure.
    #[arg(long, value_enum, default_value_t = Measure::GrossSales)]
    pub x: Measure,

    /// Vertical measure.
    #[arg(long, value_enum, default_value_t = Measure::Discounts)]
    pub y: Measure,

    /// Column that splits points into series.
    #[arg(long, value_enum, default_value_t = Dimension::Segment)]
    pub category: Dimension,

    /// Category values to keep (repeatable); all when omitted.
    #[arg(long = "include", value_name = "VALUE")]
    pub include: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ValuesArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long, value_enum)]
    pub column: Dimension,

    /// Print as a JSON array.
    #[arg(long)]
    pub json: bool,
}
