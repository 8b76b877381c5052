//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the records file and loads it once
//! - turns flags into a view request
//! - prints narratives/plots (or JSON)
//! - writes optional exports

use std::path::Path;

use clap::Parser;
use tracing::info;

use crate::aggregate::Selection;
use crate::app::pipeline::{
    BarRequest, BumpRequest, ChartRequest, DerivedTable, ScatterRequest, StackedRequest, prompt_message, render,
};
use crate::cli::{BarArgs, BumpArgs, Command, InputArgs, OutputArgs, ScatterArgs, StackedArgs, ValuesArgs};
use crate::config::{LogTarget, init_logging, resolve_csv_path};
use crate::domain::{CategoryKey, Dimension, FinanceTable};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `findash` binary.
pub fn run() -> Result<(), AppError> {
    // We want `findash` and `findash -f data.csv` to behave like `findash tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Bar(args) => handle_bar(args),
        Command::Stacked(args) => handle_stacked(args),
        Command::Bump(args) => handle_bump(args),
        Command::Scatter(args) => handle_scatter(args),
        Command::Values(args) => handle_values(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn load(input: &InputArgs, target: LogTarget) -> Result<FinanceTable, AppError> {
    init_logging(input, target)?;
    let path = resolve_csv_path(input)?;
    Ok(crate::io::load_table(&path)?)
}

fn handle_bar(args: BarArgs) -> Result<(), AppError> {
    let table = load(&args.input, LogTarget::Stderr)?;
    let request = ChartRequest::Bar(BarRequest {
        by: args.by,
        total: args.total,
        color_by_extremal: !args.plain,
    });
    show(&table, &request, &args.output)
}

fn handle_stacked(args: StackedArgs) -> Result<(), AppError> {
    let table = load(&args.input, LogTarget::Stderr)?;
    let request = ChartRequest::Stacked(StackedRequest {
        by: args.by,
        total: args.total,
        stack_by: args.stack_by,
        included: resolve_included(&table, args.stack_by, &args.include)?,
    });
    show(&table, &request, &args.output)
}

fn handle_bump(args: BumpArgs) -> Result<(), AppError> {
    let table = load(&args.input, LogTarget::Stderr)?;

    // Like the dashboard, start from the earliest year on record.
    let years = if args.years.is_empty() {
        table.years().first().copied().into_iter().collect()
    } else {
        args.years.iter().copied().collect()
    };

    let request = ChartRequest::Bump(BumpRequest {
        by: args.by,
        total: args.total,
        included: resolve_included(&table, args.by, &args.include)?,
        years,
    });
    show(&table, &request, &args.output)
}

fn handle_scatter(args: ScatterArgs) -> Result<(), AppError> {
    let table = load(&args.input, LogTarget::Stderr)?;
    let request = ChartRequest::Scatter(ScatterRequest {
        x: args.x,
        y: args.y,
        category: args.category,
        included: resolve_included(&table, args.category, &args.include)?,
    });
    show(&table, &request, &args.output)
}

fn handle_values(args: ValuesArgs) -> Result<(), AppError> {
    let table = load(&args.input, LogTarget::Stderr)?;
    let values = column_values(&table, args.column);

    if args.json {
        let json = serde_json::to_string_pretty(&values)
            .map_err(|e| AppError::new(4, format!("Failed to serialize values: {e}")))?;
        println!("{json}");
    } else {
        for value in values {
            println!("{value}");
        }
    }
    Ok(())
}

fn handle_tui(args: InputArgs) -> Result<(), AppError> {
    let table = load(&args, LogTarget::FileOnly)?;
    crate::tui::run(table)
}

/// Selectable values of a column; `Date` lists years.
pub fn column_values(table: &FinanceTable, column: Dimension) -> Vec<String> {
    match column {
        Dimension::Date => table.years().iter().map(ToString::to_string).collect(),
        dim => table.domain(dim).iter().map(ToString::to_string).collect(),
    }
}

/// Parse `--include` values; no values means the whole domain.
fn resolve_included(table: &FinanceTable, dim: Dimension, raw: &[String]) -> Result<Vec<CategoryKey>, AppError> {
    if raw.is_empty() {
        return Ok(table.domain(dim));
    }
    raw.iter()
        .map(|value| {
            FinanceTable::parse_key(dim, value)
                .ok_or_else(|| AppError::new(3, format!("Invalid value '{value}' for {dim}.")))
        })
        .collect()
}

fn show(table: &FinanceTable, request: &ChartRequest, output: &OutputArgs) -> Result<(), AppError> {
    let view = match render(table, request) {
        Selection::Ready(view) => view,
        other => {
            let message = prompt_message(request, &other).unwrap_or_else(|| "Nothing to show.".to_string());
            return Err(AppError::new(3, message));
        }
    };

    if output.json {
        let json = serde_json::to_string_pretty(&view.chart)
            .map_err(|e| AppError::new(4, format!("Failed to serialize chart: {e}")))?;
        println!("{json}");
    } else {
        if let Some(narrative) = &view.narrative {
            println!("{narrative}\n");
        }
        println!(
            "{}",
            crate::plot::render_ascii_chart(&view.chart, output.width, output.height)
        );
        println!("{}", view.table.to_text());
    }

    if let Some(path) = &output.export {
        export_table(path, &view.table)?;
        info!(path = %path.display(), "exported derived table");
    }
    Ok(())
}

/// Write the table behind a view with the matching CSV layout.
pub fn export_table(path: &Path, table: &DerivedTable) -> Result<(), AppError> {
    match table {
        DerivedTable::Aggregate(agg) => crate::io::write_aggregate_csv(path, agg),
        DerivedTable::Pivot(p) => crate::io::write_pivot_csv(path, p),
        DerivedTable::Scatter(set) => crate::io::write_scatter_csv(path, set),
    }
}

/// Rewrite argv so `findash` defaults to `findash tui`.
///
/// Rules:
/// - `findash`                      -> `findash tui`
/// - `findash -f data.csv ...`      -> `findash tui -f data.csv ...`
/// - `findash --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "bar" | "stacked" | "bump" | "scatter" | "values" | "tui"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
