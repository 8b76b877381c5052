//! Export derived tables to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! plain decimals (no currency symbols or grouping) and ISO dates.

use std::path::Path;

use csv::Writer;
use tracing::info;

use crate::aggregate::{Aggregate, PivotTable, ScatterSet};
use crate::error::AppError;

fn create_writer(path: &Path) -> Result<Writer<std::fs::File>, AppError> {
    Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))
}

fn write_err(e: csv::Error) -> AppError {
    AppError::new(4, format!("Failed to write export CSV: {e}"))
}

fn finish(mut writer: Writer<std::fs::File>, path: &Path, rows: usize) -> Result<(), AppError> {
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV '{}': {e}", path.display())))?;
    info!(path = %path.display(), rows, "wrote export");
    Ok(())
}

/// One line per category: `<key column>,<measure>`.
pub fn write_aggregate_csv(path: &Path, agg: &Aggregate) -> Result<(), AppError> {
    let mut writer = create_writer(path)?;
    writer
        .write_record([agg.key.header(), agg.value.header()])
        .map_err(write_err)?;
    for (key, value) in agg.iter() {
        writer
            .write_record([key.to_string(), value.to_string()])
            .map_err(write_err)?;
    }
    finish(writer, path, agg.len())
}

/// Row key in the first column, one column per pivot column value.
pub fn write_pivot_csv(path: &Path, pivot: &PivotTable) -> Result<(), AppError> {
    let mut writer = create_writer(path)?;

    let mut header = vec![pivot.row_key.header().to_string()];
    header.extend(pivot.columns.iter().map(ToString::to_string));
    writer.write_record(&header).map_err(write_err)?;

    for (row_idx, row) in pivot.rows.iter().enumerate() {
        let mut record = vec![row.to_string()];
        record.extend((0..pivot.columns.len()).map(|c| pivot.cell(row_idx, c).to_string()));
        writer.write_record(&record).map_err(write_err)?;
    }
    finish(writer, path, pivot.rows.len())
}

/// Long format: `<category>,<x measure>,<y measure>` per source row.
pub fn write_scatter_csv(path: &Path, set: &ScatterSet) -> Result<(), AppError> {
    let mut writer = create_writer(path)?;
    writer
        .write_record([set.category.header(), set.x.header(), set.y.header()])
        .map_err(write_err)?;
    for group in &set.groups {
        let key = group.key.to_string();
        for (x, y) in &group.points {
            writer
                .write_record([key.clone(), x.to_string(), y.to_string()])
                .map_err(write_err)?;
        }
    }
    finish(writer, path, set.point_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{PivotSpec, ScatterSpec, aggregate, pivot, scatter};
    use crate::domain::fixtures::sample_table;
    use crate::domain::{CategoryKey, Dimension, Measure};

    #[test]
    fn aggregate_export_uses_plain_decimals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bar.csv");
        let agg = aggregate(&sample_table(), Dimension::DiscountBand, Measure::Sales);

        write_aggregate_csv(&path, &agg).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Discount Band,Sales\nNone,140\nLow,25.50\nMedium,-10\nHigh,50\n"
        );
    }

    #[test]
    fn pivot_export_has_one_column_per_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bump.csv");
        let table = sample_table();
        let p = pivot(
            &table,
            &PivotSpec {
                row_key: Dimension::Date,
                column_key: Dimension::Segment,
                value: Measure::Sales,
                included: vec![CategoryKey::text("Government"), CategoryKey::text("Midmarket")],
                years: None,
            },
        )
        .ready()
        .unwrap();

        write_pivot_csv(&path, &p).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Date,Government,Midmarket\n2013-10-01,100,0\n2014-01-01,50,25.50\n2014-06-01,0,40\n"
        );
    }

    #[test]
    fn scatter_export_is_long_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scatter.csv");
        let table = sample_table();
        let set = scatter(
            &table,
            &ScatterSpec {
                x: Measure::Sales,
                y: Measure::UnitsSold,
                category: Dimension::Segment,
                included: vec![CategoryKey::text("Enterprise")],
            },
        )
        .ready()
        .unwrap();

        write_scatter_csv(&path, &set).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Segment,Sales,Units Sold\nEnterprise,-10,10\n");
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let agg = aggregate(&sample_table(), Dimension::Segment, Measure::Sales);
        let err = write_aggregate_csv(&path, &agg).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
