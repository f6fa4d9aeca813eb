use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, instrument, trace};

use crate::error::{DashboardError, Result};

/// Timestamp column every table is keyed on.
pub const DATETIME_COLUMN: &str = "Datetime";
/// Observed Kp values in the main table.
pub const ACTUAL_COLUMN: &str = "Kps";
/// Model output stored next to the observations in the main table.
pub const PREDICTED_COLUMN: &str = "Predicted_Kp";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Parses the timestamp shapes found in exported CSVs. Date-only values are
/// taken as midnight and offsets are normalized to UTC.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.naive_utc()))
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// An immutable, chronologically ordered table keyed by `Datetime`.
///
/// The parsed timestamps are held next to a DataFrame with the remaining
/// columns, both in the row order they were loaded in.
#[derive(Debug, Clone)]
pub struct TimeSeriesTable {
    datetimes: Vec<NaiveDateTime>,
    frame: DataFrame,
}

impl TimeSeriesTable {
    /// Splits the `Datetime` column off a DataFrame and parses it.
    pub fn from_dataframe(df: DataFrame) -> Result<Self> {
        let column = df.column(DATETIME_COLUMN).map_err(|_| {
            DashboardError::DataFrame(format!("Missing {} column", DATETIME_COLUMN))
        })?;
        let as_text = column.cast(&DataType::String)?;

        let mut datetimes = Vec::with_capacity(df.height());
        for (row, value) in as_text.str()?.into_iter().enumerate() {
            let value = value.ok_or_else(|| {
                DashboardError::DataFrame(format!("Missing {} value at row {}", DATETIME_COLUMN, row))
            })?;
            let parsed = parse_datetime(value).ok_or_else(|| {
                DashboardError::DataFrame(format!(
                    "Invalid {} value '{}' at row {}",
                    DATETIME_COLUMN, value, row
                ))
            })?;
            datetimes.push(parsed);
        }

        let frame = df.drop(DATETIME_COLUMN)?;
        trace!("Parsed {} timestamps, {} value columns", datetimes.len(), frame.width());

        Ok(Self { datetimes, frame })
    }

    /// Reads a headered CSV file.
    #[instrument]
    pub fn read_csv(path: &Path) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;
        debug!("Read {} rows x {} columns", df.height(), df.width());

        Self::from_dataframe(df)
    }

    /// Keeps only the rows whose timestamp falls in `year`.
    pub fn filter_year(&self, year: i32) -> Result<Self> {
        let mask: BooleanChunked = self.datetimes.iter().map(|dt| dt.year() == year).collect();

        // A frame without value columns carries no rows to filter
        let frame = if self.frame.width() == 0 {
            self.frame.clone()
        } else {
            self.frame.filter(&mask)?
        };
        let datetimes: Vec<NaiveDateTime> = self
            .datetimes
            .iter()
            .copied()
            .filter(|dt| dt.year() == year)
            .collect();
        debug!("Year {} keeps {} of {} rows", year, datetimes.len(), self.datetimes.len());

        Ok(Self { datetimes, frame })
    }

    /// Fails unless every named column is present.
    pub fn require_columns(&self, names: &[&str]) -> Result<()> {
        let accessor = self.accessor();
        match names.iter().find(|name| !accessor.has_column(name)) {
            Some(missing) => Err(DashboardError::DataFrame(format!("Missing {} column", missing))),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.datetimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datetimes.is_empty()
    }

    pub fn datetimes(&self) -> &[NaiveDateTime] {
        &self.datetimes
    }

    /// First and last timestamp, if the table has rows.
    pub fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.datetimes.iter().min()?;
        let last = self.datetimes.iter().max()?;
        Some((*first, *last))
    }

    pub fn accessor(&self) -> TimeSeriesAccessor<'_> {
        TimeSeriesAccessor { table: self }
    }
}

/// One row of a [`TimeSeriesAccessor::select`] result.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedRow {
    pub datetime: NaiveDateTime,
    /// Values in the order the fields were requested; `None` marks a gap
    pub values: Vec<Option<f64>>,
}

/// Read-only typed view over a [`TimeSeriesTable`].
#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesAccessor<'a> {
    table: &'a TimeSeriesTable,
}

impl<'a> TimeSeriesAccessor<'a> {
    /// All column names except `Datetime`, in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.table
            .frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        name != DATETIME_COLUMN && self.table.frame.get_column_index(name).is_some()
    }

    /// A column widened to `f64`. Values that are not numbers become gaps.
    pub fn values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        if !self.has_column(name) {
            return Err(DashboardError::UnknownVariable(name.to_string()));
        }

        let column = self.table.frame.column(name)?.cast(&DataType::Float64)?;
        Ok(column.f64()?.into_iter().collect())
    }

    /// Rows restricted to `x_field` and `y_fields`, in load order.
    pub fn select(&self, x_field: &str, y_fields: &[&str]) -> Result<Vec<SelectedRow>> {
        if x_field != DATETIME_COLUMN {
            return Err(DashboardError::UnknownVariable(x_field.to_string()));
        }

        let columns = y_fields
            .iter()
            .map(|field| self.values(field))
            .collect::<Result<Vec<_>>>()?;

        let rows = self
            .table
            .datetimes
            .iter()
            .enumerate()
            .map(|(row, datetime)| SelectedRow {
                datetime: *datetime,
                values: columns.iter().map(|column| column[row]).collect(),
            })
            .collect();

        Ok(rows)
    }
}
