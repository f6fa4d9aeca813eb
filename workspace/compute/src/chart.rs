//! Renderer-independent chart descriptions.
//!
//! Builders here are pure functions of a table; turning a [`ChartSpec`] into
//! markup is left to [`crate::render`].

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{DashboardError, Result};
use crate::table::{ACTUAL_COLUMN, DATETIME_COLUMN, PREDICTED_COLUMN, TimeSeriesTable};

pub const BACKGROUND_COLOR: &str = "#101c33";
pub const FONT_COLOR: &str = "white";
pub const ACTUAL_COLOR: &str = "blue";
pub const PREDICTED_COLOR: &str = "red";
pub const VARIABLE_COLOR: &str = "#75b8e5";

pub const COMPARISON_TITLE: &str = "Actual vs Predicted Kp (3 hours ahead)";
/// Label format of the monthly ticks on variable charts.
pub const MONTHLY_TICK_FORMAT: &str = "%Y-%m-%d";

/// One line on a chart.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SeriesSpec {
    /// Source column
    pub field: String,
    /// Legend label
    pub name: String,
    pub color: String,
    pub x: Vec<NaiveDateTime>,
    /// `None` marks a gap in the line
    pub y: Vec<Option<f64>>,
}

/// How ticks are laid out along an axis.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub enum TickPlacement {
    Auto,
    /// Evenly spaced ticks
    Linear,
    /// One tick on the first day of every month the data spans
    Monthly { ticks: Vec<NaiveDateTime> },
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AxisSpec {
    pub title: String,
    pub show_grid: bool,
    pub show_line: bool,
    pub ticks_outside: bool,
    pub tick_angle: Option<f64>,
    pub tick_placement: TickPlacement,
    pub tick_format: Option<String>,
}

impl AxisSpec {
    fn value_axis(title: &str) -> Self {
        Self {
            title: title.to_string(),
            show_grid: true,
            show_line: false,
            ticks_outside: false,
            tick_angle: None,
            tick_placement: TickPlacement::Auto,
            tick_format: None,
        }
    }

    fn time_axis(tick_placement: TickPlacement, tick_format: Option<String>) -> Self {
        Self {
            title: DATETIME_COLUMN.to_string(),
            show_grid: false,
            show_line: true,
            ticks_outside: true,
            tick_angle: Some(45.0),
            tick_placement,
            tick_format,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartStyle {
    pub background_color: String,
    pub font_color: String,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            background_color: BACKGROUND_COLOR.to_string(),
            font_color: FONT_COLOR.to_string(),
        }
    }
}

/// Everything needed to draw one time-series chart.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartSpec {
    pub title: String,
    /// Always `Datetime`
    pub x_field: String,
    pub series: Vec<SeriesSpec>,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    pub legend_title: Option<String>,
    pub style: ChartStyle,
}

fn series(table: &TimeSeriesTable, field: &str, name: &str, color: &str) -> Result<SeriesSpec> {
    let rows = table.accessor().select(DATETIME_COLUMN, &[field])?;
    let (x, y) = rows
        .into_iter()
        .map(|row| (row.datetime, row.values[0]))
        .unzip();

    Ok(SeriesSpec {
        field: field.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        x,
        y,
    })
}

/// Actual and predicted Kp overlaid on one pair of axes.
pub fn build_comparison_chart(main: &TimeSeriesTable) -> Result<ChartSpec> {
    let actual = series(main, ACTUAL_COLUMN, "Actual Kp", ACTUAL_COLOR)?;
    let predicted = series(main, PREDICTED_COLUMN, "Predicted Kp", PREDICTED_COLOR)?;

    Ok(ChartSpec {
        title: COMPARISON_TITLE.to_string(),
        x_field: DATETIME_COLUMN.to_string(),
        series: vec![actual, predicted],
        x_axis: AxisSpec::time_axis(TickPlacement::Linear, None),
        y_axis: AxisSpec::value_axis("Kps / Predicted Kps"),
        legend_title: Some("Variables".to_string()),
        style: ChartStyle::default(),
    })
}

/// A single column of the detail table over time.
pub fn build_variable_chart(detail: &TimeSeriesTable, variable: &str) -> Result<ChartSpec> {
    if variable.is_empty() || !detail.accessor().has_column(variable) {
        return Err(DashboardError::UnknownVariable(variable.to_string()));
    }

    let line = series(detail, variable, variable, VARIABLE_COLOR)?;
    let ticks = detail
        .span()
        .map(|(first, last)| month_starts(first, last))
        .unwrap_or_default();

    Ok(ChartSpec {
        title: format!("{} Time Series", variable),
        x_field: DATETIME_COLUMN.to_string(),
        series: vec![line],
        x_axis: AxisSpec::time_axis(
            TickPlacement::Monthly { ticks },
            Some(MONTHLY_TICK_FORMAT.to_string()),
        ),
        y_axis: AxisSpec::value_axis(variable),
        legend_title: None,
        style: ChartStyle::default(),
    })
}

/// Midnight on the first of each month from `first`'s month through `last`.
pub fn month_starts(first: NaiveDateTime, last: NaiveDateTime) -> Vec<NaiveDateTime> {
    let mut ticks = Vec::new();
    let mut current = NaiveDate::from_ymd_opt(first.year(), first.month(), 1);

    while let Some(date) = current {
        let tick = date.and_time(chrono::NaiveTime::MIN);
        if tick > last {
            break;
        }
        ticks.push(tick);
        current = date.checked_add_months(chrono::Months::new(1));
    }

    ticks
}
