use chrono::NaiveDateTime;
use plotly::common::{Font, Line, Mode, TickMode, Title};
use plotly::layout::{Axis, Legend, TicksDirection};
use plotly::{Layout, Plot, Scatter};
use tracing::trace;

use crate::chart::{AxisSpec, ChartSpec, TickPlacement};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

fn axis(spec: &AxisSpec) -> Axis {
    let mut axis = Axis::new()
        .title(Title::with_text(spec.title.as_str()))
        .show_grid(spec.show_grid)
        .show_line(spec.show_line);

    if spec.ticks_outside {
        axis = axis.ticks(TicksDirection::Outside);
    }
    if let Some(angle) = spec.tick_angle {
        axis = axis.tick_angle(angle);
    }
    if let Some(format) = &spec.tick_format {
        axis = axis.tick_format(format.as_str());
    }

    match &spec.tick_placement {
        TickPlacement::Auto => axis,
        TickPlacement::Linear => axis.tick_mode(TickMode::Linear),
        TickPlacement::Monthly { ticks } => {
            // Date axes take tick positions as epoch milliseconds
            let values = ticks
                .iter()
                .map(|tick| tick.and_utc().timestamp_millis() as f64)
                .collect();
            let labels = ticks
                .iter()
                .map(|tick| tick.format(spec.tick_format.as_deref().unwrap_or("%Y-%m-%d")).to_string())
                .collect();
            axis.tick_mode(TickMode::Array)
                .tick_values(values)
                .tick_text(labels)
        }
    }
}

/// Renders a chart as an embeddable plotly.js fragment: a `<div>` with the
/// given id plus the script that draws into it. The page must load plotly.js.
pub fn render(spec: &ChartSpec, div_id: &str) -> String {
    let mut plot = Plot::new();

    for series in &spec.series {
        let x: Vec<String> = series.x.iter().map(format_timestamp).collect();
        let trace = Scatter::new(x, series.y.clone())
            .mode(Mode::Lines)
            .name(series.name.as_str())
            .line(Line::new().color(series.color.clone()));
        plot.add_trace(trace);
    }

    let mut layout = Layout::new()
        .title(Title::with_text(spec.title.as_str()))
        .plot_background_color(spec.style.background_color.clone())
        .paper_background_color(spec.style.background_color.clone())
        .font(Font::new().color(spec.style.font_color.clone()))
        .x_axis(axis(&spec.x_axis))
        .y_axis(axis(&spec.y_axis));
    if let Some(legend_title) = &spec.legend_title {
        layout = layout.legend(Legend::new().title(Title::with_text(legend_title.as_str())));
    }
    plot.set_layout(layout);

    let html = plot.to_inline_html(Some(div_id));
    trace!(div_id, bytes = html.len(), "Rendered chart");
    html
}
