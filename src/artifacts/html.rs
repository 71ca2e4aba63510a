use crate::workflows::congestion::{AnnotatedRow, PredictionOutcome};
use chrono::NaiveDate;
use std::fmt::Write as _;

const ATTENDANCE_COLUMNS: [&str; 2] = ["Capacity", "Expected_Attendance"];
const POINT_COLORS: [&str; 6] = [
    "#2563eb", "#f59e0b", "#10b981", "#ef4444", "#8b5cf6", "#64748b",
];

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 440.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 50.0;

/// Self-contained interactive risk chart: an inline SVG scatter of risk
/// against expected attendance with native hover detail per point, one color
/// per recommendation.
pub(crate) fn render_interactive_chart(
    outcome: &PredictionOutcome,
    generated_on: NaiveDate,
) -> String {
    let attendance = attendance_axis(outcome);
    let max_attendance = attendance
        .iter()
        .copied()
        .fold(f64::NAN, f64::max)
        .max(1.0);
    let max_risk = outcome
        .rows
        .iter()
        .map(|row| row.congestion_risk)
        .fold(f64::NAN, f64::max)
        .max(1.0);

    let mut colors: Vec<&'static str> = Vec::new();
    let mut legend: Vec<&'static str> = Vec::new();
    for row in &outcome.rows {
        if !legend.contains(&row.recommendation) {
            legend.push(row.recommendation);
        }
    }

    for row in &outcome.rows {
        let slot = legend
            .iter()
            .position(|entry| *entry == row.recommendation)
            .unwrap_or(0);
        colors.push(POINT_COLORS[slot % POINT_COLORS.len()]);
    }

    let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    writeln!(
        page,
        "<title>Crowd Congestion Risk - Scenario: {}</title>",
        escape_html(outcome.scenario.as_str())
    )
    .expect("write title");
    page.push_str("</head>\n<body>\n");
    writeln!(
        page,
        "<h1>Crowd Congestion Risk - Scenario: {}</h1>",
        escape_html(outcome.scenario.as_str())
    )
    .expect("write heading");

    writeln!(
        page,
        "<svg width=\"{WIDTH}\" height=\"{HEIGHT}\" viewBox=\"0 0 {WIDTH} {HEIGHT}\">"
    )
    .expect("open svg");

    // axes
    writeln!(
        page,
        "<line x1=\"{MARGIN_LEFT}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#333\"/>",
        HEIGHT - MARGIN_BOTTOM,
        WIDTH - MARGIN_RIGHT,
        HEIGHT - MARGIN_BOTTOM
    )
    .expect("x axis");
    writeln!(
        page,
        "<line x1=\"{MARGIN_LEFT}\" y1=\"{MARGIN_TOP}\" x2=\"{MARGIN_LEFT}\" y2=\"{}\" stroke=\"#333\"/>",
        HEIGHT - MARGIN_BOTTOM
    )
    .expect("y axis");

    for fraction in [0.0, 0.5, 1.0] {
        let x = MARGIN_LEFT + fraction * plot_width;
        let y = MARGIN_TOP + plot_height - fraction * plot_height;
        writeln!(
            page,
            "<text x=\"{x}\" y=\"{}\" font-size=\"11\" text-anchor=\"middle\">{}</text>",
            HEIGHT - MARGIN_BOTTOM + 18.0,
            format_tick(fraction * max_attendance)
        )
        .expect("x tick");
        writeln!(
            page,
            "<text x=\"{}\" y=\"{y}\" font-size=\"11\" text-anchor=\"end\">{}</text>",
            MARGIN_LEFT - 6.0,
            format_tick(fraction * max_risk)
        )
        .expect("y tick");
    }

    writeln!(
        page,
        "<text x=\"{}\" y=\"{}\" font-size=\"13\" text-anchor=\"middle\">Expected Attendance</text>",
        MARGIN_LEFT + plot_width / 2.0,
        HEIGHT - 10.0
    )
    .expect("x label");
    writeln!(
        page,
        "<text x=\"14\" y=\"{}\" font-size=\"13\" text-anchor=\"middle\" transform=\"rotate(-90 14 {})\">Congestion Risk</text>",
        MARGIN_TOP + plot_height / 2.0,
        MARGIN_TOP + plot_height / 2.0
    )
    .expect("y label");

    for ((row, value), color) in outcome.rows.iter().zip(&attendance).zip(&colors) {
        let risk = if row.congestion_risk.is_finite() {
            row.congestion_risk
        } else {
            0.0
        };
        let cx = MARGIN_LEFT + (value / max_attendance) * plot_width;
        let cy = MARGIN_TOP + plot_height - (risk / max_risk).clamp(0.0, 1.0) * plot_height;
        let radius = 4.0 + (value / max_attendance) * 8.0;
        writeln!(
            page,
            "<circle cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"{radius:.1}\" fill=\"{color}\" fill-opacity=\"0.8\"><title>{}</title></circle>",
            escape_html(&hover_detail(row))
        )
        .expect("data point");
    }

    page.push_str("</svg>\n");

    page.push_str("<ul>\n");
    for (slot, recommendation) in legend.iter().enumerate() {
        writeln!(
            page,
            "<li><span style=\"color:{}\">&#9679;</span> {}</li>",
            POINT_COLORS[slot % POINT_COLORS.len()],
            escape_html(recommendation)
        )
        .expect("legend entry");
    }
    page.push_str("</ul>\n");

    writeln!(page, "<p><em>Generated {generated_on}</em></p>").expect("footer");
    page.push_str("</body>\n</html>\n");
    page
}

/// X axis values: the `Capacity` column when present, otherwise
/// `Expected_Attendance`, otherwise zeros.
fn attendance_axis(outcome: &PredictionOutcome) -> Vec<f64> {
    let column = ATTENDANCE_COLUMNS
        .iter()
        .find(|candidate| outcome.columns.iter().any(|column| column == *candidate));

    outcome
        .rows
        .iter()
        .map(|row| {
            column
                .and_then(|name| row.features.get(*name).copied().flatten())
                .unwrap_or(0.0)
        })
        .collect()
}

fn hover_detail(row: &AnnotatedRow) -> String {
    let mut detail = String::new();
    for (column, value) in &row.features {
        match value {
            Some(value) => writeln!(detail, "{column}: {value}").expect("hover line"),
            None => writeln!(detail, "{column}:").expect("hover line"),
        }
    }
    writeln!(detail, "Congestion_Risk: {}", row.congestion_risk).expect("hover risk");
    write!(detail, "Recommendation: {}", row.recommendation).expect("hover recommendation");
    detail
}

fn format_tick(value: f64) -> String {
    if value >= 100.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
