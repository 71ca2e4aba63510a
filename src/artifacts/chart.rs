use super::ArtifactError;
use crate::workflows::congestion::Scenario;
use plotters::prelude::*;
use plotters_svg::SVGBackend;

const BAR_FILL: RGBColor = RGBColor(135, 206, 235);

/// Static per-row risk bar chart, rendered to an SVG document.
pub(crate) fn render_risk_chart(
    risks: &[f64],
    scenario: &Scenario,
) -> Result<String, ArtifactError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (800, 500)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let x_max = risks.len().max(1) as f64;
        let y_max = risks.iter().copied().fold(f64::NAN, f64::max).max(1.0);

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Scenario: {scenario}"),
                ("sans-serif", 22).into_font(),
            )
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(55)
            .build_cartesian_2d(0f64..x_max, 0f64..y_max)
            .map_err(chart_error)?;

        chart
            .configure_mesh()
            .x_labels(risks.len().max(1))
            .x_label_formatter(&|x| format!("Row {}", *x as usize + 1))
            .y_desc("Congestion Risk")
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(risks.iter().enumerate().map(|(index, risk)| {
                let left = index as f64 + 0.15;
                let right = index as f64 + 0.85;
                Rectangle::new([(left, 0.0), (right, *risk)], BAR_FILL.filled())
            }))
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }
    Ok(svg)
}

fn chart_error<E: std::fmt::Display>(err: E) -> ArtifactError {
    ArtifactError::Chart(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_one_bar_per_risk_value() {
        let svg = render_risk_chart(&[0.2, 0.8], &Scenario::parse("general"))
            .expect("chart renders");
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Scenario: general"));
    }

    #[test]
    fn renders_an_empty_chart_without_panicking() {
        let svg = render_risk_chart(&[], &Scenario::parse("evacuation")).expect("chart renders");
        assert!(svg.contains("Scenario: evacuation"));
    }
}
