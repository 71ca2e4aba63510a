use super::encoder::EncodedTable;
use super::recommendation::{recommend, Scenario};
use indexmap::IndexMap;
use serde::Serialize;

pub const RISK_COLUMN: &str = "Congestion_Risk";
pub const SCENARIO_COLUMN: &str = "Scenario";
pub const RECOMMENDATION_COLUMN: &str = "Recommendation";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("{risks} risk value(s) cannot annotate {rows} table row(s)")]
    RiskAlignment { rows: usize, risks: usize },
    #[error("csv rendering failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer error: {0}")]
    Io(#[from] std::io::Error),
}

/// One encoded row annotated with its risk value, the run's scenario, and
/// the derived recommendation. Built once per run, never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedRow {
    pub features: IndexMap<String, Option<f64>>,
    pub congestion_risk: f64,
    pub scenario: String,
    pub recommendation: &'static str,
}

/// Zips encoded rows with risk values by position and annotates each with
/// the scenario and its recommendation. Row order is the input order.
pub fn assemble(
    table: &EncodedTable,
    risks: &[f64],
    scenario: &Scenario,
) -> Result<Vec<AnnotatedRow>, ReportError> {
    if table.row_count() != risks.len() {
        return Err(ReportError::RiskAlignment {
            rows: table.row_count(),
            risks: risks.len(),
        });
    }

    let rows = table
        .rows()
        .iter()
        .zip(risks)
        .map(|(row, risk)| AnnotatedRow {
            features: table
                .columns()
                .iter()
                .cloned()
                .zip(row.iter().copied())
                .collect(),
            congestion_risk: *risk,
            scenario: scenario.as_str().to_string(),
            recommendation: recommend(*risk, scenario),
        })
        .collect();

    Ok(rows)
}

/// Renders the annotated table as CSV: feature columns in table order, then
/// the three annotation columns. Absent cells become empty fields.
pub fn render_csv(columns: &[String], rows: &[AnnotatedRow]) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = columns.iter().map(String::as_str).collect();
    header.extend([RISK_COLUMN, SCENARIO_COLUMN, RECOMMENDATION_COLUMN]);
    writer.write_record(&header)?;

    for row in rows {
        let mut record: Vec<String> = columns
            .iter()
            .map(|column| match row.features.get(column) {
                Some(Some(value)) => value.to_string(),
                _ => String::new(),
            })
            .collect();
        record.push(row.congestion_risk.to_string());
        record.push(row.scenario.clone());
        record.push(row.recommendation.to_string());
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|err| ReportError::Io(err.into_error()))
}
