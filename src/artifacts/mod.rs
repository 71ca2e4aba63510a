mod chart;
mod html;

use crate::storage::{ObjectStoreError, ObjectStoreGateway};
use crate::workflows::congestion::{render_csv, PredictionOutcome, ReportError};
use chrono::Local;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error(transparent)]
    Store(#[from] ObjectStoreError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("chart rendering failed: {0}")]
    Chart(String),
}

/// Stored locations of the three artifacts of one prediction run.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactManifest {
    pub csv: String,
    pub chart: String,
    pub interactive: String,
}

/// Renders and uploads the prediction artifacts: the annotated CSV, a static
/// SVG bar chart, and an interactive HTML chart. All-or-nothing per run; the
/// first failed upload aborts publication.
#[derive(Debug, Clone)]
pub struct ArtifactPublisher {
    store: Arc<dyn ObjectStoreGateway>,
    bucket: String,
    folder: String,
}

impl ArtifactPublisher {
    pub fn new(
        store: Arc<dyn ObjectStoreGateway>,
        bucket: impl Into<String>,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            folder: folder.into(),
        }
    }

    pub fn publish(&self, outcome: &PredictionOutcome) -> Result<ArtifactManifest, ArtifactError> {
        let scenario = outcome.scenario.as_str();

        let csv_bytes = render_csv(&outcome.columns, &outcome.rows)?;
        let csv = self.store.put_object(
            &self.bucket,
            &format!("{}/prediction_{scenario}.csv", self.folder),
            &mime::TEXT_CSV,
            csv_bytes,
        )?;

        let risks: Vec<f64> = outcome
            .rows
            .iter()
            .map(|row| row.congestion_risk)
            .collect();
        let svg = chart::render_risk_chart(&risks, &outcome.scenario)?;
        let chart = self.store.put_object(
            &self.bucket,
            &format!("{}/risk_plot_{scenario}.svg", self.folder),
            &mime::IMAGE_SVG,
            svg.into_bytes(),
        )?;

        let page = html::render_interactive_chart(outcome, Local::now().date_naive());
        let interactive = self.store.put_object(
            &self.bucket,
            &format!("{}/risk_plot_{scenario}.html", self.folder),
            &mime::TEXT_HTML,
            page.into_bytes(),
        )?;

        info!(%csv, %chart, %interactive, "prediction artifacts published");

        Ok(ArtifactManifest {
            csv,
            chart,
            interactive,
        })
    }
}
