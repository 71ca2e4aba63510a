mod document;
mod encoder;
mod normalizer;
mod recommendation;
mod report;
mod scorer;

pub use document::{ExtractionDocument, RawRecord, RawValue};
pub use encoder::{encode_rows, ColumnMapping, EncodedTable};
pub use normalizer::{normalize_record, CellValue, NormalizedRow};
pub use recommendation::{recommend, Scenario};
pub use report::{render_csv, AnnotatedRow, ReportError};
pub use scorer::{EndpointScorer, ScoringError, ScoringGateway};

use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Result of one pipeline invocation: the annotated table, the categorical
/// code book, and the scenario the run was evaluated under.
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    pub columns: Vec<String>,
    pub rows: Vec<AnnotatedRow>,
    pub mappings: ColumnMapping,
    pub scenario: Scenario,
}

/// Feature-normalization and risk-scoring pipeline. Stateless across
/// invocations; each run derives its mappings fresh from that run's input.
#[derive(Debug)]
pub struct CongestionPipeline {
    scorer: Box<dyn ScoringGateway>,
}

impl CongestionPipeline {
    pub fn new(scorer: Box<dyn ScoringGateway>) -> Self {
        Self { scorer }
    }

    /// Runs the full pipeline over one extraction document. An empty document
    /// produces an empty outcome without touching the inference endpoint.
    pub fn run(
        &self,
        document: &ExtractionDocument,
        scenario: &Scenario,
    ) -> Result<PredictionOutcome, PipelineError> {
        let normalized: Vec<NormalizedRow> =
            document.pages.iter().map(normalize_record).collect();
        let (table, mappings) = encode_rows(&normalized);

        let risks = if table.is_empty() {
            Vec::new()
        } else {
            scorer::score_table(self.scorer.as_ref(), &table)?
        };

        let rows = report::assemble(&table, &risks, scenario)?;
        info!(
            rows = rows.len(),
            scenario = %scenario,
            "congestion pipeline complete"
        );

        Ok(PredictionOutcome {
            columns: table.into_columns(),
            rows,
            mappings,
            scenario: scenario.clone(),
        })
    }
}
