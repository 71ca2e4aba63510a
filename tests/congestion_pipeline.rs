use crowd_risk::workflows::congestion::{
    CongestionPipeline, ExtractionDocument, PipelineError, Scenario, ScoringError, ScoringGateway,
};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct CannedScorer {
    response: &'static str,
    payloads: Arc<Mutex<Vec<String>>>,
}

impl CannedScorer {
    fn new(response: &'static str) -> Self {
        Self {
            response,
            payloads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn recording(response: &'static str, payloads: Arc<Mutex<Vec<String>>>) -> Self {
        Self { response, payloads }
    }
}

impl ScoringGateway for CannedScorer {
    fn invoke(&self, payload: &str) -> Result<String, ScoringError> {
        let mut guard = self.payloads.lock().expect("payload mutex");
        guard.push(payload.to_string());
        Ok(self.response.to_string())
    }
}

fn document(json: &str) -> ExtractionDocument {
    ExtractionDocument::from_slice(json.as_bytes()).expect("document parses")
}

fn two_page_document() -> ExtractionDocument {
    document(
        r#"{"pages":[
            {"Weather Severity":"Mild rain","Zone":"north"},
            {"Weather Severity":"Severe storm","Zone":"south"}
        ]}"#,
    )
}

#[test]
fn evacuation_run_annotates_both_pages() {
    let document = two_page_document();
    let pipeline = CongestionPipeline::new(Box::new(CannedScorer::new("0.42\n0.87\n")));

    let outcome = pipeline
        .run(&document, &Scenario::parse("Evacuation"))
        .expect("pipeline runs");

    assert_eq!(
        outcome.columns,
        ["Weather Severity", "Zone", "Day_Hour", "Weather_Score"]
    );

    assert_eq!(outcome.rows.len(), 2);
    let weather_scores: Vec<Option<f64>> = outcome
        .rows
        .iter()
        .map(|row| row.features.get("Weather_Score").copied().flatten())
        .collect();
    assert_eq!(weather_scores, [Some(0.5), Some(1.0)]);

    let zone = outcome.mappings.get("Zone").expect("Zone mapping");
    assert_eq!(zone.get("north"), Some(&0));
    assert_eq!(zone.get("south"), Some(&1));

    assert_eq!(outcome.rows[0].congestion_risk, 0.42);
    assert_eq!(outcome.rows[1].congestion_risk, 0.87);
    for row in &outcome.rows {
        assert_eq!(row.scenario, "evacuation");
        assert_eq!(row.recommendation, "Activate emergency exits and guides");
    }
}

#[test]
fn scorer_receives_row_major_csv_in_column_order() {
    let document = two_page_document();
    let payloads = Arc::new(Mutex::new(Vec::new()));
    let scorer = CannedScorer::recording("0.1\n0.2\n", payloads.clone());
    let pipeline = CongestionPipeline::new(Box::new(scorer));

    pipeline
        .run(&document, &Scenario::parse("general"))
        .expect("pipeline runs");

    // Weather Severity codes: "Mild rain"=0, "Severe storm"=1; Zone: north=0, south=1.
    let sent = payloads.lock().expect("payload mutex");
    assert_eq!(sent.as_slice(), ["0,0,18,0.5\n1,1,18,1\n"]);
}

#[test]
fn composite_fields_degrade_without_failing_the_run() {
    let document = document(
        r#"{"pages":[{"Severity":"Level: 3.2","Queue":"Depth: deep","Capacity":1200}]}"#,
    );
    let pipeline = CongestionPipeline::new(Box::new(CannedScorer::new("0.5\n")));

    let outcome = pipeline
        .run(&document, &Scenario::parse("mid_event"))
        .expect("pipeline runs");

    let row = &outcome.rows[0];
    assert_eq!(row.features.get("Severity").copied().flatten(), Some(3.2));
    assert_eq!(row.features.get("Queue").copied().flatten(), Some(0.0));
    assert_eq!(row.features.get("Capacity").copied().flatten(), Some(1200.0));
    assert_eq!(
        row.recommendation,
        "Redirect crowd to food/restroom areas"
    );
}

#[test]
fn short_risk_vector_fails_instead_of_truncating() {
    let document = document(
        r#"{"pages":[{"Zone":"a"},{"Zone":"b"},{"Zone":"c"}]}"#,
    );
    let pipeline = CongestionPipeline::new(Box::new(CannedScorer::new("0.1\n0.2\n")));

    let err = pipeline
        .run(&document, &Scenario::parse("general"))
        .expect_err("mismatch fails");

    match err {
        PipelineError::Scoring(ScoringError::LengthMismatch { expected, received }) => {
            assert_eq!(expected, 3);
            assert_eq!(received, 2);
        }
        other => panic!("expected LengthMismatch, got {other:?}"),
    }
}

#[test]
fn unparsable_score_token_reports_its_row() {
    let document = document(r#"{"pages":[{"Zone":"a"},{"Zone":"b"}]}"#);
    let pipeline = CongestionPipeline::new(Box::new(CannedScorer::new("0.1\nnot-a-float\n")));

    let err = pipeline
        .run(&document, &Scenario::parse("general"))
        .expect_err("bad token fails");

    match err {
        PipelineError::Scoring(ScoringError::InvalidScore { row, token }) => {
            assert_eq!(row, 1);
            assert_eq!(token, "not-a-float");
        }
        other => panic!("expected InvalidScore, got {other:?}"),
    }
}

#[test]
fn empty_document_skips_the_scorer() {
    #[derive(Debug)]
    struct PanickingScorer;

    impl ScoringGateway for PanickingScorer {
        fn invoke(&self, _payload: &str) -> Result<String, ScoringError> {
            panic!("scorer must not be invoked for an empty document");
        }
    }

    let pipeline = CongestionPipeline::new(Box::new(PanickingScorer));
    let outcome = pipeline
        .run(&document("{}"), &Scenario::parse("general"))
        .expect("empty run succeeds");

    assert!(outcome.rows.is_empty());
    assert!(outcome.columns.is_empty());
    assert!(outcome.mappings.is_empty());
}

#[test]
fn reruns_on_identical_input_yield_identical_mappings() {
    let document = document(
        r#"{"pages":[{"Zone":"west"},{"Zone":"east"},{"Zone":"north"},{"Zone":"east"}]}"#,
    );

    let first = CongestionPipeline::new(Box::new(CannedScorer::new("0.1\n0.2\n0.3\n0.4\n")))
        .run(&document, &Scenario::parse("general"))
        .expect("first run");
    let second = CongestionPipeline::new(Box::new(CannedScorer::new("0.1\n0.2\n0.3\n0.4\n")))
        .run(&document, &Scenario::parse("general"))
        .expect("second run");

    assert_eq!(first.mappings, second.mappings);
    assert_eq!(first.columns, second.columns);
}
