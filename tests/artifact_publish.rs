use crowd_risk::artifacts::{ArtifactError, ArtifactPublisher};
use crowd_risk::storage::{ObjectStoreError, ObjectStoreGateway};
use crowd_risk::workflows::congestion::{
    CongestionPipeline, ExtractionDocument, PredictionOutcome, Scenario, ScoringError,
    ScoringGateway,
};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct StoredObject {
    bucket: String,
    key: String,
    content_type: String,
    body: Vec<u8>,
}

#[derive(Debug, Default)]
struct FakeObjectStore {
    objects: Mutex<Vec<StoredObject>>,
}

impl ObjectStoreGateway for FakeObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let guard = self.objects.lock().expect("object mutex");
        guard
            .iter()
            .find(|object| object.bucket == bucket && object.key == key)
            .map(|object| object.body.clone())
            .ok_or_else(|| ObjectStoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &mime::Mime,
        body: Vec<u8>,
    ) -> Result<String, ObjectStoreError> {
        let mut guard = self.objects.lock().expect("object mutex");
        guard.push(StoredObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: content_type.to_string(),
            body,
        });
        Ok(format!("s3://{bucket}/{key}"))
    }
}

#[derive(Debug)]
struct FailingStore;

impl ObjectStoreGateway for FailingStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        Err(ObjectStoreError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    fn put_object(
        &self,
        _bucket: &str,
        _key: &str,
        _content_type: &mime::Mime,
        _body: Vec<u8>,
    ) -> Result<String, ObjectStoreError> {
        Err(ObjectStoreError::Backend("storage offline".to_string()))
    }
}

#[derive(Debug)]
struct CannedScorer(&'static str);

impl ScoringGateway for CannedScorer {
    fn invoke(&self, _payload: &str) -> Result<String, ScoringError> {
        Ok(self.0.to_string())
    }
}

fn evacuation_outcome() -> PredictionOutcome {
    let document = ExtractionDocument::from_slice(
        br#"{"pages":[
            {"Weather Severity":"Mild rain","Zone":"north","Capacity":1200},
            {"Weather Severity":"Severe storm","Zone":"south","Capacity":800}
        ]}"#,
    )
    .expect("document parses");

    CongestionPipeline::new(Box::new(CannedScorer("0.42\n0.87\n")))
        .run(&document, &Scenario::parse("evacuation"))
        .expect("pipeline runs")
}

#[test]
fn publishes_csv_chart_and_interactive_artifacts() {
    let store = Arc::new(FakeObjectStore::default());
    let publisher = ArtifactPublisher::new(store.clone(), "events", "predictions");

    let manifest = publisher
        .publish(&evacuation_outcome())
        .expect("artifacts publish");

    assert_eq!(
        manifest.csv,
        "s3://events/predictions/prediction_evacuation.csv"
    );
    assert_eq!(
        manifest.chart,
        "s3://events/predictions/risk_plot_evacuation.svg"
    );
    assert_eq!(
        manifest.interactive,
        "s3://events/predictions/risk_plot_evacuation.html"
    );

    let objects = store.objects.lock().expect("object mutex");
    assert_eq!(objects.len(), 3);
    assert!(objects.iter().all(|object| object.bucket == "events"));

    let content_types: Vec<&str> = objects
        .iter()
        .map(|object| object.content_type.as_str())
        .collect();
    assert_eq!(content_types, ["text/csv", "image/svg+xml", "text/html"]);
}

#[test]
fn published_csv_contains_the_annotated_table() {
    let store = Arc::new(FakeObjectStore::default());
    let publisher = ArtifactPublisher::new(store.clone(), "events", "predictions");

    publisher
        .publish(&evacuation_outcome())
        .expect("artifacts publish");

    let csv = store
        .get_object("events", "predictions/prediction_evacuation.csv")
        .expect("csv stored");
    let text = String::from_utf8(csv).expect("utf8 csv");
    let mut lines = text.lines();

    assert_eq!(
        lines.next(),
        Some("Weather Severity,Zone,Capacity,Day_Hour,Weather_Score,Congestion_Risk,Scenario,Recommendation")
    );
    assert_eq!(
        lines.next(),
        Some("0,0,1200,18,0.5,0.42,evacuation,Activate emergency exits and guides")
    );
    assert_eq!(
        lines.next(),
        Some("1,1,800,18,1,0.87,evacuation,Activate emergency exits and guides")
    );
}

#[test]
fn published_charts_reflect_the_scenario_and_rows() {
    let store = Arc::new(FakeObjectStore::default());
    let publisher = ArtifactPublisher::new(store.clone(), "events", "predictions");

    publisher
        .publish(&evacuation_outcome())
        .expect("artifacts publish");

    let svg = store
        .get_object("events", "predictions/risk_plot_evacuation.svg")
        .expect("svg stored");
    let svg = String::from_utf8(svg).expect("utf8 svg");
    assert!(svg.contains("Scenario: evacuation"));

    let html = store
        .get_object("events", "predictions/risk_plot_evacuation.html")
        .expect("html stored");
    let html = String::from_utf8(html).expect("utf8 html");
    assert_eq!(html.matches("<circle").count(), 2);
    assert!(html.contains("Activate emergency exits and guides"));
}

#[test]
fn first_failed_upload_aborts_publication() {
    let publisher = ArtifactPublisher::new(Arc::new(FailingStore), "events", "predictions");

    let err = publisher
        .publish(&evacuation_outcome())
        .expect_err("publish fails");

    match err {
        ArtifactError::Store(ObjectStoreError::Backend(detail)) => {
            assert_eq!(detail, "storage offline");
        }
        other => panic!("expected store error, got {other:?}"),
    }
}
