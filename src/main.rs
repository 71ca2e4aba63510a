use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use crowd_risk::artifacts::{ArtifactManifest, ArtifactPublisher};
use crowd_risk::config::AppConfig;
use crowd_risk::error::AppError;
use crowd_risk::storage::{HttpObjectStore, ObjectStoreGateway};
use crowd_risk::telemetry;
use crowd_risk::workflows::congestion::{
    render_csv, ColumnMapping, CongestionPipeline, EndpointScorer, ExtractionDocument,
    PipelineError, PredictionOutcome, Scenario,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
    store: Arc<dyn ObjectStoreGateway>,
    pipeline: Arc<CongestionPipeline>,
    publisher: Arc<ArtifactPublisher>,
}

#[derive(Parser, Debug)]
#[command(
    name = "Crowd Congestion Scorer",
    about = "Score crowd congestion risk from document-extraction output and publish prediction artifacts",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run the scoring pipeline against a local extraction JSON file
    Predict(PredictArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Path of the extraction JSON file
    #[arg(long)]
    input: PathBuf,
    /// Scenario name (general, entry_rush, mid_event, evacuation)
    #[arg(long, default_value = "general")]
    scenario: String,
    /// Override the configured inference endpoint URL
    #[arg(long)]
    endpoint_url: Option<String>,
    /// Also write the annotated CSV to this path
    #[arg(long)]
    csv_out: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct PredictRequest {
    input_bucket: String,
    input_key: String,
    #[serde(default)]
    scenario: Option<String>,
}

#[derive(Debug, Serialize)]
struct PredictResponse {
    message: &'static str,
    scenario: String,
    row_count: usize,
    artifacts: ArtifactManifest,
    mappings: ColumnMapping,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        // the pipeline and its HTTP clients are blocking; keep them off the
        // async worker threads
        Command::Predict(args) => tokio::task::spawn_blocking(move || run_predict(args)).await?,
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let endpoint_url = config.scoring.require_endpoint_url()?.to_string();
    let storage_base_url = config.artifacts.require_storage_base_url()?.to_string();

    let store: Arc<dyn ObjectStoreGateway> = Arc::new(HttpObjectStore::new(storage_base_url));
    let pipeline = Arc::new(CongestionPipeline::new(Box::new(EndpointScorer::new(
        endpoint_url,
    ))));
    let publisher = Arc::new(ArtifactPublisher::new(
        store.clone(),
        config.artifacts.output_bucket.clone(),
        config.artifacts.output_folder.clone(),
    ));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
        store,
        pipeline,
        publisher,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/congestion/predict", post(predict_endpoint))
        .layer(prometheus_layer)
        .with_state(state);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "congestion scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let PredictArgs {
        input,
        scenario,
        endpoint_url,
        csv_out,
    } = args;

    let config = AppConfig::load()?;
    let endpoint_url = match endpoint_url {
        Some(url) => url,
        None => config.scoring.require_endpoint_url()?.to_string(),
    };

    let bytes = std::fs::read(&input)?;
    let document = ExtractionDocument::from_slice(&bytes)?;
    let scenario = Scenario::parse(&scenario);

    let pipeline = CongestionPipeline::new(Box::new(EndpointScorer::new(endpoint_url)));
    let outcome = pipeline.run(&document, &scenario)?;

    if let Some(path) = csv_out {
        let csv = render_csv(&outcome.columns, &outcome.rows).map_err(PipelineError::Report)?;
        std::fs::write(&path, csv)?;
        println!("Annotated CSV written to {}", path.display());
    }

    render_prediction(&outcome);
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn predict_endpoint(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, AppError> {
    let PredictRequest {
        input_bucket,
        input_key,
        scenario,
    } = request;
    let scenario = Scenario::parse(scenario.as_deref().unwrap_or("general"));

    let worker = state.clone();
    let (outcome, artifacts) = tokio::task::spawn_blocking(move || -> Result<_, AppError> {
        let bytes = worker.store.get_object(&input_bucket, &input_key)?;
        let document = ExtractionDocument::from_slice(&bytes)?;
        let outcome = worker.pipeline.run(&document, &scenario)?;
        let artifacts = worker.publisher.publish(&outcome)?;
        Ok((outcome, artifacts))
    })
    .await??;

    Ok(Json(PredictResponse {
        message: "Prediction completed successfully",
        scenario: outcome.scenario.to_string(),
        row_count: outcome.rows.len(),
        artifacts,
        mappings: outcome.mappings,
    }))
}

fn render_prediction(outcome: &PredictionOutcome) {
    println!("Crowd congestion prediction");
    println!(
        "Scenario: {} ({} row{})",
        outcome.scenario,
        outcome.rows.len(),
        if outcome.rows.len() == 1 { "" } else { "s" }
    );

    if outcome.rows.is_empty() {
        println!("\nNo pages in the input document; nothing was scored.");
        return;
    }

    println!("\nPer-row risk");
    for (index, row) in outcome.rows.iter().enumerate() {
        println!(
            "- Row {} | risk {:.3} | {}",
            index + 1,
            row.congestion_risk,
            row.recommendation
        );
    }

    if outcome.mappings.is_empty() {
        println!("\nCategorical mappings: none");
    } else {
        println!("\nCategorical mappings");
        for (column, codes) in &outcome.mappings {
            let rendered: Vec<String> = codes
                .iter()
                .map(|(label, code)| format!("{label}={code}"))
                .collect();
            println!("- {}: {}", column, rendered.join(", "));
        }
    }
}
