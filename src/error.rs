use crate::artifacts::ArtifactError;
use crate::config::ConfigError;
use crate::storage::ObjectStoreError;
use crate::telemetry::TelemetryError;
use crate::workflows::congestion::PipelineError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Join(tokio::task::JoinError),
    Document(serde_json::Error),
    Storage(ObjectStoreError),
    Pipeline(PipelineError),
    Artifact(ArtifactError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Join(err) => write!(f, "worker task error: {}", err),
            AppError::Document(err) => write!(f, "invalid extraction document: {}", err),
            AppError::Storage(err) => write!(f, "object storage error: {}", err),
            AppError::Pipeline(err) => write!(f, "pipeline error: {}", err),
            AppError::Artifact(err) => write!(f, "artifact error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Join(err) => Some(err),
            AppError::Document(err) => Some(err),
            AppError::Storage(err) => Some(err),
            AppError::Pipeline(err) => Some(err),
            AppError::Artifact(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Document(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) | AppError::Pipeline(_) | AppError::Artifact(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Join(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Document(value)
    }
}

impl From<ObjectStoreError> for AppError {
    fn from(value: ObjectStoreError) -> Self {
        Self::Storage(value)
    }
}

impl From<PipelineError> for AppError {
    fn from(value: PipelineError) -> Self {
        Self::Pipeline(value)
    }
}

impl From<ArtifactError> for AppError {
    fn from(value: ArtifactError) -> Self {
        Self::Artifact(value)
    }
}
