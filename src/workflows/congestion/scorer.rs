use super::encoder::EncodedTable;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::fmt::Debug;

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("inference endpoint call failed: {0}")]
    Endpoint(String),
    #[error("score row {row}: cannot parse '{token}' as a float")]
    InvalidScore { row: usize, token: String },
    #[error("scorer returned {received} value(s) for {expected} row(s)")]
    LengthMismatch { expected: usize, received: usize },
}

/// Transport seam for the external inference service. Takes the row-major
/// CSV payload, returns the raw response body; the pipeline owns both the
/// serialization and the decoding around it.
pub trait ScoringGateway: Debug + Send + Sync {
    fn invoke(&self, payload: &str) -> Result<String, ScoringError>;
}

/// Scores an encoded table: serialize, invoke, decode, and verify that the
/// service returned exactly one risk value per row.
pub fn score_table(
    gateway: &dyn ScoringGateway,
    table: &EncodedTable,
) -> Result<Vec<f64>, ScoringError> {
    let payload = serialize_rows(table);
    let response = gateway.invoke(&payload)?;
    let risks = parse_risk_vector(&response)?;

    if risks.len() != table.row_count() {
        return Err(ScoringError::LengthMismatch {
            expected: table.row_count(),
            received: risks.len(),
        });
    }

    Ok(risks)
}

/// Row-major CSV without a header. The service has no column names, so the
/// encoding column order is preserved verbatim; absent cells render empty.
pub(crate) fn serialize_rows(table: &EncodedTable) -> String {
    let mut body = String::new();
    for row in table.rows() {
        let line = row
            .iter()
            .map(|cell| match cell {
                Some(value) => value.to_string(),
                None => String::new(),
            })
            .collect::<Vec<_>>()
            .join(",");
        body.push_str(&line);
        body.push('\n');
    }
    body
}

/// Decodes a newline-delimited float response, one risk value per row.
pub(crate) fn parse_risk_vector(raw: &str) -> Result<Vec<f64>, ScoringError> {
    raw.trim()
        .lines()
        .enumerate()
        .map(|(row, token)| {
            let token = token.trim();
            token
                .parse::<f64>()
                .map_err(|_| ScoringError::InvalidScore {
                    row,
                    token: token.to_string(),
                })
        })
        .collect()
}

/// Blocking HTTP client for the inference endpoint. One synchronous request
/// per pipeline invocation; retries, auth, and timeouts are the deployment's
/// concern, not this client's.
#[derive(Debug)]
pub struct EndpointScorer {
    client: reqwest::blocking::Client,
    endpoint_url: String,
}

impl EndpointScorer {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            endpoint_url: endpoint_url.into(),
        }
    }
}

impl ScoringGateway for EndpointScorer {
    fn invoke(&self, payload: &str) -> Result<String, ScoringError> {
        let response = self
            .client
            .post(&self.endpoint_url)
            .header(CONTENT_TYPE, mime::TEXT_CSV.as_ref())
            .header(ACCEPT, mime::TEXT_CSV.as_ref())
            .body(payload.to_string())
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| ScoringError::Endpoint(err.to_string()))?;

        response
            .text()
            .map_err(|err| ScoringError::Endpoint(err.to_string()))
    }
}
