use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::fmt::Debug;

#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreError {
    #[error("object store request failed: {0}")]
    Backend(String),
    #[error("object {bucket}/{key} not found")]
    NotFound { bucket: String, key: String },
}

/// Object storage seam: fetch extraction documents, persist artifacts.
/// `put_object` returns the stored object's URI.
pub trait ObjectStoreGateway: Debug + Send + Sync {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError>;

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &mime::Mime,
        body: Vec<u8>,
    ) -> Result<String, ObjectStoreError>;
}

/// S3-style path addressing over plain HTTP (`{base}/{bucket}/{key}`).
/// Auth and retry policy live outside this client.
#[derive(Debug)]
pub struct HttpObjectStore {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::blocking::Client::new(),
            base_url,
        }
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{}/{}", self.base_url, bucket, key)
    }
}

impl ObjectStoreGateway for HttpObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let response = self
            .client
            .get(self.object_url(bucket, key))
            .send()
            .map_err(|err| ObjectStoreError::Backend(err.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ObjectStoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }

        let response = response
            .error_for_status()
            .map_err(|err| ObjectStoreError::Backend(err.to_string()))?;

        response
            .bytes()
            .map(|bytes| bytes.to_vec())
            .map_err(|err| ObjectStoreError::Backend(err.to_string()))
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &mime::Mime,
        body: Vec<u8>,
    ) -> Result<String, ObjectStoreError> {
        self.client
            .put(self.object_url(bucket, key))
            .header(CONTENT_TYPE, content_type.as_ref())
            .body(body)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| ObjectStoreError::Backend(err.to_string()))?;

        Ok(format!("s3://{bucket}/{key}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_urls_join_without_duplicate_slashes() {
        let store = HttpObjectStore::new("http://storage.local/");
        assert_eq!(
            store.object_url("events", "predictions/run.csv"),
            "http://storage.local/events/predictions/run.csv"
        );
    }
}
