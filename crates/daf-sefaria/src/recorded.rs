//! Replaying and recording request makers backed by a fixture directory.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::endpoints::Endpoint;
use crate::error::SefariaError;
use crate::request_maker::RequestMaker;

fn recording_path(dir: &Path, endpoint: &str) -> Result<PathBuf, SefariaError> {
    Ok(dir.join(Endpoint::parse(endpoint)?.recording_file_name()))
}

/// Serves every endpoint from a JSON file previously written by
/// [`RecordingRequestMaker`].
#[derive(Debug, Clone)]
pub struct RecordedRequestMaker {
    dir: PathBuf,
}

impl RecordedRequestMaker {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl RequestMaker for RecordedRequestMaker {
    async fn make_request(&self, endpoint: &str) -> Result<Value, SefariaError> {
        let path = recording_path(&self.dir, endpoint)?;
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SefariaError::MissingRecording { endpoint: endpoint.to_string(), path });
            }
            Err(source) => return Err(SefariaError::Io { path, source }),
        };
        serde_json::from_str(&contents)
            .map_err(|source| SefariaError::Parse { endpoint: endpoint.to_string(), source })
    }
}

/// Forwards to another request maker and writes each successful response
/// to the fixture directory.
#[derive(Debug, Clone)]
pub struct RecordingRequestMaker<R> {
    inner: R,
    dir: PathBuf,
}

impl<R: RequestMaker> RecordingRequestMaker<R> {
    #[must_use]
    pub fn new(inner: R, dir: impl Into<PathBuf>) -> Self {
        Self { inner, dir: dir.into() }
    }
}

impl<R: RequestMaker> RequestMaker for RecordingRequestMaker<R> {
    async fn make_request(&self, endpoint: &str) -> Result<Value, SefariaError> {
        let path = recording_path(&self.dir, endpoint)?;
        let value = self.inner.make_request(endpoint).await?;
        let body = serde_json::to_string_pretty(&value)
            .map_err(|source| SefariaError::Parse { endpoint: endpoint.to_string(), source })?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|source| SefariaError::Io { path: path.clone(), source })?;
        tracing::debug!(%endpoint, path = %path.display(), "recorded response");
        Ok(value)
    }
}
