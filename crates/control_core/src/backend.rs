use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    error::BackendError,
    protocol::{
        ControlRequest, ControlResponse, CurrentPlaybackResponse, PredictRequest,
        PredictResponse, StatusResponse, CONTROL_PATH, CURRENT_PATH, PREDICT_PATH, STATUS_PATH,
    },
};
use tracing::debug;
use url::Url;

/// The four backend endpoints the bridge consumes.
#[async_trait]
pub trait PlaybackBackend: Send + Sync {
    async fn status(&self) -> Result<StatusResponse, BackendError>;
    async fn current_playback(&self) -> Result<CurrentPlaybackResponse, BackendError>;
    async fn control(&self, request: &ControlRequest) -> Result<ControlResponse, BackendError>;
    async fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, BackendError>;
}

pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, BackendError> {
        let parsed = parse_backend_url(base_url)?;
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(transport)?;

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl PlaybackBackend for HttpBackend {
    async fn status(&self) -> Result<StatusResponse, BackendError> {
        let res = self
            .http
            .get(self.endpoint(STATUS_PATH))
            .send()
            .await
            .map_err(transport)?;
        decode(res).await
    }

    async fn current_playback(&self) -> Result<CurrentPlaybackResponse, BackendError> {
        let res = self
            .http
            .get(self.endpoint(CURRENT_PATH))
            .send()
            .await
            .map_err(transport)?;
        decode(res).await
    }

    async fn control(&self, request: &ControlRequest) -> Result<ControlResponse, BackendError> {
        debug!(action = %request.action, delta = ?request.delta, "sending control request");
        let res = self
            .http
            .post(self.endpoint(CONTROL_PATH))
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        decode(res).await
    }

    async fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, BackendError> {
        let res = self
            .http
            .post(self.endpoint(PREDICT_PATH))
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        decode(res).await
    }
}

/// Accepts only absolute http(s) URLs.
pub fn parse_backend_url(base_url: &str) -> Result<Url, BackendError> {
    let parsed = Url::parse(base_url).map_err(|err| BackendError::InvalidUrl {
        url: base_url.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(BackendError::InvalidUrl {
            url: base_url.to_string(),
            reason: format!("backend must use http or https, not '{}'", parsed.scheme()),
        });
    }
    Ok(parsed)
}

fn transport(err: reqwest::Error) -> BackendError {
    BackendError::Transport(err.to_string())
}

/// The backend reports failures as JSON with non-2xx codes, so the body is
/// decoded first and the status only matters when decoding fails.
async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, BackendError> {
    let status = res.status();
    let body = res.text().await.map_err(transport)?;
    match serde_json::from_str::<T>(&body) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(BackendError::Status {
            status: status.as_u16(),
            body,
        }),
        Err(err) => Err(BackendError::Decode(err.to_string())),
    }
}
