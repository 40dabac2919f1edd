use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use mathiter_core::model::{AnalysisReport, Problem, UserContext};
use mathiter_core::session::{StartOutcome, SubmitOutcome, SubmitRequest};

use crate::api::wire::{AnalyzeRequest, ErrorBody, StartTestRequest, SubmitAnswerRequest};
use crate::api::{
    ANALYZE_PATH, AdaptiveTestApi, LegacyTestApi, PROBLEMS_PATH, START_PATH, SUBMIT_PATH,
};
use crate::config::ApiConfig;
use crate::error::ApiError;

/// `reqwest`-backed client for both test protocols.
///
/// One attempt per call: a failed request is reported, never retried.
#[derive(Clone)]
pub struct HttpApiClient {
    client: Client,
    config: ApiConfig,
}

impl HttpApiClient {
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the underlying client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.config.endpoint(path)?;
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        decode(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path)?;
        debug!(%url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let url = response.url().clone();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(ErrorBody::message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_owned()
            });
        warn!(%url, %status, %message, "backend rejected request");
        return Err(ApiError::HttpStatus { status, message });
    }

    serde_json::from_slice(&bytes).map_err(|err| {
        warn!(%url, error = %err, "backend sent an unreadable body");
        ApiError::Decode(err)
    })
}

#[async_trait]
impl AdaptiveTestApi for HttpApiClient {
    async fn start_test(&self, context: &UserContext) -> Result<StartOutcome, ApiError> {
        self.post_json(START_PATH, &StartTestRequest::from_context(context))
            .await
    }

    async fn submit_answer(&self, request: &SubmitRequest) -> Result<SubmitOutcome, ApiError> {
        self.post_json(SUBMIT_PATH, &SubmitAnswerRequest::from(request))
            .await
    }
}

#[async_trait]
impl LegacyTestApi for HttpApiClient {
    async fn load_problems(&self) -> Result<Vec<Problem>, ApiError> {
        self.get_json(PROBLEMS_PATH).await
    }

    async fn submit_and_analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisReport, ApiError> {
        self.post_json(ANALYZE_PATH, request).await
    }
}
