//! HTTP like repository

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::instrument;

use forum_common::SyncConfig;
use forum_core::traits::{DeleteOutcome, InsertOutcome, LikeRepository, RepoResult};
use forum_core::{Actor, DomainError, LikeRecord, PostId};

use super::{likes_url, parse_relay_url};
use crate::dto::{ActorQuery, LikeCountResponse, LikeStatusResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// [`LikeRepository`] backed by the relay's REST endpoints
#[derive(Debug, Clone)]
pub struct HttpLikeRepository {
    client: Client,
    base_url: Url,
}

impl HttpLikeRepository {
    pub fn new(base_url: &str) -> RepoResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DomainError::Internal(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: parse_relay_url(base_url)?,
        })
    }

    /// Build from `RELAY_URL`
    pub fn from_config(config: &SyncConfig) -> RepoResult<Self> {
        let relay_url = config
            .relay_url
            .as_deref()
            .ok_or_else(|| DomainError::Internal("relay url is not configured".to_string()))?;
        Self::new(relay_url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> RepoResult<Response> {
        request.send().await.map_err(transport_error)
    }
}

#[async_trait]
impl LikeRepository for HttpLikeRepository {
    #[instrument(skip(self), fields(relay = %self.base_url))]
    async fn count(&self, post_id: &PostId) -> RepoResult<u64> {
        let url = likes_url(&self.base_url, post_id, &["count"])?;
        let response = self.send(self.client.get(url)).await?;
        let body: LikeCountResponse = read_json(response).await?;
        Ok(body.count)
    }

    #[instrument(skip(self), fields(relay = %self.base_url))]
    async fn has_liked(&self, post_id: &PostId, actor: &Actor) -> RepoResult<bool> {
        let url = likes_url(&self.base_url, post_id, &["@me"])?;
        let request = self.client.get(url).query(&ActorQuery::from_actor(actor));
        let body: LikeStatusResponse = read_json(self.send(request).await?).await?;
        Ok(body.liked)
    }

    #[instrument(skip(self), fields(relay = %self.base_url))]
    async fn insert(&self, record: &LikeRecord) -> RepoResult<InsertOutcome> {
        let url = likes_url(&self.base_url, &record.post_id, &["@me"])?;
        let request = self
            .client
            .put(url)
            .query(&ActorQuery::from_actor(&record.actor));
        let response = self.send(request).await?;

        match response.status() {
            StatusCode::CONFLICT => Ok(InsertOutcome::Duplicate),
            status if status.is_success() => Ok(InsertOutcome::Inserted),
            status => Err(status_error(status, response.text().await.unwrap_or_default())),
        }
    }

    #[instrument(skip(self), fields(relay = %self.base_url))]
    async fn delete(&self, post_id: &PostId, actor: &Actor) -> RepoResult<DeleteOutcome> {
        let url = likes_url(&self.base_url, post_id, &["@me"])?;
        let request = self.client.delete(url).query(&ActorQuery::from_actor(actor));
        let response = self.send(request).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(DeleteOutcome::NotFound),
            status if status.is_success() => Ok(DeleteOutcome::Deleted),
            status => Err(status_error(status, response.text().await.unwrap_or_default())),
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

async fn read_json<T: DeserializeOwned>(response: Response) -> RepoResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(status_error(status, response.text().await.unwrap_or_default()));
    }
    response
        .json()
        .await
        .map_err(|e| DomainError::Internal(format!("unexpected relay response: {e}")))
}

/// Network failures are transient
fn transport_error(err: reqwest::Error) -> DomainError {
    if err.is_connect() {
        DomainError::Unavailable(err.to_string())
    } else {
        DomainError::Backend(err.to_string())
    }
}

/// Map a non-success status, preferring the relay's error message
fn status_error(status: StatusCode, body: String) -> DomainError {
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);

    match status {
        StatusCode::SERVICE_UNAVAILABLE => DomainError::Unavailable(message),
        StatusCode::BAD_REQUEST => DomainError::InvalidActor(message),
        status if status.is_server_error() => DomainError::Backend(format!("{status}: {message}")),
        status => DomainError::Internal(format!("relay returned {status}: {message}")),
    }
}
