use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use super::{FavoriteError, FavoriteStore};
use crate::models::Viewer;

/// Header carrying the viewer identity
pub const VIEWER_HEADER: &str = "x-viewer-id";
/// Header echoing the CSRF cookie on mutating requests
pub const CSRF_HEADER: &str = "x-csrf-token";
pub const CSRF_COOKIE: &str = "csrf_token";

/// Remote save/unsave endpoints as seen by a client
#[async_trait]
pub trait FavoriteApi: Send + Sync {
    async fn is_saved(&self, viewer: &Viewer, location_id: &str) -> Result<bool, FavoriteError>;

    async fn save(&self, viewer: &Viewer, location_id: &str) -> Result<(), FavoriteError>;

    async fn unsave(&self, viewer: &Viewer, location_id: &str) -> Result<(), FavoriteError>;
}

/// In-process access, used when client and store share a process
#[async_trait]
impl FavoriteApi for FavoriteStore {
    async fn is_saved(&self, viewer: &Viewer, location_id: &str) -> Result<bool, FavoriteError> {
        Ok(FavoriteStore::is_saved(self, viewer, location_id).await)
    }

    async fn save(&self, viewer: &Viewer, location_id: &str) -> Result<(), FavoriteError> {
        FavoriteStore::save(self, viewer, location_id).await;
        Ok(())
    }

    async fn unsave(&self, viewer: &Viewer, location_id: &str) -> Result<(), FavoriteError> {
        FavoriteStore::unsave(self, viewer, location_id).await;
        Ok(())
    }
}

#[derive(Deserialize)]
struct SavedBody {
    saved: bool,
}

#[derive(Deserialize)]
struct TokenBody {
    token: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// [`FavoriteApi`] over the marketplace HTTP API
pub struct HttpFavoriteApi {
    client: Client,
    base_url: String,
    csrf_token: Mutex<Option<String>>,
}

impl HttpFavoriteApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("location-market/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            csrf_token: Mutex::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch the CSRF token once and reuse it for later mutations.
    async fn csrf_token(&self) -> Result<String, FavoriteError> {
        let mut cached = self.csrf_token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let response = self.client.get(self.url("/api/csrf-token")).send().await?;
        let body: TokenBody = check(response).await?.json().await?;
        debug!("Fetched CSRF token");
        *cached = Some(body.token.clone());
        Ok(body.token)
    }

    async fn mutate(&self, method: Method, viewer: &Viewer, location_id: &str) -> Result<(), FavoriteError> {
        let token = self.csrf_token().await?;
        let response = self
            .client
            .request(method, self.url(&format!("/api/locations/{location_id}/save")))
            .header(VIEWER_HEADER, &viewer.id)
            .header(CSRF_HEADER, &token)
            .header(reqwest::header::COOKIE, format!("{CSRF_COOKIE}={token}"))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

/// Map non-success responses to [`FavoriteError::Rejected`] with the server's message.
async fn check(response: Response) -> Result<Response, FavoriteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_default();
    Err(FavoriteError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl FavoriteApi for HttpFavoriteApi {
    async fn is_saved(&self, viewer: &Viewer, location_id: &str) -> Result<bool, FavoriteError> {
        let response = self
            .client
            .get(self.url(&format!("/api/locations/{location_id}/saved")))
            .header(VIEWER_HEADER, &viewer.id)
            .send()
            .await?;
        let body: SavedBody = check(response).await?.json().await?;
        Ok(body.saved)
    }

    async fn save(&self, viewer: &Viewer, location_id: &str) -> Result<(), FavoriteError> {
        self.mutate(Method::POST, viewer, location_id).await
    }

    async fn unsave(&self, viewer: &Viewer, location_id: &str) -> Result<(), FavoriteError> {
        self.mutate(Method::DELETE, viewer, location_id).await
    }
}
