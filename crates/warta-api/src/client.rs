//! The REST client
//!
//! Owns the HTTP connection pool, the configuration, and the token store.
//! Endpoint groups live in sibling modules (`messaging`, `news`); this file
//! is the plumbing — URL building, bearer auth, the 429 retry loop, and
//! response decoding — plus the session operations.

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::token::TokenStore;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use warta_core::{ErrorBody, LoginRequest, LoginResponse, RegisterRequest, User};

/// Where the app shell should land on startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// No persisted session: show the login stack
    Login,
    /// A token is persisted: show the authenticated tab stack
    Main,
}

/// REST client for the backend
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client from configuration and a token store
    ///
    /// # Errors
    /// `ApiError::Transport` if the underlying HTTP client cannot be built.
    pub fn new(config: ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            config,
            tokens,
        })
    }

    /// Client configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    // Session operations

    /// Authenticate and persist the returned bearer token
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.post_json("/login", &request).await?;
        self.tokens.save(&response.access_token)?;
        tracing::info!(user = %response.user.email, "logged in");
        Ok(response.user)
    }

    /// Create an account; does not log in
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        let _: Value = self.post_json("/register", request).await?;
        Ok(())
    }

    /// Drop the persisted session
    ///
    /// The backend has no live logout endpoint; clearing the token is the
    /// whole operation, as in the source app.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.tokens.clear()
    }

    /// Resolve the authenticated account (`GET /user`).
    ///
    /// The single authoritative source of the caller's own identity;
    /// route-supplied identities are never trusted.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get_json_auth("/user").await
    }

    /// Initial navigation route, decided once at app start from token presence
    #[must_use]
    pub fn initial_route(&self) -> Route {
        match self.tokens.load() {
            Ok(Some(_)) => Route::Main,
            _ => Route::Login,
        }
    }

    // Plumbing, shared with the endpoint modules

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    pub(crate) fn bearer_token(&self) -> Result<String, ApiError> {
        self.tokens.load()?.ok_or(ApiError::MissingToken)
    }

    /// Send a request, retrying on HTTP 429 per the configured policy.
    ///
    /// `build` recreates the request for each attempt since a sent request
    /// cannot be reused.
    pub(crate) async fn send_with_retry<F>(&self, build: F) -> Result<reqwest::Response, ApiError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            let response = build().send().await?;
            if response.status() == StatusCode::TOO_MANY_REQUESTS
                && attempt < self.config.retry.max_retries
            {
                let delay = self.config.retry.delay_for(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max = self.config.retry.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }
            return Ok(response);
        }
    }

    /// Decode a response, turning non-success statuses into `ApiError::Status`
    pub(crate) async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await?;
            serde_json::from_slice(&bytes).map_err(|e| ApiError::MalformedPayload(e.to_string()))
        } else {
            let body: ErrorBody = response.json().await.unwrap_or_default();
            Err(ApiError::Status {
                status,
                message: body.message,
            })
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self.send_with_retry(|| self.http.get(&url)).await?;
        Self::decode(response).await
    }

    pub(crate) async fn get_json_auth<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let token = self.bearer_token()?;
        let response = self
            .send_with_retry(|| self.http.get(&url).bearer_auth(&token))
            .await?;
        Self::decode(response).await
    }

    pub(crate) async fn get_json_auth_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let token = self.bearer_token()?;
        let response = self
            .send_with_retry(|| self.http.get(&url).bearer_auth(&token).query(query))
            .await?;
        Self::decode(response).await
    }

    pub(crate) async fn get_json_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self
            .send_with_retry(|| self.http.get(&url).query(query))
            .await?;
        Self::decode(response).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self
            .send_with_retry(|| self.http.post(&url).json(body))
            .await?;
        Self::decode(response).await
    }

    pub(crate) async fn post_json_auth<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let token = self.bearer_token()?;
        let response = self
            .send_with_retry(|| self.http.post(&url).bearer_auth(&token).json(body))
            .await?;
        Self::decode(response).await
    }
}
