use log::{debug, warn};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::error::ApiError;
use crate::resources::{AttendanceApi, AuthApi, DevicesApi, UsersApi};
use crate::session::SessionStore;

/// HTTP client for the attendance backend.
///
/// Every outgoing request picks up the bearer credential from the injected
/// [`SessionStore`] when one is present; requests without a stored token go
/// out unauthenticated (login is the only endpoint that needs this).
/// Timeouts are handled by the underlying `reqwest` client; no retry policy
/// lives here.
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self, ApiError> {
        Url::parse(base_url)?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Builds a client from the process [`common::config::Config`].
    pub fn from_config(session: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let config = common::config::Config::get();
        Self::new(
            &config.api_base_url,
            Duration::from_secs(config.http_timeout_seconds),
            session,
        )
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    pub fn devices(&self) -> DevicesApi<'_> {
        DevicesApi::new(self)
    }

    pub fn attendance(&self) -> AttendanceApi<'_> {
        AttendanceApi::new(self)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, ApiError> {
        let response = self.dispatch(Method::GET, path, query, None).await?;
        Self::decode(response).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        let response = self.dispatch(Method::POST, path, &[], Some(&body)).await?;
        Self::decode(response).await
    }

    /// POST with no request body (token regeneration).
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.dispatch(Method::POST, path, &[], None).await?;
        Self::decode(response).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        let response = self.dispatch(Method::PUT, path, &[], Some(&body)).await?;
        Self::decode(response).await
    }

    /// DELETE, discarding whatever body the server returns.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.dispatch(Method::DELETE, path, &[], None).await?;
        Ok(())
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        debug!("{} {}", method, path);

        let response = request.send().await.map_err(|e| {
            warn!("{} {} transport failure: {}", method, path, e);
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body_text = response.text().await.unwrap_or_default();
            let message = extract_server_message(&body_text);
            warn!("{} {} -> {}", method, path, status);
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
                message,
            });
        }
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let message = extract_server_message(&body_text)
                .unwrap_or_else(|| format!("HTTP {}", status));
            warn!("{} {} -> {}: {}", method, path, status, message);
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("{} {} -> {}", method, path, status);
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Pulls the human-readable `message` field out of an error body shaped like
/// `{"success": false, "message": "..."}`, when the server supplied one.
fn extract_server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(|m| m.to_string())
}
