//! HTTP implementation of [`PlaygroundApi`] over the playground REST API.
//!
//! Every endpoint answers with a JSON envelope, either `{"result": ...}` or
//! `{"error": "..."}`.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::client::{ApiResult, PlaygroundApi};
use crate::api::errors::ApiError;
use crate::api::types::{
    InstanceDetails, Playground, Session, SessionConfiguration, User, UserConfiguration,
    UserUpdateConfiguration,
};
use crate::config::PlaygroundConfig;

#[derive(Debug, serde::Deserialize)]
struct Envelope<T> {
    result: Option<T>,
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let parsed = url::Url::parse(base_url).map_err(|e| ApiError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Request {
                path: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn from_config(config: &PlaygroundConfig) -> ApiResult<Self> {
        Self::new(config.base_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn call<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(event = "core.api.request_started", method = %method, path = path);

        let mut request = self
            .http
            .request(method, &url)
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout {
                    path: path.to_string(),
                }
            } else {
                ApiError::Request {
                    path: path.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                event = "core.api.request_failed",
                path = path,
                status = status.as_u16()
            );
            return Err(ApiError::Http {
                path: path.to_string(),
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let envelope: Envelope<T> = response.json().await.map_err(|e| ApiError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        if let Some(message) = envelope.error {
            return Err(ApiError::Server { message });
        }
        Ok(envelope.result)
    }

    async fn get_required<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.call::<(), T>(Method::GET, path, None)
            .await?
            .ok_or_else(|| ApiError::Decode {
                path: path.to_string(),
                message: "missing result".to_string(),
            })
    }

    async fn send_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<()> {
        self.call::<B, serde_json::Value>(method, path, body)
            .await
            .map(|_| ())
    }
}

impl PlaygroundApi for HttpClient {
    async fn list_sessions(&self) -> ApiResult<BTreeMap<String, Session>> {
        self.get_required("/sessions").await
    }

    async fn list_users(&self) -> ApiResult<BTreeMap<String, User>> {
        self.get_required("/users").await
    }

    async fn get_current_session(&self) -> ApiResult<Option<Session>> {
        self.call::<(), Session>(Method::GET, "/session", None).await
    }

    async fn create_user(&self, id: &str, conf: UserConfiguration) -> ApiResult<()> {
        self.send_unit(Method::PUT, &format!("/users/{id}"), Some(&conf))
            .await
    }

    async fn update_user(&self, id: &str, conf: UserUpdateConfiguration) -> ApiResult<()> {
        self.send_unit(Method::PATCH, &format!("/users/{id}"), Some(&conf))
            .await
    }

    async fn delete_user(&self, id: &str) -> ApiResult<()> {
        self.send_unit::<()>(Method::DELETE, &format!("/users/{id}"), None)
            .await
    }

    async fn get(&self) -> ApiResult<Playground> {
        self.get_required("/").await
    }

    async fn get_details(&self) -> ApiResult<InstanceDetails> {
        // An empty result means "no user, no instance".
        Ok(self
            .call::<(), InstanceDetails>(Method::GET, "/details", None)
            .await?
            .unwrap_or_default())
    }

    async fn create_session(&self, conf: SessionConfiguration) -> ApiResult<()> {
        self.send_unit(Method::PUT, "/session", Some(&conf)).await
    }

    async fn delete_session(&self) -> ApiResult<()> {
        self.send_unit::<()>(Method::DELETE, "/session", None).await
    }
}
