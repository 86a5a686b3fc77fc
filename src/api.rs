//! REST access.
//!
//! [`Transport`] moves one request to the backend and returns the raw status
//! and body. [`ApiClient`] adds the bearer credential and turns non-2xx
//! answers into [`ApiError::Status`]. [`ResourceClient`] is the typed
//! list/get/create/update/delete wrapper for one resource path.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::session::Session;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("request rejected with status {status}")]
    Status {
        status: u16,
        message: Option<String>,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Message supplied by the server in the error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(FilePart),
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: RequestBody,
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// reqwest-backed transport rooted at the API base URL.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("resto-admin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        };

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(file) => {
                let part = reqwest::multipart::Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)
                    .map_err(|e| ApiError::Transport(e.to_string()))?;
                builder.multipart(reqwest::multipart::Form::new().part(file.field, part))
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(ApiResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Pulls `message` out of an error body. Validation errors carry a list.
fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("message")? {
        Value::String(message) => Some(message.clone()),
        Value::Array(messages) => {
            let parts: Vec<&str> = messages.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<Session>) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Sends a request with the current bearer credential, if any.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<Vec<u8>, ApiError> {
        let bearer = self.session.bearer();
        debug!(?method, path, authenticated = bearer.is_some(), "api request");

        let response = self
            .transport
            .send(ApiRequest {
                method,
                path: path.to_string(),
                bearer,
                body,
            })
            .await?;

        if !(200..300).contains(&response.status) {
            let message = error_message(&response.body);
            debug!(?method, path, status = response.status, ?message, "api request rejected");
            return Err(ApiError::Status {
                status: response.status,
                message,
            });
        }

        Ok(response.body)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.send(Method::Get, path, RequestBody::Empty).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn post_json<B, T>(&self, path: &str, payload: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = RequestBody::Json(serde_json::to_value(payload)?);
        let body = self.send(Method::Post, path, body).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn patch_json<B, T>(&self, path: &str, payload: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = RequestBody::Json(serde_json::to_value(payload)?);
        let body = self.send(Method::Patch, path, body).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Any 2xx counts as success; the body is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::Delete, path, RequestBody::Empty).await?;
        Ok(())
    }

    pub fn resource<T>(&self, path: &'static str) -> ResourceClient<T> {
        ResourceClient {
            api: self.clone(),
            path,
            _record: PhantomData,
        }
    }
}

/// Typed CRUD calls against `path` and `path/{id}`.
pub struct ResourceClient<T> {
    api: ApiClient,
    path: &'static str,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            path: self.path,
            _record: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> ResourceClient<T> {
    pub fn path(&self) -> &'static str {
        self.path
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path, id)
    }

    pub async fn list(&self) -> Result<Vec<T>, ApiError> {
        self.api.get_json(self.path).await
    }

    pub async fn get(&self, id: &str) -> Result<T, ApiError> {
        self.api.get_json(&self.item_path(id)).await
    }

    pub async fn create<P: Serialize + ?Sized>(&self, payload: &P) -> Result<T, ApiError> {
        self.api.post_json(self.path, payload).await
    }

    pub async fn update<P: Serialize + ?Sized>(&self, id: &str, payload: &P) -> Result<T, ApiError> {
        self.api.patch_json(&self.item_path(id), payload).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete(&self.item_path(id)).await
    }
}
