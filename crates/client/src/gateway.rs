//! HTTP gateway to the remote inventory service.
//!
//! The gateway is the only component that performs network IO for the view.
//! It reports every response it receives (including 4xx/5xx) as an
//! [`ApiResponse`]; `Err` is reserved for transport failures where no response
//! exists. Status classification happens one layer up in [`crate::api`].

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ClientError;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// A request relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Patch, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of a query parameter, if present.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and decoded body of a received response.
///
/// Bodies that are not JSON are kept as a JSON string; empty bodies are `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body of a 2xx response, or the API error describing the failure.
    pub fn into_result(self) -> Result<Value, ClientError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(ClientError::from_status(self.status, &self.body))
        }
    }
}

/// Authenticated request/response transport.
#[async_trait]
pub trait HttpGateway: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ClientError>;
}

/// `reqwest`-backed gateway with optional bearer authentication.
#[derive(Debug, Clone)]
pub struct ReqwestGateway {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl ReqwestGateway {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            token: None,
        }
    }

    pub fn with_token(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::new(api_url)
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl HttpGateway for ReqwestGateway {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = self.url(&request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut req = self.client.request(method, &url);
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        tracing::debug!(method = request.method.as_str(), %url, "sending request");

        let resp = req
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        tracing::debug!(method = request.method.as_str(), %url, status, "received response");

        Ok(ApiResponse { status, body })
    }
}
