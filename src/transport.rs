//! HTTP transport for Tablebase API requests.
//!
//! Resources never talk to reqwest directly; they hand an [`ApiRequest`] to a
//! [`Transport`] and normalize whatever comes back.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;
use uuid::Uuid;

pub use reqwest::Method;

use crate::config::ClientOptions;
use crate::error::Result;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest slice of a non-JSON body kept in the synthesized error
const MAX_BODY_EXCERPT: usize = 512;

/// A request relative to the API base URL
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
    Self::new(Method::GET, path)
  }

  pub fn post(path: impl Into<String>) -> Self {
    Self::new(Method::POST, path)
  }

  pub fn patch(path: impl Into<String>) -> Self {
    Self::new(Method::PATCH, path)
  }

  pub fn delete(path: impl Into<String>) -> Self {
    Self::new(Method::DELETE, path)
  }

  pub fn with_body(mut self, body: Value) -> Self {
    self.body = Some(body);
    self
  }

  pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.query.push((key.into(), value.into()));
    self
  }
}

/// Status and decoded body of a response
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
  pub status: u16,
  pub body: Value,
}

/// Executes API requests
#[async_trait]
pub trait Transport: Send + Sync {
  async fn send(&self, request: ApiRequest) -> Result<RawResponse>;
}

/// reqwest-backed [`Transport`]
#[derive(Clone)]
pub struct HttpTransport {
  client: reqwest::Client,
  base_url: String,
  api_key: String,
}

impl HttpTransport {
  pub fn new(options: &ClientOptions) -> Result<Self> {
    options.validate()?;

    let client = reqwest::Client::builder()
      .timeout(options.timeout)
      .user_agent(&options.user_agent)
      .build()?;

    Ok(Self {
      client,
      base_url: options.base_url.trim_end_matches('/').to_string(),
      api_key: options.api_key.clone(),
    })
  }

  fn endpoint(&self, path: &str) -> Result<Url> {
    let path = path.trim_start_matches('/');
    Ok(Url::parse(&format!("{}/{}", self.base_url, path))?)
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn send(&self, request: ApiRequest) -> Result<RawResponse> {
    let request_id = Uuid::new_v4();
    let url = self.endpoint(&request.path)?;
    debug!(%request_id, method = %request.method, path = %request.path, "sending request");

    let mut builder = self
      .client
      .request(request.method, url)
      .header(API_KEY_HEADER, &self.api_key)
      .header(REQUEST_ID_HEADER, request_id.to_string());
    if !request.query.is_empty() {
      builder = builder.query(&request.query);
    }
    if let Some(body) = &request.body {
      builder = builder.json(body);
    }

    let response = builder.send().await?;
    let status = response.status().as_u16();
    let text = response.text().await?;
    debug!(%request_id, status, bytes = text.len(), "received response");

    Ok(RawResponse {
      status,
      body: decode_body(&text),
    })
  }
}

/// Decode a response body. Non-JSON text is turned into an error body so the
/// normalizer still sees something it can classify.
pub(crate) fn decode_body(text: &str) -> Value {
  if text.trim().is_empty() {
    return Value::Null;
  }

  serde_json::from_str(text).unwrap_or_else(|_| {
    let excerpt: String = text.chars().take(MAX_BODY_EXCERPT).collect();
    json!({
      "error": {
        "code": "INVALID_RESPONSE_BODY",
        "message": excerpt,
      }
    })
  })
}
