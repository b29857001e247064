/* src/router/backend/rust/src/client.rs */

use std::time::Duration;

use reqwest::multipart::Form;
use serde_json::Value;
use waypoint_router::{Encoding, Method, RouterError};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Status and decoded body of a backend response. Non-JSON bodies are kept
/// as a string; empty bodies are `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
  pub status: u16,
  pub body: Value,
}

impl Response {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

/// Thin JSON client for the persistence backend.
#[derive(Debug, Clone)]
pub struct ResourceClient {
  http: reqwest::Client,
  base_url: String,
}

impl ResourceClient {
  pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RouterError> {
    let http = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| RouterError::config(format!("failed to build HTTP client: {e}")))?;
    let base_url = base_url.into().trim_end_matches('/').to_string();
    Ok(Self { http, base_url })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub fn url(&self, path: &str) -> String {
    format!("{}/{}", self.base_url, path.trim_start_matches('/'))
  }

  pub async fn get(&self, path: &str) -> Result<Response, RouterError> {
    let url = self.url(path);
    tracing::debug!(%url, "GET");
    let resp = self.http.get(&url).send().await.map_err(|e| transport_error(&url, &e))?;
    read_response(&url, resp).await
  }

  pub async fn send(
    &self,
    method: Method,
    path: &str,
    payload: &Value,
    encoding: Encoding,
  ) -> Result<Response, RouterError> {
    let url = self.url(path);
    tracing::debug!(%url, %method, "sending");
    let mut req = self.http.request(http_method(method), &url);
    if !payload.is_null() {
      req = match encoding {
        Encoding::Json => req.json(payload),
        Encoding::Multipart => req.multipart(multipart_form(payload)),
      };
    }
    let resp = req.send().await.map_err(|e| transport_error(&url, &e))?;
    read_response(&url, resp).await
  }
}

fn http_method(method: Method) -> reqwest::Method {
  match method {
    Method::Post => reqwest::Method::POST,
    Method::Put => reqwest::Method::PUT,
    Method::Patch => reqwest::Method::PATCH,
    Method::Delete => reqwest::Method::DELETE,
  }
}

/// Each top-level field becomes a text part; non-string values are sent as
/// their JSON text.
fn multipart_form(payload: &Value) -> Form {
  let mut form = Form::new();
  if let Value::Object(fields) = payload {
    for (name, value) in fields {
      let text = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
      };
      form = form.text(name.clone(), text);
    }
  }
  form
}

async fn read_response(url: &str, resp: reqwest::Response) -> Result<Response, RouterError> {
  let status = resp.status().as_u16();
  let bytes = resp.bytes().await.map_err(|e| transport_error(url, &e))?;
  let body = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes)
      .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
  };
  Ok(Response { status, body })
}

fn transport_error(url: &str, err: &reqwest::Error) -> RouterError {
  tracing::warn!(%url, error = %err, "backend request failed");
  let status = if err.is_timeout() { 504 } else { 502 };
  RouterError::fetch_failed(status, format!("request to {url} failed: {err}"))
}
