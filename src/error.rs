//! Error types for the Tablebase client SDK.
//!
//! Only local failures are represented here. Failures reported by the remote
//! service are returned as data inside [`crate::ApiResponse::Error`].

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("Unsupported filter operator: {operator}")]
  UnsupportedOperator { operator: String },

  #[error("Invalid filter: {}", .violations.join("; "))]
  FilterValidation { violations: Vec<String> },

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Invalid request: {0}")]
  InvalidRequest(String),

  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("Invalid URL: {0}")]
  Url(#[from] url::ParseError),

  #[error("Serialization error: {0}")]
  Serialization(String),
}

impl Error {
  pub(crate) fn unsupported(operator: impl Into<String>) -> Self {
    Self::UnsupportedOperator {
      operator: operator.into(),
    }
  }

  pub(crate) fn invalid_filter(violation: impl Into<String>) -> Self {
    Self::FilterValidation {
      violations: vec![violation.into()],
    }
  }

  /// Error text with credentials and tokens masked
  pub fn sanitized_message(&self) -> String {
    sanitize_error_message(&self.to_string())
  }
}

fn sanitize_error_message(msg: &str) -> String {
  static URL_CREDS_RE: OnceLock<Regex> = OnceLock::new();
  static AUTH_RE: OnceLock<Regex> = OnceLock::new();

  let url_creds_re =
    URL_CREDS_RE.get_or_init(|| Regex::new(r"https?://[^@:/\s]+:[^@\s]+@").expect("valid regex"));
  let auth_re = AUTH_RE.get_or_init(|| {
    Regex::new(r"(?i)(bearer|x-api-key|api[_-]?key|token)\s*[:=]?\s*[^\s&]+").expect("valid regex")
  });

  let sanitized = url_creds_re.replace_all(msg, "https://[REDACTED]@");
  let sanitized = auth_re.replace_all(&sanitized, "$1=[REDACTED]");
  sanitized.to_string()
}

impl From<serde_json::Error> for Error {
  fn from(e: serde_json::Error) -> Self {
    Self::Serialization(e.to_string())
  }
}

pub type Result<T> = std::result::Result<T, Error>;
