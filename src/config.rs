//! Client configuration.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.tablebase.io/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const API_KEY_ENV: &str = "TABLEBASE_API_KEY";
pub const BASE_URL_ENV: &str = "TABLEBASE_BASE_URL";
pub const DATABASE_ID_ENV: &str = "TABLEBASE_DATABASE_ID";

/// Options for [`crate::Tablebase`]
#[derive(Clone)]
pub struct ClientOptions {
  pub api_key: String,
  pub base_url: String,
  pub timeout: Duration,
  pub user_agent: String,
  /// Database every request is scoped to; `None` targets the account default
  pub database_id: Option<String>,
}

impl ClientOptions {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key: api_key.into(),
      base_url: DEFAULT_BASE_URL.to_string(),
      timeout: DEFAULT_TIMEOUT,
      user_agent: format!("tablebase-rust/{}", env!("CARGO_PKG_VERSION")),
      database_id: None,
    }
  }

  /// Read `TABLEBASE_API_KEY`, `TABLEBASE_BASE_URL` and `TABLEBASE_DATABASE_ID`
  pub fn from_env() -> Result<Self> {
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let api_key = lookup(API_KEY_ENV)
      .filter(|key| !key.trim().is_empty())
      .ok_or_else(|| Error::Config(format!("{} is not set", API_KEY_ENV)))?;

    let mut options = Self::new(api_key);
    if let Some(base_url) = lookup(BASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
      options = options.with_base_url(base_url);
    }
    if let Some(database_id) = lookup(DATABASE_ID_ENV).filter(|id| !id.trim().is_empty()) {
      options = options.with_database(database_id);
    }

    options.validate()?;
    Ok(options)
  }

  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
    self.user_agent = user_agent.into();
    self
  }

  pub fn with_database(mut self, database_id: impl Into<String>) -> Self {
    self.database_id = Some(database_id.into());
    self
  }

  /// Check the options before a client is built from them
  pub fn validate(&self) -> Result<()> {
    if self.api_key.trim().is_empty() {
      return Err(Error::Config("api key is empty".to_string()));
    }

    let url = Url::parse(&self.base_url)?;
    if !matches!(url.scheme(), "http" | "https") {
      return Err(Error::Config(format!(
        "base url must use http or https, got {}",
        url.scheme()
      )));
    }

    if self.timeout.is_zero() {
      return Err(Error::Config("timeout must be positive".to_string()));
    }

    Ok(())
  }
}

impl fmt::Debug for ClientOptions {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ClientOptions")
      .field("api_key", &"[REDACTED]")
      .field("base_url", &self.base_url)
      .field("timeout", &self.timeout)
      .field("user_agent", &self.user_agent)
      .field("database_id", &self.database_id)
      .finish()
  }
}
