//! Response normalization for Tablebase API calls.
//!
//! Every endpoint answers with one of three body shapes:
//!
//! - `{data, message?}`
//! - `{data: [], pagination: {...}, message?}`
//! - `{data: {}, error: {code?, message?, meta?}}`
//!
//! [`normalize`] classifies a decoded body into [`ApiResponse`]. It never fails:
//! anything it cannot classify becomes an `UNKNOWN_ERROR`.

use serde::de::DeserializeOwned;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::Error;

pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unexpected error occurred";
pub const UNKNOWN_ERROR_META: &str = "Unknown error type";
pub const DESERIALIZATION_ERROR_CODE: &str = "DESERIALIZATION_ERROR";

/// Pagination block of a list response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
  pub total_count: u64,
  pub total_pages: u64,
  pub current_page: u64,
  pub per_page: u64,
  #[serde(rename = "type")]
  pub kind: String,
}

/// Error reported by the API, or synthesized when a response could not be read
#[derive(thiserror::Error, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[error("{}", .message.as_deref().unwrap_or(UNKNOWN_ERROR_MESSAGE))]
pub struct ApiError {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub code: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub meta: Option<Vec<String>>,
}

impl ApiError {
  pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      code: Some(code.into()),
      message: Some(message.into()),
      meta: None,
    }
  }

  /// The fallback used when no structured error is available
  pub fn unknown() -> Self {
    Self {
      code: Some(UNKNOWN_ERROR_CODE.to_string()),
      message: Some(UNKNOWN_ERROR_MESSAGE.to_string()),
      meta: Some(vec![UNKNOWN_ERROR_META.to_string()]),
    }
  }

  pub fn with_meta(mut self, meta: Vec<String>) -> Self {
    self.meta = Some(meta);
    self
  }
}

/// Result of every SDK call: a single payload, a page of payloads or an error
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T = Value> {
  Single {
    data: T,
    message: Option<String>,
  },
  List {
    data: Vec<T>,
    pagination: PageInfo,
    message: Option<String>,
  },
  Error {
    error: ApiError,
  },
}

/// True iff the response carries an error
pub fn is_error<T>(response: &ApiResponse<T>) -> bool {
  matches!(response, ApiResponse::Error { .. })
}

/// True iff the response is a paginated list
pub fn is_list_result<T>(response: &ApiResponse<T>) -> bool {
  matches!(response, ApiResponse::List { .. })
}

/// Classify a decoded response body.
pub fn normalize(body: Value, status: u16) -> ApiResponse<Value> {
  let mut body = match body {
    Value::Object(body) => body,
    Value::Null if status < 400 => {
      return ApiResponse::Single {
        data: Value::Null,
        message: None,
      }
    }
    Value::Null => return ApiResponse::failure(ApiError::unknown()),
    other => {
      warn!(status, body = %other, "response body is not an object");
      return ApiResponse::failure(ApiError::unknown());
    }
  };

  let error = body.remove("error").filter(|error| !error.is_null());
  if status >= 400 || error.is_some() {
    return ApiResponse::failure(extract_error(error));
  }

  let message = match body.remove("message") {
    Some(Value::String(message)) => Some(message),
    _ => None,
  };
  let data = body.remove("data").unwrap_or(Value::Null);

  if let Some(pagination) = body.remove("pagination").filter(|pagination| !pagination.is_null()) {
    let data = match data {
      Value::Array(items) => items,
      Value::Null => Vec::new(),
      other => {
        warn!(status, data = %other, "paginated response data is not an array");
        return ApiResponse::failure(ApiError::unknown());
      }
    };
    let Some(pagination) = page_info(&pagination, data.len() as u64) else {
      warn!(status, %pagination, "malformed pagination block");
      return ApiResponse::failure(ApiError::unknown());
    };
    return ApiResponse::List {
      data,
      pagination,
      message,
    };
  }

  ApiResponse::Single { data, message }
}

/// Decorate a local transport failure as an error response.
pub fn transport_failure<T>(error: &Error) -> ApiResponse<T> {
  ApiResponse::failure(ApiError::unknown().with_meta(vec![error.sanitized_message()]))
}

fn extract_error(raw: Option<Value>) -> ApiError {
  match raw {
    Some(Value::Object(fields)) => {
      let error = ApiError {
        code: text_field(&fields, "code"),
        message: text_field(&fields, "message"),
        meta: meta_field(&fields),
      };
      if error == ApiError::default() {
        ApiError::unknown()
      } else {
        error
      }
    }
    Some(Value::String(message)) => ApiError {
      message: Some(message),
      ..ApiError::unknown()
    },
    _ => ApiError::unknown(),
  }
}

fn text_field(fields: &Map<String, Value>, name: &str) -> Option<String> {
  match fields.get(name)? {
    Value::String(text) => Some(text.clone()),
    Value::Number(number) => Some(number.to_string()),
    _ => None,
  }
}

fn meta_field(fields: &Map<String, Value>) -> Option<Vec<String>> {
  match fields.get("meta")? {
    Value::Array(items) => Some(
      items
        .iter()
        .map(|item| match item {
          Value::String(text) => text.clone(),
          other => other.to_string(),
        })
        .collect(),
    ),
    Value::String(text) => Some(vec![text.clone()]),
    _ => None,
  }
}

fn count_field(fields: &Map<String, Value>, name: &str) -> Option<u64> {
  match fields.get(name)? {
    Value::Number(number) => number.as_u64().or_else(|| {
      number
        .as_f64()
        .filter(|n| n.fract() == 0.0 && *n >= 0.0 && *n <= u64::MAX as f64)
        .map(|n| n as u64)
    }),
    Value::String(text) => text.trim().parse().ok(),
    _ => None,
  }
}

/// Read a pagination block. `total_count` and `per_page` are only needed when
/// `total_pages` has to be computed; otherwise they fall back to the page's
/// item count.
fn page_info(raw: &Value, item_count: u64) -> Option<PageInfo> {
  let fields = raw.as_object()?;
  let total_count = count_field(fields, "total_count");
  let per_page = count_field(fields, "per_page");
  let total_pages = match (count_field(fields, "total_pages"), total_count, per_page) {
    (Some(pages), _, _) => pages,
    (None, Some(count), Some(size)) => total_pages(count, size),
    _ => return None,
  };

  Some(PageInfo {
    total_count: total_count.unwrap_or(item_count),
    total_pages,
    current_page: count_field(fields, "current_page").unwrap_or(1),
    per_page: per_page.unwrap_or(item_count),
    kind: fields
      .get("type")
      .and_then(Value::as_str)
      .unwrap_or("page")
      .to_string(),
  })
}

/// `ceil(total_count / per_page)`, zero for an empty page size
pub fn total_pages(total_count: u64, per_page: u64) -> u64 {
  if per_page == 0 {
    0
  } else {
    total_count.div_ceil(per_page)
  }
}

impl<T> ApiResponse<T> {
  pub(crate) fn failure(error: ApiError) -> Self {
    ApiResponse::Error { error }
  }

  pub fn is_error(&self) -> bool {
    is_error(self)
  }

  pub fn is_list_result(&self) -> bool {
    is_list_result(self)
  }

  /// Payload of a single-object response
  pub fn data(&self) -> Option<&T> {
    match self {
      ApiResponse::Single { data, .. } => Some(data),
      _ => None,
    }
  }

  /// Items of a list response
  pub fn items(&self) -> Option<&[T]> {
    match self {
      ApiResponse::List { data, .. } => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&ApiError> {
    match self {
      ApiResponse::Error { error } => Some(error),
      _ => None,
    }
  }

  pub fn pagination(&self) -> Option<&PageInfo> {
    match self {
      ApiResponse::List { pagination, .. } => Some(pagination),
      _ => None,
    }
  }

  pub fn message(&self) -> Option<&str> {
    match self {
      ApiResponse::Single { message, .. } | ApiResponse::List { message, .. } => message.as_deref(),
      ApiResponse::Error { .. } => None,
    }
  }

  /// Apply `f` to every payload, keeping the response kind
  pub fn map<U, F: FnMut(T) -> U>(self, mut f: F) -> ApiResponse<U> {
    match self {
      ApiResponse::Single { data, message } => ApiResponse::Single {
        data: f(data),
        message,
      },
      ApiResponse::List {
        data,
        pagination,
        message,
      } => ApiResponse::List {
        data: data.into_iter().map(f).collect(),
        pagination,
        message,
      },
      ApiResponse::Error { error } => ApiResponse::Error { error },
    }
  }

  /// Split off the error case so it can be propagated with `?`
  pub fn into_result(self) -> std::result::Result<Self, ApiError> {
    match self {
      ApiResponse::Error { error } => Err(error),
      other => Ok(other),
    }
  }
}

impl ApiResponse<Value> {
  /// Deserialize the payload. Failure becomes a `DESERIALIZATION_ERROR` response.
  pub fn into_typed<T: DeserializeOwned>(self) -> ApiResponse<T> {
    let typed = match self {
      ApiResponse::Single { data, message } => {
        serde_json::from_value(data).map(|data| ApiResponse::Single { data, message })
      }
      ApiResponse::List {
        data,
        pagination,
        message,
      } => data
        .into_iter()
        .map(serde_json::from_value)
        .collect::<serde_json::Result<Vec<T>>>()
        .map(|data| ApiResponse::List {
          data,
          pagination,
          message,
        }),
      ApiResponse::Error { error } => Ok(ApiResponse::Error { error }),
    };

    typed.unwrap_or_else(|e| {
      warn!(error = %e, "response payload did not match the expected type");
      ApiResponse::failure(
        ApiError::new(DESERIALIZATION_ERROR_CODE, "Response payload has an unexpected shape")
          .with_meta(vec![e.to_string()]),
      )
    })
  }
}

impl<T: Serialize> Serialize for ApiResponse<T> {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(None)?;
    match self {
      ApiResponse::Single { data, message } => {
        map.serialize_entry("data", data)?;
        if let Some(message) = message {
          map.serialize_entry("message", message)?;
        }
      }
      ApiResponse::List {
        data,
        pagination,
        message,
      } => {
        map.serialize_entry("data", data)?;
        map.serialize_entry("pagination", pagination)?;
        if let Some(message) = message {
          map.serialize_entry("message", message)?;
        }
      }
      ApiResponse::Error { error } => {
        map.serialize_entry("data", &Map::new())?;
        map.serialize_entry("error", error)?;
      }
    }
    map.end()
  }
}
