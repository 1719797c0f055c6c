//! Resource handles for each part of the Tablebase API.
//!
//! Every method resolves names to ids, issues one or more requests and returns
//! the normalized [`ApiResponse`]. `Err` is reserved for local failures such as
//! filters that do not translate.

/// Unwrap a `Result<T, ApiError>` or return the error as a response
macro_rules! try_api {
  ($expr:expr) => {
    match $expr {
      Ok(value) => value,
      Err(error) => return Ok(crate::response::ApiResponse::Error { error }),
    }
  };
}

mod columns;
mod databases;
mod indexes;
mod records;
mod sql;
mod tables;

pub use columns::Columns;
pub use databases::Databases;
pub use indexes::Indexes;
pub use records::Records;
pub use sql::Sql;
pub use tables::Tables;

use crate::response::{ApiError, ApiResponse};

/// Collapse a list response to its first item, or `not_found` when empty
pub(crate) fn first_match<T>(response: ApiResponse<T>, not_found: ApiError) -> ApiResponse<T> {
  match response {
    ApiResponse::List { data, message, .. } => match data.into_iter().next() {
      Some(data) => ApiResponse::Single { data, message },
      None => ApiResponse::Error { error: not_found },
    },
    other => other,
  }
}

/// Payload of a single response
pub(crate) fn single<T>(response: ApiResponse<T>) -> Result<T, ApiError> {
  match response {
    ApiResponse::Single { data, .. } => Ok(data),
    ApiResponse::List { data, .. } => data
      .into_iter()
      .next()
      .ok_or_else(|| ApiError::new("NOT_FOUND", "The list response was empty")),
    ApiResponse::Error { error } => Err(error),
  }
}

pub(crate) fn segment(value: &str) -> String {
  urlencoding::encode(value).into_owned()
}
