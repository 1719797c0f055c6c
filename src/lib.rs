//! Tablebase Rust Client SDK
//!
//! An HTTP client for Tablebase, a hosted table database. Tables, columns,
//! records, indexes, databases and raw SQL are exposed as typed calls.
//!
//! Every call returns an [`ApiResponse`]: a single payload, a paginated list, or
//! an error reported by the service. `Err` is only used for local problems such
//! as a filter that does not translate.
//!
//! # Example
//!
//! ```no_run
//! use serde_json::json;
//! use tablebase::filter::create_filter;
//! use tablebase::{ClientOptions, ListOptions, Tablebase};
//!
//! #[tokio::main]
//! async fn main() -> tablebase::Result<()> {
//!     let client = Tablebase::new(ClientOptions::new("my-api-key"))?;
//!
//!     // Insert a record
//!     let inserted = client
//!         .records()
//!         .insert("users", &json!({"name": "Alice", "age": 31}))
//!         .await?;
//!     if let Some(error) = inserted.error() {
//!         eprintln!("insert failed: {}", error);
//!     }
//!
//!     // Nested where-conditions and the filter builder are interchangeable
//!     let condition = json!({"age": {"$gte": 18}, "name": "Alice"});
//!     let by_where = client
//!         .records()
//!         .find_all("users", ListOptions::new().filters(condition.as_object().cloned().unwrap_or_default()))
//!         .await?;
//!
//!     let by_builder = client
//!         .records()
//!         .find_all(
//!             "users",
//!             ListOptions::new().filters(create_filter().greater_than_or_equal("age", 18).equals("name", "Alice")),
//!         )
//!         .await?;
//!
//!     println!("{:?} {:?}", by_where.items(), by_builder.items());
//!
//!     // Work in another database without touching `client`
//!     let analytics = client.use_database("analytics");
//!     let tables = analytics.tables().list(ListOptions::new()).await?;
//!     println!("{:?}", tables.pagination());
//!
//!     Ok(())
//! }
//! ```

mod builder;
mod client;
mod config;
mod error;
pub mod filter;
mod resources;
pub mod response;
pub mod transport;
mod types;

pub use builder::{RecordQuery, TableBuilder};
pub use client::{DatabaseContext, Tablebase, DATABASE_ID_PARAM};
pub use config::{ClientOptions, API_KEY_ENV, BASE_URL_ENV, DATABASE_ID_ENV, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use filter::{create_filter, Filter, FilterBuilder, Filters, Operator, WhereCondition};
pub use resources::{Columns, Databases, Indexes, Records, Sql, Tables};
pub use response::{is_error, is_list_result, normalize, ApiError, ApiResponse, PageInfo};
pub use transport::{ApiRequest, HttpTransport, Method, RawResponse, Transport};
pub use types::{
  ColumnDefinition, ColumnInfo, ColumnType, ColumnUpdate, DatabaseCreateRequest, DatabaseInfo,
  DatabaseUpdate, IndexCreateRequest, IndexInfo, IndexMethod, ListOptions, Page, RecordDelete,
  SortDirection, SortSpec, TableCreateRequest, TableInfo, TableUpdate,
};
