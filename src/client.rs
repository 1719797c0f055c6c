//! Tablebase client facade.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::builder::{RecordQuery, TableBuilder};
use crate::config::ClientOptions;
use crate::error::Result;
use crate::resources::{single, Columns, Databases, Indexes, Records, Sql, Tables};
use crate::response::{normalize, transport_failure, ApiError, ApiResponse};
use crate::transport::{ApiRequest, HttpTransport, Transport};

pub const DATABASE_ID_PARAM: &str = "db_id";

/// The database a client handle sends its requests to.
///
/// A context never changes once created; switching databases produces a new
/// client handle with a new context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseContext {
  database_id: Option<String>,
}

impl DatabaseContext {
  pub fn new(database_id: Option<String>) -> Self {
    Self { database_id }
  }

  pub fn database(database_id: impl Into<String>) -> Self {
    Self::new(Some(database_id.into()))
  }

  pub fn database_id(&self) -> Option<&str> {
    self.database_id.as_deref()
  }

  fn apply(&self, request: ApiRequest) -> ApiRequest {
    match &self.database_id {
      Some(id) => request.with_query(DATABASE_ID_PARAM, id.as_str()),
      None => request,
    }
  }
}

/// Client for the Tablebase API
///
/// Cloning is cheap; clones share one transport.
///
/// # Example
///
/// ```no_run
/// use tablebase::{ClientOptions, Tablebase};
/// use tablebase::filter::create_filter;
///
/// #[tokio::main]
/// async fn main() -> tablebase::Result<()> {
///     let client = Tablebase::new(ClientOptions::new("my-api-key"))?;
///
///     let adults = client
///         .from("users")
///         .and_where(create_filter().greater_than_or_equal("age", 18))
///         .limit(10)
///         .find_all()
///         .await?;
///
///     match adults.error() {
///         Some(error) => eprintln!("query failed: {}", error),
///         None => println!("{:?}", adults.items()),
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Tablebase {
  transport: Arc<dyn Transport>,
  context: DatabaseContext,
}

impl Tablebase {
  pub fn new(options: ClientOptions) -> Result<Self> {
    let transport = HttpTransport::new(&options)?;
    Ok(Self::with_transport(
      Arc::new(transport),
      DatabaseContext::new(options.database_id),
    ))
  }

  /// Build a client from `TABLEBASE_*` environment variables
  pub fn from_env() -> Result<Self> {
    Self::new(ClientOptions::from_env()?)
  }

  pub fn with_transport(transport: Arc<dyn Transport>, context: DatabaseContext) -> Self {
    Self { transport, context }
  }

  /// A handle scoped to another database. `self` keeps its own database.
  pub fn use_database(&self, database_id: impl Into<String>) -> Self {
    Self {
      transport: Arc::clone(&self.transport),
      context: DatabaseContext::database(database_id),
    }
  }

  pub fn context(&self) -> &DatabaseContext {
    &self.context
  }

  pub fn tables(&self) -> Tables<'_> {
    Tables::new(self)
  }

  pub fn columns(&self) -> Columns<'_> {
    Columns::new(self)
  }

  pub fn records(&self) -> Records<'_> {
    Records::new(self)
  }

  pub fn indexes(&self) -> Indexes<'_> {
    Indexes::new(self)
  }

  pub fn databases(&self) -> Databases<'_> {
    Databases::new(self)
  }

  pub fn sql(&self) -> Sql<'_> {
    Sql::new(self)
  }

  /// Start building a table schema
  pub fn table_builder(&self, name: impl Into<String>) -> TableBuilder {
    TableBuilder::new(self.clone(), name)
  }

  /// Start a record query against `table`
  pub fn from(&self, table: impl Into<String>) -> RecordQuery {
    RecordQuery::new(self.clone(), table)
  }

  /// Send a request in this handle's database and normalize the answer
  pub(crate) async fn call(&self, request: ApiRequest) -> ApiResponse<Value> {
    self.call_unscoped(self.context.apply(request)).await
  }

  /// Send a request without attaching the database context
  pub(crate) async fn call_unscoped(&self, request: ApiRequest) -> ApiResponse<Value> {
    match self.transport.send(request).await {
      Ok(raw) => normalize(raw.body, raw.status),
      Err(e) => {
        warn!(error = %e.sanitized_message(), "request failed before a response arrived");
        transport_failure(&e)
      }
    }
  }

  /// Resolve a table name to its id
  pub(crate) async fn table_id(&self, table: &str) -> std::result::Result<String, ApiError> {
    let table_info = single(self.tables().lookup(table).await)?;
    debug!(table, table_id = %table_info.id, "resolved table");
    Ok(table_info.id)
  }
}

impl std::fmt::Debug for Tablebase {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Tablebase")
      .field("context", &self.context)
      .finish()
  }
}
