//! Fluent builders for table schemas and record queries
//!
//! Every chained call consumes the builder and returns the next state, so a
//! builder that already ran a terminal call is never changed by later chains.

use serde::Serialize;
use serde_json::Value;

use crate::client::Tablebase;
use crate::error::Result;
use crate::filter::{validate, Filter, Filters};
use crate::resources::first_match;
use crate::response::{ApiError, ApiResponse};
use crate::types::{
    ColumnDefinition, ColumnType, ListOptions, Page, RecordDelete, SortDirection, SortSpec,
    TableCreateRequest, TableInfo,
};

/// Table schema builder
///
/// # Example
/// ```no_run
/// # async fn demo(client: tablebase::Tablebase) -> tablebase::Result<()> {
/// let created = client
///     .table_builder("products")
///     .description("Catalog")
///     .text("name")
///     .number("price")
///     .checkbox("in_stock")
///     .create()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TableBuilder {
    client: Tablebase,
    request: TableCreateRequest,
}

impl TableBuilder {
    pub(crate) fn new(client: Tablebase, name: impl Into<String>) -> Self {
        Self {
            client,
            request: TableCreateRequest {
                name: name.into(),
                description: None,
                fields: Vec::new(),
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.request.description = Some(description.into());
        self
    }

    /// Add a fully specified column
    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.request.fields.push(column);
        self
    }

    fn typed(self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.column(ColumnDefinition::new(name, column_type))
    }

    pub fn text(self, name: impl Into<String>) -> Self {
        self.typed(name, ColumnType::Text)
    }

    pub fn long_text(self, name: impl Into<String>) -> Self {
        self.typed(name, ColumnType::LongText)
    }

    pub fn number(self, name: impl Into<String>) -> Self {
        self.typed(name, ColumnType::Number)
    }

    pub fn currency(self, name: impl Into<String>, currency_format: impl Into<String>) -> Self {
        let mut column = ColumnDefinition::new(name, ColumnType::Currency);
        column.currency_format = Some(currency_format.into());
        self.column(column)
    }

    pub fn checkbox(self, name: impl Into<String>) -> Self {
        self.typed(name, ColumnType::Checkbox)
    }

    pub fn date_time(self, name: impl Into<String>) -> Self {
        self.typed(name, ColumnType::DateTime)
    }

    pub fn email(self, name: impl Into<String>) -> Self {
        self.typed(name, ColumnType::Email)
    }

    pub fn phone_number(self, name: impl Into<String>) -> Self {
        self.typed(name, ColumnType::PhoneNumber)
    }

    pub fn link(self, name: impl Into<String>) -> Self {
        self.typed(name, ColumnType::Link)
    }

    pub fn json(self, name: impl Into<String>) -> Self {
        self.typed(name, ColumnType::Json)
    }

    pub fn dropdown<I, S>(self, name: impl Into<String>, items: I, multiple: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut column = ColumnDefinition::new(name, ColumnType::Dropdown);
        column.selectable_items = Some(items.into_iter().map(Into::into).collect());
        column.multiple_selections = Some(multiple);
        self.column(column)
    }

    pub fn vector(self, name: impl Into<String>, dimension: u32) -> Self {
        let mut column = ColumnDefinition::new(name, ColumnType::Vector);
        column.vector_dimension = Some(dimension);
        self.column(column)
    }

    /// The validated create request
    pub fn build(&self) -> Result<TableCreateRequest> {
        self.request.validate()?;
        Ok(self.request.clone())
    }

    pub async fn create(&self) -> Result<ApiResponse<TableInfo>> {
        let request = self.build()?;
        self.client.tables().create(&request).await
    }
}

/// Record query builder
///
/// Conditions from every `and_where`/`filter` call are AND-combined.
#[derive(Debug, Clone)]
pub struct RecordQuery {
    client: Tablebase,
    table: String,
    conditions: Vec<Filters>,
    sort: Vec<SortSpec>,
    page: Option<Page>,
    fields: Vec<String>,
}

impl RecordQuery {
    pub(crate) fn new(client: Tablebase, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            conditions: Vec::new(),
            sort: Vec::new(),
            page: None,
            fields: Vec::new(),
        }
    }

    /// Add conditions in any accepted filter syntax
    pub fn and_where(mut self, filters: impl Into<Filters>) -> Self {
        self.conditions.push(filters.into());
        self
    }

    /// Add one canonical filter
    pub fn filter(self, filter: Filter) -> Self {
        self.and_where(vec![filter])
    }

    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort.push(SortSpec {
            field: field.into(),
            direction,
        });
        self
    }

    /// Limit the number of records returned
    pub fn limit(mut self, n: u64) -> Self {
        let page_no = self.page.map_or(1, |page| page.page_no);
        self.page = Some(Page {
            page_no,
            page_size: n,
        });
        self
    }

    /// Select a page; counts from 1
    pub fn page(mut self, page_no: u64) -> Self {
        let page_size = self.page.map_or(Page::default().page_size, |page| page.page_size);
        self.page = Some(Page { page_no, page_size });
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Canonical filters of every condition, in the order they were added
    pub fn canonical_filters(&self) -> Result<Vec<Filter>> {
        let mut filters = Vec::new();
        for condition in &self.conditions {
            filters.extend(condition.clone().into_canonical()?);
        }
        validate(&filters)?;
        Ok(filters)
    }

    fn list_options(&self) -> Result<ListOptions> {
        Ok(ListOptions {
            filters: Some(Filters::List(self.canonical_filters()?)),
            page: self.page,
            sort: self.sort.clone(),
            fields: self.fields.clone(),
        })
    }

    pub async fn find_all(&self) -> Result<ApiResponse<Value>> {
        let options = self.list_options()?;
        self.client.records().find_all(&self.table, options).await
    }

    /// First matching record, or a `RECORD_NOT_FOUND` error
    pub async fn find_one(&self) -> Result<ApiResponse<Value>> {
        let mut options = self.list_options()?;
        options.page = Some(Page {
            page_no: 1,
            page_size: 1,
        });
        let response = self.client.records().find_all(&self.table, options).await?;
        Ok(first_match(
            response,
            ApiError::new(
                "RECORD_NOT_FOUND",
                format!("No matching record in table '{}'", self.table),
            ),
        ))
    }

    pub async fn update<T: Serialize>(&self, values: &T) -> Result<ApiResponse<Value>> {
        let filters = self.canonical_filters()?;
        self.client.records().update(&self.table, values, filters).await
    }

    pub async fn delete(&self) -> Result<ApiResponse<Value>> {
        let filters = self.canonical_filters()?;
        self.client
            .records()
            .delete(&self.table, RecordDelete::matching(filters))
            .await
    }
}
