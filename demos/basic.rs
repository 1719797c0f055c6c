//! Basic example demonstrating Tablebase Rust SDK usage.
//!
//! Reads `TABLEBASE_API_KEY` (and optionally `TABLEBASE_BASE_URL`) from the
//! environment.

use serde_json::json;
use tablebase::filter::create_filter;
use tablebase::{ApiResponse, ListOptions, SortDirection, Tablebase};

#[tokio::main]
async fn main() -> tablebase::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter("tablebase=debug")
    .init();

  let client = Tablebase::from_env()?;

  // Create a table
  let created = client
    .table_builder("users")
    .description("Demo users")
    .text("name")
    .email("email")
    .number("age")
    .checkbox("active")
    .create()
    .await?;
  match &created {
    ApiResponse::Error { error } => println!("Create failed: {}", error),
    _ => println!("Created table: {:?}", created.data()),
  }

  // Insert a record
  let inserted = client
    .records()
    .insert(
      "users",
      &json!({
          "name": "Alice",
          "email": "alice@example.com",
          "age": 31,
          "active": true
      }),
    )
    .await?;
  println!("Inserted: {}", serde_json::to_string_pretty(&inserted)?);

  // Query with a nested where-condition
  let condition = json!({"age": {"$between": [18, 65]}, "active": true});
  let adults = client
    .records()
    .find_all(
      "users",
      ListOptions::new()
        .filters(condition.as_object().cloned().unwrap_or_default())
        .sort("name", SortDirection::Asc)
        .page(1, 20),
    )
    .await?;
  if let Some(page) = adults.pagination() {
    println!("{} matching users over {} pages", page.total_count, page.total_pages);
  }

  // Same query through the record builder
  let first = client
    .from("users")
    .and_where(create_filter().between("age", 18, 65).equals("active", true))
    .find_one()
    .await?;
  println!("First adult: {:?}", first.data());

  // Update matching records
  let updated = client
    .from("users")
    .and_where(create_filter().equals("email", "alice@example.com"))
    .update(&json!({"age": 32}))
    .await?;
  println!("Updated: {}", !updated.is_error());

  Ok(())
}
