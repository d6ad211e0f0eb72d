//! Access to the relational store backing the marketplace.
//!
//! The store is abstracted behind the [`DataSource`] trait, which supports
//! exactly the three capabilities the services need:
//!
//! - calling a named procedure with keyword arguments
//! - running an equality-filtered, sorted & paginated query against a table
//! - updating exactly one row by its ID and reading it back
//!
//! Rows travel as JSON objects; decoding them into concrete types is up to
//! the caller. There are two implementations: [`PostgrestClient`], which
//! talks to a hosted PostgREST endpoint (Supabase), and [`PostgresClient`],
//! which talks to Postgres directly.

use async_trait::async_trait;
use uuid::Uuid;

mod error;
pub use error::{Error, Result, StoreError};

mod query;
pub use query::{Order, TableQuery};

pub mod postgrest;
pub use postgrest::PostgrestClient;

pub mod postgres;
pub use postgres::PostgresClient;

/// A single row returned by the store.
pub type Row = serde_json::Value;

/// A set of named values, used for procedure arguments and row updates.
pub type Object = serde_json::Map<String, serde_json::Value>;

/// A relational store the marketplace can read from and write to.
#[async_trait]
pub trait DataSource: Send + Sync + 'static
{
	/// Calls the procedure `name` with the given keyword arguments.
	async fn call_procedure(&self, name: &str, args: &Object) -> Result<Vec<Row>>;

	/// Runs `query` and returns all matching rows.
	async fn select(&self, query: &TableQuery) -> Result<Vec<Row>>;

	/// Applies `patch` to the row of `table` whose `id` column equals `id`,
	/// and returns the updated row.
	///
	/// If `id` does not match exactly one row, [`Error::NotSingleRow`] is
	/// returned and nothing is changed.
	async fn update_single(&self, table: &str, id: Uuid, patch: &Object) -> Result<Row>;
}

/// Splits a JSON response into rows.
///
/// Set-returning procedures and table queries yield arrays; procedures
/// returning a single composite yield an object, and `null` means "no rows".
fn into_rows(value: serde_json::Value) -> Result<Vec<Row>>
{
	match value {
		serde_json::Value::Array(rows) => Ok(rows),
		serde_json::Value::Null => Ok(Vec::new()),
		row @ serde_json::Value::Object(_) => Ok(vec![row]),
		_ => Err(Error::UnexpectedShape("expected an array of rows")),
	}
}
