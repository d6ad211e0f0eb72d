//! A [`DataSource`] talking to Postgres directly.
//!
//! Rows are converted to JSON inside the database using `to_jsonb()`, so they
//! have exactly the same shape as the ones returned by PostgREST.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::pool::PoolOptions;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{DataSource, Error, Object, Result, Row, TableQuery};

/// A connection pool to a Postgres database.
#[derive(Debug, Clone)]
pub struct PostgresClient
{
	/// The underlying connection pool.
	database: Pool<Postgres>,
}

impl PostgresClient
{
	/// Creates a new [`PostgresClient`] from an existing pool.
	pub const fn new(database: Pool<Postgres>) -> Self
	{
		Self { database }
	}

	/// Creates a pool for the database at `url`.
	///
	/// Connections are established on first use, so an unreachable database
	/// does not prevent the client from being created.
	pub fn connect(url: &str, acquire_timeout: Duration) -> Result<Self>
	{
		let database = PoolOptions::new()
			.acquire_timeout(acquire_timeout)
			.connect_lazy(url)?;

		Ok(Self::new(database))
	}
}

#[async_trait]
impl DataSource for PostgresClient
{
	#[tracing::instrument(level = "debug", skip(self), err(Debug, level = "debug"))]
	async fn call_procedure(&self, name: &str, args: &Object) -> Result<Vec<Row>>
	{
		let mut query = procedure_query(name, args)?;
		let rows = query
			.build_query_scalar::<Json<Value>>()
			.fetch_all(&self.database)
			.await?;

		// procedures returning a single JSON array are treated like set-returning ones
		Ok(rows
			.into_iter()
			.flat_map(|Json(row)| match row {
				Value::Array(rows) => rows,
				row => vec![row],
			})
			.collect())
	}

	#[tracing::instrument(level = "debug", skip(self), err(Debug, level = "debug"))]
	async fn select(&self, query: &TableQuery) -> Result<Vec<Row>>
	{
		let mut query = select_query(query)?;
		let rows = query
			.build_query_scalar::<Json<Value>>()
			.fetch_all(&self.database)
			.await?;

		Ok(rows.into_iter().map(|Json(row)| row).collect())
	}

	#[tracing::instrument(level = "debug", skip(self), err(Debug, level = "debug"))]
	async fn update_single(&self, table: &str, id: Uuid, patch: &Object) -> Result<Row>
	{
		let mut query = update_query(table, id, patch)?;
		let mut transaction = self.database.begin().await?;
		let mut rows = query
			.build_query_scalar::<Json<Value>>()
			.fetch_all(transaction.as_mut())
			.await?;

		if rows.len() != 1 {
			transaction.rollback().await?;

			return Err(Error::NotSingleRow { rows: u64::try_from(rows.len()).ok() });
		}

		transaction.commit().await?;

		match rows.pop() {
			Some(Json(row)) => Ok(row),
			None => Err(Error::NotSingleRow { rows: Some(0) }),
		}
	}
}

/// Builds `SELECT to_jsonb(r) FROM name(arg => $1, ...) r`.
fn procedure_query(name: &str, args: &Object) -> Result<QueryBuilder<'static, Postgres>>
{
	let mut query = QueryBuilder::new("SELECT to_jsonb(r) FROM ");
	query.push(quote_ident(name)?).push("(");

	for (idx, (arg, value)) in args.iter().enumerate() {
		if idx > 0 {
			query.push(", ");
		}

		query.push(quote_ident(arg)?).push(" => ");
		push_value(&mut query, value.clone());
	}

	query.push(") r");

	Ok(query)
}

/// Builds a filtered, sorted & paginated `SELECT` for `table_query`.
fn select_query(table_query: &TableQuery) -> Result<QueryBuilder<'static, Postgres>>
{
	let mut query = QueryBuilder::new("SELECT to_jsonb(t) FROM ");
	query.push(quote_ident(&table_query.table)?).push(" t");

	let mut delimiter = " WHERE ";

	for (column, value) in &table_query.filters {
		query.push(delimiter).push(quote_ident(column)?);

		if value.is_null() {
			query.push(" IS NULL");
		} else {
			query.push(" = ");
			push_value(&mut query, value.clone());
		}

		delimiter = " AND ";
	}

	if let Some(ref order) = table_query.order {
		query
			.push(" ORDER BY ")
			.push(quote_ident(&order.column)?)
			.push(if order.descending { " DESC" } else { " ASC" });
	}

	if let (Some(offset), Some(limit)) = (table_query.offset(), table_query.limit()) {
		query
			.push(" LIMIT ")
			.push_bind(i64::try_from(limit).unwrap_or(i64::MAX))
			.push(" OFFSET ")
			.push_bind(i64::try_from(offset).unwrap_or(i64::MAX));
	}

	Ok(query)
}

/// Builds `UPDATE table SET ... WHERE id = $n RETURNING to_jsonb(t.*)`.
fn update_query(table: &str, id: Uuid, patch: &Object) -> Result<QueryBuilder<'static, Postgres>>
{
	if patch.is_empty() {
		return Err(Error::EmptyPatch);
	}

	let mut query = QueryBuilder::new("UPDATE ");
	query.push(quote_ident(table)?).push(" AS t");

	let mut delimiter = " SET ";

	for (column, value) in patch {
		query.push(delimiter).push(quote_ident(column)?).push(" = ");
		push_value(&mut query, value.clone());
		delimiter = ", ";
	}

	query
		.push(" WHERE t.id = ")
		.push_bind(id)
		.push(" RETURNING to_jsonb(t.*)");

	Ok(query)
}

/// Binds a JSON value as the closest matching Postgres type.
fn push_value(query: &mut QueryBuilder<'static, Postgres>, value: Value)
{
	match value {
		Value::Null => {
			query.push("NULL");
		}
		Value::Bool(value) => {
			query.push_bind(value);
		}
		Value::Number(number) => {
			if let Some(int) = number.as_i64() {
				match i32::try_from(int) {
					Ok(int) => query.push_bind(int),
					Err(_) => query.push_bind(int),
				};
			} else {
				query.push_bind(number.as_f64().unwrap_or_default());
			}
		}
		Value::String(string) => {
			query.push_bind(string);
		}
		value @ (Value::Array(_) | Value::Object(_)) => {
			query.push_bind(Json(value));
		}
	}
}

/// Quotes a (possibly schema-qualified) identifier.
///
/// Only plain identifiers are accepted; anything that would need escaping is
/// rejected instead.
fn quote_ident(ident: &str) -> Result<String>
{
	let is_valid = |part: &str| {
		let mut chars = part.chars();

		chars
			.next()
			.is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
			&& chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
	};

	if !ident.split('.').all(is_valid) {
		return Err(Error::InvalidIdentifier(ident.to_owned()));
	}

	Ok(ident
		.split('.')
		.map(|part| format!("\"{part}\""))
		.collect::<Vec<_>>()
		.join("."))
}
