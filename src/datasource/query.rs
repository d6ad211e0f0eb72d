//! This module contains the [`TableQuery`] type, a description of a filtered,
//! sorted & paginated read from a single table.

use serde_json::Value;

/// A read against a single table.
///
/// Every filter is an equality check, and all of them have to match. Rows are
/// sorted by at most one column and can be restricted to an inclusive range
/// of row indices.
///
/// # Example
///
/// ```
/// use marketplace_api::datasource::TableQuery;
///
/// let query = TableQuery::new("marketplace_course")
///     .eq("is_active", true)
///     .order_desc("rating")
///     .range(0, 19);
///
/// assert_eq!(query.limit(), Some(20));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery
{
	/// The table to read from.
	pub table: String,

	/// `(column, value)` pairs that have to be equal.
	pub filters: Vec<(String, Value)>,

	/// The sorting order.
	pub order: Option<Order>,

	/// Inclusive `(from, to)` row indices.
	pub range: Option<(u64, u64)>,
}

/// The sorting order of a [`TableQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order
{
	/// The column to sort by.
	pub column: String,

	/// Whether to sort in descending order.
	pub descending: bool,
}

impl TableQuery
{
	/// Creates a query returning every row of `table`.
	pub fn new<T>(table: T) -> Self
	where
		T: Into<String>,
	{
		Self { table: table.into(), filters: Vec::new(), order: None, range: None }
	}

	/// Only keep rows whose `column` equals `value`.
	pub fn eq<V>(mut self, column: &str, value: V) -> Self
	where
		V: Into<Value>,
	{
		self.filters.push((column.to_owned(), value.into()));
		self
	}

	/// Sort rows by `column`, largest first.
	pub fn order_desc(mut self, column: &str) -> Self
	{
		self.order = Some(Order { column: column.to_owned(), descending: true });
		self
	}

	/// Only return rows `from..=to`.
	pub fn range(mut self, from: u64, to: u64) -> Self
	{
		self.range = Some((from, to.max(from)));
		self
	}

	/// The number of rows to skip.
	pub fn offset(&self) -> Option<u64>
	{
		self.range.map(|(from, _)| from)
	}

	/// The maximum number of rows to return.
	pub fn limit(&self) -> Option<u64>
	{
		self.range
			.map(|(from, to)| to.saturating_sub(from).saturating_add(1))
	}

	/// Returns the value `column` is filtered by, if any.
	pub fn filter(&self, column: &str) -> Option<&Value>
	{
		self.filters
			.iter()
			.find(|(name, _)| name == column)
			.map(|(_, value)| value)
	}
}

#[cfg(test)]
mod tests
{
	use serde_json::json;

	use super::*;

	#[test]
	fn range_is_inclusive()
	{
		let query = TableQuery::new("t").range(5, 14);

		assert_eq!(query.offset(), Some(5));
		assert_eq!(query.limit(), Some(10));
	}

	#[test]
	fn filters_are_kept_in_order()
	{
		let query = TableQuery::new("t")
			.eq("is_active", true)
			.eq("category", "design");

		assert_eq!(query.filter("is_active"), Some(&json!(true)));
		assert_eq!(query.filter("category"), Some(&json!("design")));
		assert_eq!(query.filter("featured"), None);
		assert_eq!(query.filters.len(), 2);
	}
}
