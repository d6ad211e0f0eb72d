//! The errors that can occur when talking to the store.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Type alias with a default `Err` type of [`Error`].
///
/// [`Error`]: enum@Error
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The errors that can occur when talking to the store.
#[derive(Debug, Error)]
pub enum Error
{
	/// The store received the request and rejected it, e.g. because a table
	/// is missing or permission was denied.
	#[error("store rejected the request: {0}")]
	Rejected(StoreError),

	/// An update targeted a row by ID, but the ID matched zero or several
	/// rows.
	#[error("expected exactly one matching row ({rows:?} matched)")]
	NotSingleRow
	{
		/// How many rows matched, if the store told us.
		rows: Option<u64>,
	},

	/// An update without any columns to change.
	#[error("cannot apply an empty update")]
	EmptyPatch,

	/// A table, procedure, or column name that cannot be used safely.
	#[error("invalid identifier `{0}`")]
	InvalidIdentifier(String),

	/// The store responded with something that isn't a set of rows.
	#[error("unexpected response from store: {0}")]
	UnexpectedShape(&'static str),

	/// We failed to reach the store over HTTP.
	#[error("failed to reach the store: {0}")]
	Http(#[from] reqwest::Error),

	/// A request URL could not be built.
	#[error("failed to build store url: {0}")]
	Url(#[from] url::ParseError),

	/// Something went wrong communicating with the database.
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),

	/// The store's response could not be decoded.
	#[error("failed to decode store response: {0}")]
	Decode(#[from] serde_json::Error),
}

/// An error reported by the store itself.
///
/// This mirrors the error objects returned by PostgREST, which in turn carry
/// the SQLSTATE of the underlying Postgres error as their `code`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreError
{
	/// The HTTP status code of the response, if the error came from HTTP.
	#[serde(skip)]
	pub status: Option<u16>,

	/// Machine-readable error code (a SQLSTATE or a `PGRST` code).
	#[serde(default)]
	pub code: Option<String>,

	/// Human-readable error message.
	#[serde(default)]
	pub message: String,

	/// Extra details, if any.
	#[serde(default)]
	pub details: Option<String>,

	/// A hint on how to fix the problem, if any.
	#[serde(default)]
	pub hint: Option<String>,
}

impl fmt::Display for StoreError
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		if let Some(ref code) = self.code {
			write!(f, "[{code}] ")?;
		}

		f.write_str(&self.message)?;

		if let Some(ref details) = self.details {
			write!(f, " ({details})")?;
		}

		Ok(())
	}
}
