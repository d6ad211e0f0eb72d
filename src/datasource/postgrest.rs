//! A [`DataSource`] backed by a PostgREST endpoint, such as the one every
//! Supabase project exposes under `/rest/v1`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header, HeaderValue, StatusCode};
use reqwest::RequestBuilder;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use super::{into_rows, DataSource, Error, Object, Result, Row, StoreError, TableQuery};

/// PostgREST's error code for "the result does not contain exactly one row".
const NOT_SINGLE_ROW: &str = "PGRST116";

/// Media type asking PostgREST for a single object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// An HTTP client for a PostgREST API.
#[derive(Clone)]
pub struct PostgrestClient
{
	/// The client used for making requests.
	http_client: reqwest::Client,

	/// The URL all table and procedure paths are relative to.
	rest_url: Arc<Url>,

	/// The API key sent with every request.
	api_key: Arc<str>,
}

impl fmt::Debug for PostgrestClient
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		f.debug_struct("PostgrestClient")
			.field("rest_url", &format_args!("{:?}", self.rest_url.as_str()))
			.field("api_key", &"*****")
			.finish_non_exhaustive()
	}
}

impl PostgrestClient
{
	/// Creates a new [`PostgrestClient`] for the project hosted at
	/// `project_url`.
	///
	/// Requests that take longer than `timeout` fail with [`Error::Http`].
	pub fn new(project_url: &Url, api_key: String, timeout: Duration) -> Result<Self>
	{
		let http_client = reqwest::Client::builder().timeout(timeout).build()?;
		let rest_url = with_trailing_slash(project_url).join("rest/v1/")?;

		Ok(Self { http_client, rest_url: Arc::new(rest_url), api_key: api_key.into() })
	}

	/// Builds a request to `path`, relative to the REST root.
	fn request(&self, method: reqwest::Method, path: &str) -> Result<RequestBuilder>
	{
		let url = self.rest_url.join(path)?;

		Ok(self
			.http_client
			.request(method, url)
			.header("apikey", &*self.api_key)
			.bearer_auth(&*self.api_key))
	}

	/// Sends a request and decodes the JSON response body.
	///
	/// Non-2xx responses are turned into errors.
	async fn send(&self, request: RequestBuilder) -> Result<Value>
	{
		let response = request.send().await?;
		let status = response.status();
		let body = response.bytes().await?;

		if !status.is_success() {
			let error = decode_error(status, &body);

			tracing::debug!(%status, %error, "store rejected request");

			if error.code.as_deref() == Some(NOT_SINGLE_ROW) {
				let rows = error.details.as_deref().and_then(count_rows);
				return Err(Error::NotSingleRow { rows });
			}

			return Err(Error::Rejected(error));
		}

		if body.is_empty() {
			return Ok(Value::Null);
		}

		Ok(serde_json::from_slice(&body)?)
	}
}

#[async_trait]
impl DataSource for PostgrestClient
{
	#[tracing::instrument(level = "debug", skip(self), err(Debug, level = "debug"))]
	async fn call_procedure(&self, name: &str, args: &Object) -> Result<Vec<Row>>
	{
		let request = self
			.request(reqwest::Method::POST, &format!("rpc/{name}"))?
			.json(args);

		self.send(request).await.and_then(into_rows)
	}

	#[tracing::instrument(level = "debug", skip(self), err(Debug, level = "debug"))]
	async fn select(&self, query: &TableQuery) -> Result<Vec<Row>>
	{
		let mut params = vec![(String::from("select"), String::from("*"))];

		for (column, value) in &query.filters {
			params.push((column.clone(), eq_filter(value)));
		}

		if let Some(ref order) = query.order {
			let direction = if order.descending { "desc" } else { "asc" };
			params.push((String::from("order"), format!("{}.{direction}", order.column)));
		}

		if let (Some(offset), Some(limit)) = (query.offset(), query.limit()) {
			params.push((String::from("offset"), offset.to_string()));
			params.push((String::from("limit"), limit.to_string()));
		}

		let request = self
			.request(reqwest::Method::GET, &query.table)?
			.query(&params);

		self.send(request).await.and_then(into_rows)
	}

	#[tracing::instrument(level = "debug", skip(self), err(Debug, level = "debug"))]
	async fn update_single(&self, table: &str, id: Uuid, patch: &Object) -> Result<Row>
	{
		if patch.is_empty() {
			return Err(Error::EmptyPatch);
		}

		let request = self
			.request(reqwest::Method::PATCH, table)?
			.query(&[("id", format!("eq.{id}"))])
			.header("prefer", "return=representation")
			.header(header::ACCEPT, HeaderValue::from_static(SINGLE_OBJECT))
			.json(patch);

		match self.send(request).await? {
			row @ Value::Object(_) => Ok(row),
			_ => Err(Error::UnexpectedShape("expected a single row")),
		}
	}
}

/// Ensures joining relative paths onto `url` appends rather than replaces its
/// last path segment.
fn with_trailing_slash(url: &Url) -> Url
{
	let mut url = url.clone();

	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());
		url.set_path(&path);
	}

	url
}

/// Formats `value` as a PostgREST equality filter.
fn eq_filter(value: &Value) -> String
{
	match value {
		Value::Null => String::from("is.null"),
		Value::String(string) => format!("eq.{string}"),
		other => format!("eq.{other}"),
	}
}

/// Decodes an error response body, falling back to the status text if the
/// body isn't a PostgREST error object.
fn decode_error(status: StatusCode, body: &[u8]) -> StoreError
{
	let mut error = serde_json::from_slice::<StoreError>(body).unwrap_or_else(|_| StoreError {
		status: None,
		code: None,
		message: String::from_utf8_lossy(body).into_owned(),
		details: None,
		hint: None,
	});

	if error.message.is_empty() {
		error.message = status
			.canonical_reason()
			.unwrap_or("unknown error")
			.to_owned();
	}

	error.status = Some(status.as_u16());
	error
}

/// Extracts the row count out of messages like "The result contains 0 rows".
fn count_rows(details: &str) -> Option<u64>
{
	details
		.split(|c: char| !c.is_ascii_digit())
		.find(|part| !part.is_empty())
		.and_then(|digits| digits.parse().ok())
}
