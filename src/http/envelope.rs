//! The `{ data, error }` envelope every JSON response is wrapped in.
//!
//! Successful responses set `data` and leave `error` as `null`; failed
//! responses do the opposite. An [`ErrorResponse`] can be created from any
//! error type implementing [`IntoErrorBody`].

use std::panic::Location;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// A JSON response body.
#[derive(Debug, Serialize)]
pub struct Envelope<T>
{
	/// The payload, if the request succeeded.
	pub data: Option<T>,

	/// Information about the failure, if the request failed.
	pub error: Option<ErrorBody>,
}

impl<T> Envelope<T>
{
	/// Wraps a successful payload.
	pub const fn data(data: T) -> Self
	{
		Self { data: Some(data), error: None }
	}
}

impl<T> IntoResponse for Envelope<T>
where
	T: Serialize,
{
	fn into_response(self) -> Response
	{
		axum::Json(self).into_response()
	}
}

/// The `error` half of an [`Envelope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ErrorBody
{
	/// Machine-readable error code, e.g. `course_not_found`.
	pub code: &'static str,

	/// Human-readable error message.
	pub message: String,
}

/// A trait for turning error types into HTTP error responses.
pub trait IntoErrorBody: std::error::Error
{
	/// The HTTP status code of the response.
	fn status(&self) -> StatusCode;

	/// The machine-readable error code.
	fn code(&self) -> &'static str;
}

/// An error response: a status code and an [`Envelope`] without data.
#[derive(Debug)]
pub struct ErrorResponse
{
	/// The HTTP status code.
	status: StatusCode,

	/// The response body.
	body: ErrorBody,
}

impl ErrorResponse
{
	/// The HTTP status code of this response.
	pub const fn status(&self) -> StatusCode
	{
		self.status
	}

	/// The error carried by this response.
	pub const fn body(&self) -> &ErrorBody
	{
		&self.body
	}
}

impl<E> From<E> for ErrorResponse
where
	E: IntoErrorBody,
{
	#[track_caller]
	fn from(error: E) -> Self
	{
		tracing::debug!(loc = %Location::caller(), ?error, "creating error response");

		let status = error.status();
		let body = ErrorBody { code: error.code(), message: error.to_string() };

		Self { status, body }
	}
}

impl IntoResponse for ErrorResponse
{
	fn into_response(self) -> Response
	{
		let envelope = Envelope::<()> { data: None, error: Some(self.body) };

		(self.status, envelope).into_response()
	}
}

/// Trait implementations for [`utoipa`].
mod utoipa_impls
{
	use std::collections::BTreeMap;

	use utoipa::openapi::response::{Response, ResponseBuilder, ResponsesBuilder};
	use utoipa::openapi::RefOr;
	use utoipa::IntoResponses;

	use super::ErrorResponse;

	impl IntoResponses for ErrorResponse
	{
		fn responses() -> BTreeMap<String, RefOr<Response>>
		{
			let responses = [
				("400", "the request would not change anything"),
				("404", "the requested resource does not exist"),
				("422", "the request could not be decoded"),
				("500", "something unexpected happened"),
				("502", "the data store failed"),
			]
			.map(|(code, description)| {
				(code, ResponseBuilder::new().description(description).build())
			});

			ResponsesBuilder::new()
				.responses_from_iter(responses)
				.build()
				.into()
		}
	}
}
