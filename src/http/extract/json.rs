//! This module contains the [`Json`] extractor, a wrapper around [`axum::Json`]
//! with a custom error response.

use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::{ErrorResponse, IntoErrorBody};

#[allow(clippy::missing_docs_in_private_items)]
mod base
{
	pub use axum::extract::rejection::JsonRejection;
	pub use axum::Json;
}

/// An extractor for JSON request bodies.
///
/// This wraps [`axum::Json`] exactly, but produces different error responses.
#[derive(Debug, FromRequest)]
#[from_request(via(base::Json), rejection(JsonRejection))]
pub struct Json<T>(pub T);

/// Rejection for the [`Json`] extractor.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct JsonRejection(#[from] pub base::JsonRejection);

impl IntoResponse for JsonRejection
{
	fn into_response(self) -> Response
	{
		ErrorResponse::from(self).into_response()
	}
}

impl IntoErrorBody for JsonRejection
{
	fn status(&self) -> StatusCode
	{
		StatusCode::UNPROCESSABLE_ENTITY
	}

	fn code(&self) -> &'static str
	{
		match self.0 {
			base::JsonRejection::MissingJsonContentType(_) => "missing_content_type",
			_ => "invalid_request_body",
		}
	}
}
