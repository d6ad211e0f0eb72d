//! The errors that can occur when interacting with this service.

use axum::http::StatusCode;
use thiserror::Error;

use super::CourseID;
use crate::datasource;
use crate::http::IntoErrorBody;

/// Type alias with a default `Err` type of [`Error`].
///
/// [`Error`]: enum@Error
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The errors that can occur when interacting with the marketplace service.
#[derive(Debug, Error)]
pub enum Error
{
	/// A request targeted at a specific course was made, but the course
	/// could not be found.
	#[error("course `{course_id}` does not exist")]
	CourseNotFound
	{
		/// The ID of the course.
		course_id: CourseID,
	},

	/// An update request did not contain any fields to change.
	#[error("no fields to update")]
	NoChanges,

	/// Something went wrong communicating with the data store.
	#[error("the data store failed to handle the request")]
	DataSource(#[from] datasource::Error),

	/// Something unexpected happened, e.g. a panic while talking to the store.
	#[error("something unexpected happened")]
	Unexpected
	{
		/// What went wrong.
		reason: String,
	},
}

impl IntoErrorBody for Error
{
	fn status(&self) -> StatusCode
	{
		match self {
			Self::CourseNotFound { .. } => StatusCode::NOT_FOUND,
			Self::NoChanges => StatusCode::BAD_REQUEST,
			Self::DataSource(_) => StatusCode::BAD_GATEWAY,
			Self::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn code(&self) -> &'static str
	{
		match self {
			Self::CourseNotFound { .. } => "course_not_found",
			Self::NoChanges => "no_changes",
			Self::DataSource(_) => "data_source_error",
			Self::Unexpected { .. } => "unexpected",
		}
	}
}
