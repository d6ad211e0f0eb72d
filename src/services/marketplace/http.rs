//! HTTP handlers for this service.

use axum::extract::State;
use axum::{routing, Router};

use super::{
	Category,
	CourseID,
	CourseRecord,
	CourseUpdate,
	FetchCoursesRequest,
	Listings,
	MarketplaceCourse,
	MarketplaceService,
	ToggleCourseStatusRequest,
	UpdateCourseRequest,
	UpdateCourseStatusPayload,
};
use crate::http::extract::{Json, Path, Query};
use crate::http::{Envelope, ErrorResponse};

impl From<MarketplaceService> for Router
{
	fn from(svc: MarketplaceService) -> Self
	{
		Router::new()
			.route("/courses", routing::get(get_courses))
			.route("/courses/{course_id}", routing::patch(update_course))
			.route("/courses/{course_id}/status", routing::patch(update_course_status))
			.route("/categories", routing::get(get_categories))
			.with_state(svc)
	}
}

/// Returns marketplace listings.
///
/// Rows from the store's listings procedure are returned exactly as stored.
/// If the store is unavailable, a set of built-in listings is returned.
#[tracing::instrument(skip(svc))]
#[utoipa::path(
  get,
  path = "/marketplace/courses",
  tag = "Marketplace",
  params(FetchCoursesRequest),
  responses(
    (status = 200, body = Vec<MarketplaceCourse>, description = "`data` contains the listings"),
    (status = 422, description = "invalid query parameters"),
  ),
)]
pub(crate) async fn get_courses(
	State(svc): State<MarketplaceService>,
	Query(req): Query<FetchCoursesRequest>,
) -> Envelope<Listings>
{
	Envelope::data(svc.fetch_courses(req).await)
}

/// Returns the categories listings can be filtered by.
#[tracing::instrument(skip(svc))]
#[utoipa::path(
  get,
  path = "/marketplace/categories",
  tag = "Marketplace",
  responses(
    (status = 200, body = Vec<Category>, description = "`data` contains the categories"),
  ),
)]
pub(crate) async fn get_categories(State(svc): State<MarketplaceService>) -> Envelope<Vec<Category>>
{
	Envelope::data(svc.fetch_categories())
}

/// Lists or unlists a course on the marketplace.
#[tracing::instrument(skip(svc), err(Debug, level = "debug"))]
#[utoipa::path(
  patch,
  path = "/marketplace/courses/{course_id}/status",
  tag = "Marketplace",
  params(("course_id" = CourseID, Path, description = "a course's ID")),
  request_body = UpdateCourseStatusPayload,
  responses(
    (status = 200, body = CourseRecord, description = "`data` contains the updated course"),
    ErrorResponse,
  ),
)]
pub(crate) async fn update_course_status(
	State(svc): State<MarketplaceService>,
	Path(course_id): Path<CourseID>,
	Json(payload): Json<UpdateCourseStatusPayload>,
) -> Result<Envelope<CourseRecord>, ErrorResponse>
{
	let req = ToggleCourseStatusRequest { course_id, is_active: payload.is_active };
	let record = svc.toggle_course_status(req).await?;

	Ok(Envelope::data(record))
}

/// Updates a course's title, description, or price.
#[tracing::instrument(skip(svc), err(Debug, level = "debug"))]
#[utoipa::path(
  patch,
  path = "/marketplace/courses/{course_id}",
  tag = "Marketplace",
  params(("course_id" = CourseID, Path, description = "a course's ID")),
  request_body = CourseUpdate,
  responses(
    (status = 200, body = CourseRecord, description = "`data` contains the updated course"),
    ErrorResponse,
  ),
)]
pub(crate) async fn update_course(
	State(svc): State<MarketplaceService>,
	Path(course_id): Path<CourseID>,
	Json(update): Json<CourseUpdate>,
) -> Result<Envelope<CourseRecord>, ErrorResponse>
{
	let record = svc
		.update_course(UpdateCourseRequest { course_id, update })
		.await?;

	Ok(Envelope::data(record))
}
