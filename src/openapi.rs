//! OpenAPI documentation for the API.
//!
//! The schema is generated from code using [`utoipa`] and served alongside a
//! SwaggerUI page under `/docs`.

use std::sync::{Arc, LazyLock};

use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{routing, Json, Router};
use utoipa::openapi::OpenApi;

/// The generated schema.
static SCHEMA: LazyLock<OpenApi> = LazyLock::new(schema);

/// SwaggerUI configuration.
static CONFIG: LazyLock<Arc<utoipa_swagger_ui::Config<'static>>> = LazyLock::new(|| {
	let config = utoipa_swagger_ui::Config::from("/docs/openapi.json")
		.display_operation_id(true)
		.use_base_layout()
		.display_request_duration(true)
		.filter(true)
		.with_credentials(true);

	Arc::new(config)
});

#[derive(Debug, utoipa::OpenApi)]
#[openapi(
  info(
    title = "Marketplace API",
    description = "Course listings for the LMS marketplace.",
  ),
  tags(
    (name = "Health"),
    (name = "Marketplace", description = "published courses, their categories, and their settings"),
  ),
  components(
    schemas(
      crate::http::ErrorBody,
      crate::services::marketplace::Category,
      crate::services::marketplace::CourseRecord,
      crate::services::marketplace::CourseUpdate,
      crate::services::marketplace::MarketplaceCourse,
      crate::services::marketplace::UpdateCourseStatusPayload,
    ),
  ),
  paths(
    crate::services::health::http::get,

    crate::services::marketplace::http::get_courses,
    crate::services::marketplace::http::get_categories,
    crate::services::marketplace::http::update_course_status,
    crate::services::marketplace::http::update_course,
  ),
)]
#[allow(clippy::missing_docs_in_private_items)]
pub struct Schema;

/// Generates the OpenAPI schema.
pub fn schema() -> OpenApi
{
	<Schema as utoipa::OpenApi>::openapi()
}

/// Returns a router serving the schema and SwaggerUI.
pub(crate) fn router<S>() -> Router<S>
where
	S: Clone + Send + Sync + 'static,
{
	Router::new()
		.route("/openapi.json", routing::get(serve_openapi_json))
		.route("/swagger-ui", routing::get(|| async { Redirect::permanent("/docs/swagger-ui/") }))
		.route("/swagger-ui/", routing::get(serve_swagger_ui))
		.route("/swagger-ui/{*rest}", routing::get(serve_swagger_ui))
}

/// Serves the OpenAPI schema as JSON.
async fn serve_openapi_json() -> Response
{
	Json(&*SCHEMA).into_response()
}

/// Serves SwaggerUI's static files.
#[tracing::instrument(level = "debug")]
async fn serve_swagger_ui(path: Option<Path<String>>) -> Response
{
	let tail = match path {
		None => "",
		Some(Path(ref path)) => path.as_str(),
	};

	match utoipa_swagger_ui::serve(tail, Arc::clone(&*CONFIG)) {
		Ok(None) => StatusCode::NOT_FOUND.into_response(),
		Ok(Some(file)) => ([(header::CONTENT_TYPE, file.content_type)], file.bytes.into_owned())
			.into_response(),
		Err(error) => {
			tracing::error!(%error, "failed to serve SwaggerUI file");
			StatusCode::INTERNAL_SERVER_ERROR.into_response()
		}
	}
}
