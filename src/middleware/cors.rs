//! CORS middleware.

use std::time::Duration;

use axum::http::{header, HeaderName, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Header carrying the deployed revision, exposed to browsers.
static REVISION: HeaderName = HeaderName::from_static("x-kuma-revision");

/// How long browsers may cache preflight responses.
const MAX_AGE: Duration = Duration::from_secs(600);

/// Creates a CORS layer that allows credentialed requests from any origin.
///
/// The request's origin is mirrored back, as browsers refuse credentials for
/// a wildcard origin.
pub fn layer() -> CorsLayer
{
	CorsLayer::new()
		.allow_origin(AllowOrigin::mirror_request())
		.allow_credentials(true)
		.allow_methods([
			Method::GET,
			Method::POST,
			Method::PUT,
			Method::PATCH,
			Method::DELETE,
			Method::OPTIONS,
		])
		.allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
		.expose_headers([header::CONTENT_LENGTH, REVISION.clone()])
		.max_age(MAX_AGE)
}

#[cfg(test)]
mod tests
{
	use std::sync::Arc;

	use axum::body::Body;
	use axum::http::{header, Method, Request, StatusCode};
	use tower::ServiceExt;

	use crate::testing::{self, FakeDataSource};

	#[tokio::test]
	async fn preflight_mirrors_origin() -> color_eyre::Result<()>
	{
		let request = Request::builder()
			.method(Method::OPTIONS)
			.uri("/marketplace/courses/0192d8c4-6ac0-7bd3-9d24-4b0d5f2a1c3e")
			.header(header::ORIGIN, "https://app.example.org")
			.header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
			.body(Body::empty())?;

		let response = crate::router(Arc::new(FakeDataSource::new()))
			.oneshot(request)
			.await?;

		let headers = response.headers();

		testing::assert_eq!(response.status(), StatusCode::OK);
		testing::assert_eq!(
			headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).map(|value| value.as_bytes()),
			Some(&b"https://app.example.org"[..])
		);
		testing::assert_eq!(
			headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).map(|value| value.as_bytes()),
			Some(&b"true"[..])
		);
		testing::assert_eq!(
			headers.get(header::ACCESS_CONTROL_MAX_AGE).map(|value| value.as_bytes()),
			Some(&b"600"[..])
		);

		Ok(())
	}
}
