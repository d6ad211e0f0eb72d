//! Request logging using the [`Trace`] middleware from [`tower_http`].
//!
//! The configured layer contains unique function types and cannot be spelled
//! out in code, so this module exports a macro that expands to the final
//! expression instead. The functions it calls are `#[doc(hidden)]`.
//!
//! [`Trace`]: tower_http::trace::Trace

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request};
use axum::http::{header, StatusCode};
use axum::response::Response;
use tower_http::classify::ServerErrorsFailureClass;
use uuid::Uuid;

/// Creates a middleware that will log incoming HTTP requests.
///
/// Every request gets its own span with a unique ID, which is filled in with
/// the response status and latency once the response is ready.
macro_rules! layer {
	() => {
		tower_http::trace::TraceLayer::new_for_http()
			.make_span_with($crate::middleware::logging::make_span)
			.on_response($crate::middleware::logging::on_response)
			.on_failure($crate::middleware::logging::on_failure)
	};
}

pub(crate) use layer;

#[doc(hidden)]
pub(crate) fn make_span(request: &Request) -> tracing::Span
{
	let ip = request
		.extensions()
		.get::<ConnectInfo<SocketAddr>>()
		.map_or_else(|| String::from("N/A"), |ConnectInfo(addr)| addr.to_string());

	// browsers always send this for cross-origin requests
	let origin = request
		.headers()
		.get(header::ORIGIN)
		.and_then(|origin| origin.to_str().ok())
		.unwrap_or("N/A");

	tracing::info_span! {
		target: "marketplace_api::http",
		"request",
		request.id = %Uuid::now_v7(),
		request.ip = %ip,
		request.method = %request.method(),
		request.uri = %request.uri(),
		request.origin = %origin,
		response.status = tracing::field::Empty,
		latency = tracing::field::Empty,
	}
}

#[doc(hidden)]
pub(crate) fn on_response(response: &Response, latency: Duration, span: &tracing::Span)
{
	span.record("response.status", response.status().as_u16())
		.record("latency", format_args!("{latency:?}"));

	tracing::debug!(target: "marketplace_api::http", status = %response.status(), "sending response");
}

#[doc(hidden)]
pub(crate) fn on_failure(
	failure: ServerErrorsFailureClass,
	_latency: Duration,
	_span: &tracing::Span,
)
{
	match failure {
		ServerErrorsFailureClass::Error(error) => {
			tracing::error!(target: "marketplace_api::audit_log", %error, "request failed");
		}

		// the store failed us, not the other way around
		ServerErrorsFailureClass::StatusCode(StatusCode::BAD_GATEWAY) => {
			tracing::warn!(target: "marketplace_api::audit_log", "store rejected request");
		}

		ServerErrorsFailureClass::StatusCode(status) => {
			tracing::error!(target: "marketplace_api::audit_log", %status, "request failed");
		}
	}
}
