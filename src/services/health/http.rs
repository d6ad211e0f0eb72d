//! HTTP handlers for this service.

use axum::extract::State;
use axum::{routing, Router};

use super::{HealthService, Welcome};
use crate::http::Envelope;

impl From<HealthService> for Router
{
	fn from(svc: HealthService) -> Self
	{
		Router::new().route("/", routing::get(get)).with_state(svc)
	}
}

/// (͡ ͡° ͜ つ ͡͡°)
#[tracing::instrument]
#[utoipa::path(get, path = "/", tag = "Health", responses(
  (status = OK, description = "The API is healthy.", body = Welcome),
))]
pub(crate) async fn get(State(svc): State<HealthService>) -> Envelope<Welcome>
{
	Envelope::data(svc.hello())
}
