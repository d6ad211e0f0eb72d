//! A very basic service that greets whoever asks.
//!
//! It doubles as a healthcheck: if it responds, the API is up.

use std::fmt;

use serde::Serialize;

pub(crate) mod http;

/// A service that simply responds if the API is healthy.
#[derive(Clone, Copy)]
pub struct HealthService {}

impl fmt::Debug for HealthService
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		f.debug_struct("HealthService").finish_non_exhaustive()
	}
}

/// Response payload for the API root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct Welcome
{
	/// A greeting, pointing at the API documentation.
	pub message: &'static str,
}

impl HealthService
{
	/// Create a new [`HealthService`].
	#[tracing::instrument]
	pub fn new() -> Self
	{
		Self {}
	}

	/// Says hello to the world.
	#[tracing::instrument(level = "debug")]
	pub fn hello(&self) -> Welcome
	{
		Welcome { message: "Welcome to the Marketplace API - docs are at /docs/swagger-ui" }
	}
}
