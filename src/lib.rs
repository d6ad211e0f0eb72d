#![doc = include_str!("../README.md")]

use std::fmt::Write;
use std::future::{self, Future};
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

mod config;
pub use config::{Config, DataSourceConfig};

pub mod datasource;
pub mod http;
pub mod logging;
pub mod middleware;
pub mod num;
pub mod openapi;
pub mod runtime;
pub mod services;

mod macros;

#[cfg(test)]
mod testing;

use datasource::{DataSource, PostgresClient, PostgrestClient};
use services::{HealthService, MarketplaceService};

/// Run the API.
///
/// This function will not exit until a SIGINT signal is received.
/// If you want to supply a custom signal for graceful shutdown, use [`run_until()`] instead.
pub async fn run(config: Config) -> anyhow::Result<()>
{
	run_until(config, future::pending()).await
}

/// Run the API until a given future completes.
///
/// This function is the same as [`run()`], except that it also waits for the provided `until`
/// future, and shuts down the server when that future resolves.
pub async fn run_until<Until>(config: Config, until: Until) -> anyhow::Result<()>
where
	Until: Future<Output = ()> + Send + 'static,
{
	let (tcp_listener, router) = server(config).await?;

	axum::serve(tcp_listener, router.into_make_service_with_connect_info::<SocketAddr>())
		.with_graceful_shutdown(async move {
			tokio::select! {
				() = until => {}
				() = runtime::signals::sigint() => {}
			}
		})
		.await
		.context("run http server")
}

/// Builds the API's [`Router`] on top of the given store.
///
/// This is everything the server does, minus the TCP listener.
pub fn router(data_source: Arc<dyn DataSource>) -> Router
{
	Router::new()
		.merge(Router::from(HealthService::new()))
		.nest("/marketplace", Router::from(MarketplaceService::new(data_source)))
		.nest("/docs", openapi::router())
		.layer(middleware::logging::layer!())
		.layer(middleware::cors::layer())
}

/// Creates the store described by `config`.
pub fn data_source(config: &Config) -> anyhow::Result<Arc<dyn DataSource>>
{
	match config.data_source {
		DataSourceConfig::Postgrest { ref url, ref api_key } => {
			let client = PostgrestClient::new(url, api_key.clone(), config.store_timeout)
				.context("initialize PostgREST client")?;

			Ok(Arc::new(client))
		}
		DataSourceConfig::Postgres { ref url } => {
			let client = PostgresClient::connect(url.as_str(), config.store_timeout)
				.context("initialize database pool")?;

			Ok(Arc::new(client))
		}
	}
}

/// Binds the TCP listener and builds the router.
///
/// See [`run()`] and [`run_until()`].
async fn server(config: Config) -> anyhow::Result<(TcpListener, Router)>
{
	tracing::debug!(addr = %config.addr, "establishing TCP connection");

	let tcp_listener = TcpListener::bind(config.addr)
		.await
		.context("bind tcp socket")?;

	let addr = tcp_listener.local_addr().context("get tcp addr")?;
	tracing::info!(%addr, "listening for requests");

	let data_source = data_source(&config)?;
	let mut routes_message = String::from("registering routes:\n");

	for path in openapi::schema().paths.paths.keys() {
		writeln!(&mut routes_message, "    • {path}")?;
	}

	tracing::info!("{routes_message}");
	tracing::info!("SwaggerUI is available at <http://{addr}/docs/swagger-ui>");

	Ok((tcp_listener, router(data_source)))
}
