//! Log capturing facilities.
//!
//! Logs are always written to stderr. If a log directory is configured, they
//! are additionally written to daily rotating files in that directory.

use std::path::Path;

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

mod stderr;
mod files;

/// The filter used if `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "marketplace_api=info";

/// Keeps the file logger alive.
#[derive(Debug)]
pub struct Guard
{
	/// The guard returned by [`tracing-appender`]'s logging thread.
	#[allow(dead_code)]
	appender_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Initializes [`tracing-subscriber`].
///
/// NOTE: the returned [`Guard`] will perform cleanup for the tracing layer that
/// emits logs to files, which means it has to stay alive until the program
/// exits!
pub fn init(log_dir: Option<&Path>) -> anyhow::Result<Guard>
{
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

	let (files, appender_guard) = match log_dir {
		None => (None, None),
		Some(log_dir) => {
			let (layer, guard) = files::layer(log_dir).context("initialize files tracing layer")?;
			(Some(layer), Some(guard))
		}
	};

	let layer = Layer::and_then(stderr::layer(), files).with_filter(filter);

	tracing_subscriber::registry()
		.with(layer)
		.try_init()
		.context("install global subscriber")?;

	tracing::info!("initialized tracing");

	Ok(Guard { appender_guard })
}
