//! The Marketplace API.

use anyhow::Context;
use marketplace_api::{logging, runtime, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()>
{
	if let Err(error) = dotenvy::dotenv() {
		eprintln!("WARNING: failed to load `.env` file: {error}");
	}

	let config = Config::new().context("load config")?;
	let _guard = logging::init(config.log_dir.as_deref()).context("initialize logging")?;

	runtime::panic_hook::install();

	tracing::debug!(?config, "starting up");

	marketplace_api::run(config).await
}
