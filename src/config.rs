//! Module containing the [`Config`] struct, the API's configuration.

use std::env;
use std::error::Error as StdError;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use derive_more::Debug;
use url::Url;

/// The address the API listens on if none is configured.
const DEFAULT_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// The port the API listens on if none is configured.
const DEFAULT_PORT: u16 = 3000;

/// How long to wait for the store if no timeout is configured.
const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration values for the API.
///
/// These are read from the environment on startup.
#[derive(Debug, Clone)]
pub struct Config
{
	/// The ip address and port the API is going to listen on.
	#[debug("{addr}")]
	pub addr: SocketAddr,

	/// The store listings and courses are read from.
	pub data_source: DataSourceConfig,

	/// How long to wait for the store before giving up on a request.
	pub store_timeout: Duration,

	/// Directory to write log files to, in addition to stderr.
	pub log_dir: Option<PathBuf>,
}

/// The store the API talks to.
#[derive(Debug, Clone)]
pub enum DataSourceConfig
{
	/// A Supabase project, accessed through its PostgREST API.
	Postgrest
	{
		/// The project URL.
		#[debug("{}", url.as_str())]
		url: Url,

		/// The project's anonymous API key.
		#[debug("*****")]
		api_key: String,
	},

	/// A Postgres database, accessed directly.
	Postgres
	{
		/// The connection URL, which usually contains a password.
		#[debug("*****")]
		url: Url,
	},
}

impl Config
{
	/// Creates a new [`Config`] object by reading from the environment.
	pub fn new() -> anyhow::Result<Self>
	{
		let ip_addr = parse_from_env_opt("MARKETPLACE_API_IP")?.unwrap_or(DEFAULT_IP);
		let port = parse_from_env_opt("MARKETPLACE_API_PORT")?.unwrap_or(DEFAULT_PORT);
		let addr = SocketAddr::new(ip_addr, port);
		let data_source = DataSourceConfig::new()?;
		let store_timeout = parse_from_env_opt("MARKETPLACE_API_STORE_TIMEOUT")?
			.map_or(DEFAULT_STORE_TIMEOUT, Duration::from_secs);
		let log_dir = parse_from_env_opt("MARKETPLACE_API_LOG_DIR")?;

		Ok(Self { addr, data_source, store_timeout, log_dir })
	}
}

impl DataSourceConfig
{
	/// Picks the store from the environment.
	///
	/// A Supabase project takes precedence over a direct database connection.
	fn new() -> anyhow::Result<Self>
	{
		if let Some(url) = parse_from_env_opt("SUPABASE_URL")? {
			let api_key = parse_from_env("SUPABASE_ANON_KEY")?;
			return Ok(Self::Postgrest { url, api_key });
		}

		if let Some(url) = parse_from_env_opt("DATABASE_URL")? {
			return Ok(Self::Postgres { url });
		}

		anyhow::bail!("either `SUPABASE_URL` or `DATABASE_URL` must be set");
	}
}

/// Parses an environment variable into a `T`.
fn parse_from_env<T>(var: &str) -> anyhow::Result<T>
where
	T: FromStr,
	T::Err: StdError + Send + Sync + 'static,
{
	let value = env::var(var).with_context(|| format!("missing `{var}` environment variable"))?;

	if value.is_empty() {
		anyhow::bail!("`{var}` cannot be empty");
	}

	<T as FromStr>::from_str(&value).with_context(|| format!("failed to parse `{var}`"))
}

/// Parses an environment variable into an `Option<T>`, returning `None` if the variable is not
/// set or empty.
fn parse_from_env_opt<T>(var: &str) -> anyhow::Result<Option<T>>
where
	T: FromStr,
	T::Err: StdError + Send + Sync + 'static,
{
	let Some(value) = env::var(var).ok() else {
		return Ok(None);
	};

	if value.is_empty() {
		return Ok(None);
	}

	<T as FromStr>::from_str(&value)
		.map(Some)
		.with_context(|| format!("failed to parse `{var}`"))
}
