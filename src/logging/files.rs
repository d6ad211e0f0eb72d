//! JSON logs in daily rotating files.

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::registry::LookupSpan;

/// Prefix of every log file's name; the date is appended to it.
const FILE_PREFIX: &str = "marketplace-api";

/// Creates a tracing layer that will write one JSON object per event to
/// files in `log_dir`, creating the directory if necessary.
///
/// The returned [`WorkerGuard`] flushes buffered logs when dropped, so it must
/// be kept alive until the application shuts down.
pub fn layer<S>(log_dir: &Path) -> anyhow::Result<(impl tracing_subscriber::Layer<S>, WorkerGuard)>
where
	S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
	fs::create_dir_all(log_dir)
		.with_context(|| format!("create log dir `{}`", log_dir.display()))?;

	let appender = tracing_appender::rolling::Builder::new()
		.rotation(Rotation::DAILY)
		.filename_prefix(FILE_PREFIX)
		.filename_suffix("log")
		.build(log_dir)
		.context("initialize file appender")?;

	let (writer, guard) = tracing_appender::non_blocking(appender);

	let layer = tracing_subscriber::fmt::layer()
		.json()
		.with_current_span(true)
		.with_span_list(false)
		.with_file(true)
		.with_line_number(true)
		.with_target(true)
		.with_writer(writer);

	Ok((layer, guard))
}
