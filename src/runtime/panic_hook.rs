//! This module contains a function that will install a global panic hook.
//!
//! See [`std::panic::set_hook()`] for more details.

use std::backtrace::Backtrace;
use std::{panic, thread};

/// Installs a global panic hook that logs panics, including where they
/// happened and a backtrace.
///
/// The previous hook will be invoked afterwards.
#[tracing::instrument(target = "marketplace_api::runtime", name = "panic_hook")]
pub fn install()
{
	let old_hook = panic::take_hook();

	panic::set_hook(Box::new(move |info| {
		let backtrace = Backtrace::force_capture();
		let location = info.location().map(ToString::to_string);
		let thread = thread::current();

		tracing::error! {
			target: "marketplace_api::audit_log",
			thread = thread.name().unwrap_or("<unnamed>"),
			location = location.as_deref().unwrap_or("<unknown>"),
			"{info}\n---\nbacktrace:\n{backtrace}"
		};

		old_hook(info);
	}));

	tracing::info!("installed panic hook");
}
