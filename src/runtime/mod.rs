//! This module contains code relevant to the API's runtime, such as signal
//! handlers and the panic hook.

pub mod signals;
pub mod panic_hook;
