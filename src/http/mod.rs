//! HTTP plumbing shared by all services.

pub mod envelope;
pub use envelope::{Envelope, ErrorBody, ErrorResponse, IntoErrorBody};

pub mod extract;
