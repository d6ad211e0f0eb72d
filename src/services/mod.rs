//! API services.
//!
//! These contain the core business logic.
//!
//! If a service directly maps to an HTTP route, it will have an `http` module
//! containing the handlers and an `Into<axum::Router>` implementation.

pub mod health;
pub use health::HealthService;

pub mod marketplace;
pub use marketplace::MarketplaceService;
