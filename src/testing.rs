//! This module contains helpers for unit/integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::datasource::{self, DataSource, Object, Row, StoreError, TableQuery};
use crate::services::MarketplaceService;

/// What a [`FakeDataSource`] does when one of its methods is called.
#[derive(Debug, Clone)]
pub enum Outcome
{
	/// Return these rows.
	///
	/// Updates succeed only if there is exactly one row.
	Rows(Vec<Row>),

	/// Fail as if the store rejected the request.
	Reject,

	/// Panic with this message.
	Panic(&'static str),
}

/// A call made to a [`FakeDataSource`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call
{
	Procedure
	{
		name: String,
		args: Object,
	},
	Select(TableQuery),
	Update
	{
		table: String,
		id: Uuid,
		patch: Object,
	},
}

/// A scripted [`DataSource`] that records every call made to it.
#[derive(Debug)]
pub struct FakeDataSource
{
	procedure: Outcome,
	select: Outcome,
	update: Outcome,
	calls: Mutex<Vec<Call>>,
}

impl FakeDataSource
{
	/// Creates a data source that rejects everything.
	pub fn new() -> Self
	{
		Self {
			procedure: Outcome::Reject,
			select: Outcome::Reject,
			update: Outcome::Reject,
			calls: Mutex::default(),
		}
	}

	pub fn with_procedure(self, procedure: Outcome) -> Self
	{
		Self { procedure, ..self }
	}

	pub fn with_select(self, select: Outcome) -> Self
	{
		Self { select, ..self }
	}

	pub fn with_update(self, update: Outcome) -> Self
	{
		Self { update, ..self }
	}

	/// Returns every call made so far.
	pub fn calls(&self) -> Vec<Call>
	{
		self.calls.lock().unwrap().clone()
	}

	fn record(&self, call: Call)
	{
		self.calls.lock().unwrap().push(call);
	}

	fn rows(outcome: &Outcome) -> datasource::Result<Vec<Row>>
	{
		match outcome {
			Outcome::Rows(rows) => Ok(rows.clone()),
			Outcome::Reject => Err(datasource::Error::Rejected(StoreError {
				status: Some(404),
				code: Some(String::from("42P01")),
				message: String::from("relation does not exist"),
				details: None,
				hint: None,
			})),
			Outcome::Panic(message) => panic!("{message}"),
		}
	}
}

#[async_trait]
impl DataSource for FakeDataSource
{
	async fn call_procedure(&self, name: &str, args: &Object) -> datasource::Result<Vec<Row>>
	{
		self.record(Call::Procedure { name: name.to_owned(), args: args.clone() });
		Self::rows(&self.procedure)
	}

	async fn select(&self, query: &TableQuery) -> datasource::Result<Vec<Row>>
	{
		self.record(Call::Select(query.clone()));
		Self::rows(&self.select)
	}

	async fn update_single(&self, table: &str, id: Uuid, patch: &Object) -> datasource::Result<Row>
	{
		self.record(Call::Update { table: table.to_owned(), id, patch: patch.clone() });

		let mut rows = Self::rows(&self.update)?;

		match (rows.pop(), rows.len()) {
			(Some(row), 0) => Ok(row),
			(None, _) => Err(datasource::Error::NotSingleRow { rows: Some(0) }),
			(Some(_), more) => Err(datasource::Error::NotSingleRow {
				rows: u64::try_from(more + 1).ok(),
			}),
		}
	}
}

/// Creates a [`MarketplaceService`] backed by `data_source`.
pub fn marketplace_svc(data_source: &Arc<FakeDataSource>) -> MarketplaceService
{
	let data_source: Arc<FakeDataSource> = Arc::clone(data_source);

	MarketplaceService::new(data_source)
}

/// A complete listing row, as the store would return it.
pub fn listing_json(n: u128, category: &str, featured: bool) -> Value
{
	json!({
		"id": Uuid::from_u128(n),
		"course_id": Uuid::from_u128(n + 1000),
		"organization_id": Uuid::from_u128(1),
		"title": format!("Course {n}"),
		"description": "A course from the store.",
		"logo": "/logo.png",
		"banner_image": "/banner.png",
		"cost": 1000,
		"currency": "USD",
		"slug": format!("course-{n}"),
		"is_active": true,
		"featured": featured,
		"category": category,
		"tags": ["store"],
		"rating": 4.5,
		"review_count": 10,
		"enrollment_count": 100,
		"organization_name": "Store Academy",
		"created_at": "2024-01-01T00:00:00Z",
	})
}

/// Global constructor that will run before tests.
#[ctor::ctor]
fn ctor()
{
	use tracing_subscriber::fmt::format::FmtSpan;
	use tracing_subscriber::EnvFilter;

	color_eyre::install().expect("failed to install color-eyre");
	tracing_subscriber::fmt()
		.compact()
		.with_ansi(true)
		.with_file(true)
		.with_level(true)
		.with_line_number(true)
		.with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
		.with_target(true)
		.with_test_writer()
		.with_thread_ids(true)
		.with_thread_names(true)
		.with_env_filter(EnvFilter::from_default_env())
		.init();
}

macro_rules! assert {
	($expr:expr $(, $($msg:tt)*)?) => {
		::color_eyre::eyre::ensure!($expr $(, $($msg)*)?)
	};
}

macro_rules! assert_eq {
	($lhs:expr, $rhs:expr $(,)?) => {
		match (&$lhs, &$rhs) {
			(lhs, rhs) => {
				if lhs != rhs {
					::color_eyre::eyre::bail!(
						"assertion `{} == {}` failed\n  lhs: {:?}\n  rhs: {:?}",
						stringify!($lhs),
						stringify!($rhs),
						lhs,
						rhs,
					);
				}
			}
		}
	};
}

macro_rules! assert_matches {
	($expr:expr, $pat:pat $(if $cond:expr)? $(,)?) => {
		::color_eyre::eyre::ensure!(
			matches!($expr, $pat $(if $cond)?),
			"`{}` does not match `{}`",
			stringify!($expr),
			stringify!($pat),
		)
	};
}

pub(crate) use {assert, assert_eq, assert_matches};
