//! A service for the course marketplace.
//!
//! Listings are resolved in tiers. The store's `get_marketplace_courses`
//! procedure is tried first; if that fails, the listing table is queried
//! directly and its rows are normalized; if that fails too, a small set of
//! built-in listings is served. Reading listings therefore never fails.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use itertools::Itertools;

use crate::datasource::{self, DataSource, Object, Row, TableQuery};

pub(crate) mod http;

mod error;
pub use error::{Error, Result};

pub(crate) mod models;
pub use models::{
	Category,
	CourseID,
	CourseRecord,
	CourseUpdate,
	Currency,
	FetchCoursesRequest,
	ListingID,
	Listings,
	MarketplaceCourse,
	OrganizationID,
	Rating,
	ToggleCourseStatusRequest,
	UpdateCourseRequest,
	UpdateCourseStatusPayload,
};

mod categories;
mod fallback;

/// The procedure returning marketplace listings.
const LISTINGS_PROCEDURE: &str = "get_marketplace_courses";

/// The table containing marketplace listings.
const LISTINGS_TABLE: &str = "marketplace_course";

/// The table containing courses.
const COURSES_TABLE: &str = "course";

/// A service for the course marketplace.
#[derive(Clone)]
pub struct MarketplaceService
{
	/// The store listings and courses are read from.
	data_source: Arc<dyn DataSource>,
}

impl fmt::Debug for MarketplaceService
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		f.debug_struct("MarketplaceService").finish_non_exhaustive()
	}
}

/// Where a set of listings came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier
{
	/// The listings procedure.
	Procedure,

	/// A direct query against the listing table.
	Table,

	/// The built-in listings.
	Fallback,
}

/// The result of resolving listings.
#[derive(Debug)]
pub struct ResolvedCourses
{
	/// The tier that produced `courses`.
	pub tier: Tier,

	/// The listings.
	pub courses: Listings,
}

impl MarketplaceService
{
	/// Create a new [`MarketplaceService`].
	#[tracing::instrument(skip(data_source))]
	pub fn new(data_source: Arc<dyn DataSource>) -> Self
	{
		Self { data_source }
	}

	/// Fetches marketplace listings.
	///
	/// This never fails; if the store cannot provide any listings, the
	/// built-in ones are returned instead.
	#[tracing::instrument(level = "debug", skip(self))]
	pub async fn fetch_courses(&self, req: FetchCoursesRequest) -> Listings
	{
		self.resolve(&req).await.courses
	}

	/// Fetches marketplace listings and reports which tier produced them.
	pub async fn resolve(&self, req: &FetchCoursesRequest) -> ResolvedCourses
	{
		match AssertUnwindSafe(self.resolve_live(req)).catch_unwind().await {
			Ok(Some(resolved)) => resolved,
			Ok(None) => {
				tracing::warn!("store unavailable; serving built-in listings");
				Self::serve_fallback(req)
			}
			Err(payload) => {
				tracing::error!(
					reason = panic_message(&*payload),
					"panicked while resolving listings; serving built-in listings"
				);

				Self::serve_fallback(req)
			}
		}
	}

	/// Serves the built-in listings.
	fn serve_fallback(req: &FetchCoursesRequest) -> ResolvedCourses
	{
		ResolvedCourses { tier: Tier::Fallback, courses: Listings::Normalized(fallback::courses(req)) }
	}

	/// Fetches the categories listings can be filtered by.
	#[tracing::instrument(level = "debug", skip(self))]
	pub fn fetch_categories(&self) -> Vec<Category>
	{
		categories::all()
	}

	/// Lists or unlists a course.
	#[tracing::instrument(level = "debug", skip(self), err(Debug, level = "debug"))]
	pub async fn toggle_course_status(&self, req: ToggleCourseStatusRequest)
	-> Result<CourseRecord>
	{
		let mut patch = Object::new();
		patch.insert(String::from("is_published"), req.is_active.into());

		let record = self.update_course_row(req.course_id, patch).await?;

		tracing::info! {
			target: "marketplace_api::audit_log",
			course_id = %req.course_id,
			is_active = req.is_active,
			"updated course status"
		};

		Ok(record)
	}

	/// Updates a course's title, description, or price.
	///
	/// Only the fields present in the update are written.
	#[tracing::instrument(level = "debug", skip(self), err(Debug, level = "debug"))]
	pub async fn update_course(&self, req: UpdateCourseRequest) -> Result<CourseRecord>
	{
		if req.update.is_empty() {
			return Err(Error::NoChanges);
		}

		let patch = req.update.into_patch();
		let columns = patch.keys().join(",");
		let record = self.update_course_row(req.course_id, patch).await?;

		tracing::info! {
			target: "marketplace_api::audit_log",
			course_id = %req.course_id,
			%columns,
			"updated course"
		};

		Ok(record)
	}

	/// Tries the live tiers in order.
	///
	/// Returns [`None`] if all of them failed.
	async fn resolve_live(&self, req: &FetchCoursesRequest) -> Option<ResolvedCourses>
	{
		match self.fetch_via_procedure(req).await {
			Ok(rows) => {
				return Some(ResolvedCourses { tier: Tier::Procedure, courses: Listings::Stored(rows) });
			}
			Err(error) => tracing::warn!(%error, "failed to call listings procedure"),
		}

		match self.fetch_via_table(req).await {
			Ok(courses) => Some(ResolvedCourses { tier: Tier::Table, courses: Listings::Normalized(courses) }),
			Err(error) => {
				tracing::warn!(%error, "failed to query listing table");
				None
			}
		}
	}

	/// Calls the listings procedure.
	///
	/// Rows are returned as-is, but every one of them needs all the fields of
	/// a listing.
	async fn fetch_via_procedure(&self, req: &FetchCoursesRequest) -> datasource::Result<Vec<Row>>
	{
		let mut args = Object::new();
		args.insert(String::from("limit_arg"), req.limit.get().into());
		args.insert(String::from("offset_arg"), req.offset.get().into());

		// `all` is left for the procedure to interpret
		if let Some(category) = req.category.as_deref().filter(|category| !category.is_empty()) {
			args.insert(String::from("category_arg"), category.into());
		}

		if let Some(featured) = req.featured {
			args.insert(String::from("featured_arg"), featured.into());
		}

		tracing::debug!(procedure = LISTINGS_PROCEDURE, ?args, "calling listings procedure");

		let rows = self
			.data_source
			.call_procedure(LISTINGS_PROCEDURE, &args)
			.await?;

		if let Some(row) = rows.iter().find(|row| !models::is_listing(row)) {
			tracing::debug!(?row, "procedure returned something that is not a listing");
			return Err(datasource::Error::UnexpectedShape("procedure row is missing listing fields"));
		}

		Ok(rows)
	}

	/// Queries the listing table directly and normalizes the rows.
	async fn fetch_via_table(
		&self,
		req: &FetchCoursesRequest,
	) -> datasource::Result<Vec<MarketplaceCourse>>
	{
		let offset = req.offset.get();
		let last = offset.saturating_add(req.limit.get()).saturating_sub(1);
		let mut query = TableQuery::new(LISTINGS_TABLE).eq("is_active", true);

		if let Some(category) = req.category_filter() {
			query = query.eq("category", category);
		}

		if let Some(featured) = req.featured {
			query = query.eq("featured", featured);
		}

		let query = query.order_desc("rating").range(offset, last);

		tracing::debug!(?query, "querying listing table");

		let rows: Vec<models::RawCourseRow> = self
			.data_source
			.select(&query)
			.await?
			.into_iter()
			.map(serde_json::from_value)
			.collect::<Result<_, _>>()?;

		Ok(rows
			.into_iter()
			.map(models::RawCourseRow::normalize)
			.unique_by(|course| course.id)
			.collect())
	}

	/// Updates the course row with the given ID.
	async fn update_course_row(&self, course_id: CourseID, patch: Object) -> Result<CourseRecord>
	{
		let update = self
			.data_source
			.update_single(COURSES_TABLE, course_id.0, &patch);

		let row = match AssertUnwindSafe(update).catch_unwind().await {
			Ok(Ok(row)) => row,
			Ok(Err(datasource::Error::NotSingleRow { rows })) => {
				tracing::debug!(?rows, "course id did not match exactly one row");
				return Err(Error::CourseNotFound { course_id });
			}
			Ok(Err(error)) => return Err(Error::DataSource(error)),
			Err(payload) => {
				let reason = panic_message(&*payload).to_owned();
				tracing::error!(%reason, "panicked while updating course");
				return Err(Error::Unexpected { reason });
			}
		};

		serde_json::from_value(row).map_err(|error| Error::DataSource(error.into()))
	}
}

/// Extracts the message out of a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> &str
{
	payload
		.downcast_ref::<&str>()
		.copied()
		.or_else(|| payload.downcast_ref::<String>().map(String::as_str))
		.unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests
{
	use std::sync::Arc;
	use std::time::Duration;

	use serde_json::{json, Value};
	use url::Url;
	use uuid::Uuid;

	use super::*;
	use crate::datasource::PostgrestClient;
	use crate::num::ClampedU64;
	use crate::testing::{self, Call, FakeDataSource, Outcome};

	fn request(category: Option<&str>, featured: Option<bool>) -> FetchCoursesRequest
	{
		FetchCoursesRequest {
			category: category.map(ToOwned::to_owned),
			featured,
			..Default::default()
		}
	}

	#[tokio::test]
	async fn procedure_rows_are_returned_unchanged() -> color_eyre::Result<()>
	{
		let mut row = testing::listing_json(1, "design", false);

		if let Some(fields) = row.as_object_mut() {
			fields.insert(String::from("created_at"), json!("2024-01-01T00:00:00+00:00"));
			fields.insert(String::from("rating"), json!(4));
			fields.insert(String::from("instructor_name"), json!("Ada"));
		}

		let fake = Arc::new(
			FakeDataSource::new().with_procedure(Outcome::Rows(vec![row.clone()])),
		);

		let resolved = testing::marketplace_svc(&fake)
			.resolve(&request(Some("design"), None))
			.await;

		testing::assert_eq!(resolved.tier, Tier::Procedure);
		testing::assert_eq!(serde_json::to_value(&resolved.courses)?, json!([row]));

		let mut args = Object::new();
		args.insert(String::from("limit_arg"), json!(20));
		args.insert(String::from("offset_arg"), json!(0));
		args.insert(String::from("category_arg"), json!("design"));

		testing::assert_eq!(
			fake.calls(),
			vec![Call::Procedure { name: String::from(LISTINGS_PROCEDURE), args }]
		);

		Ok(())
	}

	#[tokio::test]
	async fn procedure_rows_may_contain_nulls() -> color_eyre::Result<()>
	{
		let mut row = testing::listing_json(1, "design", false);

		if let Some(fields) = row.as_object_mut() {
			fields.insert(String::from("rating"), Value::Null);
		}

		let fake = Arc::new(
			FakeDataSource::new().with_procedure(Outcome::Rows(vec![row.clone()])),
		);

		let resolved = testing::marketplace_svc(&fake).resolve(&request(None, None)).await;

		testing::assert_eq!(resolved.tier, Tier::Procedure);
		testing::assert_eq!(resolved.courses, Listings::Stored(vec![row]));

		Ok(())
	}

	#[tokio::test]
	async fn empty_category_is_not_forwarded() -> color_eyre::Result<()>
	{
		let fake = Arc::new(FakeDataSource::new().with_procedure(Outcome::Rows(Vec::new())));

		testing::marketplace_svc(&fake)
			.fetch_courses(request(Some(""), None))
			.await;

		testing::assert_matches!(
			fake.calls().as_slice(),
			[Call::Procedure { args, .. }] if !args.contains_key("category_arg")
		);

		Ok(())
	}

	#[tokio::test]
	async fn large_limits_are_capped() -> color_eyre::Result<()>
	{
		let fake = Arc::new(FakeDataSource::new().with_procedure(Outcome::Rows(Vec::new())));
		let req = serde_json::from_value::<FetchCoursesRequest>(json!({ "limit": 500 }))?;

		testing::marketplace_svc(&fake).fetch_courses(req).await;

		testing::assert_matches!(
			fake.calls().as_slice(),
			[Call::Procedure { args, .. }] if args.get("limit_arg") == Some(&json!(100))
		);

		Ok(())
	}

	#[tokio::test]
	async fn all_is_forwarded_to_procedure() -> color_eyre::Result<()>
	{
		let fake = Arc::new(FakeDataSource::new().with_procedure(Outcome::Rows(Vec::new())));
		let courses = testing::marketplace_svc(&fake)
			.fetch_courses(request(Some("all"), Some(true)))
			.await;

		testing::assert!(courses.is_empty());
		testing::assert_matches!(
			fake.calls().as_slice(),
			[Call::Procedure { args, .. }]
				if args.get("category_arg") == Some(&json!("all"))
				&& args.get("featured_arg") == Some(&json!(true))
		);

		Ok(())
	}

	#[tokio::test]
	async fn malformed_procedure_rows_fall_through_to_table() -> color_eyre::Result<()>
	{
		let fake = Arc::new(
			FakeDataSource::new()
				.with_procedure(Outcome::Rows(vec![json!({ "id": Uuid::from_u128(1) })]))
				.with_select(Outcome::Rows(vec![testing::listing_json(2, "design", false)])),
		);

		let resolved = testing::marketplace_svc(&fake).resolve(&request(None, None)).await;

		testing::assert_eq!(resolved.tier, Tier::Table);
		testing::assert_eq!(resolved.courses.len(), 1);

		Ok(())
	}

	#[tokio::test]
	async fn table_rows_are_normalized() -> color_eyre::Result<()>
	{
		let sparse = json!({ "id": Uuid::from_u128(7), "title": null, "rating": 9.0 });
		let fake = Arc::new(FakeDataSource::new().with_select(Outcome::Rows(vec![
			sparse.clone(),
			sparse,
			testing::listing_json(8, "design", true),
		])));

		let req = FetchCoursesRequest {
			limit: ClampedU64::new(10),
			offset: ClampedU64::new(5),
			..request(Some("design"), Some(true))
		};

		let resolved = testing::marketplace_svc(&fake).resolve(&req).await;

		testing::assert_eq!(resolved.tier, Tier::Table);

		let Listings::Normalized(ref courses) = resolved.courses else {
			color_eyre::eyre::bail!("table rows should be normalized");
		};

		testing::assert_eq!(courses.len(), 2);

		for course in courses {
			testing::assert!(!course.title.is_empty());
			testing::assert!(!course.description.is_empty());
			testing::assert!(!course.logo.is_empty());
			testing::assert!(!course.banner_image.is_empty());
			testing::assert!(!course.category.is_empty());
			testing::assert!(!course.organization_name.is_empty());
			testing::assert!(course.rating.get() <= Rating::MAX);
		}

		let expected_query = TableQuery::new(LISTINGS_TABLE)
			.eq("is_active", true)
			.eq("category", "design")
			.eq("featured", true)
			.order_desc("rating")
			.range(5, 14);

		testing::assert_matches!(
			fake.calls().as_slice(),
			[Call::Procedure { .. }, Call::Select(query)] if *query == expected_query
		);

		Ok(())
	}

	#[tokio::test]
	async fn all_is_not_a_table_filter() -> color_eyre::Result<()>
	{
		let fake = Arc::new(FakeDataSource::new().with_select(Outcome::Rows(Vec::new())));

		testing::marketplace_svc(&fake)
			.fetch_courses(request(Some("all"), None))
			.await;

		testing::assert_matches!(
			fake.calls().as_slice(),
			[_, Call::Select(query)] if query.filter("category").is_none()
		);

		Ok(())
	}

	#[tokio::test]
	async fn failing_store_serves_filtered_fallback() -> color_eyre::Result<()>
	{
		let fake = Arc::new(FakeDataSource::new());
		let svc = testing::marketplace_svc(&fake);

		let design = svc.resolve(&request(Some("design"), None)).await;

		testing::assert_eq!(design.tier, Tier::Fallback);

		let Listings::Normalized(ref courses) = design.courses else {
			color_eyre::eyre::bail!("fallback listings are never stored rows");
		};

		testing::assert!(!courses.is_empty());
		testing::assert!(courses.iter().all(|course| course.category == "design"));

		let all = svc.fetch_courses(request(Some("all"), None)).await;

		testing::assert_eq!(all, Listings::Normalized(fallback::all().to_vec()));

		Ok(())
	}

	#[tokio::test]
	async fn fallback_is_paginated() -> color_eyre::Result<()>
	{
		let fake = Arc::new(FakeDataSource::new());
		let req = FetchCoursesRequest {
			limit: ClampedU64::new(1),
			offset: ClampedU64::new(1),
			..Default::default()
		};

		let courses = testing::marketplace_svc(&fake).fetch_courses(req).await;

		let second = fallback::all().get(1..2).unwrap_or_default().to_vec();

		testing::assert_eq!(second.len(), 1);
		testing::assert_eq!(courses, Listings::Normalized(second));

		Ok(())
	}

	#[tokio::test]
	async fn panics_serve_filtered_fallback() -> color_eyre::Result<()>
	{
		let fake = Arc::new(
			FakeDataSource::new()
				.with_procedure(Outcome::Panic("connection pool poisoned"))
				.with_select(Outcome::Rows(vec![testing::listing_json(1, "design", true)])),
		);

		let resolved = testing::marketplace_svc(&fake)
			.resolve(&request(Some("marketing"), Some(true)))
			.await;

		testing::assert_eq!(resolved.tier, Tier::Fallback);

		let Listings::Normalized(ref courses) = resolved.courses else {
			color_eyre::eyre::bail!("fallback listings are never stored rows");
		};

		testing::assert_eq!(courses.len(), 1);
		testing::assert!(courses
			.iter()
			.all(|course| course.category == "marketing" && course.featured));

		Ok(())
	}

	#[tokio::test]
	async fn unreachable_store_serves_fallback() -> color_eyre::Result<()>
	{
		let url = Url::parse("http://127.0.0.1:9")?;
		let client = PostgrestClient::new(&url, String::from("anon-key"), Duration::from_secs(2))?;
		let svc = MarketplaceService::new(Arc::new(client));

		let resolved = svc.resolve(&FetchCoursesRequest::default()).await;

		testing::assert_eq!(resolved.tier, Tier::Fallback);
		testing::assert_eq!(resolved.courses, Listings::Normalized(fallback::all().to_vec()));

		Ok(())
	}

	#[tokio::test]
	async fn categories_are_static() -> color_eyre::Result<()>
	{
		let fake = Arc::new(FakeDataSource::new());
		let categories = testing::marketplace_svc(&fake).fetch_categories();
		let ids = categories.iter().map(|category| category.id.as_str()).collect_vec();

		testing::assert_eq!(
			ids,
			["all", "general", "technology", "business", "design", "marketing", "development"]
		);
		testing::assert!(categories.iter().all(|category| category.count == 0));
		testing::assert!(fake.calls().is_empty());

		Ok(())
	}

	#[tokio::test]
	async fn toggling_missing_course_is_not_found() -> color_eyre::Result<()>
	{
		let fake = Arc::new(FakeDataSource::new().with_update(Outcome::Rows(Vec::new())));
		let course_id = CourseID::from_u128(404);

		let error = testing::marketplace_svc(&fake)
			.toggle_course_status(ToggleCourseStatusRequest { course_id, is_active: true })
			.await
			.unwrap_err();

		testing::assert_matches!(error, Error::CourseNotFound { course_id: id } if id == course_id);

		Ok(())
	}

	#[tokio::test]
	async fn toggling_sets_published_flag() -> color_eyre::Result<()>
	{
		let course_id = CourseID::from_u128(5);
		let row = json!({ "id": course_id, "title": "Rust 101", "is_published": false });
		let fake = Arc::new(FakeDataSource::new().with_update(Outcome::Rows(vec![row])));

		let record = testing::marketplace_svc(&fake)
			.toggle_course_status(ToggleCourseStatusRequest { course_id, is_active: false })
			.await?;

		testing::assert_eq!(record.id, course_id);
		testing::assert_eq!(record.is_published(), Some(false));

		let mut patch = Object::new();
		patch.insert(String::from("is_published"), json!(false));

		testing::assert_eq!(
			fake.calls(),
			vec![Call::Update { table: String::from(COURSES_TABLE), id: course_id.0, patch }]
		);

		Ok(())
	}

	#[tokio::test]
	async fn update_only_sends_provided_fields() -> color_eyre::Result<()>
	{
		let course_id = CourseID::from_u128(6);
		let row = json!({ "id": course_id, "title": "Advanced Rust", "cost": 1500 });
		let fake = Arc::new(FakeDataSource::new().with_update(Outcome::Rows(vec![row])));

		let update = serde_json::from_value::<CourseUpdate>(json!({
			"title": "Advanced Rust",
			"cost": 1500,
			"slug": "ignored",
			"is_active": false,
		}))?;

		let record = testing::marketplace_svc(&fake)
			.update_course(UpdateCourseRequest { course_id, update })
			.await?;

		let mut patch = Object::new();
		patch.insert(String::from("title"), json!("Advanced Rust"));
		patch.insert(String::from("cost"), json!(1500));

		testing::assert_eq!(record.title(), Some("Advanced Rust"));
		testing::assert_eq!(
			fake.calls(),
			vec![Call::Update { table: String::from(COURSES_TABLE), id: course_id.0, patch }]
		);

		Ok(())
	}

	#[tokio::test]
	async fn empty_update_does_not_reach_store() -> color_eyre::Result<()>
	{
		let fake = Arc::new(FakeDataSource::new());
		let req = UpdateCourseRequest {
			course_id: CourseID::from_u128(1),
			update: CourseUpdate::default(),
		};

		let error = testing::marketplace_svc(&fake)
			.update_course(req)
			.await
			.unwrap_err();

		testing::assert_matches!(error, Error::NoChanges);
		testing::assert!(fake.calls().is_empty());

		Ok(())
	}

	#[tokio::test]
	async fn rejected_update_is_data_source_error() -> color_eyre::Result<()>
	{
		let fake = Arc::new(FakeDataSource::new());
		let req = UpdateCourseRequest {
			course_id: CourseID::from_u128(1),
			update: CourseUpdate { title: Some(String::from("x")), ..Default::default() },
		};

		let error = testing::marketplace_svc(&fake)
			.update_course(req)
			.await
			.unwrap_err();

		testing::assert_matches!(error, Error::DataSource(datasource::Error::Rejected(_)));

		Ok(())
	}

	#[tokio::test]
	async fn panicking_update_is_unexpected() -> color_eyre::Result<()>
	{
		let fake = Arc::new(FakeDataSource::new().with_update(Outcome::Panic("boom")));
		let req = ToggleCourseStatusRequest { course_id: CourseID::from_u128(1), is_active: true };

		let error = testing::marketplace_svc(&fake)
			.toggle_course_status(req)
			.await
			.unwrap_err();

		testing::assert_matches!(error, Error::Unexpected { ref reason } if reason == "boom");

		Ok(())
	}
}
