//! Request / Response types for this service.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::datasource::{Object, Row};
use crate::num::ClampedU64;

crate::macros::make_id! {
	/// An ID uniquely identifying a marketplace listing.
	ListingID
}

crate::macros::make_id! {
	/// An ID uniquely identifying a course.
	CourseID
}

crate::macros::make_id! {
	/// An ID uniquely identifying an organization.
	OrganizationID
}

/// A course offered on the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MarketplaceCourse
{
	/// The listing's ID.
	pub id: ListingID,

	/// The ID of the course being offered.
	pub course_id: CourseID,

	/// The ID of the organization offering the course.
	pub organization_id: OrganizationID,

	/// The course's title.
	pub title: String,

	/// A description of the course.
	pub description: String,

	/// Path or URL to the course's logo.
	pub logo: String,

	/// Path or URL to the course's banner.
	pub banner_image: String,

	/// The price, in minor units of `currency`.
	pub cost: u64,

	/// The currency `cost` is denominated in.
	pub currency: Currency,

	/// URL-friendly identifier.
	pub slug: String,

	/// Whether the listing is visible on the marketplace.
	pub is_active: bool,

	/// Whether the listing is highlighted.
	pub featured: bool,

	/// The category the course belongs to.
	pub category: String,

	/// Free-form tags.
	pub tags: Vec<String>,

	/// Average review score.
	pub rating: Rating,

	/// How many reviews the course has received.
	pub review_count: u64,

	/// How many students are enrolled.
	pub enrollment_count: u64,

	/// The name of the organization offering the course.
	pub organization_name: String,

	/// When the listing was created.
	pub created_at: DateTime<Utc>,
}

/// The fields every listing has.
const LISTING_FIELDS: [&str; 19] = [
	"id",
	"course_id",
	"organization_id",
	"title",
	"description",
	"logo",
	"banner_image",
	"cost",
	"currency",
	"slug",
	"is_active",
	"featured",
	"category",
	"tags",
	"rating",
	"review_count",
	"enrollment_count",
	"organization_name",
	"created_at",
];

/// Whether `row` has every field of a [`MarketplaceCourse`].
///
/// Only the keys are checked; `null` values and additional columns are fine.
pub(crate) fn is_listing(row: &Row) -> bool
{
	row.as_object()
		.is_some_and(|row| LISTING_FIELDS.iter().all(|&field| row.contains_key(field)))
}

/// Marketplace listings, as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Listings
{
	/// Rows exactly as the store's listings procedure returned them.
	Stored(Vec<Row>),

	/// Listings that were normalized from table rows, or built in.
	Normalized(Vec<MarketplaceCourse>),
}

impl Listings
{
	/// The number of listings.
	pub fn len(&self) -> usize
	{
		match self {
			Self::Stored(rows) => rows.len(),
			Self::Normalized(courses) => courses.len(),
		}
	}

	/// Whether there are no listings at all.
	pub fn is_empty(&self) -> bool
	{
		self.len() == 0
	}
}

/// An ISO 4217-style currency code: exactly three ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String)]
pub struct Currency(String);

impl Currency
{
	/// The currency used when none is known.
	pub fn usd() -> Self
	{
		Self(String::from("USD"))
	}

	/// Returns the currency code.
	pub fn as_str(&self) -> &str
	{
		&self.0
	}
}

impl fmt::Display for Currency
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		f.write_str(&self.0)
	}
}

/// An invalid currency code.
#[derive(Debug, Error)]
#[error("`{0}` is not a three letter currency code")]
pub struct InvalidCurrency(String);

impl TryFrom<String> for Currency
{
	type Error = InvalidCurrency;

	fn try_from(code: String) -> Result<Self, Self::Error>
	{
		if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
			Ok(Self(code))
		} else {
			Err(InvalidCurrency(code))
		}
	}
}

impl From<Currency> for String
{
	fn from(currency: Currency) -> Self
	{
		currency.0
	}
}

/// A review score between 0 and 5.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(try_from = "f64", into = "f64")]
#[schema(value_type = f64)]
pub struct Rating(f64);

impl Rating
{
	/// The highest possible rating.
	pub const MAX: f64 = 5.0;

	/// Creates a rating, forcing `value` into range.
	///
	/// `NaN` becomes 0.
	pub fn clamped(value: f64) -> Self
	{
		if value.is_nan() {
			return Self(0.0);
		}

		Self(value.clamp(0.0, Self::MAX))
	}

	/// Returns the rating as a float.
	pub const fn get(self) -> f64
	{
		self.0
	}
}

/// A rating outside of `0..=5`.
#[derive(Debug, Error)]
#[error("rating {0} is outside of 0..=5")]
pub struct InvalidRating(f64);

impl TryFrom<f64> for Rating
{
	type Error = InvalidRating;

	fn try_from(value: f64) -> Result<Self, Self::Error>
	{
		if (0.0..=Self::MAX).contains(&value) {
			Ok(Self(value))
		} else {
			Err(InvalidRating(value))
		}
	}
}

impl From<Rating> for f64
{
	fn from(rating: Rating) -> Self
	{
		rating.0
	}
}

/// A row of the listing table, as stored.
///
/// Everything but the ID may be missing; [`RawCourseRow::normalize()`] fills
/// the gaps.
#[derive(Debug, Deserialize)]
#[allow(clippy::missing_docs_in_private_items)]
pub(crate) struct RawCourseRow
{
	pub id: ListingID,
	pub course_id: Option<CourseID>,
	pub organization_id: Option<OrganizationID>,
	pub title: Option<String>,
	pub description: Option<String>,
	pub logo: Option<String>,
	pub banner_image: Option<String>,
	pub cost: Option<i64>,
	pub currency: Option<String>,
	pub slug: Option<String>,
	pub is_active: Option<bool>,
	pub featured: Option<bool>,
	pub category: Option<String>,
	pub tags: Option<Vec<String>>,
	pub rating: Option<f64>,
	pub review_count: Option<i64>,
	pub enrollment_count: Option<i64>,
	pub organization_name: Option<String>,
	pub created_at: Option<DateTime<Utc>>,
}

impl RawCourseRow
{
	/// Turns this row into a [`MarketplaceCourse`], using defaults for
	/// anything that is missing.
	pub fn normalize(self) -> MarketplaceCourse
	{
		/// Empty strings count as missing.
		fn or(value: Option<String>, default: &str) -> String
		{
			value
				.filter(|value| !value.trim().is_empty())
				.unwrap_or_else(|| default.to_owned())
		}

		/// Negative numbers count as 0.
		fn non_negative(value: Option<i64>) -> u64
		{
			value.map_or(0, |value| u64::try_from(value).unwrap_or(0))
		}

		let title = or(self.title, "Course Title");
		let slug = self
			.slug
			.filter(|slug| !slug.trim().is_empty())
			.unwrap_or_else(|| slugify(&title));

		MarketplaceCourse {
			id: self.id,
			course_id: self.course_id.unwrap_or(CourseID(self.id.0)),
			organization_id: self.organization_id.unwrap_or(OrganizationID(Uuid::nil())),
			title,
			description: or(self.description, "No description available"),
			logo: or(self.logo, "/images/marketplace/course-logo.png"),
			banner_image: or(self.banner_image, "/images/marketplace/course-banner.png"),
			cost: non_negative(self.cost),
			currency: self
				.currency
				.and_then(|code| Currency::try_from(code).ok())
				.unwrap_or_else(Currency::usd),
			slug,
			is_active: self.is_active.unwrap_or(true),
			featured: self.featured.unwrap_or(false),
			category: or(self.category, "general"),
			tags: self.tags.unwrap_or_default(),
			rating: self.rating.map_or(Rating::clamped(0.0), Rating::clamped),
			review_count: non_negative(self.review_count),
			enrollment_count: non_negative(self.enrollment_count),
			organization_name: or(self.organization_name, "Unknown Organization"),
			created_at: self.created_at.unwrap_or_default(),
		}
	}
}

/// Turns a title into a lowercase, dash-separated slug.
pub(crate) fn slugify(title: &str) -> String
{
	title
		.split(|c: char| !c.is_alphanumeric())
		.filter(|word| !word.is_empty())
		.map(str::to_lowercase)
		.collect::<Vec<_>>()
		.join("-")
}

/// Request payload for fetching marketplace listings.
#[derive(Debug, Default, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FetchCoursesRequest
{
	/// Only return courses in this category.
	///
	/// `all` disables this filter.
	pub category: Option<String>,

	/// Only return (non-)featured courses.
	pub featured: Option<bool>,

	/// The maximum amount of courses to return, between 1 and 100.
	///
	/// Larger values are lowered to 100, smaller ones raised to 1.
	#[serde(default)]
	#[param(value_type = u64, default = 20, minimum = 1, maximum = 100)]
	pub limit: ClampedU64<20, 100, 1>,

	/// Pagination offset.
	#[serde(default)]
	#[param(value_type = u64)]
	pub offset: ClampedU64,
}

impl FetchCoursesRequest
{
	/// The category to filter by, if any.
	///
	/// Returns [`None`] for the `all` sentinel.
	pub fn category_filter(&self) -> Option<&str>
	{
		self.category
			.as_deref()
			.filter(|category| !category.is_empty() && *category != Category::ALL)
	}
}

/// A marketplace category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Category
{
	/// The category's ID, used for filtering.
	pub id: String,

	/// The category's display name.
	pub name: String,

	/// How many courses are in this category.
	pub count: u64,
}

impl Category
{
	/// ID of the sentinel category matching every course.
	pub const ALL: &'static str = "all";
}

/// Request payload for (de)activating a course.
#[derive(Debug, Clone, Copy)]
pub struct ToggleCourseStatusRequest
{
	/// The course to update.
	pub course_id: CourseID,

	/// The new status.
	pub is_active: bool,
}

/// Request body for (de)activating a course.
#[derive(Debug, Clone, Copy, Deserialize, utoipa::ToSchema)]
pub struct UpdateCourseStatusPayload
{
	/// Whether the course should be listed.
	pub is_active: bool,
}

/// Request payload for updating a course.
#[derive(Debug, Clone)]
pub struct UpdateCourseRequest
{
	/// The course to update.
	pub course_id: CourseID,

	/// The changes to apply.
	pub update: CourseUpdate,
}

/// The fields of a course that can be updated through the marketplace.
///
/// Any other fields in the request body are ignored.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
pub struct CourseUpdate
{
	/// A new title.
	pub title: Option<String>,

	/// A new description.
	pub description: Option<String>,

	/// A new price, in minor units.
	pub cost: Option<u64>,

	/// A new currency.
	pub currency: Option<Currency>,
}

impl CourseUpdate
{
	/// Whether this update would change anything.
	pub const fn is_empty(&self) -> bool
	{
		self.title.is_none()
			&& self.description.is_none()
			&& self.cost.is_none()
			&& self.currency.is_none()
	}

	/// The columns to set, containing only the fields that were provided.
	pub fn into_patch(self) -> Object
	{
		let mut patch = Object::new();

		if let Some(title) = self.title {
			patch.insert(String::from("title"), title.into());
		}

		if let Some(description) = self.description {
			patch.insert(String::from("description"), description.into());
		}

		if let Some(cost) = self.cost {
			patch.insert(String::from("cost"), cost.into());
		}

		if let Some(currency) = self.currency {
			patch.insert(String::from("currency"), String::from(currency).into());
		}

		patch
	}
}

/// A row of the course table, as returned after an update.
///
/// Only the ID is guaranteed to exist; every column is passed through as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord
{
	/// The course's ID.
	pub id: CourseID,

	/// All other columns.
	#[serde(flatten)]
	pub columns: Object,
}

impl CourseRecord
{
	/// Whether the course is published, if the column exists.
	pub fn is_published(&self) -> Option<bool>
	{
		self.columns
			.get("is_published")
			.and_then(serde_json::Value::as_bool)
	}

	/// The course's title, if the column exists.
	pub fn title(&self) -> Option<&str>
	{
		self.columns.get("title").and_then(serde_json::Value::as_str)
	}
}

impl utoipa::PartialSchema for CourseRecord
{
	fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema>
	{
		use utoipa::openapi::schema::{AdditionalProperties, ObjectBuilder, Type};
		use utoipa::openapi::{KnownFormat, SchemaFormat};

		let string = || ObjectBuilder::new().schema_type(Type::String);

		ObjectBuilder::new()
			.property(
				"id",
				string().format(Some(SchemaFormat::KnownFormat(KnownFormat::Uuid))),
			)
			.required("id")
			.property("title", string())
			.property("description", string())
			.property("cost", ObjectBuilder::new().schema_type(Type::Integer))
			.property("currency", string())
			.property("is_published", ObjectBuilder::new().schema_type(Type::Boolean))
			.additional_properties(Some(AdditionalProperties::FreeForm(true)))
			.into()
	}
}

impl utoipa::ToSchema for CourseRecord
{
	fn name() -> std::borrow::Cow<'static, str>
	{
		std::borrow::Cow::Borrowed("CourseRecord")
	}
}
