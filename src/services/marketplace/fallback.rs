//! Built-in listings served when the store cannot be reached.

use std::sync::LazyLock;

use chrono::DateTime;

use super::{
	CourseID,
	Currency,
	FetchCoursesRequest,
	ListingID,
	MarketplaceCourse,
	OrganizationID,
	Rating,
};

/// The built-in listings, in the order they are served.
static COURSES: LazyLock<Vec<MarketplaceCourse>> = LazyLock::new(|| {
	let organization_id = OrganizationID::from_u128(0x0192_5d2c_7a10_7000_8000_0000_0000_0001);
	let created_at = |secs| DateTime::from_timestamp(secs, 0).unwrap_or_default();

	vec![
		MarketplaceCourse {
			id: ListingID::from_u128(0x0192_5d2c_7a10_7000_8000_0000_0000_0101),
			course_id: CourseID::from_u128(0x0192_5d2c_7a10_7000_8000_0000_0000_0201),
			organization_id,
			title: String::from("Full-Stack Web Development"),
			description: String::from(
				"Build and deploy modern web applications from the database to the browser.",
			),
			logo: String::from("/images/marketplace/course-logo.png"),
			banner_image: String::from("/images/marketplace/course-banner.png"),
			cost: 0,
			currency: Currency::usd(),
			slug: String::from("full-stack-web-development"),
			is_active: true,
			featured: true,
			category: String::from("development"),
			tags: vec![String::from("javascript"), String::from("web"), String::from("sql")],
			rating: Rating::clamped(4.8),
			review_count: 124,
			enrollment_count: 1543,
			organization_name: String::from("ClassroomIO Academy"),
			created_at: created_at(1_704_067_200),
		},
		MarketplaceCourse {
			id: ListingID::from_u128(0x0192_5d2c_7a10_7000_8000_0000_0000_0102),
			course_id: CourseID::from_u128(0x0192_5d2c_7a10_7000_8000_0000_0000_0202),
			organization_id,
			title: String::from("UI/UX Design Fundamentals"),
			description: String::from(
				"Learn user research, wireframing and prototyping for digital products.",
			),
			logo: String::from("/images/marketplace/course-logo.png"),
			banner_image: String::from("/images/marketplace/course-banner.png"),
			cost: 4999,
			currency: Currency::usd(),
			slug: String::from("ui-ux-design-fundamentals"),
			is_active: true,
			featured: false,
			category: String::from("design"),
			tags: vec![String::from("design"), String::from("figma")],
			rating: Rating::clamped(4.6),
			review_count: 89,
			enrollment_count: 876,
			organization_name: String::from("Design Studio"),
			created_at: created_at(1_706_745_600),
		},
		MarketplaceCourse {
			id: ListingID::from_u128(0x0192_5d2c_7a10_7000_8000_0000_0000_0103),
			course_id: CourseID::from_u128(0x0192_5d2c_7a10_7000_8000_0000_0000_0203),
			organization_id,
			title: String::from("Digital Marketing Strategy"),
			description: String::from(
				"Plan campaigns across search, social and e-mail, and measure what works.",
			),
			logo: String::from("/images/marketplace/course-logo.png"),
			banner_image: String::from("/images/marketplace/course-banner.png"),
			cost: 2999,
			currency: Currency::usd(),
			slug: String::from("digital-marketing-strategy"),
			is_active: true,
			featured: true,
			category: String::from("marketing"),
			tags: vec![String::from("marketing"), String::from("seo")],
			rating: Rating::clamped(4.5),
			review_count: 56,
			enrollment_count: 432,
			organization_name: String::from("Growth Lab"),
			created_at: created_at(1_709_251_200),
		},
	]
});

/// Returns every built-in listing.
pub(crate) fn all() -> &'static [MarketplaceCourse]
{
	&COURSES
}

/// Returns the built-in listings matching `req`.
pub(crate) fn courses(req: &FetchCoursesRequest) -> Vec<MarketplaceCourse>
{
	let category = req.category_filter();
	let offset = usize::try_from(req.offset.get()).unwrap_or(usize::MAX);
	let limit = usize::try_from(req.limit.get()).unwrap_or(usize::MAX);

	all()
		.iter()
		.filter(|course| category.map_or(true, |category| course.category == category))
		.filter(|course| req.featured.map_or(true, |featured| course.featured == featured))
		.skip(offset)
		.take(limit)
		.cloned()
		.collect()
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::num::ClampedU64;

	fn request(category: Option<&str>, featured: Option<bool>) -> FetchCoursesRequest
	{
		FetchCoursesRequest {
			category: category.map(ToOwned::to_owned),
			featured,
			..Default::default()
		}
	}

	#[test]
	fn ids_are_unique()
	{
		let mut ids = all().iter().map(|course| course.id).collect::<Vec<_>>();
		ids.sort_unstable();
		ids.dedup();

		assert_eq!(ids.len(), all().len());
	}

	#[test]
	fn filters_by_category()
	{
		let courses = courses(&request(Some("design"), None));

		assert_eq!(courses.len(), 1);
		assert!(
			courses.iter().all(|course| course.category == "design"),
			"only design courses should be returned"
		);
	}

	#[test]
	fn all_matches_every_category()
	{
		assert_eq!(courses(&request(Some("all"), None)), all());
		assert_eq!(courses(&request(None, None)), all());
	}

	#[test]
	fn filters_by_featured()
	{
		let featured = courses(&request(None, Some(true)));

		assert_eq!(featured.len(), 2);
		assert!(featured.iter().all(|course| course.featured), "only featured courses");

		let category_and_featured = courses(&request(Some("design"), Some(true)));

		assert!(category_and_featured.is_empty(), "the design course is not featured");
	}

	#[test]
	fn paginates_after_filtering()
	{
		let req = FetchCoursesRequest {
			limit: ClampedU64::new(1),
			offset: ClampedU64::new(1),
			..request(Some("all"), None)
		};

		let page = courses(&req);

		assert_eq!(page.len(), 1);
		assert_eq!(page.first(), all().get(1));

		let past_the_end = FetchCoursesRequest { offset: ClampedU64::new(10), ..request(None, None) };

		assert!(courses(&past_the_end).is_empty(), "offset is past the end");
	}

	#[test]
	fn unknown_category_is_empty()
	{
		assert!(courses(&request(Some("cooking"), None)).is_empty(), "no cooking courses");
	}
}
