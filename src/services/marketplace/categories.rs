//! The categories listings can be filtered by.

use super::Category;

/// `(id, name)` of every category.
const CATEGORIES: [(&str, &str); 7] = [
	(Category::ALL, "All Categories"),
	("general", "General"),
	("technology", "Technology"),
	("business", "Business"),
	("design", "Design"),
	("marketing", "Marketing"),
	("development", "Development"),
];

/// Returns every category.
///
/// The list is fixed and `count` is always 0; it is not backed by any
/// aggregation over the listings yet.
pub(crate) fn all() -> Vec<Category>
{
	CATEGORIES
		.iter()
		.map(|&(id, name)| Category { id: id.to_owned(), name: name.to_owned(), count: 0 })
		.collect()
}
