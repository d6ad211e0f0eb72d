//! This module contains the [`make_id!()`] macro, which will generate the
//! boilerplate for an "ID"-like type.
//!
//! Every table in the store is keyed by a UUID, and passing raw [`Uuid`]s
//! around makes it easy to mix up a listing ID with the ID of the course it
//! advertises. [`make_id!()`] will generate a wrapper type for every unique ID
//! type you need, so you can't mix them up!
//!
//! [`Uuid`]: uuid::Uuid

/// Creates a new "ID" type.
///
/// This will produce a thin wrapper around a [`Uuid`], that implements all
/// the typical traits you'd expect.
///
/// # Example
///
/// ```ignore
/// crate::macros::make_id! {
///     /// Some useful documentation.
///     MyID
/// }
/// ```
///
/// [`Uuid`]: uuid::Uuid
macro_rules! make_id {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[repr(transparent)]
		#[derive(
			Debug,
			Clone,
			Copy,
			PartialEq,
			Eq,
			PartialOrd,
			Ord,
			Hash,
			serde::Serialize,
			serde::Deserialize,
			utoipa::ToSchema,
		)]
		#[serde(transparent)]
		#[schema(value_type = uuid::Uuid)]
		pub struct $name(pub uuid::Uuid);

		impl $name
		{
			/// Creates an ID from a raw 128-bit value.
			#[allow(dead_code)]
			pub const fn from_u128(value: u128) -> Self
			{
				Self(uuid::Uuid::from_u128(value))
			}
		}

		impl std::fmt::Display for $name
		{
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
			{
				std::fmt::Display::fmt(&self.0, f)
			}
		}

		impl std::ops::Deref for $name
		{
			type Target = uuid::Uuid;

			fn deref(&self) -> &Self::Target
			{
				&self.0
			}
		}

		impl From<$name> for uuid::Uuid
		{
			fn from(value: $name) -> Self
			{
				value.0
			}
		}

		impl From<uuid::Uuid> for $name
		{
			fn from(value: uuid::Uuid) -> Self
			{
				Self(value)
			}
		}

		impl std::str::FromStr for $name
		{
			type Err = uuid::Error;

			fn from_str(s: &str) -> std::result::Result<Self, Self::Err>
			{
				<uuid::Uuid as std::str::FromStr>::from_str(s).map(Self)
			}
		}
	};
}

pub(crate) use make_id;
