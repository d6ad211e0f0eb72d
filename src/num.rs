//! This module contains extensions for [`std::num`].

use std::ops;

use serde::{Deserialize, Deserializer, Serialize};

/// A u64 with custom default, max & min value.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ClampedU64<const DEFAULT: u64 = 0, const MAX: u64 = { u64::MAX }, const MIN: u64 = 0>(
	u64,
);

impl<const DEFAULT: u64, const MAX: u64, const MIN: u64> ClampedU64<DEFAULT, MAX, MIN>
{
	/// Create a new [`ClampedU64`].
	///
	/// This will clamp `value` into `MIN..=MAX` if necessary.
	pub const fn new(value: u64) -> Self
	{
		const {
			assert!(MIN <= DEFAULT, "`DEFAULT` cannot be less than `MIN`");
			assert!(DEFAULT <= MAX, "`DEFAULT` cannot exceed `MAX`");
		};

		Self(if value > MAX {
			MAX
		} else if value < MIN {
			MIN
		} else {
			value
		})
	}

	/// Returns the inner value.
	pub const fn get(self) -> u64
	{
		self.0
	}
}

impl<const DEFAULT: u64, const MAX: u64, const MIN: u64> Default for ClampedU64<DEFAULT, MAX, MIN>
{
	fn default() -> Self
	{
		Self::new(DEFAULT)
	}
}

impl<const DEFAULT: u64, const MAX: u64, const MIN: u64> From<u64> for ClampedU64<DEFAULT, MAX, MIN>
{
	fn from(value: u64) -> Self
	{
		Self::new(value)
	}
}

impl<const DEFAULT: u64, const MAX: u64, const MIN: u64> From<ClampedU64<DEFAULT, MAX, MIN>>
	for u64
{
	fn from(ClampedU64(value): ClampedU64<DEFAULT, MAX, MIN>) -> Self
	{
		value
	}
}

impl<const DEFAULT: u64, const MAX: u64, const MIN: u64> ops::Deref
	for ClampedU64<DEFAULT, MAX, MIN>
{
	type Target = u64;

	fn deref(&self) -> &Self::Target
	{
		&self.0
	}
}

impl<'de, const DEFAULT: u64, const MAX: u64, const MIN: u64> Deserialize<'de>
	for ClampedU64<DEFAULT, MAX, MIN>
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		Ok(Option::<u64>::deserialize(deserializer)?
			.map(Self::new)
			.unwrap_or_default())
	}
}
