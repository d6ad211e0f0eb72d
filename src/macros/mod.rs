//! This module contains various utility macros.

mod make_id;
pub(crate) use make_id::make_id;
