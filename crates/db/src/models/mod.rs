//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod category;
pub mod comment;
pub mod genre;
pub mod review;
pub mod title;
pub mod user;

use serde::{Deserialize, Deserializer};

/// Deserializer for `Option<Option<T>>` patch fields.
///
/// Paired with `#[serde(default)]`: an absent field stays `None` (keep the
/// stored value) while an explicit `null` becomes `Some(None)` (clear it).
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
