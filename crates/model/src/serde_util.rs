//! Serde helpers shared by the versioned wire types.

use serde::{Deserialize, Deserializer};

/// Deserialize an explicit `null` as the type's default value.
///
/// Wire payloads written by older clients carry `null` where an empty map
/// or list is meant; downstream consumers must never observe an
/// uninitialized collection, so both absent and `null` become the empty
/// container.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
