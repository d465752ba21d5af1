pub mod catalog;
pub mod runtime;

pub use catalog::*;
pub use runtime::*;

use serde::{Deserialize, Deserializer};

/// Deserialize a field that the upstream may send as `null` or omit entirely,
/// falling back to the type's default (empty string / empty collection).
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
