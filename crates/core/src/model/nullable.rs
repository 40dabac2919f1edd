//! Deserializers for backend fields that may arrive as explicit `null`.
//!
//! `#[serde(default)]` only covers a missing key; these also cover `null`.

use serde::{Deserialize, Deserializer};

pub(crate) const GENERAL_TOPIC: &str = "General";

pub(crate) fn general_topic() -> String {
    GENERAL_TOPIC.to_owned()
}

/// `null` or blank becomes `"General"`.
pub(crate) fn topic<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|topic| !topic.trim().is_empty())
        .unwrap_or_else(general_topic))
}

/// `null` becomes `T::default()`.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
