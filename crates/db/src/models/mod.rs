use serde::{Deserialize, Deserializer};

pub mod audit_log;
pub mod contact_message;
pub mod homepage;
pub mod metrics;
pub mod partner;
pub mod password_reset_token;
pub mod project;
pub mod site_settings;
pub mod testimonial;
pub mod user;

/// Primary key of the single-row draft/published tables.
pub const SINGLETON_ID: &str = "singleton";

/// Which half of a draft/published pair to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentStage {
    Draft,
    Published,
}

/// Keep an explicit `null` apart from an absent key.
///
/// Use as `#[serde(default, deserialize_with = "nullable")]` on an
/// `Option<Option<T>>`: a missing key stays `None`, `null` becomes
/// `Some(None)`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Split a nullable patch field into the `(supplied, value)` pair bound by
/// `CASE WHEN $supplied THEN $value ELSE column END`.
pub(crate) fn patch<T>(field: &Option<Option<T>>) -> (bool, Option<&T>) {
    match field {
        None => (false, None),
        Some(inner) => (true, inner.as_ref()),
    }
}
