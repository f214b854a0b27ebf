//! Domain models: companies and their embedded internships

pub mod company;
pub mod geo_point;
pub mod internship;

pub use company::{Company, NewCompany};
pub use geo_point::GeoPoint;
pub use internship::{CreateInternship, Internship, NewInternship};

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;

/// Merge a JSON object of field values into a record.
///
/// Fields present in `patch` replace the current ones (`null` clears optional
/// fields); fields listed in `immutable` are rejected. Merging the same patch twice
/// gives the same record as merging it once.
pub(crate) fn merge_patch<T>(current: &T, patch: &JsonValue, immutable: &[&str]) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let fields = patch
        .as_object()
        .ok_or_else(|| Error::Validation("Request body must be a JSON object".to_string()))?;

    if let Some(field) = fields.keys().find(|k| immutable.contains(&k.as_str())) {
        return Err(Error::Validation(format!("Field '{field}' cannot be modified")));
    }

    let mut merged = serde_json::to_value(current)
        .map_err(|e| Error::Internal(format!("Failed to serialize record: {e}")))?;
    let target = merged
        .as_object_mut()
        .ok_or_else(|| Error::Internal("Record did not serialize to an object".to_string()))?;
    for (key, value) in fields {
        target.insert(key.clone(), value.clone());
    }

    serde_json::from_value(merged).map_err(|e| Error::Validation(e.to_string()))
}
