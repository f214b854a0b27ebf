//! Internship records, embedded in their owning company.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use super::{merge_patch, GeoPoint};
use crate::{Error, Result};

/// Fields a patch may never touch.
const IMMUTABLE_FIELDS: &[&str] = &["id", "createdAt"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Internship {
    pub id: Uuid,
    /// Employer-side job reference; not unique across companies.
    #[validate(length(min = 1, max = 64))]
    pub job_id: String,
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub min_salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 60))]
    pub duration_months: Option<u32>,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_position: Option<GeoPoint>,
    pub created_at: DateTime<Utc>,
}

/// Client-supplied internship payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewInternship {
    #[validate(length(min = 1, max = 64))]
    pub job_id: String,
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub min_salary: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 1, max = 60))]
    pub duration_months: Option<u32>,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub geo_position: Option<GeoPoint>,
}

/// Body of `POST /internships`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInternship {
    #[validate(length(min = 1))]
    pub company_name: String,
    #[validate(nested)]
    pub internship: NewInternship,
}

impl Internship {
    /// Build a stored internship with a freshly generated id.
    pub fn from_new(new: NewInternship) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id: new.job_id,
            title: new.title,
            description: new.description,
            location: new.location,
            min_salary: new.min_salary,
            duration_months: new.duration_months,
            remote: new.remote,
            skills: new.skills,
            geo_position: new.geo_position,
            created_at: Utc::now(),
        }
    }

    /// Merge a field patch, then re-validate the result.
    pub fn patched(&self, patch: &JsonValue) -> Result<Self> {
        let merged: Internship = merge_patch(self, patch, IMMUTABLE_FIELDS)?;
        merged.check()?;
        Ok(merged)
    }

    /// Field validation plus coordinate range checks.
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        if let Some(point) = &self.geo_position {
            point.check_range().map_err(Error::Validation)?;
        }
        Ok(())
    }
}
