//! Company records. A company owns its internships; they are stored inside it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;
use validator::Validate;

use super::{merge_patch, Internship};
use crate::Result;

/// Fields a company patch may never touch. Internships change through their own routes.
const IMMUTABLE_FIELDS: &[&str] = &["id", "internships", "revision", "createdAt"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Company {
    pub id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub internships: Vec<Internship>,
    /// Incremented by the store on every successful save.
    #[serde(default)]
    pub revision: i64,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /companies`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    #[validate(length(min = 1, max = 100))]
    pub company_name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub website: Option<String>,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Company {
    pub fn from_new(new: NewCompany) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_name: new.company_name,
            description: new.description,
            website: new.website,
            email: new.email,
            phone: new.phone,
            address: new.address,
            internships: Vec::new(),
            revision: 0,
            created_at: Utc::now(),
        }
    }

    pub fn internship(&self, id: Uuid) -> Option<&Internship> {
        self.internships.iter().find(|i| i.id == id)
    }

    pub fn internship_mut(&mut self, id: Uuid) -> Option<&mut Internship> {
        self.internships.iter_mut().find(|i| i.id == id)
    }

    /// Remove an internship; returns it when it was present.
    pub fn remove_internship(&mut self, id: Uuid) -> Option<Internship> {
        let index = self.internships.iter().position(|i| i.id == id)?;
        Some(self.internships.remove(index))
    }

    pub fn patched(&self, patch: &JsonValue) -> Result<Self> {
        let merged: Company = merge_patch(self, patch, IMMUTABLE_FIELDS)?;
        merged.validate()?;
        Ok(merged)
    }

    /// JSON documents for each internship, tagged with the owning company.
    ///
    /// This is the shape internship queries filter, sort and project over.
    pub fn internship_documents(&self) -> Vec<JsonValue> {
        self.internships
            .iter()
            .filter_map(|internship| serde_json::to_value(internship).ok())
            .map(|mut doc| {
                if let Some(map) = doc.as_object_mut() {
                    tag_with_company(map, self);
                }
                doc
            })
            .collect()
    }
}

fn tag_with_company(map: &mut Map<String, JsonValue>, company: &Company) {
    map.insert(
        "companyId".to_string(),
        JsonValue::String(company.id.to_string()),
    );
    map.insert(
        "companyName".to_string(),
        JsonValue::String(company.company_name.clone()),
    );
}
