//! Internship operations
//!
//! Internships live inside their company, so every write is: locate the owner,
//! change its embedded list, save the whole company.

use serde_json::Value as JsonValue;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::Listing;
use crate::{
    db::{locator, CompanyStore, LookupResult},
    geo::{self, EarthRadius, Geocoder},
    models::{CreateInternship, GeoPoint, Internship},
    query::{translate, QueryLimits, RawParams, ResourceKind},
    Error, Result,
};

/// Field holding an internship's position.
pub const GEO_FIELD: &str = "geoPosition";

pub struct InternshipService {
    store: Arc<dyn CompanyStore>,
    geocoder: Arc<dyn Geocoder>,
    radii: EarthRadius,
    limits: QueryLimits,
    geocode_on_create: bool,
}

fn not_found(id: &str) -> Error {
    Error::NotFound(format!("internship id {id} doesn't exist"))
}

impl InternshipService {
    pub fn new(
        store: Arc<dyn CompanyStore>,
        geocoder: Arc<dyn Geocoder>,
        radii: EarthRadius,
        limits: QueryLimits,
        geocode_on_create: bool,
    ) -> Self {
        Self {
            store,
            geocoder,
            radii,
            limits,
            geocode_on_create,
        }
    }

    pub async fn list(&self, params: &RawParams) -> Result<Listing> {
        let spec = translate(params, ResourceKind::Internships, &self.limits)?;
        let page = self.store.query_internships(&spec).await?;
        Ok(Listing {
            page,
            pagination: spec.pagination,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Internship> {
        Ok(self.locate(id).await?.internship)
    }

    pub async fn create(&self, body: CreateInternship) -> Result<Internship> {
        body.validate()?;

        let mut company = self
            .store
            .find_by_name(&body.company_name)
            .await?
            .ok_or_else(|| Error::Forbidden("Company doesn't exist".to_string()))?;

        let mut internship = Internship::from_new(body.internship);
        internship.check()?;
        if internship.geo_position.is_none() && self.geocode_on_create {
            internship.geo_position = self.position_for(&internship).await;
        }

        company.internships.push(internship.clone());
        let company = self.store.save(company).await?;

        tracing::info!(
            internship_id = %internship.id,
            company_id = %company.id,
            "Created internship"
        );
        Ok(internship)
    }

    pub async fn update(&self, id: &str, patch: &JsonValue) -> Result<Internship> {
        let LookupResult {
            mut company,
            internship,
        } = self.locate(id).await?;

        let updated = internship.patched(patch)?;
        let slot = company
            .internship_mut(internship.id)
            .ok_or_else(|| not_found(id))?;
        *slot = updated.clone();
        self.store.save(company).await?;

        tracing::info!(internship_id = %updated.id, "Updated internship");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let LookupResult {
            mut company,
            internship,
        } = self.locate(id).await?;

        company
            .remove_internship(internship.id)
            .ok_or_else(|| not_found(id))?;
        self.store.save(company).await?;

        tracing::info!(internship_id = %internship.id, "Deleted internship");
        Ok(())
    }

    /// Internships whose position lies within `distance` `unit` of `address`.
    ///
    /// Further filter, sort and paging parameters apply as in [`Self::list`].
    pub async fn within_radius(
        &self,
        address: &str,
        distance: &str,
        unit: &str,
        params: &RawParams,
    ) -> Result<Listing> {
        // Unit errors win over distance errors and are reported before geocoding.
        unit.parse::<geo::DistanceUnit>()?;
        let distance = geo::parse_distance(distance)?;
        let spec = translate(params, ResourceKind::Internships, &self.limits)?;

        let radius =
            geo::compute_radius(self.geocoder.as_ref(), &self.radii, address, distance, unit)
                .await?;
        tracing::debug!(
            address = %address,
            longitude = radius.center.longitude(),
            latitude = radius.center.latitude(),
            radius = radius.radius,
            "Radius search"
        );

        let spec = spec.within_sphere(GEO_FIELD, radius.center, radius.radius);
        let page = self.store.query_internships(&spec).await?;
        Ok(Listing {
            page,
            pagination: spec.pagination,
        })
    }

    async fn locate(&self, id: &str) -> Result<LookupResult> {
        let internship_id: Uuid = locator::parse_id(id).ok_or_else(|| not_found(id))?;
        self.store
            .find_owner(internship_id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Best-effort position from `location`; a failed lookup leaves it unset.
    async fn position_for(&self, internship: &Internship) -> Option<GeoPoint> {
        let location = internship.location.as_deref()?.trim();
        if location.is_empty() {
            return None;
        }
        match self.geocoder.geocode(location).await {
            Ok(candidates) => candidates
                .first()
                .map(|c| GeoPoint::new(c.longitude, c.latitude)),
            Err(e) => {
                tracing::warn!(location = %location, error = %e, "Geocoding on create failed");
                None
            }
        }
    }
}
