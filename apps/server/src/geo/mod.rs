//! Geospatial radius search support
//!
//! Converts `address + distance + unit` into a spherical cap: the geocoded center
//! (longitude, latitude) and an angular radius in radians. The cap is matched
//! against stored points with the haversine central angle.

pub mod geocoder;

pub use geocoder::{Coordinates, Geocoder, HttpGeocoder, StaticGeocoder};

use std::str::FromStr;

use crate::{models::GeoPoint, Error, Result};

/// Units accepted by radius searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Miles,
    Kilometers,
}

impl FromStr for DistanceUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mi" => Ok(Self::Miles),
            "km" => Ok(Self::Kilometers),
            _ => Err(Error::InvalidUnit(s.to_string())),
        }
    }
}

/// Planetary radius per unit, from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarthRadius {
    pub miles: f64,
    pub kilometers: f64,
}

impl Default for EarthRadius {
    fn default() -> Self {
        Self {
            miles: 3963.2,
            kilometers: 6378.1,
        }
    }
}

impl EarthRadius {
    pub fn for_unit(&self, unit: DistanceUnit) -> f64 {
        match unit {
            DistanceUnit::Miles => self.miles,
            DistanceUnit::Kilometers => self.kilometers,
        }
    }

    /// Linear distance → angle in radians.
    pub fn angular_radius(&self, distance: f64, unit: DistanceUnit) -> f64 {
        distance / self.for_unit(unit)
    }
}

/// Center and radius of a radius search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusQuery {
    pub center: GeoPoint,
    /// Radians.
    pub radius: f64,
}

/// Parse the distance path segment.
pub fn parse_distance(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| Error::InvalidQuery(format!("distance must be a non-negative number, got '{raw}'")))
}

/// Geocode `address` and turn `distance` into an angular radius.
///
/// The unit is checked before the geocoder is called; the first candidate wins.
pub async fn compute_radius(
    geocoder: &dyn Geocoder,
    radii: &EarthRadius,
    address: &str,
    distance: f64,
    unit: &str,
) -> Result<RadiusQuery> {
    let unit: DistanceUnit = unit.parse()?;
    if !distance.is_finite() || distance < 0.0 {
        return Err(Error::InvalidQuery(format!(
            "distance must be a non-negative number, got {distance}"
        )));
    }

    let candidates = geocoder.geocode(address).await?;
    let first = candidates
        .first()
        .ok_or_else(|| Error::AddressNotFound(address.to_string()))?;

    Ok(RadiusQuery {
        center: GeoPoint::new(first.longitude, first.latitude),
        radius: radii.angular_radius(distance, unit),
    })
}

/// Central angle between two points in radians (haversine).
pub fn central_angle(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let (lat1, lat2) = (a.latitude().to_radians(), b.latitude().to_radians());
    let d_lat = lat2 - lat1;
    let d_lng = (b.longitude() - a.longitude()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}
