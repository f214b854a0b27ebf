//! Embedded internship lookup

use uuid::Uuid;

use crate::models::{Company, Internship};

/// First company, in stored order, whose internships contain `internship_id`.
pub fn find_owner(companies: &[Company], internship_id: Uuid) -> Option<(&Company, &Internship)> {
    companies
        .iter()
        .find_map(|company| company.internship(internship_id).map(|i| (company, i)))
}

/// Resolve a path id. Anything that is not a UUID cannot name a stored record.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}
