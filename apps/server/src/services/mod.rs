//! Service layer - business logic over the company store

pub mod companies;
pub mod internships;

pub use companies::CompanyService;
pub use internships::InternshipService;

use crate::{db::QueryPage, query::Pagination};

/// A page of results with the window that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub page: QueryPage,
    pub pagination: Pagination,
}
