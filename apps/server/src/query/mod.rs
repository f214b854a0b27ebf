//! Backend-agnostic query model
//!
//! Request parameters are translated into a [`QuerySpec`] (see [`translate`]) which
//! each store executes in its own way: the in-memory store evaluates it directly
//! (see [`eval`]), the Postgres store compiles it to SQL. Field names are the public
//! JSON field names of the queried documents.

pub mod eval;
pub mod translate;

pub use translate::{translate, QueryLimits, RawParams, ResourceKind};

use crate::models::GeoPoint;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Typed right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Operand {
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Self::Text(s) => JsonValue::String(s.clone()),
            Self::Bool(b) => JsonValue::Bool(*b),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        field: String,
        op: CmpOp,
        value: Operand,
    },
    In {
        field: String,
        values: Vec<Operand>,
    },
    /// Point field within `radius` radians of `center` on the unit sphere.
    WithinSphere {
        field: String,
        center: GeoPoint,
        radius: f64,
    },
}

impl Condition {
    pub fn field(&self) -> &str {
        match self {
            Self::Compare { field, .. } | Self::In { field, .. } | Self::WithinSphere { field, .. } => {
                field
            }
        }
    }
}

/// Conjunction of conditions. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub conditions: Vec<Condition>,
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.conditions.iter().map(Condition::field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// One-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn skip(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.limit as usize)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub resource: ResourceKind,
    pub filter: Filter,
    /// Fields to return; empty means all fields.
    pub select: Vec<String>,
    pub sort: Vec<SortKey>,
    pub pagination: Pagination,
}

impl QuerySpec {
    /// Restrict results to points within a spherical cap.
    pub fn within_sphere(mut self, field: impl Into<String>, center: GeoPoint, radius: f64) -> Self {
        self.filter.push(Condition::WithinSphere {
            field: field.into(),
            center,
            radius,
        });
        self
    }
}
