//! Response envelope
//!
//! Every endpoint answers with the same JSON wrapper:
//! - success: `{"success": true, "count"?: N, "pagination"?: {...}, "data": ...}`
//! - failure: `{"success": false, "error": "..."}`
//!
//! `count` is only present for collection results. Building an envelope has no side
//! effects; emitting the status line and headers is left to axum.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use crate::{db::QueryPage, query::Pagination, Error};

/// Neighbouring page reference in a paged list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub page: u32,
    pub limit: u32,
}

/// Paging metadata attached to list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

impl PageLinks {
    pub fn new(pagination: Pagination, total: usize) -> Self {
        let end = pagination.skip().saturating_add(pagination.limit as usize);
        let next = (end < total).then(|| PageRef {
            page: pagination.page + 1,
            limit: pagination.limit,
        });
        let prev = (pagination.page > 1).then(|| PageRef {
            page: pagination.page - 1,
            limit: pagination.limit,
        });

        Self {
            page: pagination.page,
            limit: pagination.limit,
            total,
            next,
            prev,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageLinks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    /// Single-object success.
    pub fn one(data: T) -> Self {
        Self {
            success: true,
            count: None,
            pagination: None,
            data: Some(data),
            error: None,
        }
    }
}

impl<T: Serialize> Envelope<Vec<T>> {
    /// Collection success; `count` is the number of items carried.
    pub fn many(items: Vec<T>) -> Self {
        Self {
            success: true,
            count: Some(items.len()),
            pagination: None,
            data: Some(items),
            error: None,
        }
    }

    pub fn with_pagination(mut self, links: PageLinks) -> Self {
        self.pagination = Some(links);
        self
    }
}

impl Envelope<JsonValue> {
    /// Success without a payload (deletes).
    pub fn empty() -> Self {
        Self::one(json!({}))
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            count: None,
            pagination: None,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Envelope plus the status it should be sent with.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub envelope: Envelope<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope::one(data),
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            envelope: Envelope::one(data),
        }
    }
}

impl ApiResponse<Vec<JsonValue>> {
    /// Paged list response built from a store result.
    pub fn page(page: QueryPage, pagination: Pagination) -> Self {
        let links = PageLinks::new(pagination, page.total);
        Self {
            status: StatusCode::OK,
            envelope: Envelope::many(page.items).with_pagination(links),
        }
    }
}

impl ApiResponse<JsonValue> {
    pub fn deleted() -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope::empty(),
        }
    }

    /// The single place errors are turned into failure envelopes.
    pub fn failure(error: &Error) -> Self {
        Self {
            status: error.status(),
            envelope: Envelope::failure(error.public_message()),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}
