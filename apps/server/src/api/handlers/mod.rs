//! Request handlers for API endpoints
//!
//! Handlers extract the request, call a service and wrap the result in the
//! response envelope. Errors convert to failure envelopes on their own.

pub mod companies;
pub mod internships;
pub mod metrics;

pub use companies::*;
pub use internships::*;
pub use metrics::*;
