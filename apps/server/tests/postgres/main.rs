//! Store tests against a live Postgres
//!
//! Run with `DATABASE_URL=postgres://... cargo test --test postgres -- --ignored`.
//! Every test works in its own schema, dropped afterwards.

#![allow(unused)]
mod support;

mod store;
