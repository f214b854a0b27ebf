#![allow(unused)]
mod support;

mod auth;
mod companies;
mod envelope;
mod internships;
