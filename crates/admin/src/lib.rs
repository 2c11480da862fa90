//! Live visitors admin library.
//!
//! Computes which signed-in customers and anonymous visitors are browsing a
//! shop right now, from the host platform's tracking tables, and serves the
//! result as JSON. Exposed as a library so the CLI and integration tests can
//! drive the same report.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod report;
pub mod routes;
pub mod state;
