//! Visitors Online Core - Shared types library.
//!
//! This crate provides the types used by the live visitors report:
//! - `admin` - Report computation, host database access and the JSON endpoint
//! - `cli` - Command-line tools for operators
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Parsing the maintenance IP list and extracting referrer
//! hosts live here so they can be tested without a store.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, packed IPv4 addresses, tracking rows and report entries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
