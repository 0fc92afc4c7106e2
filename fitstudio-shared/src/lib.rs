//! # FitStudio Shared Library
//!
//! Types, storage access and business logic shared by the FitStudio API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: Account and member-trainer relationship records
//! - `assignment`: Capacity-aware trainer assignment and backfill
//! - `auth`: Password hashing for registration
//! - `db`: Connection pool and migrations

pub mod assignment;
pub mod auth;
pub mod db;
pub mod models;

/// Current version of the FitStudio shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
