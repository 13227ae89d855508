//! roamly HTTP server library
//!
//! Exposes the router and application state so integration tests can drive
//! the API in-process.

pub mod routes;
