//! PDF Shelf Server Library
//!
//! Local PDF upload, storage and viewing service. The binary in main.rs wires
//! configuration and logging around the router built here.
//!
//! # Modules
//!
//! - `store`: PDF record store and its SQLite / in-memory backends
//! - `thumbnail`: Placeholder thumbnail generation
//! - `format`: File size and date labels
//! - `upload`: Validation of uploaded files
//! - `routes`: HTTP API

pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod routes;
pub mod state;
pub mod store;
pub mod thumbnail;
pub mod upload;

pub use routes::app;
