//! `milestoned` - A minimal HTTP backend for milestone records
//!
//! This library provides the core functionality for storing milestone
//! records (title, description, date, owner, attached images) in a flat
//! JSON file, persisting uploaded images to local disk, and exposing
//! create/list/delete operations over HTTP.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod milestone;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use milestone::Milestone;
pub use store::{FileStore, RecordStore};
