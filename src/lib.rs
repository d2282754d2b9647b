//! Route-Watch: routing-table change monitor
//!
//! A library for chunking a routing-table dump into keyed, hashed records
//! and reporting which records changed each time the file is rewritten.

pub mod config;
pub mod table;
pub mod time;
pub mod watch;
