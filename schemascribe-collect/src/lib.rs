//! Library module for schemascribe-collect
//!
//! Connection resolution and snapshot output live here so they can be tested
//! without a database. The command-line entry point is in main.rs.

pub mod connection;
pub mod output;

pub use connection::ConnectionArgs;
pub use output::{save_snapshot, snapshot_summary};
