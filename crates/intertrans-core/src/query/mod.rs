//! Analyses over ingested edge tables.

pub mod accuracy;
pub mod guards;
pub mod timeouts;
pub mod tree;
