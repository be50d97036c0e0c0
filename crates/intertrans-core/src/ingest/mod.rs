//! Response ingest: decoded batch responses to edge tables.

pub mod flatten;

pub use flatten::{ingest_binary, ingest_json, response_to_rows};
