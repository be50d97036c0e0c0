//! On-disk persistence of batch responses and their tabular exports.

pub mod artifacts;
pub mod discovery;
pub mod export;
