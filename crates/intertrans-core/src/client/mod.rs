//! Request shaping for the translation engine.
//!
//! Transport is supplied by the caller through [`TranslationService`].

pub mod service;

pub use service::{build_batch, receive_batch, submit_batch, ChannelOptions, TranslationService};
