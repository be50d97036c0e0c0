//! Engine-facing batch submission and reply decoding under channel limits.

use indexmap::IndexSet;
use tracing::{debug, info};

use crate::codec::wire::{decode_batch_response, encode_batch_request};
use crate::config::{engine_address, max_message_bytes};
use crate::errors::{IntertransError, IntertransResult};
use crate::models::{BatchResponse, BatchTranslationRequest, TranslationRequest};

/// Channel limits for talking to the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelOptions {
    pub address: String,
    pub max_send_message_bytes: usize,
    pub max_receive_message_bytes: usize,
}

impl ChannelOptions {
    /// Options from `INTERTRANS_ENGINE_ADDRESS` and `INTERTRANS_MAX_MESSAGE_BYTES`.
    pub fn from_env() -> Self {
        let cap = max_message_bytes();
        Self {
            address: engine_address(),
            max_send_message_bytes: cap,
            max_receive_message_bytes: cap,
        }
    }
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Decode a binary reply, refusing one larger than the receive limit.
pub fn receive_batch(payload: &[u8], options: &ChannelOptions) -> IntertransResult<BatchResponse> {
    if payload.len() > options.max_receive_message_bytes {
        return Err(IntertransError::InvalidParameter(format!(
            "reply of {} bytes is over the {} byte receive limit",
            payload.len(),
            options.max_receive_message_bytes
        )));
    }
    let response = decode_batch_response(payload)?;
    debug!(
        bytes = payload.len(),
        responses = response.translation_responses.len(),
        "decoded translation reply"
    );
    Ok(response)
}

/// The engine's batch translation endpoint.
pub trait TranslationService {
    fn batch_translate(&self, request: &BatchTranslationRequest) -> IntertransResult<BatchResponse>;
}

/// Build a batch, rejecting empty ids and duplicate request ids.
///
/// Request ids key every downstream grouping, so a repeated id would merge
/// two requests into one.
pub fn build_batch(
    id: &str,
    translation_requests: Vec<TranslationRequest>,
) -> IntertransResult<BatchTranslationRequest> {
    if id.is_empty() {
        return Err(IntertransError::InvalidParameter(
            "batch id must not be empty".to_string(),
        ));
    }
    let mut seen: IndexSet<&str> = IndexSet::new();
    for request in &translation_requests {
        if request.id.is_empty() {
            return Err(IntertransError::InvalidParameter(
                "request id must not be empty".to_string(),
            ));
        }
        if !seen.insert(request.id.as_str()) {
            return Err(IntertransError::InvalidParameter(format!(
                "duplicate request id {:?} in batch {id:?}",
                request.id
            )));
        }
    }
    Ok(BatchTranslationRequest {
        id: id.to_string(),
        translation_requests,
    })
}

/// Submit one batch. No retry; the service's error is returned as is.
pub fn submit_batch<S: TranslationService + ?Sized>(
    service: &S,
    request: &BatchTranslationRequest,
    options: &ChannelOptions,
) -> IntertransResult<BatchResponse> {
    let encoded = encode_batch_request(request).len();
    if encoded > options.max_send_message_bytes {
        return Err(IntertransError::InvalidParameter(format!(
            "batch {:?} encodes to {encoded} bytes, over the {} byte send limit",
            request.id, options.max_send_message_bytes
        )));
    }
    info!(
        batch = %request.id,
        requests = request.translation_requests.len(),
        bytes = encoded,
        address = %options.address,
        "submitting translation batch"
    );
    let response = service.batch_translate(request)?;
    debug!(
        batch = %request.id,
        responses = response.translation_responses.len(),
        edges = response.edge_count(),
        "received translation batch"
    );
    Ok(response)
}
