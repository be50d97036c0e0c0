//! Decoders and encoders for the two equivalent batch-response encodings.

pub mod json;
pub mod wire;

use std::path::Path;

use crate::errors::{IntertransError, IntertransResult};
use crate::models::BatchResponse;

/// On-disk / on-wire encoding of a batch response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchEncoding {
    Binary,
    Json,
}

impl BatchEncoding {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Binary => "bin",
            Self::Json => "json",
        }
    }

    /// Pick the encoding from a file extension (`.bin` or `.json`).
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "bin" | "pb" => Some(Self::Binary),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Decode raw bytes in the given encoding.
pub fn decode(data: &[u8], encoding: BatchEncoding) -> IntertransResult<BatchResponse> {
    match encoding {
        BatchEncoding::Binary => wire::decode_batch_response(data),
        BatchEncoding::Json => {
            let text = std::str::from_utf8(data).map_err(|e| {
                IntertransError::MalformedResponse(format!("JSON payload is not UTF-8: {e}"))
            })?;
            json::decode_batch_response(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_from_path() {
        assert_eq!(
            BatchEncoding::from_path(Path::new("out/run.bin")),
            Some(BatchEncoding::Binary)
        );
        assert_eq!(
            BatchEncoding::from_path(Path::new("out/run.JSON")),
            Some(BatchEncoding::Json)
        );
        assert_eq!(BatchEncoding::from_path(Path::new("out/run.csv")), None);
        assert_eq!(BatchEncoding::from_path(Path::new("out/run")), None);
    }

    #[test]
    fn test_decode_rejects_non_utf8_json() {
        assert!(matches!(
            decode(&[0xff, 0xfe], BatchEncoding::Json),
            Err(IntertransError::MalformedResponse(_))
        ));
    }
}
