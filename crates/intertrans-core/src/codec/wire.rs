//! Protobuf wire codec for engine responses and outgoing batch requests.
//!
//! A small reader/writer over the protobuf wire format, enough for the
//! message set below. Unknown fields are skipped so newer engines can add
//! fields without breaking older clients.
//!
//! ```text
//! BatchTranslationResponse {
//!   translation_responses: [TranslationResponse]   (field 1)
//! }
//! TranslationResponse {
//!   translation_request: TranslationRequest        (field 1, required)
//!   paths: [ResponseTranslationPath]               (field 2)
//! }
//! TranslationRequest {
//!   id: string (1)  seed_language: string (2)
//!   target_language: string (3)  seed_code: string (4)
//! }
//! ResponseTranslationPath {
//!   translation_edges: [ResponseTranslationEdge]   (field 1)
//!   edge_index_memoized: [bool]                    (field 2, packed, one per edge)
//! }
//! ResponseTranslationEdge {
//!   edge_id: int32 (1, required)  parent_edge_id: int32 (2, required)
//!   input_language: string (3)  target_language: string (4)
//!   level: int32 (5)  status: string (6)
//!   extracted_source_code: string (7)  inference_output: string (8)
//!   fuzzy_tests: [ResponseFuzzyTestCase] (9)
//!   unit_tests: [ResponseUnitTestCase] (10)
//!   prompt: string (11)  source_code: string (12)  success: bool (13)
//!   wall_time_inference: int64 (14)  wall_time_test_execution: int64 (15)
//!   used_inference_cache: bool (16)
//! }
//! ResponseFuzzyTestCase {
//!   stdin_input (1)  expected_output (2)  optional actual_output (3)
//!   passed: bool (4)  executed_code (5)
//! }
//! ResponseUnitTestCase {
//!   source_code (1)  optional actual_output (2)  passed: bool (3)
//!   executed_code (4)
//! }
//! BatchTranslationRequest {
//!   id: string (1)  translation_requests: [TranslationRequest] (2)
//! }
//! ```

use crate::errors::{IntertransError, IntertransResult};
use crate::models::{
    memo_positions, BatchResponse, BatchTranslationRequest, EdgeStatus, FuzzyTestCase, TestSuite,
    TranslationEdge, TranslationPath, TranslationRequest, TranslationResponse, UnitTestCase,
};

const WIRE_VARINT: u32 = 0;
const WIRE_FIXED64: u32 = 1;
const WIRE_LEN: u32 = 2;
const WIRE_FIXED32: u32 = 5;

fn malformed(message: impl Into<String>) -> IntertransError {
    IntertransError::MalformedResponse(message.into())
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn has_more(&self) -> bool {
        self.pos < self.data.len()
    }

    fn read_tag(&mut self) -> IntertransResult<(u32, u32)> {
        let varint = self.read_varint()?;
        let field_num = (varint >> 3) as u32;
        let wire_type = (varint & 0x7) as u32;
        if field_num == 0 {
            return Err(malformed("field number 0 is not valid"));
        }
        Ok((field_num, wire_type))
    }

    fn read_varint(&mut self) -> IntertransResult<u64> {
        let mut result: u64 = 0;
        let mut shift = 0;
        loop {
            let Some(&byte) = self.data.get(self.pos) else {
                return Err(malformed("unexpected end of data inside varint"));
            };
            self.pos += 1;
            result |= ((byte & 0x7F) as u64) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
            if shift >= 64 {
                return Err(malformed("varint overflow"));
            }
        }
    }

    fn read_int(&mut self) -> IntertransResult<i64> {
        Ok(self.read_varint()? as i64)
    }

    fn read_bool(&mut self) -> IntertransResult<bool> {
        Ok(self.read_varint()? != 0)
    }

    fn read_bytes(&mut self) -> IntertransResult<&'a [u8]> {
        let len = self.read_varint()? as usize;
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                malformed(format!(
                    "length-delimited field extends past data ({} + {} > {})",
                    self.pos,
                    len,
                    self.data.len()
                ))
            })?;
        let result = &self.data[self.pos..end];
        self.pos = end;
        Ok(result)
    }

    fn read_string(&mut self) -> IntertransResult<String> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| malformed("invalid UTF-8 in string field"))
    }

    fn skip(&mut self, n: usize) -> IntertransResult<()> {
        if self.pos + n > self.data.len() {
            return Err(malformed("unexpected end of data while skipping"));
        }
        self.pos += n;
        Ok(())
    }

    fn skip_field(&mut self, field_num: u32, wire_type: u32) -> IntertransResult<()> {
        match wire_type {
            WIRE_VARINT => self.read_varint().map(|_| ()),
            WIRE_FIXED64 => self.skip(8),
            WIRE_LEN => self.read_bytes().map(|_| ()),
            WIRE_FIXED32 => self.skip(4),
            _ => Err(malformed(format!(
                "unsupported wire type {wire_type} for field {field_num}"
            ))),
        }
    }

    fn expect(&self, field: &str, wire_type: u32, expected: u32) -> IntertransResult<()> {
        if wire_type != expected {
            return Err(malformed(format!(
                "field {field} has wire type {wire_type}, expected {expected}"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a serialized `BatchTranslationResponse`.
pub fn decode_batch_response(data: &[u8]) -> IntertransResult<BatchResponse> {
    let mut reader = WireReader::new(data);
    let mut batch = BatchResponse::default();
    while reader.has_more() {
        let (field_num, wire_type) = reader.read_tag()?;
        match field_num {
            1 => {
                reader.expect("translation_responses", wire_type, WIRE_LEN)?;
                let body = reader.read_bytes()?;
                batch.translation_responses.push(decode_response(body)?);
            }
            _ => reader.skip_field(field_num, wire_type)?,
        }
    }
    Ok(batch)
}

fn decode_response(data: &[u8]) -> IntertransResult<TranslationResponse> {
    let mut reader = WireReader::new(data);
    let mut request = None;
    let mut paths = Vec::new();
    while reader.has_more() {
        let (field_num, wire_type) = reader.read_tag()?;
        match field_num {
            1 => {
                reader.expect("translation_request", wire_type, WIRE_LEN)?;
                request = Some(decode_request(reader.read_bytes()?)?);
            }
            2 => {
                reader.expect("paths", wire_type, WIRE_LEN)?;
                paths.push(decode_path(reader.read_bytes()?)?);
            }
            _ => reader.skip_field(field_num, wire_type)?,
        }
    }
    let translation_request =
        request.ok_or_else(|| malformed("translation response without translation_request"))?;
    Ok(TranslationResponse {
        translation_request,
        paths,
    })
}

fn decode_request(data: &[u8]) -> IntertransResult<TranslationRequest> {
    let mut reader = WireReader::new(data);
    let mut request = TranslationRequest::default();
    while reader.has_more() {
        let (field_num, wire_type) = reader.read_tag()?;
        match field_num {
            1..=4 => {
                reader.expect("translation_request string", wire_type, WIRE_LEN)?;
                let value = reader.read_string()?;
                match field_num {
                    1 => request.id = value,
                    2 => request.seed_language = value,
                    3 => request.target_language = value,
                    _ => request.seed_code = value,
                }
            }
            _ => reader.skip_field(field_num, wire_type)?,
        }
    }
    Ok(request)
}

fn decode_path(data: &[u8]) -> IntertransResult<TranslationPath> {
    let mut reader = WireReader::new(data);
    let mut translation_edges = Vec::new();
    // Packed chunks and unpacked entries all extend one flag list.
    let mut memo_flags = Vec::new();
    while reader.has_more() {
        let (field_num, wire_type) = reader.read_tag()?;
        match (field_num, wire_type) {
            (1, WIRE_LEN) => {
                let body = reader.read_bytes()?;
                translation_edges.push(decode_edge(body)?);
            }
            (2, WIRE_LEN) => {
                let mut packed = WireReader::new(reader.read_bytes()?);
                while packed.has_more() {
                    memo_flags.push(packed.read_bool()?);
                }
            }
            (2, WIRE_VARINT) => memo_flags.push(reader.read_bool()?),
            (1 | 2, _) => {
                return Err(malformed(format!(
                    "path field {field_num} has unexpected wire type {wire_type}"
                )));
            }
            _ => reader.skip_field(field_num, wire_type)?,
        }
    }
    Ok(TranslationPath {
        translation_edges,
        edge_index_memoized: memo_positions(memo_flags)?,
    })
}

fn decode_edge(data: &[u8]) -> IntertransResult<TranslationEdge> {
    let mut reader = WireReader::new(data);
    let mut edge_id = None;
    let mut parent_edge_id = None;
    let mut edge = TranslationEdge::new(0, 0, EdgeStatus::parse(""));
    let mut fuzzy = Vec::new();
    let mut unit = Vec::new();

    while reader.has_more() {
        let (field_num, wire_type) = reader.read_tag()?;
        match field_num {
            1 | 2 | 5 | 13..=16 => {
                reader.expect("translation edge scalar", wire_type, WIRE_VARINT)?;
                match field_num {
                    1 => edge_id = Some(reader.read_int()?),
                    2 => parent_edge_id = Some(reader.read_int()?),
                    5 => edge.level = reader.read_int()?,
                    13 => edge.success = reader.read_bool()?,
                    14 => edge.wall_time_inference_ms = reader.read_int()?,
                    15 => edge.wall_time_test_execution_ms = reader.read_int()?,
                    _ => edge.used_inference_cache = reader.read_bool()?,
                }
            }
            3 | 4 | 6 | 7 | 8 | 11 | 12 => {
                reader.expect("translation edge string", wire_type, WIRE_LEN)?;
                let value = reader.read_string()?;
                match field_num {
                    3 => edge.input_language = value,
                    4 => edge.target_language = value,
                    6 => edge.status = EdgeStatus::parse(&value),
                    7 => edge.extracted_source_code = value,
                    8 => edge.inference_output = value,
                    11 => edge.prompt = value,
                    _ => edge.source_code = value,
                }
            }
            9 => {
                reader.expect("fuzzy_tests", wire_type, WIRE_LEN)?;
                fuzzy.push(decode_fuzzy_test(reader.read_bytes()?)?);
            }
            10 => {
                reader.expect("unit_tests", wire_type, WIRE_LEN)?;
                unit.push(decode_unit_test(reader.read_bytes()?)?);
            }
            _ => reader.skip_field(field_num, wire_type)?,
        }
    }

    edge.edge_id = edge_id.ok_or_else(|| malformed("translation edge without edge_id"))?;
    edge.parent_edge_id = parent_edge_id.ok_or_else(|| {
        malformed(format!(
            "translation edge {} without parent_edge_id",
            edge.edge_id
        ))
    })?;
    edge.tests = TestSuite::from_collections(fuzzy, unit);
    Ok(edge)
}

fn decode_fuzzy_test(data: &[u8]) -> IntertransResult<FuzzyTestCase> {
    let mut reader = WireReader::new(data);
    let mut test = FuzzyTestCase::default();
    while reader.has_more() {
        let (field_num, wire_type) = reader.read_tag()?;
        match field_num {
            1 | 2 | 3 | 5 => {
                reader.expect("fuzzy test string", wire_type, WIRE_LEN)?;
                let value = reader.read_string()?;
                match field_num {
                    1 => test.stdin_input = value,
                    2 => test.expected_output = value,
                    3 => test.actual_output = Some(value),
                    _ => test.executed_code = value,
                }
            }
            4 => {
                reader.expect("passed", wire_type, WIRE_VARINT)?;
                test.passed = reader.read_bool()?;
            }
            _ => reader.skip_field(field_num, wire_type)?,
        }
    }
    Ok(test)
}

fn decode_unit_test(data: &[u8]) -> IntertransResult<UnitTestCase> {
    let mut reader = WireReader::new(data);
    let mut test = UnitTestCase::default();
    while reader.has_more() {
        let (field_num, wire_type) = reader.read_tag()?;
        match field_num {
            1 | 2 | 4 => {
                reader.expect("unit test string", wire_type, WIRE_LEN)?;
                let value = reader.read_string()?;
                match field_num {
                    1 => test.source_code = value,
                    2 => test.actual_output = Some(value),
                    _ => test.executed_code = value,
                }
            }
            3 => {
                reader.expect("passed", wire_type, WIRE_VARINT)?;
                test.passed = reader.read_bool()?;
            }
            _ => reader.skip_field(field_num, wire_type)?,
        }
    }
    Ok(test)
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

#[derive(Default)]
struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    fn write_varint(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.buf.push((value as u8) | 0x80);
            value >>= 7;
        }
        self.buf.push(value as u8);
    }

    fn write_tag(&mut self, field_num: u32, wire_type: u32) {
        self.write_varint(((field_num as u64) << 3) | wire_type as u64);
    }

    /// Always emitted, even when zero.
    fn write_required_int(&mut self, field_num: u32, value: i64) {
        self.write_tag(field_num, WIRE_VARINT);
        self.write_varint(value as u64);
    }

    fn write_int(&mut self, field_num: u32, value: i64) {
        if value != 0 {
            self.write_required_int(field_num, value);
        }
    }

    fn write_bool(&mut self, field_num: u32, value: bool) {
        if value {
            self.write_tag(field_num, WIRE_VARINT);
            self.write_varint(1);
        }
    }

    fn write_len(&mut self, field_num: u32, bytes: &[u8]) {
        self.write_tag(field_num, WIRE_LEN);
        self.write_varint(bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
    }

    fn write_string(&mut self, field_num: u32, value: &str) {
        if !value.is_empty() {
            self.write_len(field_num, value.as_bytes());
        }
    }

    fn write_optional_string(&mut self, field_num: u32, value: Option<&str>) {
        if let Some(value) = value {
            self.write_len(field_num, value.as_bytes());
        }
    }

    fn write_message(&mut self, field_num: u32, build: impl FnOnce(&mut WireWriter)) {
        let mut nested = WireWriter::default();
        build(&mut nested);
        self.write_len(field_num, &nested.buf);
    }

    fn finish(self) -> Vec<u8> {
        self.buf
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a batch response in the engine's wire form.
pub fn encode_batch_response(batch: &BatchResponse) -> Vec<u8> {
    let mut writer = WireWriter::default();
    for response in &batch.translation_responses {
        writer.write_message(1, |w| encode_response(w, response));
    }
    writer.finish()
}

/// Encode an outgoing batch request for the serving system.
pub fn encode_batch_request(batch: &BatchTranslationRequest) -> Vec<u8> {
    let mut writer = WireWriter::default();
    writer.write_string(1, &batch.id);
    for request in &batch.translation_requests {
        writer.write_message(2, |w| encode_request(w, request));
    }
    writer.finish()
}

fn encode_response(w: &mut WireWriter, response: &TranslationResponse) {
    w.write_message(1, |w| encode_request(w, &response.translation_request));
    for path in &response.paths {
        w.write_message(2, |w| encode_path(w, path));
    }
}

fn encode_request(w: &mut WireWriter, request: &TranslationRequest) {
    w.write_string(1, &request.id);
    w.write_string(2, &request.seed_language);
    w.write_string(3, &request.target_language);
    w.write_string(4, &request.seed_code);
}

fn encode_path(w: &mut WireWriter, path: &TranslationPath) {
    for edge in &path.translation_edges {
        w.write_message(1, |w| encode_edge(w, edge));
    }
    if !path.edge_index_memoized.is_empty() {
        w.write_message(2, |w| {
            for flag in path.memo_flags() {
                w.write_varint(u64::from(flag));
            }
        });
    }
}

fn encode_edge(w: &mut WireWriter, edge: &TranslationEdge) {
    w.write_required_int(1, edge.edge_id);
    w.write_required_int(2, edge.parent_edge_id);
    w.write_string(3, &edge.input_language);
    w.write_string(4, &edge.target_language);
    w.write_int(5, edge.level);
    w.write_string(6, edge.status.as_str());
    w.write_string(7, &edge.extracted_source_code);
    w.write_string(8, &edge.inference_output);
    for test in edge.tests.fuzzy() {
        w.write_message(9, |w| {
            w.write_string(1, &test.stdin_input);
            w.write_string(2, &test.expected_output);
            w.write_optional_string(3, test.actual_output.as_deref());
            w.write_bool(4, test.passed);
            w.write_string(5, &test.executed_code);
        });
    }
    for test in edge.tests.unit() {
        w.write_message(10, |w| {
            w.write_string(1, &test.source_code);
            w.write_optional_string(2, test.actual_output.as_deref());
            w.write_bool(3, test.passed);
            w.write_string(4, &test.executed_code);
        });
    }
    w.write_string(11, &edge.prompt);
    w.write_string(12, &edge.source_code);
    w.write_bool(13, edge.success);
    w.write_int(14, edge.wall_time_inference_ms);
    w.write_int(15, edge.wall_time_test_execution_ms);
    w.write_bool(16, edge.used_inference_cache);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::response_to_rows;

    fn sample_batch() -> BatchResponse {
        let mut direct = TranslationEdge::new(1, -1, EdgeStatus::Failed);
        direct.input_language = "C++".to_string();
        direct.target_language = "Rust".to_string();
        direct.tests = TestSuite::Fuzzy(vec![FuzzyTestCase {
            stdin_input: "3\n".to_string(),
            expected_output: "6\n".to_string(),
            actual_output: Some(String::new()),
            passed: false,
            executed_code: "fn main() {}".to_string(),
        }]);
        let mut hop = TranslationEdge::new(2, 1, EdgeStatus::TranslationFound);
        hop.level = 1;
        hop.wall_time_inference_ms = 1250;
        hop.tests = TestSuite::Unit(vec![UnitTestCase {
            source_code: "assert f(1) == 2".to_string(),
            actual_output: None,
            passed: true,
            executed_code: String::new(),
        }]);
        BatchResponse {
            translation_responses: vec![TranslationResponse {
                translation_request: TranslationRequest {
                    id: "req-1".to_string(),
                    seed_language: "C++".to_string(),
                    target_language: "Rust".to_string(),
                    seed_code: "int main() {}".to_string(),
                },
                paths: vec![TranslationPath {
                    translation_edges: vec![direct, hop],
                    edge_index_memoized: [1u32].into_iter().collect(),
                }],
            }],
        }
    }

    #[test]
    fn test_varint_encoding_matches_protobuf() {
        let mut w = WireWriter::default();
        w.write_varint(300);
        assert_eq!(w.finish(), vec![0xAC, 0x02]);
    }

    #[test]
    fn test_negative_int_is_ten_bytes() {
        let mut w = WireWriter::default();
        w.write_required_int(2, -1);
        let bytes = w.finish();
        assert_eq!(bytes.len(), 11);
        let mut r = WireReader::new(&bytes);
        assert_eq!(r.read_tag().unwrap(), (2, WIRE_VARINT));
        assert_eq!(r.read_int().unwrap(), -1);
    }

    #[test]
    fn test_decode_reproduces_encoded_batch() {
        let batch = sample_batch();
        let decoded = decode_batch_response(&encode_batch_response(&batch)).unwrap();
        assert_eq!(decoded, batch);
    }

    #[test]
    fn test_empty_actual_output_survives_as_some() {
        let decoded = decode_batch_response(&encode_batch_response(&sample_batch())).unwrap();
        let edge = &decoded.translation_responses[0].paths[0].translation_edges[0];
        assert_eq!(edge.tests.fuzzy()[0].actual_output.as_deref(), Some(""));
    }

    #[test]
    fn test_empty_input_decodes_to_empty_batch() {
        let decoded = decode_batch_response(&[]).unwrap();
        assert!(decoded.translation_responses.is_empty());
    }

    #[test]
    fn test_unknown_fields_are_skipped() {
        let mut bytes = encode_batch_response(&sample_batch());
        let mut w = WireWriter::default();
        w.write_string(15, "future field");
        w.write_required_int(16, 7);
        bytes.extend(w.finish());
        let decoded = decode_batch_response(&bytes).unwrap();
        assert_eq!(decoded, sample_batch());
    }

    #[test]
    fn test_missing_edge_id_is_malformed() {
        let mut w = WireWriter::default();
        w.write_message(1, |w| {
            w.write_message(1, |w| w.write_string(1, "req"));
            w.write_message(2, |w| {
                w.write_message(1, |w| {
                    w.write_required_int(2, -1);
                    w.write_string(6, "FAILED");
                });
            });
        });
        let err = decode_batch_response(&w.finish()).unwrap_err();
        assert!(matches!(err, IntertransError::MalformedResponse(m) if m.contains("edge_id")));
    }

    #[test]
    fn test_missing_parent_edge_id_is_malformed() {
        let mut w = WireWriter::default();
        w.write_message(1, |w| {
            w.write_message(1, |w| w.write_string(1, "req"));
            w.write_message(2, |w| {
                w.write_message(1, |w| w.write_required_int(1, 4));
            });
        });
        let err = decode_batch_response(&w.finish()).unwrap_err();
        assert!(matches!(err, IntertransError::MalformedResponse(m) if m.contains("parent_edge_id")));
    }

    #[test]
    fn test_missing_request_is_malformed() {
        let mut w = WireWriter::default();
        w.write_message(1, |w| w.write_message(2, |_| {}));
        assert!(matches!(
            decode_batch_response(&w.finish()),
            Err(IntertransError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_truncated_buffer_is_malformed() {
        let bytes = encode_batch_response(&sample_batch());
        let truncated = &bytes[..bytes.len() - 3];
        assert!(matches!(
            decode_batch_response(truncated),
            Err(IntertransError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_unpacked_memoized_flags_accepted() {
        let mut w = WireWriter::default();
        w.write_message(1, |w| {
            w.write_message(1, |w| w.write_string(1, "req"));
            w.write_message(2, |w| {
                for id in [1, 2] {
                    w.write_message(1, |w| {
                        w.write_required_int(1, id);
                        w.write_required_int(2, if id == 1 { -1 } else { 1 });
                    });
                }
                w.write_required_int(2, 0);
                w.write_required_int(2, 1);
            });
        });
        let decoded = decode_batch_response(&w.finish()).unwrap();
        let path = &decoded.translation_responses[0].paths[0];
        assert!(!path.is_memoized(0));
        assert!(path.is_memoized(1));
    }

    #[test]
    fn test_packed_memoized_flags_are_per_position() {
        let mut w = WireWriter::default();
        w.write_message(1, |w| {
            w.write_message(1, |w| w.write_string(1, "req"));
            w.write_message(2, |w| {
                for id in [1, 2] {
                    w.write_message(1, |w| {
                        w.write_required_int(1, id);
                        w.write_required_int(2, if id == 1 { -1 } else { 1 });
                    });
                }
                w.write_len(2, &[0x00, 0x01]);
            });
        });
        let decoded = decode_batch_response(&w.finish()).unwrap();
        let memoized: Vec<u32> = decoded.translation_responses[0].paths[0]
            .edge_index_memoized
            .iter()
            .copied()
            .collect();
        assert_eq!(memoized, vec![1]);
    }

    #[test]
    fn test_flag_memoization_ingests_like_json() {
        let text = r#"{"translation_responses": [{
            "translation_request": {"id": "req"},
            "paths": [{
                "translation_edges": [
                    {"edge_id": 1, "parent_edge_id": -1, "status": "FAILED"},
                    {"edge_id": 2, "parent_edge_id": 1, "status": "TRANSLATION_FOUND"}
                ],
                "edge_index_memoized": [false, true]
            }]
        }]}"#;
        let mut w = WireWriter::default();
        w.write_message(1, |w| {
            w.write_message(1, |w| w.write_string(1, "req"));
            w.write_message(2, |w| {
                for (id, status) in [(1, "FAILED"), (2, "TRANSLATION_FOUND")] {
                    w.write_message(1, |w| {
                        w.write_required_int(1, id);
                        w.write_required_int(2, if id == 1 { -1 } else { 1 });
                        w.write_string(6, status);
                    });
                }
                w.write_len(2, &[0x00, 0x01]);
            });
        });
        let from_json = response_to_rows(&crate::codec::json::decode_batch_response(text).unwrap());
        let from_binary = response_to_rows(&decode_batch_response(&w.finish()).unwrap());
        let memoized: Vec<bool> = from_binary.rows().iter().map(|r| r.memoized).collect();
        assert_eq!(memoized, vec![false, true]);
        assert_eq!(from_binary, from_json);
    }

    #[test]
    fn test_memoized_positions_encode_as_flags() {
        let bytes = encode_batch_response(&sample_batch());
        let decoded = decode_batch_response(&bytes).unwrap();
        assert_eq!(decoded.translation_responses[0].paths[0].memo_flags(), vec![false, true]);
        // sample path: two edges, position 1 memoized -> packed `12 02 00 01`
        assert!(bytes.windows(4).any(|w| w == [0x12, 0x02, 0x00, 0x01]));
    }

    #[test]
    fn test_encode_batch_request_fields() {
        let batch = BatchTranslationRequest {
            id: "b".to_string(),
            translation_requests: vec![TranslationRequest {
                id: "r".to_string(),
                ..Default::default()
            }],
        };
        let bytes = encode_batch_request(&batch);
        let mut r = WireReader::new(&bytes);
        assert_eq!(r.read_tag().unwrap(), (1, WIRE_LEN));
        assert_eq!(r.read_string().unwrap(), "b");
        assert_eq!(r.read_tag().unwrap(), (2, WIRE_LEN));
        let request = decode_request(r.read_bytes().unwrap()).unwrap();
        assert_eq!(request.id, "r");
        assert!(!r.has_more());
    }
}
