//! Decoder for the opmeta byte container.
//!
//! The container is an 8-byte magic prefix followed by a JSON array of
//! opcode descriptors. The binary format at large (versioning, multiple
//! sections) belongs to the external metadata tooling; this is the minimal
//! decoder the compiler needs, with the header check standing in for the
//! container's integrity check.

use serde::Deserialize;

use crate::error::MetaError;
use crate::opmeta::{OpMeta, OpcodeDescriptor};

/// Magic prefix identifying an opmeta payload.
pub const OPMETA_MAGIC: [u8; 8] = [0xff, 0x0a, 0x89, 0xc6, 0x74, 0xee, 0x12, 0x15];

/// Decode an opmeta table from a utf8 hex string (with or without a leading
/// `0x`).
pub fn decode_opmeta_hex(source: &str) -> Result<OpMeta, MetaError> {
    let trimmed = source.trim();
    if trimmed.is_empty() {
        return Err(MetaError::ExpectedOpMeta);
    }
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(stripped).map_err(|_| MetaError::InvalidBytes)?;
    decode_opmeta(&bytes)
}

/// Decode an opmeta table from raw container bytes.
pub fn decode_opmeta(bytes: &[u8]) -> Result<OpMeta, MetaError> {
    if bytes.is_empty() {
        return Err(MetaError::ExpectedOpMeta);
    }
    if bytes.len() < OPMETA_MAGIC.len() || bytes[..OPMETA_MAGIC.len()] != OPMETA_MAGIC {
        return Err(MetaError::IncorrectHeaderCheck);
    }
    let payload = &bytes[OPMETA_MAGIC.len()..];

    // The payload must be exactly one JSON document; trailing data is as
    // fatal as a malformed one.
    let mut de = serde_json::Deserializer::from_slice(payload);
    let ops =
        Vec::<OpcodeDescriptor>::deserialize(&mut de).map_err(|_| MetaError::InvalidOpMeta)?;
    de.end().map_err(|_| MetaError::InvalidOpMeta)?;

    OpMeta::new(ops)
}

/// Encode a descriptor list into container bytes. Test and tooling helper;
/// the compiler itself only ever decodes.
pub fn encode_opmeta(ops: &[OpcodeDescriptor]) -> Vec<u8> {
    let mut bytes = OPMETA_MAGIC.to_vec();
    bytes.extend_from_slice(&serde_json::to_vec(ops).expect("descriptors serialize"));
    bytes
}
