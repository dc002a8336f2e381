//! End-to-end compile and decompile tests.
//!
//! These tests verify the complete text → parse → emit path and its inverse
//! against a shared opmeta fixture. Tests are organized into modules by
//! functionality.

use rain_meta::{OPMETA_MAGIC, OpMeta, decode_opmeta};
use serde_json::json;

// Test modules
mod compile;
mod errors;
mod roundtrip;

/// Opcode indexes in the fixture table.
pub const OP_READ_MEMORY: u16 = 0;
pub const OP_ADD: u16 = 1;
pub const OP_SUB: u16 = 2;
pub const OP_BLOCK_TIMESTAMP: u16 = 3;
pub const OP_SPLIT: u16 = 4;
pub const OP_SET: u16 = 5;
pub const OP_FOLD: u16 = 6;

/// Build the fixture opmeta container bytes.
pub fn opmeta_bytes() -> Vec<u8> {
    let ops = json!([
        {
            "name": "read-memory",
            "desc": "push a constant or a stack back-reference",
            "inputs": 0,
            "outputs": 1,
            "operand": [
                {"name": "offset", "bits": [1, 15]},
                {"name": "type", "bits": [0, 0]}
            ]
        },
        {
            "name": "add",
            "aliases": ["sum"],
            "desc": "unchecked addition",
            "inputs": {"parameters": [{"name": "a"}, {"name": "b"}]},
            "outputs": 1,
            "operand": 0
        },
        {
            "name": "sub",
            "desc": "unchecked subtraction",
            "inputs": {"parameters": [{"name": "a"}, {"name": "b"}]},
            "outputs": 1,
            "operand": 0
        },
        {
            "name": "block-timestamp",
            "aliases": ["now"],
            "desc": "current block timestamp",
            "inputs": 0,
            "outputs": 1,
            "operand": 0
        },
        {
            "name": "split",
            "desc": "split a value into two words",
            "inputs": {"parameters": [{"name": "value"}]},
            "outputs": 2,
            "operand": 0
        },
        {
            "name": "set",
            "desc": "store a key/value pair",
            "inputs": {"parameters": [{"name": "key"}, {"name": "value"}]},
            "outputs": 0,
            "operand": 0
        },
        {
            "name": "fold",
            "desc": "fold inputs with a doubled width argument",
            "inputs": {"bits": [8, 11]},
            "outputs": 1,
            "operand": [
                {"name": "inputs", "bits": [8, 11]},
                {"name": "width", "bits": [0, 7], "computation": "width * 2"}
            ]
        }
    ]);
    let mut bytes = OPMETA_MAGIC.to_vec();
    bytes.extend_from_slice(&serde_json::to_vec(&ops).unwrap());
    bytes
}

/// The fixture opmeta as a hex-string source.
pub fn opmeta_hex() -> String {
    format!("0x{}", hex::encode(opmeta_bytes()))
}

/// The decoded fixture table.
pub fn test_meta() -> OpMeta {
    decode_opmeta(&opmeta_bytes()).unwrap()
}

/// Assemble expected source bytes from (opcode, operand) pairs.
pub fn instrs(pairs: &[(u16, u16)]) -> Vec<u8> {
    pairs
        .iter()
        .flat_map(|(opcode, operand)| {
            let mut b = opcode.to_be_bytes().to_vec();
            b.extend_from_slice(&operand.to_be_bytes());
            b
        })
        .collect()
}

/// Read-memory operand for a constant pool index.
pub fn const_ref(index: u16) -> u16 {
    (index << 1) | 1
}

/// Read-memory operand for a stack back-reference.
pub fn stack_ref(slot: u16) -> u16 {
    slot << 1
}

#[test]
fn fixture_decodes() {
    let meta = test_meta();
    assert_eq!(meta.len(), 7);
    assert_eq!(meta.find("read-memory").unwrap().0, OP_READ_MEMORY as usize);
    assert_eq!(meta.find("fold").unwrap().0, OP_FOLD as usize);
}
