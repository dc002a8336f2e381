//! Opcode metadata adapter for the rainlang compiler.
//!
//! This crate normalizes externally-fetched opmeta bytes into an ordered
//! table of opcode descriptors, and provides the `MetaStore` capability used
//! to resolve a meta hash to those bytes:
//! - `opmeta` - descriptor wire shapes and the `OpMeta` table
//! - `container` - the byte-container decoder (magic header + JSON payload)
//! - `store` - hash-addressed metadata lookup
//! - `error` - the meta error taxonomy

pub mod container;
pub mod error;
pub mod opmeta;
pub mod store;

pub use container::{OPMETA_MAGIC, decode_opmeta, decode_opmeta_hex};
pub use error::MetaError;
pub use opmeta::{InputSpec, OpMeta, OpcodeDescriptor, OperandArg, OperandSpec, OutputSpec, Param};
pub use store::{MemoryStore, MetaStore, is_meta_hash};
