//! Operand encoding and decoding against opmeta bit layouts.
//!
//! Encode packs surface argument values and the input count into the 16-bit
//! operand of an instruction. Decode is its left inverse, used by the
//! decompiler to recover argument values and arities from live operands.

pub mod algebra;

use smallvec::SmallVec;
use thiserror::Error;

use rain_meta::{InputSpec, OpcodeDescriptor, OperandArg, OperandSpec, OutputSpec};

pub use algebra::{AlgebraError, Expr};

/// Failure modes of operand resolution for one opcode call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperandError {
    #[error("expected {expected} operand args, got {got}")]
    ArgCount { expected: usize, got: usize },
    #[error("unexpected operand args")]
    UnexpectedArgs,
    #[error("value {value} out of range for operand arg \"{arg}\"")]
    OutOfRange { arg: String, value: u64 },
    #[error("invalid computation for operand arg \"{arg}\": {source}")]
    Computation {
        arg: String,
        source: AlgebraError,
    },
}

fn field_width(bits: [u8; 2]) -> u32 {
    (bits[1] - bits[0] + 1) as u32
}

fn field_max(bits: [u8; 2]) -> u64 {
    if field_width(bits) >= 64 {
        u64::MAX
    } else {
        (1u64 << field_width(bits)) - 1
    }
}

fn extract_field(operand: u16, bits: [u8; 2]) -> u64 {
    ((operand as u64) >> bits[0]) & field_max(bits)
}

/// Evaluate a field's stored value from its surface value.
fn store_value(arg_name: &str, computation: Option<&str>, surface: u64) -> Result<u64, OperandError> {
    let Some(src) = computation else {
        return Ok(surface);
    };
    let expr = parse_computation(arg_name, src)?;
    let stored = expr
        .eval(surface as i64)
        .map_err(|source| OperandError::Computation {
            arg: arg_name.to_string(),
            source,
        })?;
    u64::try_from(stored).map_err(|_| OperandError::OutOfRange {
        arg: arg_name.to_string(),
        value: surface,
    })
}

/// Recover a field's surface value from its stored value.
fn surface_value(arg_name: &str, computation: Option<&str>, stored: u64) -> Result<u64, OperandError> {
    let Some(src) = computation else {
        return Ok(stored);
    };
    let expr = parse_computation(arg_name, src)?;
    let surface = expr
        .solve(stored as i64)
        .map_err(|source| OperandError::Computation {
            arg: arg_name.to_string(),
            source,
        })?;
    u64::try_from(surface).map_err(|_| OperandError::OutOfRange {
        arg: arg_name.to_string(),
        value: stored,
    })
}

fn parse_computation(arg_name: &str, src: &str) -> Result<Expr, OperandError> {
    Expr::parse(src).map_err(|source| OperandError::Computation {
        arg: arg_name.to_string(),
        source,
    })
}

fn pack_field(
    operand: &mut u16,
    arg_name: &str,
    bits: [u8; 2],
    computation: Option<&str>,
    surface: u64,
) -> Result<(), OperandError> {
    let stored = store_value(arg_name, computation, surface)?;
    if stored > field_max(bits) {
        return Err(OperandError::OutOfRange {
            arg: arg_name.to_string(),
            value: surface,
        });
    }
    *operand |= (stored as u16) << bits[0];
    Ok(())
}

/// Encode the 16-bit operand for a call.
///
/// `surface` holds the surface-syntax argument values in declared order
/// (excluding the implicit `inputs` slot, which is filled from
/// `input_count`). `had_args` is whether the call spelled an `<...>` section
/// at all; a `Fixed`-operand opcode rejects one even when empty.
pub fn encode_operand(
    desc: &OpcodeDescriptor,
    surface: &[u64],
    input_count: usize,
    had_args: bool,
) -> Result<u16, OperandError> {
    match &desc.operand {
        OperandSpec::Fixed(value) => {
            if had_args {
                return Err(OperandError::UnexpectedArgs);
            }
            Ok(*value)
        }
        OperandSpec::ArgList(args) => {
            let expected = args.iter().filter(|a| !a.is_inputs()).count();
            if surface.len() != expected {
                return Err(OperandError::ArgCount {
                    expected,
                    got: surface.len(),
                });
            }
            let mut operand = 0u16;
            let mut values = surface.iter();
            for arg in args {
                let value = if arg.is_inputs() {
                    input_count as u64
                } else {
                    *values.next().expect("surface count checked")
                };
                pack_field(
                    &mut operand,
                    &arg.name,
                    arg.bits,
                    arg.computation.as_deref(),
                    value,
                )?;
            }
            // Opcodes whose input count lives in operand bits without a
            // declared `inputs` arg pack it straight from the input spec.
            if let InputSpec::Computed { bits, computation } = &desc.inputs {
                if !args.iter().any(|a| a.is_inputs()) {
                    pack_field(
                        &mut operand,
                        "inputs",
                        *bits,
                        computation.as_deref(),
                        input_count as u64,
                    )?;
                }
            }
            Ok(operand)
        }
    }
}

/// Decode the surface-syntax argument values out of a live operand, in
/// declared order, excluding the `inputs` slot.
pub fn decode_surface_args(
    desc: &OpcodeDescriptor,
    operand: u16,
) -> Result<SmallVec<[u64; 4]>, OperandError> {
    let mut values = SmallVec::new();
    if let OperandSpec::ArgList(args) = &desc.operand {
        for arg in args.iter().filter(|a| !a.is_inputs()) {
            values.push(decode_field(arg, operand)?);
        }
    }
    Ok(values)
}

fn decode_field(arg: &OperandArg, operand: u16) -> Result<u64, OperandError> {
    surface_value(&arg.name, arg.computation.as_deref(), extract_field(operand, arg.bits))
}

/// Input arity of a call, given its live operand.
pub fn input_arity(desc: &OpcodeDescriptor, operand: u16) -> Result<usize, OperandError> {
    match &desc.inputs {
        InputSpec::Fixed(_) => Ok(0),
        InputSpec::List { parameters } => Ok(parameters.len()),
        InputSpec::Computed { bits, computation } => {
            let stored = extract_field(operand, *bits);
            Ok(surface_value("inputs", computation.as_deref(), stored)? as usize)
        }
    }
}

/// Output arity of a call, given its live operand.
pub fn output_arity(desc: &OpcodeDescriptor, operand: u16) -> Result<usize, OperandError> {
    match &desc.outputs {
        OutputSpec::Fixed(n) => Ok(*n as usize),
        OutputSpec::Computed { bits, computation } => {
            let stored = extract_field(operand, *bits);
            Ok(surface_value("outputs", computation.as_deref(), stored)? as usize)
        }
    }
}
