//! Opcode descriptor wire shapes and the decoded opmeta table.

use serde::{Deserialize, Serialize};

use crate::error::MetaError;

/// Name of the operand argument that encodes the input count directly.
///
/// The slot is never part of surface-syntax argument lists; the parser fills
/// it with the parsed input count.
pub const INPUTS_ARG: &str = "inputs";

/// A named input parameter of an opcode with a fixed input list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

/// Input arity specification of an opcode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputSpec {
    /// Zero inputs, no operand bits. The only valid constant is 0.
    Fixed(u8),
    /// Input count equals the parameter list length.
    List { parameters: Vec<Param> },
    /// Input count is derived from operand bits, optionally via a computation.
    Computed {
        bits: [u8; 2],
        #[serde(default, skip_serializing_if = "Option::is_none")]
        computation: Option<String>,
    },
}

/// Output arity specification of an opcode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputSpec {
    Fixed(u8),
    Computed {
        bits: [u8; 2],
        #[serde(default, skip_serializing_if = "Option::is_none")]
        computation: Option<String>,
    },
}

/// One declared operand-argument bit field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperandArg {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Inclusive bit range `[lo, hi]` within the 16-bit operand.
    pub bits: [u8; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computation: Option<String>,
}

impl OperandArg {
    pub fn is_inputs(&self) -> bool {
        self.name == INPUTS_ARG
    }
}

/// Operand specification of an opcode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OperandSpec {
    /// The operand is a constant; the opcode takes no surface arguments.
    Fixed(u16),
    /// Bit-packed argument list, in declared order.
    ArgList(Vec<OperandArg>),
}

/// A single opcode descriptor from the opmeta table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpcodeDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,
    pub desc: String,
    pub inputs: InputSpec,
    pub outputs: OutputSpec,
    pub operand: OperandSpec,
}

impl OpcodeDescriptor {
    /// Check whether `word` names this opcode, by name or alias.
    pub fn is_named(&self, word: &str) -> bool {
        if self.name == word {
            return true;
        }
        self.aliases
            .as_ref()
            .is_some_and(|aliases| aliases.iter().any(|a| a == word))
    }

    /// Surface operand arguments: the declared list minus the `inputs` slot.
    pub fn surface_args(&self) -> Vec<&OperandArg> {
        match &self.operand {
            OperandSpec::Fixed(_) => Vec::new(),
            OperandSpec::ArgList(args) => args.iter().filter(|a| !a.is_inputs()).collect(),
        }
    }

    fn validate(&self) -> Result<(), MetaError> {
        if let InputSpec::Fixed(n) = self.inputs {
            if n != 0 {
                return Err(MetaError::InvalidOpMeta);
            }
        }
        if let InputSpec::Computed { bits, .. } = self.inputs {
            validate_bits(bits)?;
        }
        if let OutputSpec::Computed { bits, .. } = self.outputs {
            validate_bits(bits)?;
        }
        if let OperandSpec::ArgList(args) = &self.operand {
            if args.is_empty() {
                return Err(MetaError::InvalidOpMeta);
            }
            if args.iter().filter(|a| a.is_inputs()).count() > 1 {
                return Err(MetaError::BadOperandArgsOrder);
            }
            for arg in args {
                validate_bits(arg.bits).map_err(|_| MetaError::BadOperandArgsOrder)?;
            }
            // Fields must be declared in descending, non-overlapping bit order.
            for pair in args.windows(2) {
                if pair[1].bits[1] >= pair[0].bits[0] {
                    return Err(MetaError::BadOperandArgsOrder);
                }
            }
        }
        Ok(())
    }
}

fn validate_bits(bits: [u8; 2]) -> Result<(), MetaError> {
    if bits[0] > bits[1] || bits[1] > 15 {
        return Err(MetaError::InvalidOpMeta);
    }
    Ok(())
}

/// The decoded, validated opmeta table: an ordered list of opcode
/// descriptors, looked up by name/alias while parsing and by index while
/// decoding bytecode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpMeta {
    ops: Vec<OpcodeDescriptor>,
}

impl OpMeta {
    /// Build a table from descriptors, validating each one.
    pub fn new(ops: Vec<OpcodeDescriptor>) -> Result<Self, MetaError> {
        if ops.is_empty() {
            return Err(MetaError::ExpectedOpMeta);
        }
        for op in &ops {
            op.validate()?;
        }
        Ok(Self { ops })
    }

    /// Look up an opcode by name or alias, returning its index and descriptor.
    pub fn find(&self, word: &str) -> Option<(usize, &OpcodeDescriptor)> {
        self.ops
            .iter()
            .enumerate()
            .find(|(_, op)| op.is_named(word))
    }

    /// Get a descriptor by opcode index.
    pub fn get(&self, index: usize) -> Option<&OpcodeDescriptor> {
        self.ops.get(index)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OpcodeDescriptor> {
        self.ops.iter()
    }
}
