//! Bytecode replay: the inverse of the emitter.
//!
//! Each source's instruction stream replays left-to-right over a simulated
//! value stack of rendered strings, one push per instruction. Multi-output
//! and zero-output opcodes are tracked by counters rather than extra pushes;
//! the final LHS placeholder count is `depth + extras - zeros`.

use alloy_primitives::U256;
use rain_core::{Diagnostic, decode_source, extract_opcode, extract_operand};
use rain_meta::{MetaError, MetaStore, OpMeta, decode_opmeta, is_meta_hash};
use thiserror::Error;

use crate::compile::{ExpressionConfig, READ_MEMORY};
use crate::operand;
use crate::parse::parse;

use super::document::RainDocument;

/// Failure modes of decompilation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecompileError {
    /// The meta hash is not `0x` + 64 hex digits.
    #[error("invalid meta hash: {0}")]
    InvalidHash(String),

    /// The store could not resolve the hash, or the resolved bytes are not
    /// a valid opmeta container.
    #[error(transparent)]
    Meta(#[from] MetaError),

    /// Structurally bad bytecode: ragged length, out-of-range indexes,
    /// stack underflow.
    #[error("{0}")]
    Codec(String),

    /// Non-invertible or corrupt operand data.
    #[error("{0}")]
    Resolution(String),

    /// The rendered text failed to re-parse; carries the parse diagnostics.
    #[error("decompiled text does not re-parse")]
    Reparse(Vec<Diagnostic>),
}

/// The stack-simulation counters, threaded functionally through the
/// instruction replay loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayState {
    pub depth: usize,
    pub extras: usize,
    pub zeros: usize,
}

impl ReplayState {
    /// A plain value push (constant or back-reference).
    pub fn push_value(self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self
        }
    }

    /// An opcode consuming `inputs` values and producing `outputs`. Returns
    /// `None` on stack underflow. The op itself still pushes exactly one
    /// rendered item; arity bookkeeping goes through the counters.
    pub fn apply_op(self, inputs: usize, outputs: usize) -> Option<Self> {
        if inputs > self.depth {
            return None;
        }
        Some(Self {
            depth: self.depth - inputs + 1,
            extras: self.extras + outputs.saturating_sub(1),
            zeros: self.zeros + usize::from(outputs == 0),
        })
    }

    /// Number of LHS placeholders the replayed source binds.
    pub fn lhs_count(self) -> usize {
        self.depth + self.extras - self.zeros
    }
}

/// One simulated stack entry: the rendered text of an instruction and the
/// stack slots it owns.
struct Item {
    text: String,
    outputs: usize,
    /// LHS name per owned slot; `None` renders as `_`. A slot gets a name
    /// when a later back-reference targets it.
    names: Vec<Option<String>>,
}

/// Decompile bytecode into a rainlang document, resolving the opmeta through
/// the injected store.
///
/// The rendered text is re-parsed against the same opmeta as a
/// self-consistency check before being returned.
pub fn decompile(
    config: &ExpressionConfig,
    meta_hash: &str,
    store: &mut dyn MetaStore,
) -> Result<RainDocument, DecompileError> {
    if !is_meta_hash(meta_hash) {
        return Err(DecompileError::InvalidHash(meta_hash.to_string()));
    }
    let bytes = store.update(meta_hash)?;
    let meta = decode_opmeta(&bytes)?;

    let constants = config
        .constants
        .iter()
        .map(|c| {
            U256::from_str_radix(c, 10)
                .map_err(|_| DecompileError::Codec(format!("invalid constant: {c}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut lines = Vec::with_capacity(config.sources.len());
    for (index, source) in config.sources.iter().enumerate() {
        lines.push(replay_source(index, source, &meta, &constants)?);
    }

    let mut text = format!("@{meta_hash}\n");
    for (index, line) in lines.iter().enumerate() {
        text.push_str(&format!("#expression-{}\n{}\n", index + 1, line));
    }

    let body = lines.join("\n");
    let trees = parse(&body, &meta).map_err(DecompileError::Reparse)?;

    Ok(RainDocument::new(text, meta_hash.to_string(), trees))
}

fn replay_source(
    index: usize,
    source: &[u8],
    meta: &OpMeta,
    constants: &[U256],
) -> Result<String, DecompileError> {
    let instrs = decode_source(source).ok_or_else(|| {
        DecompileError::Codec(format!(
            "source {index} bytecode length must be a multiple of 4"
        ))
    })?;

    let mut stack: Vec<Item> = Vec::new();
    let mut state = ReplayState::default();
    let mut has_backref = false;

    for instr in instrs {
        let opcode = extract_opcode(instr) as usize;
        let operand = extract_operand(instr);
        let desc = meta.get(opcode).ok_or_else(|| {
            DecompileError::Codec(format!(
                "opcode index {opcode} out of range in source {index}"
            ))
        })?;

        if desc.name == READ_MEMORY {
            let offset = (operand >> 1) as usize;
            let text = if operand & 1 == 1 {
                let value = constants.get(offset).ok_or_else(|| {
                    DecompileError::Codec(format!(
                        "constant index {offset} out of range in source {index}"
                    ))
                })?;
                if *value == U256::MAX {
                    "max-uint256".to_string()
                } else {
                    value.to_string()
                }
            } else {
                has_backref = true;
                name_slot(&mut stack, offset).ok_or_else(|| {
                    DecompileError::Codec(format!(
                        "invalid stack back-reference {offset} in source {index}"
                    ))
                })?
            };
            stack.push(Item {
                text,
                outputs: 1,
                names: vec![None],
            });
            state = state.push_value();
            continue;
        }

        let inputs = arity(|| operand::input_arity(desc, operand), &desc.name)?;
        let outputs = arity(|| operand::output_arity(desc, operand), &desc.name)?;
        let args = operand::decode_surface_args(desc, operand)
            .map_err(|_| resolution_error(&desc.name))?;

        state = state.apply_op(inputs, outputs).ok_or_else(|| {
            DecompileError::Codec(format!("bytecode stack underflow in source {index}"))
        })?;

        let mut children = Vec::with_capacity(inputs);
        for _ in 0..inputs {
            let item = stack.pop().expect("depth checked by apply_op");
            if item.outputs != 1 {
                return Err(DecompileError::Codec(format!(
                    "op input consumes a non-single-output value in source {index}"
                )));
            }
            children.push(item.text);
        }
        children.reverse();

        let args_section = if args.is_empty() {
            String::new()
        } else {
            format!(
                "<{}>",
                args.iter()
                    .map(u64::to_string)
                    .collect::<Vec<_>>()
                    .join(" ")
            )
        };
        let text = format!("{}{}({})", desc.name, args_section, children.join(" "));

        stack.push(Item {
            text,
            outputs,
            names: vec![None; outputs],
        });
    }

    debug_assert_eq!(
        state.lhs_count(),
        stack.iter().map(|i| i.outputs).sum::<usize>()
    );

    Ok(render_source(&stack, has_backref))
}

fn arity(
    get: impl FnOnce() -> Result<usize, operand::OperandError>,
    name: &str,
) -> Result<usize, DecompileError> {
    get().map_err(|_| resolution_error(name))
}

fn resolution_error(name: &str) -> DecompileError {
    DecompileError::Resolution(format!(
        "invalid/corrupt operand or operand arguments in opmeta: {name}"
    ))
}

/// Find the item owning global stack slot `slot`, give that slot a stable
/// alias name, and return the name.
fn name_slot(stack: &mut [Item], slot: usize) -> Option<String> {
    let mut base = 0usize;
    for item in stack.iter_mut() {
        if slot < base + item.outputs {
            let name = format!("stack-{slot}");
            item.names[slot - base] = Some(name.clone());
            return Some(name);
        }
        base += item.outputs;
    }
    None
}

/// Render the surviving stack as one source line.
///
/// Without back-references a source is a single clause. With them, each
/// top-level item becomes its own clause so the named slot is bound by an
/// earlier clause and the output re-parses.
fn render_source(stack: &[Item], split_clauses: bool) -> String {
    if stack.is_empty() {
        return "_:;".to_string();
    }
    if split_clauses {
        let clauses: Vec<String> = stack
            .iter()
            .map(|item| format!("{}: {}", lhs_of(&item.names), item.text).trim().to_string())
            .collect();
        format!("{};", clauses.join(", "))
    } else {
        let names: Vec<&[Option<String>]> = stack.iter().map(|i| i.names.as_slice()).collect();
        let lhs = lhs_of(&names.concat());
        let rhs: Vec<&str> = stack.iter().map(|i| i.text.as_str()).collect();
        format!("{}: {};", lhs, rhs.join(" ")).trim().to_string()
    }
}

fn lhs_of(names: &[Option<String>]) -> String {
    names
        .iter()
        .map(|n| n.as_deref().unwrap_or("_"))
        .collect::<Vec<_>>()
        .join(" ")
}
