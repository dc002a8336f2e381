use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// The compiled artifact: one bytecode buffer per `;`-terminated source and
/// the shared constants pool, decimal-string encoded.
///
/// Constructed fresh per compile call; immutable once returned. Every source
/// buffer's length is a multiple of 4.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionConfig {
    pub sources: Vec<Vec<u8>>,
    pub constants: Vec<String>,
}

/// Deduplicating constants pool. Values are interned in first-use order and
/// referenced by index from `read-memory` instructions.
#[derive(Debug, Default)]
pub struct ConstantPool {
    values: Vec<U256>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a value, returning its pool index. Equal values share an
    /// index.
    pub fn intern(&mut self, value: U256) -> usize {
        if let Some(index) = self.values.iter().position(|v| *v == value) {
            return index;
        }
        self.values.push(value);
        self.values.len() - 1
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume the pool into decimal strings, in first-use order.
    pub fn into_strings(self) -> Vec<String> {
        self.values.iter().map(|v| v.to_string()).collect()
    }
}
