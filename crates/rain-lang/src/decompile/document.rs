use crate::parse::ParseTree;

/// A reconstructed rainlang document: the rendered text, its meta hash
/// header, and the re-parsed trees proving the text is self-consistent.
#[derive(Clone, Debug)]
pub struct RainDocument {
    text: String,
    hash: String,
    trees: Vec<ParseTree>,
}

impl RainDocument {
    pub(crate) fn new(text: String, hash: String, trees: Vec<ParseTree>) -> Self {
        Self { text, hash, trees }
    }

    /// The full document text, including the `@<hash>` header and the
    /// `#expression-N` block markers.
    pub fn get_text(&self) -> &str {
        &self.text
    }

    pub fn meta_hash(&self) -> &str {
        &self.hash
    }

    /// One parse tree per source, in bytecode order.
    pub fn tree(&self) -> &[ParseTree] {
        &self.trees
    }
}

/// Strip document framing, leaving only the expression text: `@...` import
/// lines and `#...` block markers go, expression lines stay.
pub fn document_body(text: &str) -> String {
    text.lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            !trimmed.starts_with('@') && !trimmed.starts_with('#') && !trimmed.is_empty()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
