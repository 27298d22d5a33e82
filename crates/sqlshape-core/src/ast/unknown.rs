//! Passthrough for statements the grammar does not decompose.

use super::expression::ParamRef;

/// A piece of an unknown statement.
#[derive(Debug, Clone, PartialEq)]
pub enum UnknownPart {
    /// Raw SQL text, including any whitespace.
    Text(String),
    /// A placeholder found in the text.
    Param(ParamRef),
}

/// A statement kept as text fragments and the placeholders between them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnknownStatement {
    /// The fragments, in source order.
    pub parts: Vec<UnknownPart>,
}

impl UnknownStatement {
    /// Appends text, merging it with a preceding text fragment.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(UnknownPart::Text(last)) = self.parts.last_mut() {
            last.push_str(text);
        } else {
            self.parts.push(UnknownPart::Text(String::from(text)));
        }
    }

    /// Appends a placeholder.
    pub fn push_param(&mut self, param: ParamRef) {
        self.parts.push(UnknownPart::Param(param));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamKey;

    #[test]
    fn test_text_fragments_merge() {
        let mut stmt = UnknownStatement::default();
        stmt.push_text("DROP ");
        stmt.push_text("TABLE t");
        stmt.push_param(ParamRef::new(ParamKey::Named(String::from("x"))));
        stmt.push_text("");
        assert_eq!(stmt.parts.len(), 2);
        assert_eq!(stmt.parts[0], UnknownPart::Text(String::from("DROP TABLE t")));
    }
}
