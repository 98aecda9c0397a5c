//! Body verification synthesis.
//!
//! A body plus its matchers becomes an ordered list of path-addressed
//! assertions:
//!
//! 1. one statement parsing the body under a query variable,
//! 2. plain equality assertions for every leaf no matcher covers,
//! 3. an `and:` block with one assertion per matcher, in declaration order.
//!
//! Matched paths are removed from a copy of the body before step 2, so a
//! matcher and a literal leaf never assert the same path.

mod json;
mod text;
mod xml;

pub use json::{json_body, JsonBodySynthesizer};
pub use text::{binary_body, text_body};
pub use xml::{xml_leaves, XmlBodySynthesizer, XmlLeaf};

use crate::emit::EmitBuffer;

/// What an assertion checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssertionKind {
    Equality,
    Regex,
    Null,
    Command,
    Type,
    /// Element count of a collection.
    Size,
    /// Byte-for-byte comparison against a fixture.
    Bytes,
}

/// One rendered assertion statement and the path it addresses.
///
/// Residual assertions carry the concrete path of the leaf they check
/// (`$['items'][0]`); matcher assertions carry the matcher's path verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyAssertion {
    pub path: String,
    pub kind: AssertionKind,
    pub line: String,
}

impl BodyAssertion {
    pub fn new(path: impl Into<String>, kind: AssertionKind, line: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            line: line.into(),
        }
    }
}

/// The synthesized verification of one body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodySynthesis {
    /// Statements declaring the parsed body.
    pub declarations: Vec<String>,
    /// Equality assertions for leaves no matcher covers.
    pub residual: Vec<BodyAssertion>,
    /// Matcher assertions, in matcher declaration order.
    pub matched: Vec<BodyAssertion>,
}

impl BodySynthesis {
    pub fn assertions(&self) -> impl Iterator<Item = &BodyAssertion> {
        self.residual.iter().chain(self.matched.iter())
    }

    /// Records the synthesis as emit instructions.
    ///
    /// Must be flattened inside an open section: the matcher block closes
    /// the current section and opens an `and:` section in its place.
    pub fn to_emit(&self) -> EmitBuffer {
        let mut buffer = EmitBuffer::new();
        for declaration in &self.declarations {
            buffer.line_with_ending(declaration.as_str());
        }
        for assertion in &self.residual {
            buffer.line_with_ending(assertion.line.as_str());
        }
        if !self.matched.is_empty() {
            buffer.empty_line().close_block().start_section("and:");
            for assertion in &self.matched {
                buffer.line_with_ending(assertion.line.as_str());
            }
        }
        buffer
    }
}
