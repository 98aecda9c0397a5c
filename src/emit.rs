//! Emit instructions.
//!
//! Fragments do not write into the shared [`TextAssembler`] directly. Each
//! one records an [`EmitBuffer`] of instructions which the renderer checks
//! for balance and then flattens, in order, into the assembler.

use crate::assembler::TextAssembler;
use crate::{RenderError, RenderResult};

/// One text-assembly instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emit {
    /// Raw text on the current line.
    Append(String),
    /// Indentation then text, no newline.
    Indented(String),
    Line(String),
    /// A line terminated with the profile's line ending.
    LineWithEnding(String),
    EmptyLine,
    /// A BDD section label, commented out when the profile requires it.
    Label(String),
    /// Line terminator unless already present.
    Terminate,
    /// Ensures the buffer ends with a newline.
    EndLine,
    OpenBlock,
    CloseBlock,
    Indent,
    Unindent,
    OpenBrace,
    CloseBrace,
}

/// An ordered list of emit instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitBuffer {
    ops: Vec<Emit>,
}

impl EmitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: Emit) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn append(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Emit::Append(text.into()))
    }

    pub fn indented(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Emit::Indented(text.into()))
    }

    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Emit::Line(text.into()))
    }

    pub fn line_with_ending(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Emit::LineWithEnding(text.into()))
    }

    pub fn empty_line(&mut self) -> &mut Self {
        self.push(Emit::EmptyLine)
    }

    pub fn label(&mut self, label: impl Into<String>) -> &mut Self {
        self.push(Emit::Label(label.into()))
    }

    pub fn terminate(&mut self) -> &mut Self {
        self.push(Emit::Terminate)
    }

    pub fn end_line(&mut self) -> &mut Self {
        self.push(Emit::EndLine)
    }

    pub fn open_block(&mut self) -> &mut Self {
        self.push(Emit::OpenBlock)
    }

    pub fn close_block(&mut self) -> &mut Self {
        self.push(Emit::CloseBlock)
    }

    pub fn indent(&mut self) -> &mut Self {
        self.push(Emit::Indent)
    }

    pub fn unindent(&mut self) -> &mut Self {
        self.push(Emit::Unindent)
    }

    /// Records `inner` between a brace pair.
    pub fn wrap_in_braces<F>(&mut self, inner: F) -> RenderResult<&mut Self>
    where
        F: FnOnce(&mut Self) -> RenderResult<()>,
    {
        self.push(Emit::OpenBrace);
        inner(self)?;
        Ok(self.push(Emit::CloseBrace))
    }

    /// Starts a labelled BDD section; its content is one block deeper.
    pub fn start_section(&mut self, label: impl Into<String>) -> &mut Self {
        self.label(label).open_block()
    }

    /// A chained call: `head` on its own line, then one continuation line
    /// per link. The last line carries the line ending.
    pub fn chain<S: AsRef<str>>(&mut self, head: impl Into<String>, links: &[S]) -> &mut Self {
        if links.is_empty() {
            return self.line_with_ending(head);
        }
        self.line(head).indent();
        for (idx, link) in links.iter().enumerate() {
            if idx + 1 == links.len() {
                self.line_with_ending(link.as_ref());
            } else {
                self.line(link.as_ref());
            }
        }
        self.unindent()
    }

    pub fn extend(&mut self, other: EmitBuffer) -> &mut Self {
        self.ops.extend(other.ops);
        self
    }

    pub fn ops(&self) -> &[Emit] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Verifies every open has a matching close of the same kind.
    pub fn check_balance(&self) -> RenderResult<()> {
        let mut stack = Vec::new();
        for (idx, op) in self.ops.iter().enumerate() {
            match op {
                Emit::OpenBlock | Emit::Indent | Emit::OpenBrace => stack.push(op),
                Emit::CloseBlock | Emit::Unindent | Emit::CloseBrace => {
                    let expected = match op {
                        Emit::CloseBlock => Emit::OpenBlock,
                        Emit::Unindent => Emit::Indent,
                        _ => Emit::OpenBrace,
                    };
                    match stack.pop() {
                        Some(open) if *open == expected => {}
                        other => {
                            return Err(RenderError::unbalanced(format!(
                                "instruction {} ({:?}) closes {:?}",
                                idx, op, other
                            )))
                        }
                    }
                }
                _ => {}
            }
        }
        if stack.is_empty() {
            Ok(())
        } else {
            Err(RenderError::unbalanced(format!(
                "{} level(s) left open",
                stack.len()
            )))
        }
    }

    /// Replays the instructions into `assembler`.
    pub fn flatten_into(&self, assembler: &mut TextAssembler) -> RenderResult<()> {
        for op in &self.ops {
            match op {
                Emit::Append(text) => {
                    assembler.append(text);
                }
                Emit::Indented(text) => {
                    assembler.add_indented(text);
                }
                Emit::Line(text) => {
                    assembler.add_line(text);
                }
                Emit::LineWithEnding(text) => {
                    assembler.add_line_with_ending(text);
                }
                Emit::EmptyLine => {
                    assembler.add_empty_line();
                }
                Emit::Label(label) => {
                    assembler.add_label(label);
                }
                Emit::Terminate => {
                    assembler.terminate_if_absent();
                }
                Emit::EndLine => {
                    assembler.add_at_the_end("\n");
                }
                Emit::OpenBlock => {
                    assembler.open_block();
                }
                Emit::CloseBlock => {
                    assembler.close_block()?;
                }
                Emit::Indent => {
                    assembler.indent();
                }
                Emit::Unindent => {
                    assembler.unindent()?;
                }
                Emit::OpenBrace => {
                    assembler.open_brace();
                }
                Emit::CloseBrace => {
                    assembler.close_brace()?;
                }
            }
        }
        Ok(())
    }

    /// Flattens into a fresh assembler; used to unit-test fragments.
    pub fn render(&self, spacer: &str, line_ending: &str, label_prefix: &str) -> RenderResult<String> {
        self.check_balance()?;
        let mut assembler = TextAssembler::new(spacer)
            .with_line_ending(line_ending)
            .with_label_prefix(label_prefix);
        self.flatten_into(&mut assembler)?;
        assembler.into_string()
    }
}
