//! Indented, correctly terminated source text.
//!
//! [`TextAssembler`] owns the output buffer of one render call. Indentation
//! is tracked as a stack so every push has a matching pop: a block level
//! (one unit) for braces and BDD sections, and a continuation level (two
//! units) for chained calls. Popping the wrong kind, or popping an empty
//! stack, is reported as [`RenderError::Unbalanced`].

use crate::{RenderError, RenderResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Indentation {
    Block,
    Continuation,
}

impl Indentation {
    fn width(self) -> usize {
        match self {
            Indentation::Block => 1,
            Indentation::Continuation => 2,
        }
    }
}

/// A byte range of the buffer, handed to post-processors so they can only
/// rewrite the text of the method they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone)]
pub struct TextAssembler {
    buffer: String,
    spacer: String,
    stack: Vec<Indentation>,
    line_ending: String,
    label_prefix: String,
}

impl TextAssembler {
    pub fn new(spacer: impl Into<String>) -> Self {
        Self {
            buffer: String::new(),
            spacer: spacer.into(),
            stack: Vec::new(),
            line_ending: String::new(),
            label_prefix: String::new(),
        }
    }

    pub fn with_line_ending(mut self, line_ending: impl Into<String>) -> Self {
        self.line_ending = line_ending.into();
        self
    }

    pub fn with_label_prefix(mut self, label_prefix: impl Into<String>) -> Self {
        self.label_prefix = label_prefix.into();
        self
    }

    pub fn line_ending(&self) -> &str {
        &self.line_ending
    }

    pub fn label_prefix(&self) -> &str {
        &self.label_prefix
    }

    /// Indentation depth in units.
    pub fn depth(&self) -> usize {
        self.stack.iter().map(|i| i.width()).sum()
    }

    pub fn open_block(&mut self) -> &mut Self {
        self.stack.push(Indentation::Block);
        self
    }

    pub fn close_block(&mut self) -> RenderResult<&mut Self> {
        self.pop(Indentation::Block)?;
        Ok(self)
    }

    /// Continuation indent for chained calls.
    pub fn indent(&mut self) -> &mut Self {
        self.stack.push(Indentation::Continuation);
        self
    }

    pub fn unindent(&mut self) -> RenderResult<&mut Self> {
        self.pop(Indentation::Continuation)?;
        Ok(self)
    }

    fn pop(&mut self, expected: Indentation) -> RenderResult<()> {
        match self.stack.pop() {
            Some(found) if found == expected => Ok(()),
            Some(found) => {
                self.stack.push(found);
                Err(RenderError::unbalanced(format!(
                    "expected to close a {:?} level but the innermost level is {:?}",
                    expected, found
                )))
            }
            None => Err(RenderError::unbalanced(format!(
                "{:?} level closed at depth 0",
                expected
            ))),
        }
    }

    /// Appends raw text to the current line.
    pub fn append(&mut self, text: &str) -> &mut Self {
        self.buffer.push_str(text);
        self
    }

    /// Current indentation followed by `text`, without a newline.
    pub fn add_indented(&mut self, text: &str) -> &mut Self {
        for _ in 0..self.depth() {
            self.buffer.push_str(&self.spacer);
        }
        self.buffer.push_str(text);
        self
    }

    pub fn add_line(&mut self, text: &str) -> &mut Self {
        self.add_indented(text);
        self.buffer.push('\n');
        self
    }

    pub fn add_line_with_ending(&mut self, text: &str) -> &mut Self {
        self.add_indented(text);
        self.terminate_if_absent();
        self.buffer.push('\n');
        self
    }

    pub fn add_empty_line(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    /// Emits a BDD section label, prefixed with the label marker (e.g. `// `).
    pub fn add_label(&mut self, label: &str) -> &mut Self {
        let prefixed = format!("{}{}", self.label_prefix, label);
        self.add_line(&prefixed)
    }

    /// Appends the line terminator unless the current line already ends with
    /// it (possibly followed by whitespace), or ends with a block opener or is
    /// empty. Calling it twice is the same as calling it once.
    pub fn terminate_if_absent(&mut self) -> &mut Self {
        let ending = self.line_ending.clone();
        self.add_at_the_end(&ending)
    }

    /// Places `token` at the end of the last line, before a trailing newline.
    pub fn add_at_the_end(&mut self, token: &str) -> &mut Self {
        if token.is_empty() || self.buffer.ends_with(token) {
            return self;
        }
        let (content_end, had_newline) = match self.buffer.strip_suffix('\n') {
            Some(body) => (body.len(), true),
            None => (self.buffer.len(), false),
        };
        let content = self.buffer[..content_end].trim_end_matches(|c: char| c == ' ' || c == '\t');
        if content.ends_with(token) {
            return self;
        }
        if token == self.line_ending
            && (content.is_empty() || content.ends_with('{') || content.ends_with('\n'))
        {
            return self;
        }
        if had_newline {
            let at = content.len();
            self.buffer.insert_str(at, token);
        } else {
            self.buffer.push_str(token);
        }
        self
    }

    /// Opens a brace on the current line and indents one block.
    pub fn open_brace(&mut self) -> &mut Self {
        self.buffer.push_str("{\n");
        self.open_block()
    }

    /// Closes the innermost block and puts the brace on its own line.
    pub fn close_brace(&mut self) -> RenderResult<&mut Self> {
        self.close_block()?;
        self.add_at_the_end("\n");
        self.add_line("}");
        Ok(self)
    }

    /// Runs `inner` inside a brace pair; balance holds by construction.
    pub fn wrap_in_braces<F>(&mut self, inner: F) -> RenderResult<&mut Self>
    where
        F: FnOnce(&mut Self) -> RenderResult<()>,
    {
        self.open_brace();
        inner(self)?;
        self.close_brace()
    }

    pub fn ends_with(&self, suffix: &str) -> bool {
        self.buffer.ends_with(suffix)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Span from `start` to the current end of the buffer.
    pub fn span_from(&self, start: usize) -> Span {
        Span {
            start: start.min(self.buffer.len()),
            end: self.buffer.len(),
        }
    }

    pub fn span_text(&self, span: Span) -> &str {
        &self.buffer[span.start..span.end]
    }

    /// Replaces the text of `span` and returns the span covering the new text.
    pub fn rewrite_span<F>(&mut self, span: Span, rewrite: F) -> RenderResult<Span>
    where
        F: FnOnce(&str) -> String,
    {
        if span.end > self.buffer.len()
            || !self.buffer.is_char_boundary(span.start)
            || !self.buffer.is_char_boundary(span.end)
        {
            return Err(RenderError::unbalanced(format!(
                "span {}..{} is outside the buffer",
                span.start, span.end
            )));
        }
        let replacement = rewrite(&self.buffer[span.start..span.end]);
        let end = span.start + replacement.len();
        self.buffer.replace_range(span.start..span.end, &replacement);
        Ok(Span {
            start: span.start,
            end,
        })
    }

    /// Finishes assembly; every indentation level must have been closed.
    pub fn into_string(self) -> RenderResult<String> {
        if !self.stack.is_empty() {
            return Err(RenderError::unbalanced(format!(
                "{} indentation level(s) left open",
                self.stack.len()
            )));
        }
        Ok(self.buffer)
    }
}
