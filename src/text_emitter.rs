//! Block-style YAML text writer for raw events.
//!
//! Mappings and sequences are written in block style. A sequence under a mapping key
//! starts at the key's column, a mapping or sequence inside a sequence item starts on
//! the dash line. Empty collections are written as `{}` and `[]`. Anchors and aliases
//! are named `a<id>`. Keys too long for an implicit key use the explicit `? key` form.

use std::fmt::{self, Write};
use std::io;

use crate::error::Error;
use crate::raw::{AnchorId, RawEmitter, RawEvent, ScalarStyle};
use crate::ser_quoting::literal_safe;

/// The scanner gives up on an implicit key spanning this many characters.
const MAX_IMPLICIT_KEY_CHARS: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Block {
    Mapping,
    Sequence,
}

struct Frame {
    block: Block,
    /// Column of keys or dashes.
    indent: usize,
    /// Mapping only: a key was written and its value is next.
    awaiting_value: bool,
    /// Mapping only: the pending key was written as `? key`.
    explicit_key: bool,
}

/// Where the next node goes.
#[derive(Clone, Copy)]
enum Slot {
    Root,
    Key { indent: usize },
    Value { indent: usize },
    Item { indent: usize },
}

/// Writes raw events as block YAML into any [`fmt::Write`].
///
/// ```
/// use saphyr_json::{RawEmitter, RawEvent, TextEmitter};
///
/// let mut out = String::new();
/// let mut emitter = TextEmitter::new(&mut out, 2);
/// for event in [
///     RawEvent::StreamStart,
///     RawEvent::DocumentStart { explicit: false },
///     RawEvent::MappingStart { anchor: None },
///     RawEvent::plain("list"),
///     RawEvent::SequenceStart { anchor: None },
///     RawEvent::plain("1"),
///     RawEvent::SequenceEnd,
///     RawEvent::MappingEnd,
///     RawEvent::DocumentEnd { explicit: false },
///     RawEvent::StreamEnd,
/// ] {
///     emitter.emit(event)?;
/// }
/// assert_eq!(out, "list:\n- 1\n");
/// # Ok::<(), saphyr_json::Error>(())
/// ```
pub struct TextEmitter<W: Write> {
    out: W,
    indent_step: usize,
    stack: Vec<Frame>,
    /// A collection was started; whether it is empty is known with the next event.
    pending: Option<(Block, Option<AnchorId>)>,
    at_line_start: bool,
}

impl<W: Write> TextEmitter<W> {
    /// `indent_step` is the indentation of nested mappings. Values below 1 are taken as 1.
    pub fn new(out: W, indent_step: usize) -> Self {
        Self {
            out,
            indent_step: indent_step.max(1),
            stack: Vec::new(),
            pending: None,
            at_line_start: true,
        }
    }

    /// Give back the destination.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn slot(&self) -> Slot {
        match self.stack.last() {
            None => Slot::Root,
            Some(frame) => match (frame.block, frame.awaiting_value) {
                (Block::Mapping, false) => Slot::Key {
                    indent: frame.indent,
                },
                (Block::Mapping, true) => Slot::Value {
                    indent: frame.indent,
                },
                (Block::Sequence, _) => Slot::Item {
                    indent: frame.indent,
                },
            },
        }
    }

    fn write_indent(&mut self, indent: usize) -> fmt::Result {
        if self.at_line_start {
            for _ in 0..indent {
                self.out.write_char(' ')?;
            }
            self.at_line_start = false;
        }
        Ok(())
    }

    fn newline(&mut self) -> fmt::Result {
        self.out.write_char('\n')?;
        self.at_line_start = true;
        Ok(())
    }

    /// Move to where a node in `slot` starts.
    fn node_prefix(&mut self, slot: Slot) -> fmt::Result {
        match slot {
            Slot::Root => self.write_indent(0),
            Slot::Key { indent } => self.write_indent(indent),
            Slot::Value { .. } => self.out.write_char(' '),
            Slot::Item { indent } => {
                self.write_indent(indent)?;
                self.out.write_str("- ")
            }
        }
    }

    /// Indentation of block scalar content for a node in `slot`.
    fn body_indent(&self, slot: Slot) -> usize {
        match slot {
            Slot::Root => self.indent_step,
            Slot::Key { indent } | Slot::Value { indent } => indent + self.indent_step,
            Slot::Item { indent } => indent + 2,
        }
    }

    /// A node in the current mapping is complete: a key makes room for its value and a
    /// value for the next key.
    fn node_done(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            if frame.block == Block::Mapping {
                frame.awaiting_value = !frame.awaiting_value;
                if !frame.awaiting_value {
                    frame.explicit_key = false;
                }
            }
        }
    }

    fn scalar(&mut self, value: &str, style: ScalarStyle, anchor: Option<AnchorId>) -> Result<(), Error> {
        let slot = self.slot();
        let is_key = matches!(slot, Slot::Key { .. });
        let style = match style {
            ScalarStyle::Literal | ScalarStyle::Folded if is_key || !literal_safe(value) => {
                ScalarStyle::DoubleQuoted
            }
            // Folding is a presentation choice; the literal form carries the same text.
            ScalarStyle::Folded => ScalarStyle::Literal,
            style => style,
        };

        if let Slot::Key { indent } = slot {
            return self.key(value, style, anchor, indent);
        }

        self.node_prefix(slot)?;
        if let Some(id) = anchor {
            write!(self.out, "&a{id} ")?;
        }
        match style {
            ScalarStyle::Plain => self.out.write_str(value)?,
            ScalarStyle::SingleQuoted => write_single_quoted(&mut self.out, value)?,
            ScalarStyle::Literal => {
                let indent = self.body_indent(slot);
                self.write_literal(value, indent)?;
            }
            ScalarStyle::DoubleQuoted | ScalarStyle::Folded => {
                write_double_quoted(&mut self.out, value)?
            }
        }
        if style != ScalarStyle::Literal {
            self.newline()?;
        }
        self.node_done();
        Ok(())
    }

    /// A mapping key, already restricted to a single-line style.
    fn key(
        &mut self,
        value: &str,
        style: ScalarStyle,
        anchor: Option<AnchorId>,
        indent: usize,
    ) -> Result<(), Error> {
        let mut text = String::new();
        if let Some(id) = anchor {
            write!(text, "&a{id} ")?;
        }
        match style {
            ScalarStyle::SingleQuoted => write_single_quoted(&mut text, value)?,
            ScalarStyle::DoubleQuoted => write_double_quoted(&mut text, value)?,
            _ => text.push_str(value),
        }

        self.write_indent(indent)?;
        if text.chars().count() >= MAX_IMPLICIT_KEY_CHARS {
            self.out.write_str("? ")?;
            self.out.write_str(&text)?;
            self.newline()?;
            self.write_indent(indent)?;
            if let Some(frame) = self.stack.last_mut() {
                frame.explicit_key = true;
            }
        } else {
            self.out.write_str(&text)?;
        }
        self.out.write_char(':')?;
        self.node_done();
        Ok(())
    }

    fn alias(&mut self, anchor: AnchorId) -> Result<(), Error> {
        let slot = self.slot();
        self.node_prefix(slot)?;
        write!(self.out, "*a{anchor}")?;
        if matches!(slot, Slot::Key { .. }) {
            self.out.write_str(" :")?;
        } else {
            self.newline()?;
        }
        self.node_done();
        Ok(())
    }

    fn empty_collection(&mut self, block: Block, anchor: Option<AnchorId>) -> Result<(), Error> {
        let slot = self.slot();
        if matches!(slot, Slot::Key { .. }) {
            return Err(Error::usage("block mapping keys must be scalars"));
        }
        self.node_prefix(slot)?;
        if let Some(id) = anchor {
            write!(self.out, "&a{id} ")?;
        }
        self.out.write_str(match block {
            Block::Mapping => "{}",
            Block::Sequence => "[]",
        })?;
        self.newline()?;
        self.node_done();
        Ok(())
    }

    fn open_block(&mut self, block: Block, anchor: Option<AnchorId>) -> Result<(), Error> {
        let indent = match self.slot() {
            Slot::Key { .. } => return Err(Error::usage("block mapping keys must be scalars")),
            Slot::Root => {
                if let Some(id) = anchor {
                    self.write_indent(0)?;
                    write!(self.out, "&a{id}")?;
                    self.newline()?;
                }
                0
            }
            Slot::Value { indent } => {
                if let Some(id) = anchor {
                    write!(self.out, " &a{id}")?;
                }
                self.newline()?;
                let explicit_key = self.stack.last().is_some_and(|frame| frame.explicit_key);
                match block {
                    Block::Sequence if !explicit_key => indent,
                    _ => indent + self.indent_step,
                }
            }
            Slot::Item { indent } => {
                self.write_indent(indent)?;
                self.out.write_str("- ")?;
                if let Some(id) = anchor {
                    write!(self.out, "&a{id}")?;
                    self.newline()?;
                }
                indent + 2
            }
        };
        self.stack.push(Frame {
            block,
            indent,
            awaiting_value: false,
            explicit_key: false,
        });
        Ok(())
    }

    fn close_block(&mut self, block: Block) -> Result<(), Error> {
        match self.stack.pop() {
            Some(frame) if frame.block == block && !frame.awaiting_value => {
                self.node_done();
                Ok(())
            }
            Some(frame) if frame.awaiting_value => Err(Error::usage("mapping key without a value")),
            _ => Err(Error::usage("unbalanced end of block")),
        }
    }

    /// Literal block scalar. Chomping follows the trailing line breaks: none is strip
    /// (`|-`), one is clip (`|`), more is keep (`|+`).
    fn write_literal(&mut self, value: &str, indent: usize) -> fmt::Result {
        let content = value.trim_end_matches('\n');
        let trailing = value.len() - content.len();
        self.out.write_char('|')?;
        match trailing {
            0 => self.out.write_char('-')?,
            1 => {}
            _ => self.out.write_char('+')?,
        }
        self.newline()?;
        for line in content.split('\n') {
            if !line.is_empty() {
                self.write_indent(indent)?;
                self.out.write_str(line)?;
            }
            self.newline()?;
        }
        for _ in 1..trailing {
            self.newline()?;
        }
        Ok(())
    }
}

/// Single quotes inside the text are doubled.
fn write_single_quoted<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('\'')?;
    for ch in s.chars() {
        if ch == '\'' {
            out.write_str("''")?;
        } else {
            out.write_char(ch)?;
        }
    }
    out.write_char('\'')
}

fn write_double_quoted<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for ch in s.chars() {
        match ch {
            '\\' => out.write_str("\\\\")?,
            '"' => out.write_str("\\\"")?,
            '\0' => out.write_str("\\0")?,
            '\u{7}' => out.write_str("\\a")?,
            '\u{8}' => out.write_str("\\b")?,
            '\t' => out.write_str("\\t")?,
            '\n' => out.write_str("\\n")?,
            '\u{b}' => out.write_str("\\v")?,
            '\u{c}' => out.write_str("\\f")?,
            '\r' => out.write_str("\\r")?,
            '\u{1b}' => out.write_str("\\e")?,
            '\u{FEFF}' => out.write_str("\\uFEFF")?,
            '\u{0085}' => out.write_str("\\N")?,
            '\u{2028}' => out.write_str("\\L")?,
            '\u{2029}' => out.write_str("\\P")?,
            c if c.is_control() && (c as u32) <= 0xFF => write!(out, "\\x{:02X}", c as u32)?,
            c if c.is_control() => write!(out, "\\u{:04X}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

impl<W: Write> RawEmitter for TextEmitter<W> {
    fn emit(&mut self, event: RawEvent) -> Result<(), Error> {
        if let Some((block, anchor)) = self.pending.take() {
            match (block, &event) {
                (Block::Mapping, RawEvent::MappingEnd) | (Block::Sequence, RawEvent::SequenceEnd) => {
                    return self.empty_collection(block, anchor);
                }
                _ => self.open_block(block, anchor)?,
            }
        }
        match event {
            RawEvent::StreamStart | RawEvent::StreamEnd => {}
            RawEvent::DocumentStart { explicit } => {
                if explicit {
                    self.out.write_str("---")?;
                    self.newline()?;
                }
            }
            RawEvent::DocumentEnd { explicit } => {
                if explicit {
                    self.out.write_str("...")?;
                    self.newline()?;
                }
            }
            RawEvent::MappingStart { anchor } => self.pending = Some((Block::Mapping, anchor)),
            RawEvent::SequenceStart { anchor } => self.pending = Some((Block::Sequence, anchor)),
            RawEvent::MappingEnd => self.close_block(Block::Mapping)?,
            RawEvent::SequenceEnd => self.close_block(Block::Sequence)?,
            RawEvent::Scalar {
                value,
                style,
                anchor,
            } => self.scalar(&value, style, anchor)?,
            RawEvent::Alias { anchor } => self.alias(anchor)?,
        }
        Ok(())
    }
}

/// Adapts an [`io::Write`] to [`fmt::Write`], keeping the first I/O error so it can be
/// reported instead of the bare [`fmt::Error`].
pub struct IoSink<W: io::Write> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: io::Write> IoSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, error: None }
    }

    /// The I/O error that interrupted writing, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Flush the writer, reporting an earlier write failure first.
    pub fn finish(&mut self) -> Result<(), Error> {
        if let Some(cause) = self.error.take() {
            return Err(Error::IOError { cause });
        }
        self.inner.flush()?;
        Ok(())
    }
}

impl<W: io::Write> Write for IoSink<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.error.is_some() {
            return Err(fmt::Error);
        }
        self.inner.write_all(s.as_bytes()).map_err(|err| {
            self.error = Some(err);
            fmt::Error
        })
    }
}
