//! JSON parser producing offset-annotated outline nodes
//!
//! The parser is an explicit state machine ([`ParseJob`]): a stack of open
//! containers, the cursor, and the siblings parsed so far. A job can stop
//! after any completed sibling value and resume later with the same result,
//! which is what keeps large documents from blocking the host.
//!
//! Offsets are character offsets. Whitespace and separators never get nodes
//! of their own; the top-level value's range is widened to cover the whole
//! input so the root always spans `[base, base + len)`.

use std::sync::Arc;

use super::error::ParseError;
use super::node::{Node, NodeKind, TextRange};

/// Deepest container nesting accepted, counted from the document root
pub const MAX_DEPTH: usize = 512;

/// Parse `text` whose first character sits at offset `base` in the document
pub fn parse(text: &str, base: usize) -> Result<Node, ParseError> {
    ParseJob::new(text, base).run()
}

/// Result of driving a [`ParseJob`] for one budget
#[derive(Debug)]
pub enum ParseStep {
    /// Budget exhausted between two siblings; step the job again to continue
    Yielded(ParseJob),
    Done(Result<Node, ParseError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Just after `{` or `[`
    FirstOrClose,
    /// After a comma: a member is mandatory
    Member,
    /// After a member: `,` or the closing delimiter
    CommaOrClose,
    /// After `key:` (objects only)
    Value,
}

#[derive(Debug)]
struct Frame {
    kind: NodeKind,
    start: usize,
    children: Vec<Arc<Node>>,
    key: Option<(String, TextRange)>,
    expect: Expect,
}

enum Advance {
    Continue,
    /// A member value was attached to the innermost open container
    Member,
    Root(Node),
}

/// Resumable parse of one text span
#[derive(Debug)]
pub struct ParseJob {
    chars: Vec<char>,
    base: usize,
    pos: usize,
    stack: Vec<Frame>,
    /// Containers already open around this span in the document
    outer_depth: usize,
    /// The span must be exactly one container, with no padding
    exact: bool,
    yields: usize,
}

impl ParseJob {
    pub fn new(text: &str, base: usize) -> Self {
        Self {
            chars: text.chars().collect(),
            base,
            pos: 0,
            stack: Vec::new(),
            outer_depth: 0,
            exact: false,
            yields: 0,
        }
    }

    /// Re-parse of a single container nested `outer_depth` containers deep
    ///
    /// The span must hold one object or array from its first character to
    /// its last; anything else is an error, so a stale span is never
    /// mistaken for the container it used to hold.
    pub fn scoped(text: &str, base: usize, outer_depth: usize) -> Self {
        Self {
            outer_depth,
            exact: true,
            ..Self::new(text, base)
        }
    }

    /// Document offset of the next unread character
    pub fn position(&self) -> usize {
        self.base + self.pos
    }

    /// Number of currently open containers
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Drive the job to completion without yielding
    pub fn run(self) -> Result<Node, ParseError> {
        let mut job = self;
        loop {
            match job.step(usize::MAX) {
                ParseStep::Yielded(next) => job = next,
                ParseStep::Done(result) => return result,
            }
        }
    }

    /// Parse until `budget` sibling values have completed or the input ends
    ///
    /// A budget of zero still makes progress on one value.
    pub fn step(mut self, budget: usize) -> ParseStep {
        let budget = budget.max(1);
        let mut completed = 0usize;

        loop {
            match self.advance() {
                Ok(Advance::Continue) => {}
                Ok(Advance::Member) => {
                    completed += 1;
                    if completed >= budget {
                        self.yields += 1;
                        tracing::trace!(
                            position = self.position(),
                            depth = self.depth(),
                            yields = self.yields,
                            "parse yielded"
                        );
                        return ParseStep::Yielded(self);
                    }
                }
                Ok(Advance::Root(node)) => return ParseStep::Done(self.finish(node)),
                Err(e) => return ParseStep::Done(Err(e)),
            }
        }
    }

    fn advance(&mut self) -> Result<Advance, ParseError> {
        let Some(frame) = self.stack.last() else {
            return self.begin_value();
        };
        let (kind, expect) = (frame.kind, frame.expect);
        let close = if kind == NodeKind::Object { '}' } else { ']' };

        self.skip_whitespace();
        match (kind, expect) {
            (_, Expect::FirstOrClose) if self.peek() == Some(close) => self.close_container(),
            (_, Expect::CommaOrClose) => match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    self.set_expect(Expect::Member);
                    Ok(Advance::Continue)
                }
                Some(c) if c == close => self.close_container(),
                Some(c) => Err(self.error_here(format!("expected ',' or '{}', found {:?}", close, c))),
                None => Err(self.eof_error()),
            },
            (NodeKind::Object, Expect::FirstOrClose | Expect::Member) => {
                self.parse_key()?;
                Ok(Advance::Continue)
            }
            _ => self.begin_value(),
        }
    }

    fn begin_value(&mut self) -> Result<Advance, ParseError> {
        self.skip_whitespace();
        let Some(c) = self.peek() else {
            return Err(self.eof_error());
        };
        let start = self.pos;

        let node = match c {
            '{' | '[' => {
                if self.outer_depth + self.stack.len() >= MAX_DEPTH {
                    return Err(self.error_here(format!(
                        "nesting deeper than {} containers",
                        MAX_DEPTH
                    )));
                }
                self.pos += 1;
                self.stack.push(Frame {
                    kind: if c == '{' {
                        NodeKind::Object
                    } else {
                        NodeKind::Array
                    },
                    start,
                    children: Vec::new(),
                    key: None,
                    expect: Expect::FirstOrClose,
                });
                return Ok(Advance::Continue);
            }
            '"' => {
                let value = self.parse_string()?;
                Node::scalar(NodeKind::String, self.range(start, self.pos), value)
            }
            '-' | '0'..='9' => {
                let value = self.parse_number()?;
                Node::scalar(NodeKind::Number, self.range(start, self.pos), value)
            }
            't' | 'f' => {
                let literal = if c == 't' { "true" } else { "false" };
                self.expect_literal(literal)?;
                Node::scalar(
                    NodeKind::Boolean,
                    self.range(start, self.pos),
                    literal.to_string(),
                )
            }
            'n' => {
                self.expect_literal("null")?;
                Node::scalar(NodeKind::Null, self.range(start, self.pos), "null".to_string())
            }
            other => return Err(self.error_here(format!("expected value, found {:?}", other))),
        };

        Ok(self.complete(node))
    }

    /// Attach a finished value to the innermost open container
    fn complete(&mut self, node: Node) -> Advance {
        let Some(frame) = self.stack.last_mut() else {
            return Advance::Root(node);
        };
        let child = match frame.key.take() {
            Some((key, key_range)) => Node::property(key, key_range, node),
            None => node,
        };
        frame.children.push(Arc::new(child));
        frame.expect = Expect::CommaOrClose;
        Advance::Member
    }

    fn close_container(&mut self) -> Result<Advance, ParseError> {
        let Some(frame) = self.stack.pop() else {
            return Err(self.error_here("unbalanced closing delimiter"));
        };
        self.pos += 1;
        let node = Node::container(frame.kind, self.range(frame.start, self.pos), frame.children);
        Ok(self.complete(node))
    }

    fn parse_key(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Some('"') => {}
            Some(c) => return Err(self.error_here(format!("expected string key, found {:?}", c))),
            None => return Err(self.eof_error()),
        }

        let start = self.pos;
        let key = self.parse_string()?;
        let key_range = self.range(start, self.pos);

        self.skip_whitespace();
        match self.peek() {
            Some(':') => self.pos += 1,
            Some(c) => return Err(self.error_here(format!("expected ':', found {:?}", c))),
            None => return Err(self.eof_error()),
        }

        if let Some(frame) = self.stack.last_mut() {
            frame.key = Some((key, key_range));
            frame.expect = Expect::Value;
        }
        Ok(())
    }

    fn finish(&mut self, mut root: Node) -> Result<Node, ParseError> {
        self.skip_whitespace();
        if let Some(c) = self.peek() {
            return Err(self.error_here(format!("unexpected {:?} after value", c)));
        }
        if self.exact {
            let whole = self.range(0, self.chars.len());
            if !root.kind.is_container() || root.range != whole {
                return Err(self.error_at(
                    0,
                    format!("span {} no longer holds a single container", whole),
                ));
            }
        }
        root.range = self.range(0, self.chars.len());
        Ok(root)
    }

    // =========================================================================
    // Scalars
    // =========================================================================

    /// Parse a quoted string starting at the opening quote, returning it decoded
    fn parse_string(&mut self) -> Result<String, ParseError> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(self.error_at(self.chars.len(), "unterminated string"));
            };
            match c {
                '"' => {
                    self.pos += 1;
                    return Ok(out);
                }
                '\\' => {
                    self.pos += 1;
                    out.push(self.parse_escape()?);
                }
                c if (c as u32) < 0x20 => {
                    return Err(self.error_here(format!("control character {:?} in string", c)));
                }
                c => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char, ParseError> {
        let Some(c) = self.peek() else {
            return Err(self.error_at(self.chars.len(), "unterminated string"));
        };
        let decoded = match c {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => {
                self.pos += 1;
                return self.parse_unicode_escape();
            }
            other => return Err(self.error_here(format!("invalid escape '\\{}'", other))),
        };
        self.pos += 1;
        Ok(decoded)
    }

    /// `\uXXXX`, with the cursor just past the `u`
    fn parse_unicode_escape(&mut self) -> Result<char, ParseError> {
        let escape_start = self.pos - 2;
        let high = self.parse_hex4()?;

        let code = if (0xD800..0xDC00).contains(&high) {
            if self.peek() != Some('\\') || self.peek_at(1) != Some('u') {
                return Err(self.error_at(escape_start, "unpaired surrogate in \\u escape"));
            }
            self.pos += 2;
            let low = self.parse_hex4()?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(self.error_at(escape_start, "invalid surrogate pair"));
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else if (0xDC00..0xE000).contains(&high) {
            return Err(self.error_at(escape_start, "unpaired surrogate in \\u escape"));
        } else {
            high
        };

        char::from_u32(code).ok_or_else(|| self.error_at(escape_start, "invalid \\u escape"))
    }

    fn parse_hex4(&mut self) -> Result<u32, ParseError> {
        let mut value = 0u32;
        for _ in 0..4 {
            let Some(c) = self.peek() else {
                return Err(self.eof_error());
            };
            let digit = c
                .to_digit(16)
                .ok_or_else(|| self.error_here(format!("invalid hex digit {:?}", c)))?;
            value = value * 16 + digit;
            self.pos += 1;
        }
        Ok(value)
    }

    fn parse_number(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }

        match self.peek() {
            Some('0') => self.pos += 1,
            Some('1'..='9') => self.skip_digits(),
            Some(c) => return Err(self.error_here(format!("expected digit, found {:?}", c))),
            None => return Err(self.eof_error()),
        }

        if self.peek() == Some('.') {
            self.pos += 1;
            self.require_digits()?;
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some('+' | '-')) {
                self.pos += 1;
            }
            self.require_digits()?;
        }

        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn require_digits(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Some(c) if c.is_ascii_digit() => {
                self.skip_digits();
                Ok(())
            }
            Some(c) => Err(self.error_here(format!("expected digit, found {:?}", c))),
            None => Err(self.eof_error()),
        }
    }

    fn skip_digits(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn expect_literal(&mut self, literal: &str) -> Result<(), ParseError> {
        for expected in literal.chars() {
            match self.peek() {
                Some(c) if c == expected => self.pos += 1,
                Some(c) => {
                    return Err(self.error_here(format!("expected '{}', found {:?}", literal, c)))
                }
                None => return Err(self.eof_error()),
            }
        }
        Ok(())
    }

    // =========================================================================
    // Cursor helpers
    // =========================================================================

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.pos += 1;
        }
    }

    fn set_expect(&mut self, expect: Expect) {
        if let Some(frame) = self.stack.last_mut() {
            frame.expect = expect;
        }
    }

    fn range(&self, start: usize, end: usize) -> TextRange {
        TextRange::new(self.base + start, self.base + end)
    }

    fn error_at(&self, local: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(self.base + local, message)
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        self.error_at(self.pos, message)
    }

    fn eof_error(&self) -> ParseError {
        self.error_at(self.chars.len(), "unexpected end of input")
    }
}
