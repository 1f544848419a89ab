//! Statement model and program parser.
//!
//! A program is a sequence of lines.  Blank lines and lines starting with
//! `#` are dropped.  A line ending in `{` opens a block whose interior runs
//! up to a line consisting of `}`; every other line at depth zero is a
//! top-level statement.  Statements are chevron-separated segments:
//!
//! ```text
//! target > action > arg0 > arg1 ...
//! ```
//!
//! Parsing finishes completely before anything executes, so a malformed
//! program never leaves a session half-loaded.

use std::fmt;

use super::value::Value;

// ── Statement ─────────────────────────────────────────────────────────────────

/// One chevron-separated line: `target [> action [> args…]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub target: String,
    pub action: Option<String>,
    pub args: Vec<String>,
}

impl Statement {
    /// Parse a single source line.  Returns `None` when the line has no
    /// target segment.
    pub fn parse(line: &str) -> Option<Statement> {
        let segments = split_segments(line);
        if segments.first().map_or(true, |t| t.is_empty()) {
            return None;
        }
        Statement::from_segments(segments)
    }

    /// Build a statement from already-split segments.
    ///
    /// Unlike [`Statement::parse`], an empty target is allowed here: rewritten
    /// statements may legitimately substitute an empty argument into the
    /// target position.  Only a segment list with no entries is rejected.
    pub fn from_segments(segments: Vec<String>) -> Option<Statement> {
        let mut it = segments.into_iter();
        let target = it.next()?;
        let action = it.next();
        Some(Statement {
            target,
            action,
            args: it.collect(),
        })
    }

    /// All segments in source order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.target.as_str())
            .chain(self.action.as_deref())
            .chain(self.args.iter().map(String::as_str))
    }

    /// Append trailing segments, filling the action slot first.
    pub fn extended<I, S>(mut self, extra: I) -> Statement
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for seg in extra {
            let seg = seg.into();
            if self.action.is_none() {
                self.action = Some(seg);
            } else {
                self.args.push(seg);
            }
        }
        self
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            f.write_str(seg)?;
        }
        Ok(())
    }
}

// ── Blocks ────────────────────────────────────────────────────────────────────

/// An interior line of a block, classified at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockLine {
    /// `name > "text"` or `name > 42` — bind into the block's scope.
    Bind { name: String, value: Value },
    /// `key > template…` — a route under `target.key`.
    Route { key: String, template: Vec<String> },
    /// `var >= call…` — rewritten to `call… > target > var` and dispatched
    /// while the block is being defined.
    Callback { var: String, call: Statement },
    /// `> rest…` — a branch, dispatched as `target > rest…`.
    Branch(Statement),
    /// A line with a single segment and no chevron; nothing to define.
    Bare(String),
    /// A line inside a nested brace pair.  Only the outer block boundary is
    /// meaningful; these are kept for diagnostics and otherwise skipped.
    Nested(String),
}

/// A `target > {` … `}` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub target: String,
    /// 1-based source line of the header.
    pub line: usize,
    pub body: Vec<BlockLine>,
}

/// A parsed program: blocks and top-level statements, each in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub blocks: Vec<Block>,
    pub statements: Vec<Statement>,
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A `}` with no open block.
    UnbalancedClose,
    /// End of input inside a block.
    UnclosedBlock { target: String },
    /// A statement (or block header) with no target segment.
    EmptyStatement,
}

/// A fatal error found while parsing a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based source line.
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParseErrorKind::UnbalancedClose => {
                write!(f, "line {}: unbalanced braces: '}}' without open block", self.line)
            }
            ParseErrorKind::UnclosedBlock { target } => {
                write!(f, "line {}: unbalanced braces: block '{target}' is never closed", self.line)
            }
            ParseErrorKind::EmptyStatement => {
                write!(f, "line {}: statement has no target", self.line)
            }
        }
    }
}

impl std::error::Error for ParseError {}

// ── Parser ────────────────────────────────────────────────────────────────────

/// Parse program source into blocks and top-level statements.
pub fn parse_program(src: &str) -> Result<Program, ParseError> {
    let mut program = Program::default();
    let mut open: Option<Block> = None;
    let mut depth = 0usize;

    for (idx, raw) in src.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.ends_with('{') {
            depth += 1;
            if depth == 1 {
                let target = block_target(line).ok_or(ParseError {
                    line: lineno,
                    kind: ParseErrorKind::EmptyStatement,
                })?;
                open = Some(Block { target, line: lineno, body: Vec::new() });
            } else if let Some(block) = open.as_mut() {
                block.body.push(BlockLine::Nested(line.to_owned()));
            }
            continue;
        }

        if line == "}" {
            if depth == 0 {
                return Err(ParseError { line: lineno, kind: ParseErrorKind::UnbalancedClose });
            }
            depth -= 1;
            if depth == 0 {
                program.blocks.extend(open.take());
            } else if let Some(block) = open.as_mut() {
                block.body.push(BlockLine::Nested(line.to_owned()));
            }
            continue;
        }

        match open.as_mut() {
            Some(block) if depth > 1 => block.body.push(BlockLine::Nested(line.to_owned())),
            Some(block) => {
                let parsed = parse_block_line(&block.target, line).ok_or(ParseError {
                    line: lineno,
                    kind: ParseErrorKind::EmptyStatement,
                })?;
                block.body.push(parsed);
            }
            None => {
                let stmt = Statement::parse(line).ok_or(ParseError {
                    line: lineno,
                    kind: ParseErrorKind::EmptyStatement,
                })?;
                program.statements.push(stmt);
            }
        }
    }

    if let Some(block) = open {
        return Err(ParseError {
            line: block.line,
            kind: ParseErrorKind::UnclosedBlock { target: block.target },
        });
    }
    Ok(program)
}

/// Target name of a block header such as `getsecret > {` or `getsecret {`.
fn block_target(header: &str) -> Option<String> {
    let without_brace = header.strip_suffix('{').unwrap_or(header);
    let first = split_segments(without_brace).into_iter().next()?;
    (!first.is_empty()).then_some(first)
}

/// Classify one interior line of the block for `target`.
fn parse_block_line(target: &str, line: &str) -> Option<BlockLine> {
    if let Some((var, call)) = split_callback(line) {
        let var = var.trim();
        let call = Statement::parse(call)?;
        if var.is_empty() {
            return None;
        }
        return Some(BlockLine::Callback {
            var: var.to_owned(),
            call: call.extended([target, var]),
        });
    }

    if let Some(rest) = line.strip_prefix('>') {
        let rest = Statement::parse(rest)?;
        let branch = Statement {
            target: target.to_owned(),
            action: None,
            args: Vec::new(),
        }
        .extended(rest.segments().map(str::to_owned).collect::<Vec<_>>());
        return Some(BlockLine::Branch(branch));
    }

    let mut segments = split_segments(line);
    if segments[0].is_empty() {
        return None;
    }
    if segments.len() == 1 {
        return segments.pop().map(BlockLine::Bare);
    }

    let key = segments.remove(0);
    if let [only] = segments.as_slice() {
        if let Some(value) = Value::parse_literal(only) {
            return Some(BlockLine::Bind { name: key, value });
        }
    }
    Some(BlockLine::Route { key, template: segments })
}

// ── Segment splitting ─────────────────────────────────────────────────────────

/// Split a line on `>` (outside double quotes), trimming each segment.
///
/// Always returns at least one segment.
pub fn split_segments(line: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_str = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_str = !in_str;
                current.push(ch);
            }
            '>' if !in_str => parts.push(std::mem::take(&mut current).trim().to_owned()),
            _ => current.push(ch),
        }
    }
    parts.push(current.trim().to_owned());
    parts
}

/// Split `var >= call…` at the first unquoted `>=`.
fn split_callback(line: &str) -> Option<(&str, &str)> {
    let mut in_str = false;
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'"' => in_str = !in_str,
            b'>' if !in_str && bytes.get(i + 1) == Some(&b'=') => {
                return Some((&line[..i], &line[i + 2..]));
            }
            _ => {}
        }
    }
    None
}

// ── Tests ─────────────────────────────────────────────────────────────────────
