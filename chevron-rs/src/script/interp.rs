//! Chevron interpreter session.
//!
//! An [`Interpreter`] owns one route table and one scope stack.  Executing a
//! program first processes every block in source order (which may already
//! dispatch statements, through callback assignments and branch lines), then
//! dispatches each top-level statement.
//!
//! Dispatch resolves a statement by the first rule that applies:
//!
//! 1. no action: read the target as a value;
//! 2. exact route `target.action`: rewrite its template and dispatch again;
//! 3. literal binding `name > "text"` / `name > 42`;
//! 4. assignment `target > name > value`: bind `name` in the innermost scope;
//! 5. the `systemPrint` sink;
//! 6. deferred route `target.argI` whose argument I equals the action;
//! 7. otherwise nothing happens and the result is [`Value::Unresolved`].

use std::fmt;

use crate::config::{ScopeMode, SessionConfig, MAX_DEPTH_LIMIT};
use super::{
    expand::rewrite,
    routes::RouteTable,
    scope::ScopeStack,
    stmt::{parse_program, Block, BlockLine, ParseError, ParseErrorKind, Statement},
    value::{is_quoted, Value},
};

/// Target name of the built-in print sink.
pub const SYSTEM_PRINT: &str = "systemPrint";

/// Receives every printed line.
pub type PrintSink = Box<dyn FnMut(&str)>;

// ── Errors ────────────────────────────────────────────────────────────────────

/// A failure that aborts execution of a program.
///
/// Missing routes and variables are not errors; see the module docs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    Parse(ParseError),
    /// Dispatch nested deeper than [`SessionConfig::max_depth`].
    RecursionLimitExceeded { limit: usize, statement: String },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Parse(e) => write!(f, "parse error: {e}"),
            ScriptError::RecursionLimitExceeded { limit, statement } => {
                write!(f, "recursion limit ({limit}) exceeded at '{statement}'")
            }
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScriptError::Parse(e) => Some(e),
            ScriptError::RecursionLimitExceeded { .. } => None,
        }
    }
}

impl From<ParseError> for ScriptError {
    fn from(e: ParseError) -> Self {
        ScriptError::Parse(e)
    }
}

// ── Interpreter ───────────────────────────────────────────────────────────────

/// One interpreter session.
pub struct Interpreter {
    routes: RouteTable,
    scopes: ScopeStack,
    config: SessionConfig,
    /// Current dispatch nesting.
    depth: usize,
    sink: Option<PrintSink>,
    /// Lines printed by `systemPrint` when no sink is installed.
    pub output: Vec<String>,
    /// Unresolved routes, recorded only when `strict_routes` is set.
    pub warnings: Vec<String>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("routes", &self.routes)
            .field("scopes", &self.scopes)
            .field("config", &self.config)
            .field("output", &self.output)
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Interpreter {
            routes: RouteTable::new(),
            scopes: ScopeStack::new(),
            config,
            depth: 0,
            sink: None,
            output: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Send printed lines to `sink` instead of [`Interpreter::output`].
    pub fn set_print_sink(&mut self, sink: impl FnMut(&str) + 'static) {
        self.sink = Some(Box::new(sink));
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    /// Resolve a variable the way `@name` would.
    pub fn get_var(&self, name: &str) -> Value {
        self.scopes.resolve(name)
    }

    /// Drain and return the printed lines collected so far.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    // ── Execution ─────────────────────────────────────────────────────────────

    /// Parse and run a program.  Returns the value of the last top-level
    /// statement.
    ///
    /// Routes and variables from earlier calls stay in effect.  A parse error
    /// is reported before anything runs, leaving the session untouched.
    pub fn execute(&mut self, src: &str) -> Result<Value, ScriptError> {
        let program = parse_program(src)?;
        log::debug!(
            "program: {} block(s), {} statement(s)",
            program.blocks.len(),
            program.statements.len()
        );

        for block in &program.blocks {
            self.process_block(block)?;
        }

        let mut last = Value::Unresolved;
        for stmt in &program.statements {
            last = self.dispatch(stmt)?;
        }
        Ok(last)
    }

    /// Parse and dispatch a single statement line.
    pub fn exec_line(&mut self, line: &str) -> Result<Value, ScriptError> {
        let stmt = Statement::parse(line).ok_or(ParseError {
            line: 1,
            kind: ParseErrorKind::EmptyStatement,
        })?;
        self.dispatch(&stmt)
    }

    // ── Block processing ──────────────────────────────────────────────────────

    /// Define a block's bindings and routes, running its callbacks and
    /// branches as they are reached.
    pub fn process_block(&mut self, block: &Block) -> Result<(), ScriptError> {
        log::debug!("block '{}' (line {})", block.target, block.line);
        self.scopes.push(&block.target);
        let result = self.define_block(block);
        if self.config.scope_mode == ScopeMode::Block {
            self.scopes.pop();
        }
        result
    }

    fn define_block(&mut self, block: &Block) -> Result<(), ScriptError> {
        let target = block.target.as_str();
        for line in &block.body {
            match line {
                BlockLine::Bind { name, value } => {
                    log::debug!("  {target}: {name} = {value}");
                    self.scopes.set(name.clone(), value.clone());
                }
                BlockLine::Route { key, template } => {
                    let pattern = self.routes.define(target, key, template.clone());
                    log::debug!("  route {target}.{pattern} -> {}", template.join(" > "));
                }
                BlockLine::Callback { var, call } => {
                    log::debug!("  {target}: {var} >= {call}");
                    self.dispatch(call)?;
                }
                BlockLine::Branch(stmt) => {
                    self.dispatch(stmt)?;
                }
                BlockLine::Bare(text) | BlockLine::Nested(text) => {
                    log::debug!("  {target}: skipping '{text}'");
                }
            }
        }
        Ok(())
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    /// Resolve and run one statement.
    ///
    /// Nesting is bounded by `max_depth`, capped at [`MAX_DEPTH_LIMIT`].
    pub fn dispatch(&mut self, stmt: &Statement) -> Result<Value, ScriptError> {
        let limit = self.config.max_depth.min(MAX_DEPTH_LIMIT);
        if self.depth >= limit {
            log::warn!("recursion limit {limit} reached at '{stmt}'");
            return Err(ScriptError::RecursionLimitExceeded {
                limit,
                statement: stmt.to_string(),
            });
        }
        self.depth += 1;
        log::trace!("dispatch[{}] {stmt}", self.depth);
        let result = self.dispatch_inner(stmt);
        self.depth -= 1;
        result
    }

    fn dispatch_inner(&mut self, stmt: &Statement) -> Result<Value, ScriptError> {
        let target = stmt.target.as_str();
        let Some(action) = stmt.action.as_deref() else {
            return Ok(self.read_value(target));
        };
        let args = stmt.args.as_slice();

        if let Some(template) = self.routes.exact(target, action) {
            let template = template.to_vec();
            return self.follow(&template, args);
        }

        if args.is_empty() && target != SYSTEM_PRINT {
            if let Some(value) = Value::parse_literal(action) {
                self.scopes.set(target, value.clone());
                return Ok(value);
            }
        }

        if args.len() == 1 && target != SYSTEM_PRINT && !is_reserved(action) && !is_quoted(action) {
            let value = self.read_arg(&args[0]);
            log::trace!("assign {action} = {value} ({})", value.type_name());
            self.scopes.set(action, value.clone());
            return Ok(value);
        }

        if target == SYSTEM_PRINT {
            return Ok(self.print(action, args));
        }

        if self.routes.has_deferred(target) {
            let wanted = self.read_arg(action);
            for i in 1..args.len() {
                let Some(template) = self.routes.deferred(target, i) else { continue };
                if self.read_arg(&args[i]) != wanted {
                    continue;
                }
                let template = template.to_vec();
                let mut call_args = args.to_vec();
                call_args[i] = action.to_owned();
                log::trace!("deferred match {target}.arg{i} on '{action}'");
                return self.follow(&template, &call_args);
            }
        }

        self.unresolved(stmt);
        Ok(Value::Unresolved)
    }

    /// Rewrite `template` for this call and dispatch the result.
    fn follow(&mut self, template: &[String], args: &[String]) -> Result<Value, ScriptError> {
        match rewrite(template, args, &self.scopes) {
            Some(next) => self.dispatch(&next),
            None => Ok(Value::Unresolved),
        }
    }

    fn print(&mut self, action: &str, args: &[String]) -> Value {
        let mut parts = std::iter::once(action)
            .chain(args.iter().map(String::as_str))
            .map(|seg| self.read_arg(seg));
        let value = match (parts.next(), args.is_empty()) {
            (Some(only), true) => only,
            (first, _) => {
                let text = first
                    .into_iter()
                    .chain(parts)
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                Value::Text(text)
            }
        };
        let text = value.to_string();
        log::trace!("print '{text}'");
        match self.sink.as_mut() {
            Some(sink) => sink(&text),
            None => self.output.push(text),
        }
        value
    }

    fn unresolved(&mut self, stmt: &Statement) {
        if self.config.strict_routes {
            log::warn!("no route for '{stmt}'");
            self.warnings.push(format!("no route for '{stmt}'"));
        } else {
            log::debug!("no route for '{stmt}'");
        }
    }

    // ── Value resolution ──────────────────────────────────────────────────────

    /// A bare target: a literal, or else a variable read.
    fn read_value(&self, segment: &str) -> Value {
        Value::parse_literal(segment).unwrap_or_else(|| {
            let name = segment.strip_prefix('@').unwrap_or(segment);
            self.scopes.resolve(name)
        })
    }

    /// An argument: a literal, an `@name` read, or else the word itself.
    fn read_arg(&self, segment: &str) -> Value {
        match segment.strip_prefix('@') {
            Some(name) if !name.is_empty() => self.scopes.resolve(name),
            _ => Value::from_segment(segment),
        }
    }
}

fn is_reserved(word: &str) -> bool {
    word == SYSTEM_PRINT
}

// ── Tests ─────────────────────────────────────────────────────────────────────
