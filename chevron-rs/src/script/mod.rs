//! The chevron routing language.
//!
//! Programs are chevron-separated statements (`target > action > args…`)
//! plus brace blocks that define routes and variables for a target:
//!
//! - [`stmt`]: statement model and program parser
//! - [`value`]: runtime values
//! - [`scope`]: the variable scope stack
//! - [`routes`]: exact and deferred route table
//! - [`expand`]: `argN` / `@name` substitution
//! - [`interp`]: the interpreter session and dispatcher
//!
//! # Quick start
//!
//! ```rust
//! use chevron::script::Interpreter;
//!
//! let mut interp = Interpreter::new();
//! interp
//!     .execute("greeter > {\n    hello > systemPrint > arg0\n}\ngreeter > hello > world")
//!     .unwrap();
//! assert_eq!(interp.output, vec!["world"]);
//! ```

pub mod expand;
pub mod interp;
pub mod routes;
pub mod scope;
pub mod stmt;
pub mod value;

// Re-exports for convenience.
pub use interp::{Interpreter, ScriptError, SYSTEM_PRINT};
pub use stmt::{parse_program, ParseError, Statement};
pub use value::Value;
