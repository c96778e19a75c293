// File: src/engine/mod.rs
// Purpose: Template engine seam

//! The composition core treats the template engine as a black box
//! that can parse named blocks into an in-memory set, merge sets, and
//! execute one block against a context value and a function table.
//! [`BraceEngine`] is the built-in implementation; anything honoring
//! [`Engine`] can replace it.

use thiserror::Error;

use crate::value::Value;

pub mod brace;

pub use brace::BraceEngine;

/// A template engine's own parse and execution failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("parse error in block {block:?}: {message}")]
    Parse { block: String, message: String },

    #[error("block {block:?} is not defined")]
    MissingBlock { block: String },

    #[error("unknown function {name:?} in block {block:?}")]
    UnknownFunction { block: String, name: String },

    /// A function from the table failed; the composition engine's own
    /// error rides along as the cause.
    #[error("function {name:?} failed")]
    Call {
        name: String,
        #[source]
        source: Box<crate::error::Error>,
    },
}

/// Function table handed to the engine for one execution.
///
/// The engine resolves every function call through this, and has no
/// other way to reach back into the composition machinery.
pub trait FuncResolver {
    /// Calls a named function with already-evaluated arguments.
    /// `None` means no function with that name is in scope.
    fn call(&self, name: &str, args: &[Value]) -> Option<Result<Value, crate::error::Error>>;
}

/// A [`FuncResolver`] with nothing in scope.
pub struct NoFuncs;

impl FuncResolver for NoFuncs {
    fn call(&self, _name: &str, _args: &[Value]) -> Option<Result<Value, crate::error::Error>> {
        None
    }
}

/// The engine seam.
///
/// `Unit` is the engine's in-memory set of parsed named blocks. Units
/// must be cheap to clone: every child execution context snapshots its
/// parent's unit at creation time.
pub trait Engine {
    type Unit: Clone;

    /// A unit with no blocks.
    fn empty(&self) -> Self::Unit;

    /// Parses `source` and adds its blocks to `unit`: the top-level
    /// content under `name`, plus any blocks the source itself
    /// defines. Existing blocks with the same names are replaced.
    fn parse_into(
        &self,
        unit: &mut Self::Unit,
        name: &str,
        source: &str,
    ) -> Result<(), EngineError>;

    /// Merges every named block of `src` into `dst`.
    fn import(&self, dst: &mut Self::Unit, src: &Self::Unit);

    /// Whether `unit` holds a block with this name.
    fn contains(&self, unit: &Self::Unit, name: &str) -> bool;

    /// Executes one named block against a context value and a
    /// function table, yielding raw output bytes.
    fn execute(
        &self,
        unit: &Self::Unit,
        name: &str,
        ctx: &Value,
        funcs: &dyn FuncResolver,
    ) -> Result<Vec<u8>, EngineError>;
}
