#![no_std]
#![forbid(unsafe_code)]
#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]

//! Types used by [`tinyc`](https://docs.rs/tinyc) and [`tinyc_parser`](https://docs.rs/tinyc_parser).
//!
//! The central type is [`Program`], the three-address-code form that the
//! parser crate lowers source text into and that the main crate interprets
//! or translates to assembly.

extern crate alloc;

mod instructions;
pub use instructions::*;

#[cfg(feature = "archive")]
pub mod archive;

use alloc::{boxed::Box, string::String};

/// A compiled tinyc program.
///
/// Programs are validated and lowered before being created, so they are
/// guaranteed to be semantically sound (as long as they were created by
/// `tinyc_parser`). This means you should not trust a `Program` assembled
/// by a third party to be valid.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "archive", derive(serde::Serialize, serde::Deserialize))]
pub struct Program {
    /// Source-level identifier names, indexed by [`Function::name`] and
    /// [`Var::Local`] bindings.
    pub names: Box<[String]>,

    /// The functions of the program, in definition order.
    pub funcs: Box<[Function]>,
}

impl Program {
    /// Look up a function by its source-level name.
    pub fn func_idx(&self, name: &str) -> Option<usize> {
        self.funcs.iter().position(|f| self.names.get(f.name).map(String::as_str) == Some(name))
    }

    /// The source-level name of the function at `idx`.
    pub fn func_name(&self, idx: usize) -> Option<&str> {
        self.funcs.get(idx).and_then(|f| self.names.get(f.name)).map(String::as_str)
    }
}

/// A single lowered function body.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "archive", derive(serde::Serialize, serde::Deserialize))]
pub struct Function {
    /// Index of the function's name in [`Program::names`].
    pub name: usize,

    /// Number of `int` parameters.
    pub params: usize,

    /// The function body as three-address code.
    pub instructions: Box<[Instruction]>,
}
