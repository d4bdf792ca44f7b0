#![no_std]
#![forbid(unsafe_code)]
#![warn(missing_debug_implementations, rust_2018_idioms)]

//! Parsing and lowering pipeline for tinyc.
//!
//! Source text moves through four stages: the lexer interns identifiers and
//! constants into tables and produces a token stream, the recursive-descent
//! parser builds an AST, the analyzer checks scoping and call rules, and the
//! lowering pass emits the three-address code defined in
//! [`tinyc_types`].
//!
//! Grammar:
//!
//! ```text
//! <Program>     -> <Function>*
//! <Function>    -> int Ident ( <Params> ) { <Stmt>* }
//! <Params>      -> e | int Ident (, int Ident)*
//! <Stmt>        -> if ( <Expr> ) { <Stmt>* }
//!               |  while ( <Expr> ) { <Stmt>* }
//!               |  int <Declarator> (, <Declarator>)* ;
//!               |  Ident = <Expr> ;
//!               |  return <Expr> ;
//!               |  break ;
//!               |  continue ;
//! <Declarator>  -> Ident | Ident = <Expr>
//! <Expr>        -> <DirectValue>
//!               |  <DirectValue> <BinOp> <DirectValue>
//!               |  Ident ( <Args> )
//! <Args>        -> e | <DirectValue> (, <DirectValue>)*
//! <BinOp>       -> + - * / % & | ^ < <= > >= == !=
//! <DirectValue> -> Ident | [-] Const
//! ```

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod analyze;
mod error;
mod lower;
mod parse;

pub mod ast;
pub mod lexer;

pub use analyze::SemanticError;
pub use error::{ParseError, Result};

use log::debug;
use tinyc_types::Program;

/// Turns C-subset source text into a lowered [`Program`].
#[derive(Debug, Default)]
pub struct Parser {}

impl Parser {
    pub fn new() -> Self {
        Self {}
    }

    /// Tokenize, parse, analyze, and lower a full translation unit.
    pub fn parse_str(&self, source: &str) -> Result<Program> {
        let stream = lexer::tokenize(source)?;
        let (ast, names) = parse::parse(stream)?;
        analyze::analyze(&ast, &names)?;
        let program = lower::lower(&ast, names);
        debug!("lowered {} function(s)", program.funcs.len());
        Ok(program)
    }

    /// Parse a translation unit from a file. Requires the `std` feature.
    #[cfg(feature = "std")]
    pub fn parse_file(&self, path: impl AsRef<std::path::Path>) -> Result<Program> {
        use alloc::format;
        let source = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ParseError::Other(format!("error reading {:?}: {e}", path.as_ref())))?;
        self.parse_str(&source)
    }
}
