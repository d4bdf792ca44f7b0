//! The abstract syntax tree produced by the parser.
//!
//! The tree mirrors the grammar closely: expressions are at most one binary
//! operator wide, and every identifier occurrence keeps its source line for
//! diagnostics.

use alloc::vec::Vec;

use tinyc_types::BinOp;

/// A parsed translation unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Ast {
    pub funcs: Vec<FuncDef>,
}

/// A function definition.
#[derive(Clone, Debug, PartialEq)]
pub struct FuncDef {
    pub name: Ident,
    pub params: Vec<Ident>,
    pub body: Block,
}

/// An identifier occurrence: name-table index plus source line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ident {
    pub name: usize,
    pub line: usize,
}

/// A braced statement list.
#[derive(Clone, Debug, PartialEq)]
pub struct Block(pub Vec<Stmt>);

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    If(Expr, Block),
    While(Expr, Block),
    Decl(Vec<Declarator>),
    Assign(Ident, Expr),
    Return(Expr),
    Break,
    Continue,
}

/// One name in a declaration list, with its optional initializer.
#[derive(Clone, Debug, PartialEq)]
pub struct Declarator {
    pub name: Ident,
    pub init: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Direct(DirectValue),
    Binary(DirectValue, BinOp, DirectValue),
    Call(Ident, Vec<DirectValue>),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DirectValue {
    Ident(Ident),
    Const(i32),
}
