//! Semantic analysis.
//!
//! Runs after parsing and before lowering; the later stages assume the
//! program is semantically sound.

use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use core::fmt::Display;

use crate::ast::{Ast, Block, DirectValue, Expr, FuncDef, Ident, Stmt};

/// Violations of the language's scoping and call rules.
#[derive(Debug, PartialEq, Eq)]
pub enum SemanticError {
    UseBeforeDeclaration { name: String, line: usize },
    MultipleDeclaration { name: String, line: usize },
    DuplicateFunction { name: String, line: usize },
    UnknownFunction { name: String, line: usize },
    ArityMismatch { name: String, expected: usize, actual: usize, line: usize },
    BreakOutsideLoop,
    ContinueOutsideLoop,
}

impl Display for SemanticError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UseBeforeDeclaration { name, line } => {
                write!(f, "`{name}` used before declaration on line {line}")
            }
            Self::MultipleDeclaration { name, line } => {
                write!(f, "`{name}` declared more than once in the same scope on line {line}")
            }
            Self::DuplicateFunction { name, line } => {
                write!(f, "function `{name}` defined more than once on line {line}")
            }
            Self::UnknownFunction { name, line } => {
                write!(f, "call to unknown function `{name}` on line {line}")
            }
            Self::ArityMismatch { name, expected, actual, line } => {
                write!(f, "`{name}` takes {expected} argument(s) but {actual} were passed on line {line}")
            }
            Self::BreakOutsideLoop => write!(f, "`break` outside of a loop"),
            Self::ContinueOutsideLoop => write!(f, "`continue` outside of a loop"),
        }
    }
}

impl core::error::Error for SemanticError {}

/// Check scoping and call rules for a whole translation unit.
pub(crate) fn analyze(ast: &Ast, names: &[String]) -> Result<(), SemanticError> {
    let mut funcs: Vec<(usize, usize)> = Vec::new();
    for func in &ast.funcs {
        if funcs.iter().any(|&(name, _)| name == func.name.name) {
            return Err(SemanticError::DuplicateFunction {
                name: spell(names, func.name.name),
                line: func.name.line,
            });
        }
        funcs.push((func.name.name, func.params.len()));
    }

    for func in &ast.funcs {
        ScopeStack::new(names, &funcs, func).check(func)?;
    }
    Ok(())
}

fn spell(names: &[String], name: usize) -> String {
    names.get(name).map(String::as_str).unwrap_or("<unknown>").to_string()
}

type ScopeTable = Vec<usize>;

/// Declaration tables for the scopes currently open, innermost last.
struct ScopeStack<'a> {
    names: &'a [String],
    funcs: &'a [(usize, usize)],
    params: &'a [Ident],
    scopes: Vec<ScopeTable>,
}

impl<'a> ScopeStack<'a> {
    fn new(names: &'a [String], funcs: &'a [(usize, usize)], func: &'a FuncDef) -> Self {
        Self { names, funcs, params: &func.params, scopes: Vec::new() }
    }

    fn check(&mut self, func: &FuncDef) -> Result<(), SemanticError> {
        self.block(&func.body, false)
    }

    fn find_var(&self, ident: &Ident) -> Result<(), SemanticError> {
        let declared = self.params.iter().any(|p| p.name == ident.name)
            || self.scopes.iter().flatten().any(|&name| name == ident.name);
        if declared {
            Ok(())
        } else {
            Err(SemanticError::UseBeforeDeclaration { name: spell(self.names, ident.name), line: ident.line })
        }
    }

    fn direct_value(&self, value: &DirectValue) -> Result<(), SemanticError> {
        match value {
            DirectValue::Ident(ident) => self.find_var(ident),
            DirectValue::Const(_) => Ok(()),
        }
    }

    fn expr(&self, expr: &Expr) -> Result<(), SemanticError> {
        match expr {
            Expr::Direct(value) => self.direct_value(value),
            Expr::Binary(lhs, _, rhs) => self.direct_value(lhs).and_then(|()| self.direct_value(rhs)),
            Expr::Call(callee, args) => {
                let Some(&(_, expected)) = self.funcs.iter().find(|&&(name, _)| name == callee.name) else {
                    return Err(SemanticError::UnknownFunction {
                        name: spell(self.names, callee.name),
                        line: callee.line,
                    });
                };
                if expected != args.len() {
                    return Err(SemanticError::ArityMismatch {
                        name: spell(self.names, callee.name),
                        expected,
                        actual: args.len(),
                        line: callee.line,
                    });
                }
                args.iter().try_for_each(|arg| self.direct_value(arg))
            }
        }
    }

    fn block(&mut self, block: &Block, in_loop: bool) -> Result<(), SemanticError> {
        self.scopes.push(ScopeTable::new());
        for stmt in &block.0 {
            match stmt {
                Stmt::Decl(decls) => {
                    for decl in decls {
                        if let Some(init) = &decl.init {
                            self.expr(init)?;
                        }
                        let current = self.scopes.last_mut().expect("a scope is always open here");
                        if current.contains(&decl.name.name) {
                            return Err(SemanticError::MultipleDeclaration {
                                name: spell(self.names, decl.name.name),
                                line: decl.name.line,
                            });
                        }
                        current.push(decl.name.name);
                    }
                }
                Stmt::Assign(target, expr) => {
                    self.find_var(target)?;
                    self.expr(expr)?;
                }
                Stmt::If(cond, body) => {
                    self.expr(cond)?;
                    self.block(body, in_loop)?;
                }
                Stmt::While(cond, body) => {
                    self.expr(cond)?;
                    self.block(body, true)?;
                }
                Stmt::Return(expr) => self.expr(expr)?,
                Stmt::Break => {
                    if !in_loop {
                        return Err(SemanticError::BreakOutsideLoop);
                    }
                }
                Stmt::Continue => {
                    if !in_loop {
                        return Err(SemanticError::ContinueOutsideLoop);
                    }
                }
            }
        }
        self.scopes.pop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parse::parse;

    fn analyze_source(source: &str) -> Result<(), SemanticError> {
        let (ast, names) = parse(tokenize(source).unwrap()).unwrap();
        analyze(&ast, &names)
    }

    #[test]
    fn sound_program() {
        analyze_source(
            r"
            int helper(int n) {
                return n * 2;
            }
            int start() {
                int x = 1;
                while (x < 10) {
                    x = helper(x);
                    if (x == 4) {
                        continue;
                    }
                }
                return x;
            }
            ",
        )
        .unwrap();
    }

    #[test]
    fn use_before_declaration() {
        let err = analyze_source("int f() { x = 1; return x; }").unwrap_err();
        assert_eq!(err, SemanticError::UseBeforeDeclaration { name: "x".into(), line: 1 });
    }

    #[test]
    fn self_referential_initializer() {
        let err = analyze_source("int f() { int x = x; return x; }").unwrap_err();
        assert!(matches!(err, SemanticError::UseBeforeDeclaration { .. }));
    }

    #[test]
    fn declaration_expires_with_scope() {
        let err = analyze_source("int f() { if (1) { int x = 1; } return x; }").unwrap_err();
        assert!(matches!(err, SemanticError::UseBeforeDeclaration { .. }));
    }

    #[test]
    fn multiple_declaration() {
        let err = analyze_source("int f() { int x; int x; return 0; }").unwrap_err();
        assert_eq!(err, SemanticError::MultipleDeclaration { name: "x".into(), line: 1 });
    }

    #[test]
    fn shadowing_in_nested_scope_is_allowed() {
        analyze_source("int f() { int x = 1; if (x) { int x = 2; } return x; }").unwrap();
    }

    #[test]
    fn duplicate_function() {
        let err = analyze_source("int f() { return 0; } int f() { return 1; }").unwrap_err();
        assert!(matches!(err, SemanticError::DuplicateFunction { .. }));
    }

    #[test]
    fn unknown_function() {
        let err = analyze_source("int f() { return g(1); }").unwrap_err();
        assert_eq!(err, SemanticError::UnknownFunction { name: "g".into(), line: 1 });
    }

    #[test]
    fn calls_may_reference_later_functions() {
        analyze_source("int f(int n) { return g(n); } int g(int n) { return n; }").unwrap();
    }

    #[test]
    fn arity_mismatch() {
        let err = analyze_source("int g(int a, int b) { return a; } int f() { return g(1); }").unwrap_err();
        assert_eq!(err, SemanticError::ArityMismatch { name: "g".into(), expected: 2, actual: 1, line: 1 });
    }

    #[test]
    fn break_outside_loop() {
        let err = analyze_source("int f() { break; return 0; }").unwrap_err();
        assert_eq!(err, SemanticError::BreakOutsideLoop);
    }

    #[test]
    fn break_inside_if_inside_loop() {
        analyze_source("int f() { while (1) { if (1) { break; } } return 0; }").unwrap();
    }

    #[test]
    fn continue_outside_loop() {
        let err = analyze_source("int f() { if (1) { continue; } return 0; }").unwrap_err();
        assert_eq!(err, SemanticError::ContinueOutsideLoop);
    }
}
