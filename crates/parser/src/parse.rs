//! Recursive-descent parser over the lexer's token stream.

use alloc::{string::String, vec::Vec};
use core::iter::Peekable;

use tinyc_types::BinOp;

use crate::ast::{Ast, Block, Declarator, DirectValue, Expr, FuncDef, Ident, Stmt};
use crate::error::{ParseError, Result};
use crate::lexer::{Keyword, Symbol, SymbolTable, Token, TokenStream};

/// Parse a full token stream into an AST plus the identifier name table.
pub(crate) fn parse(stream: TokenStream) -> Result<(Ast, Vec<String>)> {
    let TokenStream { table: SymbolTable { idents, consts }, symbols } = stream;
    let mut parser = Parser { symbols: symbols.into_iter().peekable(), consts };

    let mut funcs = Vec::new();
    while parser.symbols.peek().is_some() {
        funcs.push(parser.func_def()?);
    }
    Ok((Ast { funcs }, idents))
}

struct Parser<I: Iterator<Item = Symbol>> {
    symbols: Peekable<I>,
    consts: Vec<String>,
}

impl<I: Iterator<Item = Symbol>> Parser<I> {
    fn next_if_eq(&mut self, needle: Token) -> bool {
        self.symbols.next_if(|s| s.token == needle).is_some()
    }

    fn expect(&mut self, needle: Token, expected: &'static str) -> Result<()> {
        if self.next_if_eq(needle) {
            Ok(())
        } else {
            Err(self.err_unexpected(expected))
        }
    }

    fn ident(&mut self) -> Option<Ident> {
        match self.symbols.peek() {
            Some(&Symbol { token: Token::Ident(name), line }) => {
                self.symbols.next();
                Some(Ident { name, line })
            }
            _ => None,
        }
    }

    fn expect_ident(&mut self, expected: &'static str) -> Result<Ident> {
        self.ident().ok_or_else(|| self.err_unexpected(expected))
    }

    fn err_unexpected(&mut self, expected: &'static str) -> ParseError {
        match self.symbols.peek() {
            Some(symbol) => ParseError::UnexpectedToken { expected, found: symbol.token, line: symbol.line },
            None => ParseError::UnexpectedEof { expected },
        }
    }

    fn func_def(&mut self) -> Result<FuncDef> {
        self.expect(Token::Keyword(Keyword::Int), "`int` to begin a function definition")?;
        let name = self.expect_ident("function name")?;
        self.expect(Token::LeftParen, "`(` after function name")?;

        let mut params = Vec::new();
        if !self.next_if_eq(Token::RightParen) {
            loop {
                self.expect(Token::Keyword(Keyword::Int), "`int` before parameter name")?;
                params.push(self.expect_ident("parameter name")?);
                if !self.next_if_eq(Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RightParen, "`)` after parameters")?;
        }

        self.expect(Token::LeftBrace, "`{` to begin function body")?;
        let body = self.block()?;
        Ok(FuncDef { name, params, body })
    }

    fn block(&mut self) -> Result<Block> {
        let mut stmts = Vec::new();
        while !self.next_if_eq(Token::RightBrace) {
            stmts.push(self.stmt()?);
        }
        Ok(Block(stmts))
    }

    fn stmt(&mut self) -> Result<Stmt> {
        match self.symbols.peek().map(|s| s.token) {
            Some(Token::Keyword(Keyword::If)) => {
                self.symbols.next();
                let (cond, body) = self.condition_and_block()?;
                Ok(Stmt::If(cond, body))
            }
            Some(Token::Keyword(Keyword::While)) => {
                self.symbols.next();
                let (cond, body) = self.condition_and_block()?;
                Ok(Stmt::While(cond, body))
            }
            Some(Token::Keyword(Keyword::Int)) => {
                self.symbols.next();
                self.decl_stmt()
            }
            Some(Token::Keyword(Keyword::Return)) => {
                self.symbols.next();
                let value = self.expression()?;
                self.expect(Token::Semicolon, "`;` after return value")?;
                Ok(Stmt::Return(value))
            }
            Some(Token::Keyword(Keyword::Break)) => {
                self.symbols.next();
                self.expect(Token::Semicolon, "`;` after `break`")?;
                Ok(Stmt::Break)
            }
            Some(Token::Keyword(Keyword::Continue)) => {
                self.symbols.next();
                self.expect(Token::Semicolon, "`;` after `continue`")?;
                Ok(Stmt::Continue)
            }
            Some(Token::Ident(_)) => {
                let target = self.expect_ident("assignment target")?;
                self.expect(Token::Equal, "`=` after assignment target")?;
                let value = self.expression()?;
                self.expect(Token::Semicolon, "`;` after assignment")?;
                Ok(Stmt::Assign(target, value))
            }
            _ => Err(self.err_unexpected("a statement")),
        }
    }

    fn condition_and_block(&mut self) -> Result<(Expr, Block)> {
        self.expect(Token::LeftParen, "`(` before condition")?;
        let cond = self.expression()?;
        self.expect(Token::RightParen, "`)` after condition")?;
        self.expect(Token::LeftBrace, "`{` to begin block")?;
        Ok((cond, self.block()?))
    }

    fn decl_stmt(&mut self) -> Result<Stmt> {
        let mut decls = Vec::new();
        loop {
            let name = self.expect_ident("variable name")?;
            let init = if self.next_if_eq(Token::Equal) { Some(self.expression()?) } else { None };
            decls.push(Declarator { name, init });
            if !self.next_if_eq(Token::Comma) {
                break;
            }
        }
        self.expect(Token::Semicolon, "`;` after declaration")?;
        Ok(Stmt::Decl(decls))
    }

    fn expression(&mut self) -> Result<Expr> {
        if let Some(ident) = self.ident() {
            if self.next_if_eq(Token::LeftParen) {
                return Ok(Expr::Call(ident, self.call_args()?));
            }
            return self.binary_tail(DirectValue::Ident(ident));
        }
        let lhs = self.direct_value()?;
        self.binary_tail(lhs)
    }

    fn binary_tail(&mut self, lhs: DirectValue) -> Result<Expr> {
        match self.binop() {
            Some(op) => Ok(Expr::Binary(lhs, op, self.direct_value()?)),
            None => Ok(Expr::Direct(lhs)),
        }
    }

    fn call_args(&mut self) -> Result<Vec<DirectValue>> {
        let mut args = Vec::new();
        if self.next_if_eq(Token::RightParen) {
            return Ok(args);
        }
        loop {
            args.push(self.direct_value()?);
            if !self.next_if_eq(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RightParen, "`)` after call arguments")?;
        Ok(args)
    }

    fn direct_value(&mut self) -> Result<DirectValue> {
        if let Some(ident) = self.ident() {
            return Ok(DirectValue::Ident(ident));
        }
        let negative = self.next_if_eq(Token::Minus);
        match self.symbols.peek() {
            Some(&Symbol { token: Token::Const(index), line }) => {
                self.symbols.next();
                let value = self.parse_const(index, line)?;
                Ok(DirectValue::Const(if negative { -value } else { value }))
            }
            _ => Err(self.err_unexpected("an identifier or integer constant")),
        }
    }

    fn binop(&mut self) -> Option<BinOp> {
        let op = match self.symbols.peek()?.token {
            Token::Plus => BinOp::Add,
            Token::Minus => BinOp::Sub,
            Token::Star => BinOp::Mul,
            Token::Slash => BinOp::Div,
            Token::Percent => BinOp::Rem,
            Token::Amp => BinOp::BitAnd,
            Token::Pipe => BinOp::BitOr,
            Token::Caret => BinOp::BitXor,
            Token::Less => BinOp::Lt,
            Token::LessEqual => BinOp::Le,
            Token::Greater => BinOp::Gt,
            Token::GreaterEqual => BinOp::Ge,
            Token::EqualEqual => BinOp::Eq,
            Token::BangEqual => BinOp::Ne,
            _ => return None,
        };
        self.symbols.next();
        Some(op)
    }

    fn parse_const(&self, index: usize, line: usize) -> Result<i32> {
        let text = self.consts.get(index).map(String::as_str).unwrap_or_default();
        const_value(text).ok_or_else(|| ParseError::InvalidConstant { text: text.into(), line })
    }
}

/// Decimal by default, with `0x`/`0o`/`0b` radix prefixes.
fn const_value(text: &str) -> Option<i32> {
    if let Ok(value) = text.parse::<i32>() {
        return Some(value);
    }
    let trimmed = text.trim_start_matches('0');
    let radix = match trimmed.chars().next()? {
        'b' => 2,
        'o' => 8,
        'x' => 16,
        _ => return None,
    };
    i32::from_str_radix(trimmed.get(1..)?, radix).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use alloc::vec;

    fn parse_source(source: &str) -> Result<(Ast, Vec<String>)> {
        parse(tokenize(source).unwrap())
    }

    #[test]
    fn function_with_parameters() {
        let (ast, names) = parse_source("int add(int a, int b) { return a + b; }").unwrap();
        assert_eq!(names, vec!["add", "a", "b"]);
        assert_eq!(ast.funcs.len(), 1);

        let func = &ast.funcs[0];
        assert_eq!(func.name.name, 0);
        assert_eq!(func.params.len(), 2);
        assert_eq!(
            func.body.0,
            vec![Stmt::Return(Expr::Binary(
                DirectValue::Ident(Ident { name: 1, line: 1 }),
                BinOp::Add,
                DirectValue::Ident(Ident { name: 2, line: 1 }),
            ))]
        );
    }

    #[test]
    fn empty_parameter_list() {
        let (ast, _) = parse_source("int start() { return 0; }").unwrap();
        assert!(ast.funcs[0].params.is_empty());
    }

    #[test]
    fn declaration_list_with_initializers() {
        let (ast, names) = parse_source("int f() { int n = 10, other, result = g(n); return result; }").unwrap();
        assert_eq!(names, vec!["f", "n", "other", "result", "g"]);

        let Stmt::Decl(decls) = &ast.funcs[0].body.0[0] else {
            panic!("expected a declaration");
        };
        assert_eq!(decls.len(), 3);
        assert_eq!(decls[0].init, Some(Expr::Direct(DirectValue::Const(10))));
        assert_eq!(decls[1].init, None);
        assert_eq!(
            decls[2].init,
            Some(Expr::Call(Ident { name: 4, line: 1 }, vec![DirectValue::Ident(Ident { name: 1, line: 1 })]))
        );
    }

    #[test]
    fn nested_control_flow() {
        let (ast, _) = parse_source(
            r"
            int f(int n) {
                while (1) {
                    if (n >= 10) {
                        break;
                    }
                    n = n + 1;
                }
                return n;
            }
            ",
        )
        .unwrap();

        let Stmt::While(cond, body) = &ast.funcs[0].body.0[0] else {
            panic!("expected a while loop");
        };
        assert_eq!(*cond, Expr::Direct(DirectValue::Const(1)));
        assert!(matches!(&body.0[0], Stmt::If(_, inner) if inner.0 == vec![Stmt::Break]));
    }

    #[test]
    fn negative_and_radix_constants() {
        let (ast, _) = parse_source("int f() { int x = -5, y = 0x1F, z = 0b101; return x; }").unwrap();
        let Stmt::Decl(decls) = &ast.funcs[0].body.0[0] else {
            panic!("expected a declaration");
        };
        assert_eq!(decls[0].init, Some(Expr::Direct(DirectValue::Const(-5))));
        assert_eq!(decls[1].init, Some(Expr::Direct(DirectValue::Const(0x1F))));
        assert_eq!(decls[2].init, Some(Expr::Direct(DirectValue::Const(0b101))));
    }

    #[test]
    fn missing_semicolon() {
        let err = parse_source("int f() { return 0 }").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { expected: "`;` after return value", .. }));
    }

    #[test]
    fn truncated_input() {
        let err = parse_source("int f(").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn constant_overflow() {
        let err = parse_source("int f() { return 99999999999; }").unwrap_err();
        assert!(matches!(err, ParseError::InvalidConstant { .. }));
    }

    #[test]
    fn const_value_radix_prefixes() {
        assert_eq!(const_value("42"), Some(42));
        assert_eq!(const_value("0x1F"), Some(31));
        assert_eq!(const_value("0o17"), Some(15));
        assert_eq!(const_value("0b101"), Some(5));
        assert_eq!(const_value("0zff"), None);
    }
}
