//! Three-address-code generation.
//!
//! Lowering assumes the program passed [`crate::analyze`]; identifier
//! resolution and call targets are trusted to succeed here.

use alloc::{string::String, vec, vec::Vec};

use log::debug;
use tinyc_types::{Function, Instruction, Operand, Program, Rhs, Var};

use crate::ast::{Ast, Block, Declarator, DirectValue, Expr, FuncDef, Ident, Stmt};

// Sentinel offsets for jumps that cannot be resolved until the enclosing
// loop block is fully generated.
const PENDING_BREAK: isize = isize::MAX;
const PENDING_CONTINUE: isize = isize::MIN;

/// Lower an analyzed AST into a [`Program`].
pub(crate) fn lower(ast: &Ast, names: Vec<String>) -> Program {
    let func_names: Vec<usize> = ast.funcs.iter().map(|f| f.name.name).collect();

    let funcs = ast
        .funcs
        .iter()
        .map(|func| {
            debug!("lowering function `{}`", names.get(func.name.name).map(String::as_str).unwrap_or("?"));
            let mut lowering = FuncLowering::new(names.len(), &func_names, func);
            let instructions = lowering.block(&func.body);
            Function {
                name: func.name.name,
                params: func.params.len(),
                instructions: instructions.into_boxed_slice(),
            }
        })
        .collect::<Vec<_>>()
        .into_boxed_slice();

    Program { names: names.into_boxed_slice(), funcs }
}

struct FuncLowering<'a> {
    params: &'a [Ident],
    funcs: &'a [usize],
    /// Scope ids are unique within a function so sibling scopes never alias.
    next_scope: usize,
    /// Currently open scopes with the names they bound, innermost last.
    open_scopes: Vec<(usize, Vec<usize>)>,
    /// Per name-table index, the stack of scope ids with a live binding.
    scope_map: Vec<Vec<usize>>,
}

impl<'a> FuncLowering<'a> {
    fn new(ident_count: usize, funcs: &'a [usize], func: &'a FuncDef) -> Self {
        Self {
            params: &func.params,
            funcs,
            next_scope: 0,
            open_scopes: Vec::new(),
            scope_map: (0..ident_count).map(|_| Vec::new()).collect(),
        }
    }

    fn enter_scope(&mut self) {
        self.open_scopes.push((self.next_scope, Vec::new()));
        self.next_scope += 1;
    }

    fn exit_scope(&mut self) {
        if let Some((_, bound)) = self.open_scopes.pop() {
            for name in bound {
                self.scope_map[name].pop();
            }
        }
    }

    fn bind(&mut self, ident: &Ident) -> Var {
        let (scope, bound) = self.open_scopes.last_mut().expect("a scope is always open here");
        bound.push(ident.name);
        self.scope_map[ident.name].push(*scope);
        Var::Local { name: ident.name, scope: *scope }
    }

    fn resolve(&self, ident: &Ident) -> Var {
        if let Some(&scope) = self.scope_map[ident.name].last() {
            Var::Local { name: ident.name, scope }
        } else {
            let index =
                self.params.iter().position(|p| p.name == ident.name).expect("analysis binds every identifier");
            Var::Param(index)
        }
    }

    fn operand(&self, value: &DirectValue) -> Operand {
        match value {
            DirectValue::Ident(ident) => Operand::Var(self.resolve(ident)),
            DirectValue::Const(value) => Operand::Const(*value),
        }
    }

    /// Evaluate `expr` into `dst`, materializing call arguments first.
    fn assignment(&mut self, dst: Operand, expr: &Expr) -> Vec<Instruction> {
        let mut out = Vec::new();
        let rhs = match expr {
            Expr::Call(callee, args) => {
                for arg in args.iter().rev() {
                    out.push(Instruction::Push(self.operand(arg)));
                }
                let func =
                    self.funcs.iter().position(|&name| name == callee.name).expect("analysis checks call targets");
                Rhs::Call { func, args: args.len() }
            }
            Expr::Direct(value) => Rhs::Copy(self.operand(value)),
            Expr::Binary(lhs, op, rhs) => Rhs::Binary(self.operand(lhs), *op, self.operand(rhs)),
        };
        out.push(Instruction::Assign(dst, rhs));
        out
    }

    fn decls(&mut self, decls: &[Declarator]) -> Vec<Instruction> {
        let mut out = Vec::new();
        for decl in decls {
            let var = self.bind(&decl.name);
            if let Some(init) = &decl.init {
                out.append(&mut self.assignment(Operand::Var(var), init));
            }
        }
        out
    }

    fn block(&mut self, block: &Block) -> Vec<Instruction> {
        self.enter_scope();
        let mut instructions = Vec::new();
        for stmt in &block.0 {
            let mut generated = match stmt {
                Stmt::Decl(decls) => self.decls(decls),
                Stmt::Assign(target, expr) => {
                    let dst = Operand::Var(self.resolve(target));
                    self.assignment(dst, expr)
                }
                Stmt::If(cond, body) => {
                    let mut body_instrs = self.block(body);
                    let mut out = self.assignment(Operand::Temp(0), cond);
                    out.push(Instruction::Ifz(Operand::Temp(0), body_instrs.len() + 1));
                    out.append(&mut body_instrs);
                    out
                }
                Stmt::While(cond, body) => self.while_loop(cond, body),
                Stmt::Return(expr) => {
                    let mut out = self.assignment(Operand::Temp(0), expr);
                    out.push(Instruction::Return(Operand::Temp(0)));
                    out
                }
                Stmt::Break => vec![Instruction::Goto(PENDING_BREAK)],
                Stmt::Continue => vec![Instruction::Goto(PENDING_CONTINUE)],
            };
            instructions.append(&mut generated);
        }
        self.exit_scope();
        instructions
    }

    fn while_loop(&mut self, cond: &Expr, body: &Block) -> Vec<Instruction> {
        let mut body_instrs = self.block(body);
        let mut out = self.assignment(Operand::Temp(0), cond);
        out.push(Instruction::Ifz(Operand::Temp(0), body_instrs.len() + 2));
        out.append(&mut body_instrs);
        out.push(Instruction::Goto(-(out.len() as isize)));

        // Patch pending break/continue jumps now that the loop extent is
        // known. Inner loops have already resolved their own sentinels.
        let len = out.len();
        for (i, instruction) in out.iter_mut().enumerate() {
            if let Instruction::Goto(offset) = instruction {
                if *offset == PENDING_BREAK {
                    *offset = (len - i) as isize;
                } else if *offset == PENDING_CONTINUE {
                    *offset = -(i as isize);
                }
            }
        }
        out
    }
}
