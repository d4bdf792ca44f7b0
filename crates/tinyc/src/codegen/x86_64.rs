//! x86-64 backend.
//!
//! Emits GNU-assembler text using Intel mnemonics with `%`-prefixed
//! registers. Every value lives in a 4-byte stack slot handed out by
//! [`StackAllocator`]; `%eax` (and `%ecx`/`%edx` for multiplication and
//! division) are the only scratch registers.
//!
//! Calls use a plain stack convention: arguments are pushed as 8-byte
//! slots right-to-left, the result comes back in `%eax`, and the caller
//! pops its arguments after the call. Parameter `i` of the callee is at
//! `[%rbp + 16 + 8 * i]`.

use alloc::{
    collections::BTreeMap,
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};

use log::log_enabled;
use tinyc_types::{BinOp, Instruction, Operand, Program, Rhs, Var};

const PRELUDE: &str = ".intel_mnemonic\n.intel_syntax\n.text\n";

/// Emit assembly for a whole program.
pub(crate) fn emit(program: &Program) -> String {
    let mut out = String::from(PRELUDE);
    for (idx, func) in program.funcs.iter().enumerate() {
        let name = program.func_name(idx).unwrap_or("?");
        emit_function(program, name, &func.instructions, &mut out);
    }
    out
}

fn emit_function(program: &Program, name: &str, instructions: &[Instruction], out: &mut String) {
    let mut allocator = StackAllocator::new();
    let mut if_count = 0;
    let mut goto_count = 0;

    // Resolve jump targets up front so labels can be placed while the
    // instructions are generated in one pass.
    let mut if_jumps = Vec::new();
    let mut goto_jumps = Vec::new();
    for (i, instruction) in instructions.iter().enumerate() {
        match instruction {
            Instruction::Goto(offset) => goto_jumps.push(i.saturating_add_signed(*offset)),
            Instruction::Ifz(_, offset) => if_jumps.push(i + offset),
            _ => continue,
        }
    }

    let mut asm: Vec<Vec<String>> = instructions
        .iter()
        .enumerate()
        .map(|(i, tac)| {
            let mut lines = Vec::new();
            if log_enabled!(log::Level::Debug) {
                lines.push(format!("# {i}: {tac:?}"));
            }
            lines.append(&mut match tac {
                Instruction::Return(operand) => vec![
                    format!("mov %eax, {}", allocator.operand(*operand)),
                    format!("jmp .L{name}_end"),
                ],
                Instruction::Assign(dst, rhs) => allocator.assign(program, *dst, *rhs),
                Instruction::Push(operand) => match operand {
                    Operand::Const(value) => vec![format!("push {value}")],
                    operand => vec![
                        format!("mov %eax, {}", allocator.operand(*operand)),
                        "push %rax".to_string(),
                    ],
                },
                Instruction::Ifz(operand, _) => {
                    if_count += 1;
                    vec![
                        format!("cmp {}, 0", allocator.operand(*operand)),
                        format!("je .L{name}_{}", if_count - 1),
                    ]
                }
                Instruction::Goto(_) => {
                    goto_count += 1;
                    vec![format!("jmp .L{name}_g{}", goto_count - 1)]
                }
            });
            lines
        })
        .collect();

    for (label_id, &tac_index) in if_jumps.iter().enumerate() {
        place_label(&mut asm, tac_index, format!(".L{name}_{label_id}:"));
    }
    for (label_id, &tac_index) in goto_jumps.iter().enumerate() {
        place_label(&mut asm, tac_index, format!(".L{name}_g{label_id}:"));
    }

    out.push_str(&format!("\n.global {name}\n.type {name}, @function\n{name}:\n"));
    out.push_str("\tpush %rbp\n\tmov %rbp, %rsp\n");
    let frame = allocator.frame_size();
    if frame > 0 {
        out.push_str(&format!("\tsub %rsp, {frame}\n"));
    }
    for line in asm.iter().flatten() {
        out.push_str(&format!("\t{line}\n"));
    }
    out.push_str(&format!("\t.L{name}_end:\n\tmov %rsp, %rbp\n\tpop %rbp\n\tret\n"));
}

fn place_label(asm: &mut Vec<Vec<String>>, tac_index: usize, label: String) {
    if let Some(lines) = asm.get_mut(tac_index) {
        lines.insert(0, label);
    } else if let Some(last) = asm.last_mut() {
        last.push(label);
    }
}

/// Hands out 4-byte `[%rbp - offset]` slots, one per distinct binding or
/// temporary.
#[derive(Debug)]
struct StackAllocator {
    stack_usage: usize,
    vars: BTreeMap<Var, usize>,
    temps: BTreeMap<usize, usize>,
}

impl StackAllocator {
    fn new() -> Self {
        Self { stack_usage: 0, vars: BTreeMap::new(), temps: BTreeMap::new() }
    }

    /// The frame bytes to reserve, 16-byte aligned.
    fn frame_size(&self) -> usize {
        (self.stack_usage + 15) & !15
    }

    fn operand(&mut self, operand: Operand) -> String {
        match operand {
            Operand::Var(Var::Param(index)) => format!("DWORD PTR [%rbp + {}]", 16 + 8 * index),
            Operand::Var(var) => {
                let offset = match self.vars.get(&var) {
                    Some(&offset) => offset,
                    None => {
                        self.stack_usage += 4;
                        self.vars.insert(var, self.stack_usage);
                        self.stack_usage
                    }
                };
                format!("DWORD PTR [%rbp - {offset}]")
            }
            Operand::Temp(index) => {
                let offset = match self.temps.get(&index) {
                    Some(&offset) => offset,
                    None => {
                        self.stack_usage += 4;
                        self.temps.insert(index, self.stack_usage);
                        self.stack_usage
                    }
                };
                format!("DWORD PTR [%rbp - {offset}]")
            }
            Operand::Const(value) => value.to_string(),
        }
    }

    fn assign(&mut self, program: &Program, dst: Operand, rhs: Rhs) -> Vec<String> {
        match rhs {
            Rhs::Copy(Operand::Const(value)) => {
                vec![format!("mov {}, {value}", self.operand(dst))]
            }
            Rhs::Copy(src) => vec![
                format!("mov %eax, {}", self.operand(src)),
                format!("mov {}, %eax", self.operand(dst)),
            ],
            Rhs::Call { func, args } => {
                let callee = program.func_name(func).unwrap_or("?");
                let mut lines = vec![format!("call {callee}")];
                if args > 0 {
                    lines.push(format!("add %rsp, {}", 8 * args));
                }
                lines.push(format!("mov {}, %eax", self.operand(dst)));
                lines
            }
            Rhs::Binary(lhs, op, rhs) => self.binary(dst, lhs, op, rhs),
        }
    }

    fn binary(&mut self, dst: Operand, lhs: Operand, op: BinOp, rhs: Operand) -> Vec<String> {
        enum Operation {
            Arithmetic(&'static str),
            Conditional(&'static str),
            // These require dedicated register choreography.
            Mul,
            Div,
            Rem,
        }
        let operation = match op {
            BinOp::Add => Operation::Arithmetic("add"),
            BinOp::Sub => Operation::Arithmetic("sub"),
            BinOp::BitAnd => Operation::Arithmetic("and"),
            BinOp::BitOr => Operation::Arithmetic("or"),
            BinOp::BitXor => Operation::Arithmetic("xor"),
            BinOp::Lt => Operation::Conditional("setl"),
            BinOp::Le => Operation::Conditional("setle"),
            BinOp::Gt => Operation::Conditional("setg"),
            BinOp::Ge => Operation::Conditional("setge"),
            BinOp::Eq => Operation::Conditional("sete"),
            BinOp::Ne => Operation::Conditional("setne"),
            BinOp::Mul => Operation::Mul,
            BinOp::Div => Operation::Div,
            BinOp::Rem => Operation::Rem,
        };
        match operation {
            Operation::Arithmetic(op_code) => vec![
                format!("mov %eax, {}", self.operand(lhs)),
                format!("{op_code} %eax, {}", self.operand(rhs)),
                format!("mov {}, %eax", self.operand(dst)),
            ],
            Operation::Conditional(op_code) => vec![
                format!("mov %eax, {}", self.operand(lhs)),
                format!("cmp %eax, {}", self.operand(rhs)),
                format!("{op_code} %al"),
                "and %al, 1".to_string(),
                "movzx %eax, %al".to_string(),
                format!("mov {}, %eax", self.operand(dst)),
            ],
            Operation::Mul => vec![
                format!("mov %eax, {}", self.operand(lhs)),
                format!("mov %ecx, {}", self.operand(rhs)),
                "imul %eax, %ecx".to_string(),
                format!("mov {}, %eax", self.operand(dst)),
            ],
            Operation::Div => vec![
                format!("mov %eax, {}", self.operand(lhs)),
                format!("mov %ecx, {}", self.operand(rhs)),
                "cdq".to_string(),
                "idiv %ecx".to_string(),
                format!("mov {}, %eax", self.operand(dst)),
            ],
            Operation::Rem => vec![
                format!("mov %eax, {}", self.operand(lhs)),
                format!("mov %ecx, {}", self.operand(rhs)),
                "cdq".to_string(),
                "idiv %ecx".to_string(),
                format!("mov {}, %edx", self.operand(dst)),
            ],
        }
    }
}
