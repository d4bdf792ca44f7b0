use alloc::{string::ToString, vec::Vec};
use core::ops::ControlFlow;

use log::trace;
use tinyc_types::{BinOp, Function, Instruction, Operand, Program, Rhs};

use super::call_stack::{CallFrame, CallStack};
use crate::{Error, Result, Trap};

/// Runs one entry-point call to completion.
///
/// The currently executing frame lives in `cf`; callers suspended on a
/// `call` wait on the call stack. Pushed arguments accumulate on a shared
/// stack and are consumed by the matching call instruction.
#[derive(Debug)]
pub(crate) struct Executor<'p> {
    cf: CallFrame,
    program: &'p Program,
    call_stack: CallStack,
    args: Vec<i32>,
}

impl<'p> Executor<'p> {
    pub(crate) fn new(program: &'p Program, func: usize, params: &[i32]) -> Self {
        Self {
            cf: CallFrame::new(func, params.to_vec()),
            program,
            call_stack: CallStack::default(),
            args: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn run_to_completion(&mut self) -> Result<i32> {
        loop {
            match self.exec_next()? {
                ControlFlow::Break(value) => return Ok(value),
                ControlFlow::Continue(()) => continue,
            }
        }
    }

    fn func(&self) -> Result<&'p Function> {
        self.program
            .funcs
            .get(self.cf.func)
            .ok_or_else(|| Error::Other("malformed program: call to a missing function body".to_string()))
    }

    #[inline]
    fn exec_next(&mut self) -> Result<ControlFlow<i32>> {
        let Some(&instruction) = self.func()?.instructions.get(self.cf.instr_ptr) else {
            return Err(Error::FuncDidNotReturn);
        };
        trace!("{}: {instruction:?}", self.cf.instr_ptr);

        match instruction {
            Instruction::Assign(_, Rhs::Call { func, args }) => self.exec_call(func, args)?,
            Instruction::Assign(dst, Rhs::Copy(src)) => {
                let value = self.cf.read(src);
                self.cf.write(dst, value);
                self.cf.instr_ptr += 1;
            }
            Instruction::Assign(dst, Rhs::Binary(lhs, op, rhs)) => {
                let value = binary(self.cf.read(lhs), op, self.cf.read(rhs))?;
                self.cf.write(dst, value);
                self.cf.instr_ptr += 1;
            }
            Instruction::Push(operand) => {
                let value = self.cf.read(operand);
                self.args.push(value);
                self.cf.instr_ptr += 1;
            }
            Instruction::Ifz(operand, offset) => {
                if self.cf.read(operand) == 0 {
                    self.cf.instr_ptr += offset;
                } else {
                    self.cf.instr_ptr += 1;
                }
            }
            Instruction::Goto(offset) => {
                self.cf.instr_ptr = self
                    .cf
                    .instr_ptr
                    .checked_add_signed(offset)
                    .ok_or_else(|| Error::Other("malformed program: jump before function start".to_string()))?;
            }
            Instruction::Return(operand) => return self.exec_return(operand),
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Suspend the current frame and enter the callee.
    fn exec_call(&mut self, func: usize, args: usize) -> Result<()> {
        if self.args.len() < args {
            return Err(Error::Other("malformed program: missing call arguments".to_string()));
        }
        // Arguments were pushed in reverse, so the split-off tail holds them
        // last-first.
        let mut params = self.args.split_off(self.args.len() - args);
        params.reverse();

        let callee = CallFrame::new(func, params);
        let suspended = core::mem::replace(&mut self.cf, callee);
        self.call_stack.push(suspended)?;
        Ok(())
    }

    /// Return `operand` to the suspended caller, or finish the run.
    fn exec_return(&mut self, operand: Operand) -> Result<ControlFlow<i32>> {
        let value = self.cf.read(operand);
        let Some(caller) = self.call_stack.pop() else {
            return Ok(ControlFlow::Break(value));
        };
        self.cf = caller;

        // The caller is parked on the assignment that made the call; store
        // the result there and step past it.
        let call_site = self.func()?.instructions.get(self.cf.instr_ptr).copied();
        let Some(Instruction::Assign(dst, Rhs::Call { .. })) = call_site else {
            return Err(Error::Other("malformed program: return into a non-call instruction".to_string()));
        };
        self.cf.write(dst, value);
        self.cf.instr_ptr += 1;
        Ok(ControlFlow::Continue(()))
    }
}

/// Apply a binary operator with the language's wrapping semantics.
/// Comparisons yield 0 or 1.
fn binary(lhs: i32, op: BinOp, rhs: i32) -> Result<i32> {
    let value = match op {
        BinOp::Add => lhs.wrapping_add(rhs),
        BinOp::Sub => lhs.wrapping_sub(rhs),
        BinOp::Mul => lhs.wrapping_mul(rhs),
        BinOp::Div => {
            if rhs == 0 {
                return Err(Trap::DivisionByZero.into());
            }
            lhs.checked_div(rhs).ok_or(Trap::IntegerOverflow)?
        }
        BinOp::Rem => {
            if rhs == 0 {
                return Err(Trap::DivisionByZero.into());
            }
            lhs.checked_rem(rhs).ok_or(Trap::IntegerOverflow)?
        }
        BinOp::BitAnd => lhs & rhs,
        BinOp::BitOr => lhs | rhs,
        BinOp::BitXor => lhs ^ rhs,
        BinOp::Lt => (lhs < rhs) as i32,
        BinOp::Le => (lhs <= rhs) as i32,
        BinOp::Gt => (lhs > rhs) as i32,
        BinOp::Ge => (lhs >= rhs) as i32,
        BinOp::Eq => (lhs == rhs) as i32,
        BinOp::Ne => (lhs != rhs) as i32,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_arithmetic() {
        assert_eq!(binary(i32::MAX, BinOp::Add, 1).unwrap(), i32::MIN);
        assert_eq!(binary(i32::MIN, BinOp::Sub, 1).unwrap(), i32::MAX);
        assert_eq!(binary(1 << 30, BinOp::Mul, 4).unwrap(), 0);
    }

    #[test]
    fn comparisons_yield_zero_or_one() {
        assert_eq!(binary(1, BinOp::Lt, 2).unwrap(), 1);
        assert_eq!(binary(2, BinOp::Lt, 1).unwrap(), 0);
        assert_eq!(binary(3, BinOp::Eq, 3).unwrap(), 1);
        assert_eq!(binary(3, BinOp::Ne, 3).unwrap(), 0);
    }

    #[test]
    fn division_traps() {
        assert!(matches!(binary(1, BinOp::Div, 0), Err(Error::Trap(Trap::DivisionByZero))));
        assert!(matches!(binary(1, BinOp::Rem, 0), Err(Error::Trap(Trap::DivisionByZero))));
        assert!(matches!(binary(i32::MIN, BinOp::Div, -1), Err(Error::Trap(Trap::IntegerOverflow))));
        assert_eq!(binary(7, BinOp::Div, -2).unwrap(), -3);
        assert_eq!(binary(7, BinOp::Rem, -2).unwrap(), 1);
    }
}
