use alloc::{collections::BTreeMap, vec::Vec};

use tinyc_types::{Operand, Var};

use crate::{Result, Trap};

pub(crate) const MAX_CALL_STACK_SIZE: usize = 1024;

/// Frames of calls that are suspended waiting on a callee.
#[derive(Debug, Default)]
pub(crate) struct CallStack {
    stack: Vec<CallFrame>,
}

impl CallStack {
    #[inline]
    pub(crate) fn pop(&mut self) -> Option<CallFrame> {
        self.stack.pop()
    }

    #[inline]
    pub(crate) fn push(&mut self, call_frame: CallFrame) -> Result<()> {
        if self.stack.len() + 1 >= MAX_CALL_STACK_SIZE {
            return Err(Trap::CallStackOverflow.into());
        }
        self.stack.push(call_frame);
        Ok(())
    }
}

/// The execution state of one function activation.
#[derive(Debug)]
pub(crate) struct CallFrame {
    pub(crate) func: usize,
    pub(crate) instr_ptr: usize,
    params: Vec<i32>,
    /// Value slots for local bindings and temporaries. Slots that were
    /// never written read as zero.
    slots: BTreeMap<Operand, i32>,
}

impl CallFrame {
    pub(crate) fn new(func: usize, params: Vec<i32>) -> Self {
        Self { func, instr_ptr: 0, params, slots: BTreeMap::new() }
    }

    pub(crate) fn read(&self, operand: Operand) -> i32 {
        match operand {
            Operand::Const(value) => value,
            Operand::Var(Var::Param(index)) => self.params.get(index).copied().unwrap_or(0),
            slot => self.slots.get(&slot).copied().unwrap_or(0),
        }
    }

    pub(crate) fn write(&mut self, operand: Operand, value: i32) {
        match operand {
            // Constants are not writable; lowering never emits such a store.
            Operand::Const(_) => {}
            Operand::Var(Var::Param(index)) => {
                if let Some(slot) = self.params.get_mut(index) {
                    *slot = value;
                }
            }
            slot => {
                self.slots.insert(slot, value);
            }
        }
    }
}
