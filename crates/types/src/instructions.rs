use core::fmt::{self, Display};

/// A resolved variable reference.
///
/// Name resolution happens during lowering, so the instruction stream never
/// refers to variables by their source spelling alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "archive", derive(serde::Serialize, serde::Deserialize))]
pub enum Var {
    /// A local binding: name-table index plus the id of the scope that
    /// declared it, so shadowed declarations stay distinct.
    Local {
        /// Index into [`crate::Program::names`].
        name: usize,
        /// Id of the declaring scope within the function.
        scope: usize,
    },

    /// A function parameter, by position.
    Param(usize),
}

/// The value slots an instruction can read from or write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "archive", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    /// A named variable.
    Var(Var),
    /// A compiler-introduced temporary.
    Temp(usize),
    /// An integer constant.
    Const(i32),
}

/// The right-hand side of an assignment instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "archive", derive(serde::Serialize, serde::Deserialize))]
pub enum Rhs {
    /// Call the function at index `func` in [`crate::Program::funcs`],
    /// consuming the `args` most recently pushed operands.
    Call {
        /// Index into the program's function table.
        func: usize,
        /// Number of arguments the call consumes.
        args: usize,
    },
    /// Copy a single operand.
    Copy(Operand),
    /// Apply a binary operator to two operands.
    Binary(Operand, BinOp, Operand),
}

/// A three-address-code instruction.
///
/// Jump offsets are relative to the instruction they appear in: an
/// [`Instruction::Ifz`] with offset `n` transfers control `n` instructions
/// forward when the operand is zero, and an [`Instruction::Goto`] adds its
/// signed offset to the current instruction index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "archive", derive(serde::Serialize, serde::Deserialize))]
pub enum Instruction {
    /// Evaluate `rhs` and store the result in `dst`.
    Assign(Operand, Rhs),
    /// Jump forward by the offset when the operand is zero.
    Ifz(Operand, usize),
    /// Unconditional relative jump.
    Goto(isize),
    /// Push a call argument.
    Push(Operand),
    /// Return a value to the caller.
    Return(Operand),
}

/// The binary operators of the source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "archive", derive(serde::Serialize, serde::Deserialize))]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
        };
        write!(f, "{symbol}")
    }
}
