use alloc::string::String;
use core::fmt::Display;

#[cfg(feature = "parser")]
pub use tinyc_parser::ParseError;

#[cfg(feature = "archive")]
pub use tinyc_types::archive::ArchiveError;

/// Errors that can occur for `tinyc` operations
#[derive(Debug)]
pub enum Error {
    /// A runtime trap occurred while interpreting a program
    Trap(Trap),

    /// A function was looked up by a name the program does not define
    UnknownFunction(String),

    /// The number of call arguments does not match the function's parameters
    ParamCountMismatch { expected: usize, actual: usize },

    /// A function body ran to its end without returning a value
    FuncDidNotReturn,

    /// An unknown error occurred
    Other(String),

    #[cfg(feature = "std")]
    /// An I/O error occurred
    Io(std::io::Error),

    #[cfg(feature = "parser")]
    /// A parsing error occurred
    ParseError(ParseError),

    #[cfg(feature = "archive")]
    /// An archive (de)serialization error occurred
    Archive(ArchiveError),
}

/// A runtime trap raised by the interpreter
///
/// Traps are conditions of the interpreted program itself, as opposed to
/// misuse of the embedding API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trap {
    /// An integer division or remainder by zero
    DivisionByZero,

    /// An `i32` division result that does not fit (`i32::MIN / -1`)
    IntegerOverflow,

    /// Call stack overflow
    CallStackOverflow,
}

impl Trap {
    /// Get the message of the trap
    pub fn message(&self) -> &'static str {
        match self {
            Self::DivisionByZero => "integer divide by zero",
            Self::IntegerOverflow => "integer overflow",
            Self::CallStackOverflow => "call stack exhausted",
        }
    }
}

impl From<Trap> for Error {
    fn from(value: Trap) -> Self {
        Self::Trap(value)
    }
}

#[cfg(feature = "parser")]
impl From<ParseError> for Error {
    fn from(value: ParseError) -> Self {
        Self::ParseError(value)
    }
}

#[cfg(feature = "archive")]
impl From<ArchiveError> for Error {
    fn from(value: ArchiveError) -> Self {
        Self::Archive(value)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            #[cfg(feature = "parser")]
            Self::ParseError(err) => write!(f, "error parsing program: {err}"),

            #[cfg(feature = "std")]
            Self::Io(err) => write!(f, "I/O error: {err}"),

            #[cfg(feature = "archive")]
            Self::Archive(err) => write!(f, "archive error: {err}"),

            Self::Trap(trap) => write!(f, "trap: {trap}"),
            Self::UnknownFunction(name) => write!(f, "unknown function: {name}"),
            Self::ParamCountMismatch { expected, actual } => {
                write!(f, "param count mismatch: expected {expected}, got {actual}")
            }
            Self::FuncDidNotReturn => write!(f, "function did not return"),
            Self::Other(message) => write!(f, "unknown error: {message}"),
        }
    }
}

impl Display for Trap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl core::error::Error for Error {}

/// A wrapper around [`core::result::Result`] for tinyc operations
pub type Result<T, E = Error> = core::result::Result<T, E>;
