#![no_std]
#![forbid(unsafe_code)]
#![warn(missing_debug_implementations, rust_2018_idioms)]

//! A tiny compiler and interpreter for a small C subset.
//!
//! Source text is lowered to three-address code by
//! [`tinyc-parser`](https://docs.rs/tinyc-parser); this crate wraps the
//! result in a [`Module`] that can be interpreted directly, translated to
//! x86-64 assembly, or serialized as a `.tac` archive.
//!
//! ```rust
//! use tinyc::Module;
//!
//! # fn main() -> tinyc::Result<()> {
//! let module = Module::parse_str("int double_it(int n) { return n * 2; }")?;
//! let func = module.get_func("double_it")?;
//! assert_eq!(func.call(&[21])?, 42);
//! # Ok(())
//! # }
//! ```

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod codegen;
mod error;
mod interpreter;
mod module;

pub mod fib;

pub use error::*;
pub use module::{FuncHandle, Module};
pub use tinyc_types as types;
