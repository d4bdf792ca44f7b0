use alloc::string::{String, ToString};

use log::debug;
use tinyc_types::Program;

use crate::{interpreter::Executor, Error, Result};

/// A compiled tinyc program, ready to interpret or translate.
#[derive(Debug, Clone)]
pub struct Module {
    data: Program,
}

impl From<Program> for Module {
    fn from(data: Program) -> Self {
        Self { data }
    }
}

impl From<&Program> for Module {
    fn from(data: &Program) -> Self {
        Self { data: data.clone() }
    }
}

impl Module {
    /// Compile a module from source text. Requires the `parser` feature.
    #[cfg(feature = "parser")]
    pub fn parse_str(source: &str) -> Result<Self> {
        let parser = tinyc_parser::Parser::new();
        let data = parser.parse_str(source)?;
        Ok(data.into())
    }

    /// Compile a module from a source file. Requires the `parser` and `std` features.
    #[cfg(all(feature = "parser", feature = "std"))]
    pub fn parse_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let parser = tinyc_parser::Parser::new();
        let data = parser.parse_file(path)?;
        Ok(data.into())
    }

    /// Decode a module from the bytes of a `.tac` archive. Requires the `archive` feature.
    #[cfg(feature = "archive")]
    pub fn from_tac(bytes: &[u8]) -> Result<Self> {
        Ok(Program::from_tac(bytes)?.into())
    }

    /// Serialize the module into the bytes of a `.tac` archive. Requires the `archive` feature.
    #[cfg(feature = "archive")]
    pub fn serialize_tac(&self) -> Result<alloc::vec::Vec<u8>> {
        Ok(self.data.serialize_tac()?)
    }

    /// The lowered program backing this module.
    pub fn data(&self) -> &Program {
        &self.data
    }

    /// Translate the whole module to x86-64 assembly text.
    pub fn to_x86_64(&self) -> String {
        crate::codegen::x86_64::emit(&self.data)
    }

    /// Get a handle to the function `name`.
    pub fn get_func(&self, name: &str) -> Result<FuncHandle<'_>> {
        let func = self.data.func_idx(name).ok_or_else(|| Error::UnknownFunction(name.to_string()))?;
        Ok(FuncHandle { module: self, func, name: self.data.func_name(func).unwrap_or_default() })
    }
}

/// A function handle
#[derive(Debug)]
pub struct FuncHandle<'m> {
    module: &'m Module,
    func: usize,

    /// The name of the function
    pub name: &'m str,
}

impl FuncHandle<'_> {
    /// Call the function with `params` and run it to completion.
    pub fn call(&self, params: &[i32]) -> Result<i32> {
        let func = self
            .module
            .data
            .funcs
            .get(self.func)
            .ok_or_else(|| Error::Other("malformed program: missing function body".to_string()))?;

        if func.params != params.len() {
            return Err(Error::ParamCountMismatch { expected: func.params, actual: params.len() });
        }

        debug!("calling `{}` with {params:?}", self.name);
        Executor::new(&self.module.data, self.func, params).run_to_completion()
    }
}
