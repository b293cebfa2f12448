//! Compile and execute stages
//!
//! Generated code goes through two typed stages before anyone sees output:
//! - [`Compiler`] applies the enabled syntax extensions and validates delimiters,
//!   producing a [`CompiledUnit`] or a [`CompileError`]
//! - [`Executor`] runs a unit against a [`RuntimeContext`](crate::unv::runtime::RuntimeContext),
//!   appending printed output to its log, or fails with a [`RuntimeError`]
//!
//! Both are traits so hosts and tests can swap in their own implementations.

pub mod compiler;
pub mod executor;

pub use compiler::{
    CompileError, CompileOptions, CompiledUnit, Compiler, SourceCompiler, SyntaxExtension,
};
pub use executor::{Executor, NodeExecutor, RuntimeError};
