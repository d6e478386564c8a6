//! OPLang Compiler
//!
//! Semantic core of the OPLang compiler: checks a parsed program and lowers
//! it to Jasmin-style class text.
//!
//! ## Architecture
//!
//! - **Registration**: build the frozen [`ClassTable`](oplang_registry::ClassTable)
//!   from every class declaration
//! - **Checking**: type every expression and validate every statement,
//!   failing at the first error
//! - **Code generation**: emit one [`ClassUnit`] per class
//!
//! ## Modules
//!
//! - [`checker`]: static checker
//! - [`codegen`]: code generator, per-routine [`Frame`](codegen::Frame) and loop labels
//! - [`context`]: checker state threaded through every check
//! - [`conversion`]: assignment compatibility and constructor resolution
//! - [`emit`]: instruction emitter and type descriptors
//! - [`operators`]: operator result typing
//! - [`options`]: compiler configuration
//! - [`passes`]: class table registration
//! - [`scope`]: lexical scopes for the checker

pub mod checker;
pub mod codegen;
pub mod context;
pub mod conversion;
pub mod emit;
pub mod operators;
pub mod options;
pub mod passes;
pub mod scope;

pub use checker::StaticChecker;
pub use codegen::{ClassUnit, CodeGenerator};
pub use conversion::{compatible, resolve_constructor};
pub use emit::JasminEmitter;
pub use options::CompileOptions;
pub use passes::ClassTableBuilder;

// Re-export CompilationError from core for convenience
pub use oplang_core::CompilationError;
