//! Compiler passes.
//!
//! - [`registration`]: build the frozen class table
//!
//! Checking and code generation live in [`crate::checker`] and
//! [`crate::codegen`].

pub mod registration;

pub use registration::ClassTableBuilder;
