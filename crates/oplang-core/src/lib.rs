//! Core types shared by the OPLang compiler crates.
//!
//! - [`Span`]: source positions carried by nodes and errors
//! - [`Type`], [`PrimitiveKind`], [`Modifiers`]: the type model
//! - [`CompilationError`]: the diagnostic taxonomy

mod data_type;
mod error;
mod span;

pub use data_type::{Modifiers, PrimitiveKind, Type};
pub use error::{CompilationError, DeclKind, UndeclaredKind};
pub use span::Span;
