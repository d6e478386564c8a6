//! Abstract syntax tree for OPLang programs.
//!
//! The tree is produced by an external parser and consumed by the class
//! table builder, the static checker and the code generator. Nodes own their
//! children; every node carries a [`Span`](oplang_core::Span).
//!
//! # Structure
//!
//! ```text
//! Program
//! └── ClassDecl*
//!     ├── AttributeDecl  (static/final, type, declarators with initializers)
//!     ├── MethodDecl     (static flag, return type, params, Block)
//!     ├── ConstructorDecl
//!     └── DestructorDecl
//! Block = VariableDecl* Stmt*
//! ```

pub mod build;
pub mod decl;
pub mod expr;
pub mod ops;
pub mod stmt;

pub use decl::{
    Attribute, AttributeDecl, ClassDecl, ClassMember, ConstructorDecl, DestructorDecl, MethodDecl,
    Param, Program,
};
pub use expr::{
    ArrayLiteral, BinaryExpr, Expr, Ident, Literal, LiteralKind, NewExpr, ParenExpr, PostfixExpr,
    PostfixOp, UnaryExpr,
};
pub use ops::{BinaryOp, ForDirection, UnaryOp};
pub use stmt::{
    AssignStmt, Block, ForStmt, IfStmt, InvokeStmt, Lhs, ReturnStmt, Stmt, Variable, VariableDecl,
};
