//! Shared program-building harness for the integration tests.

#![allow(dead_code)]

use oplang::ast::{Block, ClassDecl, Expr, MethodDecl, Program, Stmt, VariableDecl};
use oplang::{ClassUnit, CompilationError, CompileOptions, Compiler};

/// `class Main { static void main() { decls stmts } }`
pub fn main_class(decls: Vec<VariableDecl>, stmts: Vec<Stmt>) -> ClassDecl {
    ClassDecl::new("Main", None).with_method(MethodDecl::main(Block::new(decls, stmts)))
}

/// `io.<method>(args);`
pub fn io_call(method: &str, args: Vec<Expr>) -> Stmt {
    Stmt::invoke(Expr::call(Expr::ident("io"), method, args))
}

pub fn compile(classes: Vec<ClassDecl>) -> Result<Vec<ClassUnit>, CompilationError> {
    Compiler::new(CompileOptions::default()).compile(&Program::new(classes))
}

/// Compile a program expected to be valid.
pub fn compile_ok(classes: Vec<ClassDecl>) -> Vec<ClassUnit> {
    compile(classes).unwrap_or_else(|e| panic!("compilation failed: {e}"))
}

/// Compile a program expected to be rejected.
pub fn compile_err(classes: Vec<ClassDecl>) -> CompilationError {
    match compile(classes) {
        Ok(_) => panic!("compilation unexpectedly succeeded"),
        Err(e) => e,
    }
}

pub fn unit<'u>(units: &'u [ClassUnit], class: &str) -> &'u str {
    &units
        .iter()
        .find(|u| u.class_name == class)
        .unwrap_or_else(|| panic!("no unit for {class}"))
        .text
}

/// Body of one `.method` in a unit, from its directive to `.end method`.
pub fn routine<'u>(text: &'u str, header: &str) -> &'u str {
    let directive = format!(".method {header}\n");
    let start = text
        .find(&directive)
        .unwrap_or_else(|| panic!("no routine `{header}` in\n{text}"));
    let end = text[start..]
        .find(".end method")
        .map(|i| start + i)
        .unwrap_or(text.len());
    &text[start..end]
}
