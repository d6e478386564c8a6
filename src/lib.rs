//! OPLang
//!
//! Compiles parsed OPLang programs to Jasmin-style class text, one unit per
//! class.
//!
//! ```
//! use oplang::ast::{Block, ClassDecl, Expr, MethodDecl, Program, Stmt};
//! use oplang::{CompileOptions, Compiler};
//!
//! let main = ClassDecl::new("Main", None).with_method(MethodDecl::main(Block::of(vec![
//!     Stmt::invoke(Expr::call(Expr::ident("io"), "writeIntLn", vec![Expr::int(42)])),
//! ])));
//! let program = Program::new(vec![main]);
//!
//! let units = Compiler::new(CompileOptions::default()).compile(&program).unwrap();
//! assert_eq!(units[0].file_name, "Main.j");
//! assert!(units[0].text.contains("invokestatic io/writeIntLn(I)V"));
//! ```

mod error;

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

pub use error::{BuildError, Result as BuildResult};
pub use oplang_ast as ast;
pub use oplang_compiler::{
    ClassTableBuilder, ClassUnit, CodeGenerator, CompileOptions, StaticChecker,
};
pub use oplang_core::{CompilationError, Modifiers, Span, Type};
pub use oplang_registry::ClassTable;

use ast::Program;

type Result<T> = std::result::Result<T, CompilationError>;

/// Runs registration, checking and code generation over a program.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Build the class table and check the program against it.
    pub fn check(&self, program: &Program) -> Result<ClassTable> {
        let table = ClassTableBuilder::new().build(program)?;
        info!("registered {} classes", table.len());
        StaticChecker::new(&table, &self.options).check(program)?;
        info!("checked {} classes", program.classes.len());
        Ok(table)
    }

    /// Check the program, then generate one unit per class.
    pub fn compile(&self, program: &Program) -> Result<Vec<ClassUnit>> {
        let table = self.check(program)?;
        let units = CodeGenerator::new(&table, &self.options).generate(program)?;
        info!("generated {} units", units.len());
        Ok(units)
    }

    /// Compile and write each unit to `dir`, returning the written paths.
    pub fn compile_to_dir(&self, program: &Program, dir: &Path) -> BuildResult<Vec<PathBuf>> {
        let units = self.compile(program)?;
        fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(units.len());
        for unit in &units {
            let path = dir.join(&unit.file_name);
            fs::write(&path, &unit.text).map_err(|source| BuildError::Write {
                path: path.clone(),
                source,
            })?;
            written.push(path);
        }
        info!("wrote {} units to {}", written.len(), dir.display());
        Ok(written)
    }
}
