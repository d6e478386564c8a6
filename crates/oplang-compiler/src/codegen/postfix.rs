//! Postfix chain lowering: `.member`, `[index]` and `.method(args)`.
//!
//! A chain starting at a class name (`Shape.count`, `IO.writeInt(1)`) or the
//! `io` handle pushes nothing for its base. Static members reached through a
//! value pop the value first.

use oplang_ast::{Expr, PostfixExpr, PostfixOp};
use oplang_core::{CompilationError, Type};
use oplang_registry::{IO_CLASS, IoTarget, io_builtin};

use super::routine::{Place, Resolved, Result, RoutineCompiler};

/// What the chain has produced so far.
#[derive(Debug, Clone)]
enum Operand {
    /// Static access through a class name; nothing on the stack.
    Class(String),
    /// A value on top of the stack.
    Value(Type),
}

impl RoutineCompiler<'_> {
    /// Push the value of a chain and return its type. A call to a `void`
    /// method pushes nothing.
    pub(super) fn compile_postfix(&mut self, chain: &PostfixExpr) -> Result<Type> {
        let mut operand = self.chain_base(&chain.base)?;
        for op in &chain.ops {
            operand = self.apply(operand, op)?;
        }
        match operand {
            Operand::Value(ty) => Ok(ty),
            Operand::Class(name) => Err(CompilationError::internal(format!(
                "class `{name}` used as a value"
            ))),
        }
    }

    /// Evaluate everything but the last step and return the place the last
    /// step names.
    pub(super) fn chain_place(&mut self, chain: &PostfixExpr) -> Result<Place> {
        let Some((last, init)) = chain.ops.split_last() else {
            return Err(CompilationError::internal(format!("`{chain}` is not assignable")));
        };
        let mut operand = self.chain_base(&chain.base)?;
        for op in init {
            operand = self.apply(operand, op)?;
        }

        match (operand, last) {
            (operand, PostfixOp::Member { name, .. }) => {
                let class = self.accessed_class(&operand)?;
                let table = self.table;
                let attr = table.lookup_attribute(&class, name).ok_or_else(|| {
                    CompilationError::internal(format!("unresolved attribute {class}.{name}"))
                })?;
                let (host, name, ty) = (
                    attr.host_name().to_string(),
                    attr.info.name.clone(),
                    attr.info.ty.clone(),
                );
                if attr.info.is_static() {
                    if matches!(operand, Operand::Value(_)) {
                        self.emitter.pop()?;
                    }
                    Ok(Place::Static { host, name, ty })
                } else {
                    Ok(Place::Field { host, name, ty })
                }
            }
            (Operand::Value(array), PostfixOp::Index { index, .. }) => {
                let element = self.element_of(&array)?;
                self.compile_expr(index)?;
                Ok(Place::Element { ty: element })
            }
            _ => Err(CompilationError::internal(format!("`{chain}` is not assignable"))),
        }
    }

    fn chain_base(&mut self, base: &Expr) -> Result<Operand> {
        if let Some(class) = self.resolves_to_class(base) {
            return Ok(Operand::Class(class));
        }
        if let Expr::Ident(ident) = base.unparenthesized() {
            if let Resolved::Io = self.resolve(&ident.name)? {
                return Ok(Operand::Class(IO_CLASS.to_string()));
            }
        }
        Ok(Operand::Value(self.compile_expr(base)?))
    }

    fn apply(&mut self, operand: Operand, op: &PostfixOp) -> Result<Operand> {
        match op {
            PostfixOp::Member { name, .. } => {
                let class = self.accessed_class(&operand)?;
                let table = self.table;
                let attr = table.lookup_attribute(&class, name).ok_or_else(|| {
                    CompilationError::internal(format!("unresolved attribute {class}.{name}"))
                })?;
                let info = attr.info;
                if info.is_static() {
                    if matches!(operand, Operand::Value(_)) {
                        self.emitter.pop()?;
                    }
                    self.emitter.get_static(attr.host_name(), &info.name, &info.ty)?;
                } else {
                    self.emitter.get_field(attr.host_name(), &info.name, &info.ty)?;
                }
                Ok(Operand::Value(info.ty.dereferenced().clone()))
            }
            PostfixOp::Index { index, .. } => {
                let Operand::Value(array) = operand else {
                    return Err(CompilationError::internal("indexing a class name"));
                };
                let element = self.element_of(&array)?;
                self.compile_expr(index)?;
                self.emitter.array_load(&element)?;
                Ok(Operand::Value(element))
            }
            PostfixOp::Call { name, args, .. } => self.call(operand, name, args),
        }
    }

    fn call(&mut self, operand: Operand, name: &str, args: &[Expr]) -> Result<Operand> {
        let class = self.accessed_class(&operand)?;
        let through_value = matches!(operand, Operand::Value(_));
        let table = self.table;

        if table.is_builtin(&class) {
            if through_value {
                self.emitter.pop()?;
            }
            return self.call_io(name, args);
        }

        let method = table.lookup_method(&class, name).ok_or_else(|| {
            CompilationError::internal(format!("unresolved method {class}.{name}"))
        })?;
        let info = method.info;
        let host = method.host_name();

        if info.is_static && through_value {
            self.emitter.pop()?;
        }
        self.compile_args(args, &info.params)?;
        if info.is_static {
            self.emitter
                .invoke_static(&format!("{host}/{name}"), &info.params, &info.return_type)?;
        } else {
            self.emitter
                .invoke_virtual(&format!("{class}/{name}"), &info.params, &info.return_type)?;
        }
        Ok(Operand::Value(info.return_type.dereferenced().clone()))
    }

    fn call_io(&mut self, name: &str, args: &[Expr]) -> Result<Operand> {
        let builtin = io_builtin(name)
            .ok_or_else(|| CompilationError::internal(format!("unknown I/O method {name}")))?;
        let params = builtin.param_types();
        let ret = builtin.return_type();
        self.compile_args(args, &params)?;
        let target = match builtin.target {
            IoTarget::Runtime(method) => format!("{}/{method}", self.options.io_runtime_class),
            IoTarget::Host { class, method } => format!("{class}/{method}"),
        };
        self.emitter.invoke_static(&target, &params, &ret)?;
        Ok(Operand::Value(ret))
    }

    fn compile_args(&mut self, args: &[Expr], params: &[Type]) -> Result<()> {
        if args.len() != params.len() {
            return Err(CompilationError::internal(format!(
                "expected {} arguments, found {}",
                params.len(),
                args.len()
            )));
        }
        for (arg, param) in args.iter().zip(params) {
            let actual = self.compile_expr(arg)?;
            self.widen(param, &actual)?;
        }
        Ok(())
    }

    /// Class whose members the next step reaches.
    fn accessed_class(&self, operand: &Operand) -> Result<String> {
        match operand {
            Operand::Class(name) => Ok(name.clone()),
            Operand::Value(ty) => ty
                .dereferenced()
                .class_name()
                .map(str::to_string)
                .ok_or_else(|| CompilationError::internal(format!("member access on `{ty}`"))),
        }
    }

    fn element_of(&self, array: &Type) -> Result<Type> {
        array
            .dereferenced()
            .element()
            .cloned()
            .ok_or_else(|| CompilationError::internal(format!("indexing `{array}`")))
    }
}
