//! Expression lowering.
//!
//! Every `compile_*` method leaves exactly one value on the operand stack and
//! returns its type, with references stripped.
//!
//! Boolean results of comparisons are materialized through branches:
//!
//! ```text
//!     <left> <right>
//!     if_icmplt True
//!     iconst_0
//!     goto End
//! True:
//!     iconst_1
//! End:
//! ```

use oplang_ast::{
    ArrayLiteral, BinaryExpr, BinaryOp, Expr, LiteralKind, NewExpr, UnaryExpr, UnaryOp,
};
use oplang_core::{CompilationError, Type};

use super::routine::{Resolved, Result, RoutineCompiler};
use crate::conversion::resolve_constructor;
use crate::emit::Condition;
use crate::emit::descriptor::{STRING_CLASS, ValueKind, descriptor};
use crate::operators::binary_result;

/// Code of one operand compiled ahead of time, with its type.
pub(super) struct Captured {
    pub(super) code: String,
    pub(super) ty: Type,
}

impl RoutineCompiler<'_> {
    pub(super) fn compile_expr(&mut self, expr: &Expr) -> Result<Type> {
        match expr {
            Expr::Literal(lit) => match &lit.kind {
                LiteralKind::Int(v) => {
                    self.emitter.push_int(*v)?;
                    Ok(Type::INT)
                }
                LiteralKind::Float(v) => {
                    self.emitter.push_float(*v)?;
                    Ok(Type::FLOAT)
                }
                LiteralKind::Bool(v) => {
                    self.emitter.push_bool(*v)?;
                    Ok(Type::BOOL)
                }
                LiteralKind::String(s) => {
                    self.emitter.push_string(s)?;
                    Ok(Type::STRING)
                }
                LiteralKind::Nil => {
                    self.emitter.push_null()?;
                    Ok(Type::Nil)
                }
            },
            Expr::Ident(ident) => self.load_ident(ident),
            Expr::This(_) => {
                let this = self.this_type();
                self.emitter.load_local(&this, 0)?;
                Ok(this)
            }
            Expr::Binary(binary) => self.compile_binary(binary),
            Expr::Unary(unary) => self.compile_unary(unary),
            Expr::Postfix(chain) => self.compile_postfix(chain),
            Expr::ArrayLiteral(lit) => self.compile_array_literal(lit),
            Expr::New(new) => self.compile_new(new),
            Expr::Paren(paren) => self.compile_expr(&paren.expr),
        }
    }

    // ==========================================================================
    // Deferred operands
    // ==========================================================================

    /// Compile `expr` as if `above` more values were already on the stack,
    /// then cut its code out so it can be placed later with
    /// [`replay`](Self::replay).
    pub(super) fn capture(&mut self, expr: &Expr, above: i32) -> Result<Captured> {
        self.emitter.rewind(above)?;
        let mark = self.emitter.mark();
        let ty = self.compile_expr(expr)?;
        let code = self.emitter.take_from(mark);
        self.emitter.rewind(-(above + 1))?;
        Ok(Captured { code, ty })
    }

    /// Place captured code, optionally widening it to `target`.
    pub(super) fn replay(&mut self, captured: &Captured, target: Option<&Type>) -> Result<()> {
        self.emitter.append(&captured.code);
        self.emitter.rewind(1)?;
        if let Some(target) = target {
            self.widen(target, &captured.ty)?;
        }
        Ok(())
    }

    // ==========================================================================
    // Operators
    // ==========================================================================

    fn compile_binary(&mut self, binary: &BinaryExpr) -> Result<Type> {
        if binary.op.is_logical() {
            return self.compile_logical(binary);
        }

        let left = self.compile_expr(&binary.left)?;
        let right = self.capture(&binary.right, 0)?;
        let result = binary_result(binary.op, &left, &right.ty).ok_or_else(|| {
            CompilationError::internal(format!("untyped operands in `{}`", binary.op))
        })?;

        match binary.op {
            BinaryOp::Concat => {
                self.replay(&right, None)?;
                let ty = descriptor(&Type::STRING);
                self.emitter
                    .emit(format!("invokevirtual {STRING_CLASS}/concat({ty}){ty}"), -1)?;
                Ok(Type::STRING)
            }
            op if op.is_relational() || op.is_equality() => {
                self.compile_comparison(op, &left, &right)?;
                Ok(Type::BOOL)
            }
            BinaryOp::Div => {
                self.widen(&Type::FLOAT, &left)?;
                self.replay(&right, Some(&Type::FLOAT))?;
                self.emitter.arithmetic(BinaryOp::Div, ValueKind::Float)?;
                Ok(Type::FLOAT)
            }
            op => {
                let kind = ValueKind::of(&result);
                self.widen(&result, &left)?;
                self.replay(&right, Some(&result))?;
                self.emitter.arithmetic(op, kind)?;
                if op == BinaryOp::IntDiv && kind == ValueKind::Float {
                    // Truncate the quotient but keep the float result type.
                    self.emitter.float_to_int()?;
                    self.emitter.int_to_float()?;
                }
                Ok(result)
            }
        }
    }

    /// `&&` and `||` skip the right operand once the result is known.
    fn compile_logical(&mut self, binary: &BinaryExpr) -> Result<Type> {
        let short_label = self.emitter.frame_mut().new_label();
        let end_label = self.emitter.frame_mut().new_label();
        let (short_cond, short_value) = match binary.op {
            BinaryOp::And => (Condition::Eq, false),
            _ => (Condition::Ne, true),
        };

        self.compile_expr(&binary.left)?;
        self.emitter.if_zero_cmp(short_cond, short_label)?;
        self.compile_expr(&binary.right)?;
        self.emitter.goto(end_label)?;
        self.emitter.label(short_label);
        self.emitter.rewind(-1)?;
        self.emitter.push_bool(short_value)?;
        self.emitter.label(end_label);
        Ok(Type::BOOL)
    }

    /// Left is on the stack, right is captured.
    fn compile_comparison(&mut self, op: BinaryOp, left: &Type, right: &Captured) -> Result<()> {
        let cond = Condition::from_op(op)
            .ok_or_else(|| CompilationError::internal(format!("`{op}` is not a comparison")))?;
        let true_label = self.emitter.frame_mut().new_label();
        let end_label = self.emitter.frame_mut().new_label();

        let float = left.is_float() || right.ty.is_float();
        if float {
            self.widen(&Type::FLOAT, left)?;
            self.replay(right, Some(&Type::FLOAT))?;
            // NaN must make every comparison false.
            self.emitter
                .float_cmp(matches!(cond, Condition::Lt | Condition::Le))?;
            self.emitter.if_zero_cmp(cond, true_label)?;
        } else {
            self.replay(right, None)?;
            match ValueKind::of(left) {
                ValueKind::Reference => self.emitter.if_ref_cmp(cond, true_label)?,
                _ => self.emitter.if_int_cmp(cond, true_label)?,
            }
        }

        self.emitter.push_bool(false)?;
        self.emitter.goto(end_label)?;
        self.emitter.label(true_label);
        self.emitter.rewind(-1)?;
        self.emitter.push_bool(true)?;
        self.emitter.label(end_label);
        Ok(())
    }

    fn compile_unary(&mut self, unary: &UnaryExpr) -> Result<Type> {
        let ty = self.compile_expr(&unary.operand)?;
        match unary.op {
            UnaryOp::Plus => {}
            UnaryOp::Neg => self.emitter.negate(ValueKind::of(&ty))?,
            UnaryOp::Not => {
                self.emitter.push_bool(true)?;
                self.emitter.emit("ixor", -1)?;
            }
        }
        Ok(ty)
    }

    // ==========================================================================
    // Allocation
    // ==========================================================================

    /// `{a, b}` allocates the array, then stores each element:
    /// `dup; <index>; <element>; xastore`.
    fn compile_array_literal(&mut self, lit: &ArrayLiteral) -> Result<Type> {
        let elements = lit
            .elements
            .iter()
            .map(|elem| self.capture(elem, 3))
            .collect::<Result<Vec<_>>>()?;
        let element_ty = elements.first().map_or(Type::VOID, |e| e.ty.clone());

        self.emitter.new_array(&element_ty, elements.len() as u32)?;
        for (index, elem) in elements.iter().enumerate() {
            self.emitter.dup()?;
            self.emitter.push_int(index as i64)?;
            self.replay(elem, Some(&element_ty))?;
            self.emitter.array_store(&element_ty)?;
        }
        Ok(Type::array(element_ty, elements.len() as u32))
    }

    /// `new C(args)`: `new C; dup; <args>; invokespecial C/<init>(...)V`.
    fn compile_new(&mut self, new: &NewExpr) -> Result<Type> {
        let args = new
            .args
            .iter()
            .enumerate()
            .map(|(i, arg)| self.capture(arg, 2 + i as i32))
            .collect::<Result<Vec<_>>>()?;
        let arg_types: Vec<Type> = args.iter().map(|a| a.ty.clone()).collect();
        let ctor = resolve_constructor(self.table, &new.class_name, &arg_types);
        let params = match ctor {
            Some(ctor) => ctor.signature.types().to_vec(),
            None if arg_types.is_empty() => Vec::new(),
            None => {
                return Err(CompilationError::internal(format!(
                    "no constructor of {} accepts {} arguments",
                    new.class_name,
                    arg_types.len()
                )));
            }
        };

        self.emitter.new_object(&new.class_name)?;
        self.emitter.dup()?;
        for (arg, param) in args.iter().zip(&params) {
            self.replay(arg, Some(param))?;
        }
        self.emitter
            .invoke_special(&format!("{}/<init>", new.class_name), &params)?;
        Ok(Type::class(new.class_name.clone()))
    }

    pub(super) fn resolves_to_class(&self, expr: &Expr) -> Option<String> {
        match expr.unparenthesized() {
            Expr::Ident(ident) => match self.resolve(&ident.name) {
                Ok(Resolved::Class(name)) => Some(name.to_string()),
                _ => None,
            },
            _ => None,
        }
    }
}
