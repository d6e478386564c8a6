//! Jasmin-style instruction emitter.
//!
//! The [`JasminEmitter`] writes the text of one routine and owns its
//! [`Frame`]. Every instruction goes through [`JasminEmitter::emit`] with its
//! net operand stack effect, so the frame's depth is always in step with the
//! text and can never go negative.
//!
//! # Example
//!
//! ```
//! use oplang_compiler::codegen::Frame;
//! use oplang_compiler::emit::JasminEmitter;
//! use oplang_core::Type;
//!
//! let mut emitter = JasminEmitter::new(Frame::new("answer", Type::INT, true));
//! emitter.push_int(40).unwrap();
//! emitter.push_int(2).unwrap();
//! emitter.emit("iadd", -1).unwrap();
//! emitter.return_value(&Type::INT).unwrap();
//!
//! let text = emitter.end_method();
//! assert!(text.contains("\tbipush 40\n\ticonst_2\n\tiadd\n\tireturn\n"));
//! assert!(text.contains(".limit stack 2"));
//! ```

pub mod descriptor;

use std::fmt::{Display, Write};

use oplang_ast::BinaryOp;
use oplang_core::{CompilationError, Type};

use crate::codegen::frame::{BlockLabels, Frame, Label};
use descriptor::{
    ValueKind, array_prefix, descriptor, method_descriptor, new_array_instruction, quote,
};

type Result<T> = std::result::Result<T, CompilationError>;

/// Branch condition suffix shared by `if<cond>` and `if_icmp<cond>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Condition {
    /// Condition tested by a relational or equality operator.
    pub fn from_op(op: BinaryOp) -> Option<Self> {
        Some(match op {
            BinaryOp::Equal => Condition::Eq,
            BinaryOp::NotEqual => Condition::Ne,
            BinaryOp::Less => Condition::Lt,
            BinaryOp::LessEqual => Condition::Le,
            BinaryOp::Greater => Condition::Gt,
            BinaryOp::GreaterEqual => Condition::Ge,
            _ => return None,
        })
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Condition::Eq => "eq",
            Condition::Ne => "ne",
            Condition::Lt => "lt",
            Condition::Le => "le",
            Condition::Gt => "gt",
            Condition::Ge => "ge",
        }
    }
}

/// Writes the instruction text of one routine.
#[derive(Debug)]
pub struct JasminEmitter {
    code: String,
    frame: Frame,
}

impl JasminEmitter {
    pub fn new(frame: Frame) -> Self {
        Self {
            code: String::new(),
            frame,
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    /// Emit one instruction and apply its stack effect.
    pub fn emit(&mut self, instruction: impl Display, delta: i32) -> Result<()> {
        self.frame.adjust(delta)?;
        let _ = writeln!(self.code, "\t{instruction}");
        Ok(())
    }

    /// Emit a directive line, which has no stack effect.
    pub fn directive(&mut self, text: impl Display) {
        let _ = writeln!(self.code, "{text}");
    }

    pub fn label(&mut self, label: Label) {
        let _ = writeln!(self.code, "{label}:");
    }

    /// Record the operand depth at a join point reached only by a jump.
    pub fn rewind(&mut self, delta: i32) -> Result<()> {
        self.frame.adjust(delta)
    }

    /// Current length of the text, for [`take_from`](Self::take_from).
    pub fn mark(&self) -> usize {
        self.code.len()
    }

    /// Remove and return everything written since `mark`.
    pub fn take_from(&mut self, mark: usize) -> String {
        self.code.split_off(mark)
    }

    /// Re-insert text previously taken with [`take_from`](Self::take_from).
    pub fn append(&mut self, text: &str) {
        self.code.push_str(text);
    }

    // ==========================================================================
    // Constants
    // ==========================================================================

    pub fn push_int(&mut self, value: i64) -> Result<()> {
        match value {
            -1 => self.emit("iconst_m1", 1),
            0..=5 => self.emit(format!("iconst_{value}"), 1),
            -128..=127 => self.emit(format!("bipush {value}"), 1),
            -32768..=32767 => self.emit(format!("sipush {value}"), 1),
            _ => self.emit(format!("ldc {value}"), 1),
        }
    }

    pub fn push_float(&mut self, value: f64) -> Result<()> {
        if value == 0.0 && value.is_sign_positive() {
            self.emit("fconst_0", 1)
        } else if value == 1.0 {
            self.emit("fconst_1", 1)
        } else if value == 2.0 {
            self.emit("fconst_2", 1)
        } else {
            self.emit(format!("ldc {:?}", value as f32), 1)
        }
    }

    pub fn push_bool(&mut self, value: bool) -> Result<()> {
        self.emit(if value { "iconst_1" } else { "iconst_0" }, 1)
    }

    pub fn push_string(&mut self, value: &str) -> Result<()> {
        self.emit(format!("ldc {}", quote(value)), 1)
    }

    pub fn push_null(&mut self) -> Result<()> {
        self.emit("aconst_null", 1)
    }

    /// Zero value of a type: `0`, `0.0`, `false` or `null`.
    pub fn push_default(&mut self, ty: &Type) -> Result<()> {
        match ValueKind::of(ty) {
            ValueKind::Int => self.emit("iconst_0", 1),
            ValueKind::Float => self.emit("fconst_0", 1),
            ValueKind::Reference => self.push_null(),
        }
    }

    // ==========================================================================
    // Locals
    // ==========================================================================

    pub fn load_local(&mut self, ty: &Type, slot: u16) -> Result<()> {
        self.local_op(ty, "load", slot, 1)
    }

    pub fn store_local(&mut self, ty: &Type, slot: u16) -> Result<()> {
        self.local_op(ty, "store", slot, -1)
    }

    fn local_op(&mut self, ty: &Type, op: &str, slot: u16, delta: i32) -> Result<()> {
        let prefix = ValueKind::of(ty).prefix();
        if slot <= 3 {
            self.emit(format!("{prefix}{op}_{slot}"), delta)
        } else {
            self.emit(format!("{prefix}{op} {slot}"), delta)
        }
    }

    /// `.var` debug entry for a local slot.
    pub fn var_directive(&mut self, slot: u16, name: &str, ty: &Type, range: BlockLabels) {
        self.directive(format!(
            ".var {slot} is {name} {} from {} to {}",
            descriptor(ty),
            range.start,
            range.end
        ));
    }

    // ==========================================================================
    // Fields
    // ==========================================================================

    pub fn get_field(&mut self, host: &str, name: &str, ty: &Type) -> Result<()> {
        self.emit(format!("getfield {host}/{name} {}", descriptor(ty)), 0)
    }

    pub fn put_field(&mut self, host: &str, name: &str, ty: &Type) -> Result<()> {
        self.emit(format!("putfield {host}/{name} {}", descriptor(ty)), -2)
    }

    pub fn get_static(&mut self, host: &str, name: &str, ty: &Type) -> Result<()> {
        self.emit(format!("getstatic {host}/{name} {}", descriptor(ty)), 1)
    }

    pub fn put_static(&mut self, host: &str, name: &str, ty: &Type) -> Result<()> {
        self.emit(format!("putstatic {host}/{name} {}", descriptor(ty)), -1)
    }

    // ==========================================================================
    // Calls and objects
    // ==========================================================================

    pub fn invoke_static(&mut self, target: &str, params: &[Type], ret: &Type) -> Result<()> {
        let delta = returned(ret) - params.len() as i32;
        self.emit(
            format!("invokestatic {target}{}", method_descriptor(params, ret)),
            delta,
        )
    }

    pub fn invoke_virtual(&mut self, target: &str, params: &[Type], ret: &Type) -> Result<()> {
        let delta = returned(ret) - params.len() as i32 - 1;
        self.emit(
            format!("invokevirtual {target}{}", method_descriptor(params, ret)),
            delta,
        )
    }

    /// Constructor call; consumes the receiver and the arguments.
    pub fn invoke_special(&mut self, target: &str, params: &[Type]) -> Result<()> {
        let delta = -(params.len() as i32) - 1;
        self.emit(
            format!("invokespecial {target}{}", method_descriptor(params, &Type::VOID)),
            delta,
        )
    }

    pub fn new_object(&mut self, class: &str) -> Result<()> {
        self.emit(format!("new {class}"), 1)
    }

    pub fn dup(&mut self) -> Result<()> {
        self.emit("dup", 1)
    }

    pub fn pop(&mut self) -> Result<()> {
        self.emit("pop", -1)
    }

    // ==========================================================================
    // Arrays
    // ==========================================================================

    /// Allocate a fixed-size array of `element`.
    pub fn new_array(&mut self, element: &Type, size: u32) -> Result<()> {
        self.push_int(i64::from(size))?;
        self.emit(new_array_instruction(element), 0)
    }

    pub fn array_load(&mut self, element: &Type) -> Result<()> {
        self.emit(format!("{}aload", array_prefix(element)), -1)
    }

    pub fn array_store(&mut self, element: &Type) -> Result<()> {
        self.emit(format!("{}astore", array_prefix(element)), -3)
    }

    // ==========================================================================
    // Arithmetic
    // ==========================================================================

    /// Binary arithmetic on two operands of the same kind.
    pub fn arithmetic(&mut self, op: BinaryOp, kind: ValueKind) -> Result<()> {
        let name = match op {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div | BinaryOp::IntDiv => "div",
            BinaryOp::Mod => "rem",
            other => {
                return Err(CompilationError::internal(format!(
                    "`{other}` is not an arithmetic operator"
                )));
            }
        };
        self.emit(format!("{}{name}", kind.prefix()), -1)
    }

    pub fn negate(&mut self, kind: ValueKind) -> Result<()> {
        self.emit(format!("{}neg", kind.prefix()), 0)
    }

    pub fn int_to_float(&mut self) -> Result<()> {
        self.emit("i2f", 0)
    }

    pub fn float_to_int(&mut self) -> Result<()> {
        self.emit("f2i", 0)
    }

    // ==========================================================================
    // Jumps
    // ==========================================================================

    pub fn goto(&mut self, label: Label) -> Result<()> {
        self.emit(format!("goto {label}"), 0)
    }

    /// Branch when the int on top of the stack is zero.
    pub fn if_false(&mut self, label: Label) -> Result<()> {
        self.emit(format!("ifeq {label}"), -1)
    }

    /// Compare the int on top of the stack against zero.
    pub fn if_zero_cmp(&mut self, cond: Condition, label: Label) -> Result<()> {
        self.emit(format!("if{} {label}", cond.suffix()), -1)
    }

    /// Compare the top two ints.
    pub fn if_int_cmp(&mut self, cond: Condition, label: Label) -> Result<()> {
        self.emit(format!("if_icmp{} {label}", cond.suffix()), -2)
    }

    /// Compare the top two references for identity.
    pub fn if_ref_cmp(&mut self, cond: Condition, label: Label) -> Result<()> {
        self.emit(format!("if_acmp{} {label}", cond.suffix()), -2)
    }

    /// Compare the top two floats, leaving -1, 0 or 1. `nan_is_greater`
    /// selects `fcmpg` over `fcmpl`.
    pub fn float_cmp(&mut self, nan_is_greater: bool) -> Result<()> {
        self.emit(if nan_is_greater { "fcmpg" } else { "fcmpl" }, -1)
    }

    // ==========================================================================
    // Returns
    // ==========================================================================

    pub fn return_value(&mut self, ty: &Type) -> Result<()> {
        self.emit(format!("{}return", ValueKind::of(ty).prefix()), -1)
    }

    pub fn return_void(&mut self) -> Result<()> {
        self.emit("return", 0)
    }

    /// Finish the routine with its limits and the end marker.
    pub fn end_method(mut self) -> String {
        let _ = writeln!(self.code, ".limit stack {}", self.frame.max_stack());
        let _ = writeln!(self.code, ".limit locals {}", self.frame.max_locals());
        self.code.push_str(".end method\n");
        self.code
    }
}

fn returned(ret: &Type) -> i32 {
    if ret.is_void() { 0 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emitter() -> JasminEmitter {
        JasminEmitter::new(Frame::new("test", Type::VOID, true))
    }

    #[test]
    fn int_constant_forms() {
        let mut e = emitter();
        for v in [-1, 3, 100, 1000, 100_000] {
            e.push_int(v).unwrap();
        }
        let text = e.end_method();
        assert!(text.contains(
            "\ticonst_m1\n\ticonst_3\n\tbipush 100\n\tsipush 1000\n\tldc 100000\n"
        ));
        assert!(text.contains(".limit stack 5"));
    }

    #[test]
    fn float_constants_keep_a_decimal_point() {
        let mut e = emitter();
        e.push_float(1.0).unwrap();
        e.push_float(2.5).unwrap();
        e.push_float(3.0).unwrap();
        let text = e.end_method();
        assert!(text.contains("\tfconst_1\n\tldc 2.5\n\tldc 3.0\n"));
    }

    #[test]
    fn short_local_forms() {
        let mut e = emitter();
        e.push_int(1).unwrap();
        e.store_local(&Type::INT, 2).unwrap();
        e.load_local(&Type::class("A"), 7).unwrap();
        e.pop().unwrap();
        let text = e.end_method();
        assert!(text.contains("\tistore_2\n\taload 7\n\tpop\n"));
    }

    #[test]
    fn call_stack_effects() {
        let mut e = emitter();
        e.new_object("Point").unwrap();
        e.dup().unwrap();
        e.push_float(1.0).unwrap();
        e.invoke_special("Point/<init>", &[Type::FLOAT]).unwrap();
        assert_eq!(e.frame().stack_depth(), 1);
        e.invoke_virtual("Point/norm", &[], &Type::FLOAT).unwrap();
        assert_eq!(e.frame().stack_depth(), 1);
        e.invoke_static("io/writeFloat", &[Type::FLOAT], &Type::VOID).unwrap();
        assert_eq!(e.frame().stack_depth(), 0);

        let text = e.end_method();
        assert!(text.contains("invokespecial Point/<init>(F)V"));
        assert!(text.contains("invokestatic io/writeFloat(F)V"));
        assert!(text.contains(".limit stack 3"));
    }

    #[test]
    fn underflow_is_internal_error() {
        let mut e = emitter();
        let err = e.pop().unwrap_err();
        assert!(matches!(err, CompilationError::Internal { .. }));
    }

    #[test]
    fn take_and_append() {
        let mut e = emitter();
        let mark = e.mark();
        e.push_int(4).unwrap();
        let taken = e.take_from(mark);
        assert_eq!(taken, "\ticonst_4\n");
        e.append(&taken);
        e.int_to_float().unwrap();
        let text = e.end_method();
        assert!(text.starts_with("\ticonst_4\n\ti2f\n"));
    }

    #[test]
    fn arithmetic_names() {
        let mut e = emitter();
        e.push_int(7).unwrap();
        e.push_int(2).unwrap();
        e.arithmetic(BinaryOp::Mod, ValueKind::Int).unwrap();
        assert!(e.arithmetic(BinaryOp::And, ValueKind::Int).is_err());
        let text = e.end_method();
        assert!(text.contains("\tirem\n"));
    }

    #[test]
    fn conditions() {
        assert_eq!(Condition::from_op(BinaryOp::LessEqual), Some(Condition::Le));
        assert_eq!(Condition::from_op(BinaryOp::Add), None);
        assert_eq!(Condition::Ne.suffix(), "ne");
    }
}
