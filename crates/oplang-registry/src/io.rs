//! The built-in I/O surface.
//!
//! Programs reach it through the pre-bound `io` handle (`io.writeInt(5)`) or
//! the class name (`IO.writeInt(5)`). Every method is static. Several surface
//! names are aliases whose runtime target differs; [`IoBuiltin::target`]
//! carries the method the code generator actually invokes.

use oplang_core::{PrimitiveKind, Span, Type};

use crate::class_record::{ClassRecord, MethodInfo};

/// Name of the built-in class as seen by the checker.
pub const IO_CLASS: &str = "IO";

/// Name of the implicit program-scope binding for the I/O class.
pub const IO_BINDING: &str = "io";

/// Where a surface method is dispatched at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoTarget {
    /// A static method on the configured runtime I/O class.
    Runtime(&'static str),
    /// A static method on a fixed host class.
    Host {
        class: &'static str,
        method: &'static str,
    },
}

/// One method of the I/O surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoBuiltin {
    pub name: &'static str,
    pub params: &'static [PrimitiveKind],
    pub ret: PrimitiveKind,
    pub target: IoTarget,
}

impl IoBuiltin {
    pub fn param_types(&self) -> Vec<Type> {
        self.params.iter().copied().map(Type::Primitive).collect()
    }

    pub fn return_type(&self) -> Type {
        Type::Primitive(self.ret)
    }
}

const fn runtime(
    name: &'static str,
    params: &'static [PrimitiveKind],
    ret: PrimitiveKind,
    target: &'static str,
) -> IoBuiltin {
    IoBuiltin {
        name,
        params,
        ret,
        target: IoTarget::Runtime(target),
    }
}

const fn value_of(name: &'static str, params: &'static [PrimitiveKind]) -> IoBuiltin {
    IoBuiltin {
        name,
        params,
        ret: PrimitiveKind::String,
        target: IoTarget::Host {
            class: "java/lang/String",
            method: "valueOf",
        },
    }
}

use oplang_core::PrimitiveKind::{Bool, Float, Int, String as Str, Void};

pub static IO_BUILTINS: &[IoBuiltin] = &[
    runtime("writeInt", &[Int], Void, "writeInt"),
    runtime("writeFloat", &[Float], Void, "writeFloat"),
    runtime("writeBool", &[Bool], Void, "writeBool"),
    runtime("writeString", &[Str], Void, "writeStr"),
    runtime("writeStr", &[Str], Void, "writeStr"),
    runtime("writeIntLn", &[Int], Void, "writeIntLn"),
    runtime("writeFloatLn", &[Float], Void, "writeFloatLn"),
    runtime("writeBoolLn", &[Bool], Void, "writeBoolLn"),
    runtime("writeStringLn", &[Str], Void, "writeStrLn"),
    runtime("writeStrLn", &[Str], Void, "writeStrLn"),
    runtime("readInt", &[], Int, "readInt"),
    runtime("readFloat", &[], Float, "readFloat"),
    runtime("readBool", &[], Bool, "readBool"),
    runtime("readString", &[], Str, "readStr"),
    runtime("print", &[Str], Void, "writeStr"),
    runtime("println", &[Str], Void, "writeStrLn"),
    runtime("printInt", &[Int], Void, "writeInt"),
    runtime("printFloat", &[Float], Void, "writeFloat"),
    runtime("printBool", &[Bool], Void, "writeBool"),
    value_of("int2str", &[Int]),
    value_of("float2str", &[Float]),
    value_of("bool2str", &[Bool]),
];

/// Look up a surface method by name.
pub fn io_builtin(name: &str) -> Option<&'static IoBuiltin> {
    IO_BUILTINS.iter().find(|b| b.name == name)
}

/// Build the class record the checker sees for [`IO_CLASS`].
pub fn io_class_record() -> ClassRecord {
    let mut record = ClassRecord::new(IO_CLASS, None, Span::default());
    record.is_builtin = true;
    for builtin in IO_BUILTINS {
        record.methods.insert(
            builtin.name.to_string(),
            MethodInfo {
                name: builtin.name.to_string(),
                return_type: builtin.return_type(),
                params: builtin.param_types(),
                is_static: true,
                span: Span::default(),
            },
        );
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_share_targets() {
        assert_eq!(io_builtin("print").map(|b| b.target), Some(IoTarget::Runtime("writeStr")));
        assert_eq!(
            io_builtin("writeStringLn").map(|b| b.target),
            Some(IoTarget::Runtime("writeStrLn"))
        );
        assert!(matches!(
            io_builtin("bool2str").map(|b| b.target),
            Some(IoTarget::Host { method: "valueOf", .. })
        ));
        assert!(io_builtin("writeLine").is_none());
    }

    #[test]
    fn record_methods_are_static() {
        let record = io_class_record();
        assert!(record.is_builtin);
        assert_eq!(record.methods.len(), IO_BUILTINS.len());
        assert!(record.methods.values().all(|m| m.is_static));
        let read = &record.methods["readString"];
        assert!(read.return_type.is_string());
        assert!(read.params.is_empty());
    }
}
