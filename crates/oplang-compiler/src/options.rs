//! Compiler configuration.

/// Options shared by every pass.
///
/// ```
/// use oplang_compiler::CompileOptions;
///
/// let options = CompileOptions::default().with_require_entry_point(false);
/// assert!(!options.require_entry_point);
/// assert_eq!(options.default_superclass, "java/lang/Object");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Fail with `NoEntryPoint` when no class declares `static void main()`.
    pub require_entry_point: bool,
    /// Superclass written for classes that declare none.
    pub default_superclass: String,
    /// Runtime class hosting the I/O primitives.
    pub io_runtime_class: String,
    /// Extension named in each unit's `.source` directive.
    pub source_extension: String,
    /// File extension of emitted units.
    pub unit_extension: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            require_entry_point: true,
            default_superclass: "java/lang/Object".to_string(),
            io_runtime_class: "io".to_string(),
            source_extension: "java".to_string(),
            unit_extension: "j".to_string(),
        }
    }
}

impl CompileOptions {
    pub fn with_require_entry_point(mut self, require: bool) -> Self {
        self.require_entry_point = require;
        self
    }

    pub fn with_default_superclass(mut self, class: impl Into<String>) -> Self {
        self.default_superclass = class.into();
        self
    }

    pub fn with_io_runtime_class(mut self, class: impl Into<String>) -> Self {
        self.io_runtime_class = class.into();
        self
    }

    pub fn with_source_extension(mut self, ext: impl Into<String>) -> Self {
        self.source_extension = ext.into();
        self
    }

    pub fn with_unit_extension(mut self, ext: impl Into<String>) -> Self {
        self.unit_extension = ext.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_defaults() {
        let options = CompileOptions::default()
            .with_default_superclass("base/Root")
            .with_io_runtime_class("rt/IO")
            .with_unit_extension("jasm");
        assert_eq!(options.default_superclass, "base/Root");
        assert_eq!(options.io_runtime_class, "rt/IO");
        assert_eq!(options.unit_extension, "jasm");
        assert_eq!(options.source_extension, "java");
        assert!(options.require_entry_point);
    }
}
