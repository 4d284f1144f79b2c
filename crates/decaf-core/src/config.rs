//! Compiler configuration.
//!
//! All layout constants (slot size, segment bases, object header) and label
//! naming live here so nothing downstream hard-codes them.

/// Byte-level layout of the target machine model.
///
/// Offsets are signed: locals grow downward from `local_base` while
/// parameters sit above the frame pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetLayout {
    /// Size of every variable slot (int, double, bool, string and references).
    pub word_size: i32,
    /// Offset of the first global variable.
    pub global_base: i32,
    /// Frame-relative offset of the first parameter.
    pub param_base: i32,
    /// Frame-relative offset of the first local or temporary.
    pub local_base: i32,
    /// Offset of the first field within an object; the vtable pointer occupies 0.
    pub field_base: i32,
    /// Byte offset of slot 0 within a vtable.
    pub method_base: i32,
}

impl Default for TargetLayout {
    fn default() -> Self {
        Self {
            word_size: 4,
            global_base: 0,
            param_base: 4,
            local_base: -8,
            field_base: 4,
            method_base: 0,
        }
    }
}

impl TargetLayout {
    /// Byte offset of vtable slot `slot`.
    #[inline]
    pub fn method_offset(&self, slot: usize) -> i32 {
        self.method_base + slot as i32 * self.word_size
    }
}

/// Options for one compiler instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    pub layout: TargetLayout,
    /// Name of the program entry function, emitted without a label prefix.
    pub entry_point: String,
    /// Prefix for function and method labels.
    pub label_prefix: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            layout: TargetLayout::default(),
            entry_point: "main".to_string(),
            label_prefix: "_".to_string(),
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, layout: TargetLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_word_size(mut self, word_size: i32) -> Self {
        self.layout.word_size = word_size;
        self
    }

    pub fn with_field_base(mut self, field_base: i32) -> Self {
        self.layout.field_base = field_base;
        self
    }

    pub fn with_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = name.into();
        self
    }

    pub fn with_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.label_prefix = prefix.into();
        self
    }

    /// Label of a free function.
    pub fn function_label(&self, name: &str) -> String {
        if name == self.entry_point {
            name.to_string()
        } else {
            format!("{}{}", self.label_prefix, name)
        }
    }

    /// Label of a method of `class`.
    pub fn method_label(&self, class: &str, method: &str) -> String {
        format!("{}{}.{}", self.label_prefix, class, method)
    }
}
