//! Output sinks for the formatter.

/// Spaces per nesting level in script layout.
pub const INDENT_WIDTH: usize = 2;

/// Where formatted source goes.
///
/// Only [`emit`](Emitter::emit) is required; the layout helpers are written
/// in terms of it.
pub trait Emitter {
    fn emit(&mut self, text: &str);

    /// Statement separator in script layout.
    fn emit_newline(&mut self) {
        self.emit("\n");
    }

    /// Leading indentation for a script statement `level` blocks deep.
    fn emit_indent(&mut self, level: usize) {
        for _ in 0..level {
            self.emit(&" ".repeat(INDENT_WIDTH));
        }
    }

    fn emit_space(&mut self) {
        self.emit(" ");
    }
}

/// Collects formatted source into a `String`.
#[derive(Default)]
pub struct StringEmitter {
    buffer: String,
}

impl StringEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sized for output about as long as the source it came from.
    pub fn with_capacity(capacity: usize) -> Self {
        StringEmitter {
            buffer: String::with_capacity(capacity),
        }
    }

    pub fn output(self) -> String {
        self.buffer
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

impl Emitter for StringEmitter {
    fn emit(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn emit_indent(&mut self, level: usize) {
        self.buffer.push_str(&" ".repeat(level * INDENT_WIDTH));
    }
}
