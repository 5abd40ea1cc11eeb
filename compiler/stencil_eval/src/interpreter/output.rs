//! Output sink with a capture stack.

/// The bottom buffer is the render result; `capture` blocks and function
/// bodies push their own buffer on top.
pub(super) struct Output {
    stack: Vec<String>,
}

impl Output {
    pub(super) fn new() -> Self {
        Output {
            stack: vec![String::new()],
        }
    }

    pub(super) fn write(&mut self, text: &str) {
        if let Some(buffer) = self.stack.last_mut() {
            buffer.push_str(text);
        }
    }

    pub(super) fn begin_capture(&mut self) {
        self.stack.push(String::new());
    }

    /// Pop the innermost capture. The render buffer itself is never popped.
    pub(super) fn end_capture(&mut self) -> String {
        if self.stack.len() > 1 {
            self.stack.pop().unwrap_or_default()
        } else {
            String::new()
        }
    }

    pub(super) fn finish(self) -> String {
        self.stack.into_iter().next().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_nest() {
        let mut output = Output::new();
        output.write("a");
        output.begin_capture();
        output.write("b");
        output.begin_capture();
        output.write("c");
        assert_eq!(output.end_capture(), "c");
        assert_eq!(output.end_capture(), "b");
        output.write("d");
        assert_eq!(output.end_capture(), "");
        assert_eq!(output.finish(), "ad");
    }
}
