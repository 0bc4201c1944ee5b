// Append-only line buffer for generated C++. Indentation is an explicit
// counter pushed and popped by the caller, never inferred from braces, and
// statements land in the buffer strictly in call order.

/// One output unit (a header or a source blob).
#[derive(Default)]
pub struct CodeText {
    lines: Vec<String>,
    indent: usize,
}

impl CodeText {
    pub fn new() -> Self {
        CodeText::default()
    }

    /// Append one line at the current indent. Empty lines stay unindented.
    pub fn add_line(&mut self, line: &str) {
        if line.is_empty() {
            self.lines.push(String::new());
            return;
        }
        let mut out = String::with_capacity(self.indent + line.len());
        for _ in 0..self.indent {
            out.push('\t');
        }
        out.push_str(line);
        self.lines.push(out);
    }

    pub fn increase_indent(&mut self) {
        self.indent += 1;
    }

    pub fn decrease_indent(&mut self) {
        if self.indent == 0 {
            panic!("indent underflow in generated code buffer");
        }
        self.indent -= 1;
    }

    /// `{` plus indent push.
    pub fn open_brace(&mut self) {
        self.add_line("{");
        self.increase_indent();
    }

    /// Indent pop plus `}`.
    pub fn close_brace(&mut self) {
        self.decrease_indent();
        self.add_line("}");
    }

    /// Matched pair: call before/after emitting a function whose body must
    /// not be optimized (huge generated constructors).
    pub fn begin_disable_optimization(&mut self) {
        self.add_line("PRAGMA_DISABLE_OPTIMIZATION");
    }

    pub fn end_disable_optimization(&mut self) {
        self.add_line("PRAGMA_ENABLE_OPTIMIZATION");
    }

    /// Matched pair suppressing MSVC C4883 ("function size suppresses
    /// optimizations") around large emitted functions.
    pub fn begin_disable_size_warning(&mut self) {
        self.add_line("#pragma warning (push)");
        self.add_line("#pragma warning (disable : 4883)");
    }

    pub fn end_disable_size_warning(&mut self) {
        self.add_line("#pragma warning (pop)");
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The finished blob. Lines are joined with `\n` and the blob always ends
    /// with a newline so files concatenate cleanly.
    pub fn result(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}
