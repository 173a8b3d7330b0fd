//! Output trait for rendering reports.

/// Target output for reports.
///
/// Reports describe *what* to print with these semantic methods, the
/// implementation decides *how*.
pub trait Output {
    fn title(&mut self, text: &str);

    /// Start a new section with a heading.
    fn section(&mut self, name: &str);

    fn key_value(&mut self, key: &str, value: &str);

    fn list_item(&mut self, text: &str);

    /// An item that was added, e.g. a written file.
    fn added_item(&mut self, text: &str);

    fn warning(&mut self, msg: &str);

    fn newline(&mut self);
}

/// A report that can render itself to an output.
pub trait Report {
    fn render(&self, out: &mut dyn Output);
}

/// Plain terminal output. Warnings go to stderr.
pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for TerminalOutput {
    fn title(&mut self, text: &str) {
        println!("{text}");
        println!("{}", "=".repeat(text.chars().count()));
    }

    fn section(&mut self, name: &str) {
        println!("{name}:");
    }

    fn key_value(&mut self, key: &str, value: &str) {
        println!("{key}: {value}");
    }

    fn list_item(&mut self, text: &str) {
        println!("  - {text}");
    }

    fn added_item(&mut self, text: &str) {
        println!("  + {text}");
    }

    fn warning(&mut self, msg: &str) {
        eprintln!("warning: {msg}");
    }

    fn newline(&mut self) {
        println!();
    }
}

/// Collects rendered reports as text.
#[cfg(test)]
#[derive(Default)]
pub struct BufferOutput(pub String);

#[cfg(test)]
impl Output for BufferOutput {
    fn title(&mut self, text: &str) {
        self.0.push_str(&format!("{text}\n{}\n", "=".repeat(text.chars().count())));
    }

    fn section(&mut self, name: &str) {
        self.0.push_str(&format!("{name}:\n"));
    }

    fn key_value(&mut self, key: &str, value: &str) {
        self.0.push_str(&format!("{key}: {value}\n"));
    }

    fn list_item(&mut self, text: &str) {
        self.0.push_str(&format!("  - {text}\n"));
    }

    fn added_item(&mut self, text: &str) {
        self.0.push_str(&format!("  + {text}\n"));
    }

    fn warning(&mut self, msg: &str) {
        self.0.push_str(&format!("warning: {msg}\n"));
    }

    fn newline(&mut self) {
        self.0.push('\n');
    }
}
