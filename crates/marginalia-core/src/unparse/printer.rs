//! Line-oriented output buffer for the unparsers
//!
//! Statements start on a fresh line through [`Printer::fill`]; everything
//! else is appended with [`Printer::write`]. The buffer keeps track of the
//! indentation level and the current line number.

use crate::config::{DEFAULT_EOL_PADDING, DEFAULT_INDENT_SIZE, PrinterConfiguration};

/// Printer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterOptions {
    /// Number of spaces per indentation level
    pub indent_size: usize,

    /// Spaces between code and an end-of-line comment
    pub eol_padding: usize,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        Self {
            indent_size: DEFAULT_INDENT_SIZE,
            eol_padding: DEFAULT_EOL_PADDING,
        }
    }
}

impl From<&PrinterConfiguration> for PrinterOptions {
    fn from(config: &PrinterConfiguration) -> Self {
        let defaults = Self::default();
        Self {
            indent_size: config.indent_size.unwrap_or(defaults.indent_size),
            eol_padding: config.eol_padding.unwrap_or(defaults.eol_padding),
        }
    }
}

pub struct Printer {
    options: PrinterOptions,
    buffer: String,
    indent_level: usize,
    line_number: usize,
}

impl Printer {
    pub fn new(options: PrinterOptions) -> Self {
        Self {
            options,
            buffer: String::with_capacity(1024),
            indent_level: 0,
            line_number: 1,
        }
    }

    pub fn options(&self) -> PrinterOptions {
        self.options
    }

    /// Append `text` to the current line.
    pub fn write(&mut self, text: &str) {
        self.line_number += text.matches('\n').count();
        self.buffer.push_str(text);
    }

    /// Start a new line at the current indentation and write `text` on it.
    pub fn fill(&mut self, text: &str) {
        self.newline(self.indent_level);
        self.write(text);
    }

    /// Break the line and indent one level deeper than the current block,
    /// as inside brackets.
    pub fn continuation(&mut self) {
        self.newline(self.indent_level + 1);
    }

    fn newline(&mut self, level: usize) {
        self.buffer.push('\n');
        self.line_number += 1;
        let width = level * self.options.indent_size;
        self.buffer.extend(std::iter::repeat_n(' ', width));
    }

    /// Write `text` after the end-of-line padding.
    pub fn write_padded(&mut self, text: &str) {
        self.buffer
            .extend(std::iter::repeat_n(' ', self.options.eol_padding));
        self.write(text);
    }

    /// Drop trailing spaces of the current line.
    pub fn trim_trailing_spaces(&mut self) {
        let kept = self.buffer.trim_end_matches(' ').len();
        self.buffer.truncate(kept);
    }

    /// True when the current line holds nothing but indentation.
    pub fn at_line_start(&self) -> bool {
        let line = self
            .buffer
            .rsplit_once('\n')
            .map_or(self.buffer.as_str(), |(_, line)| line);
        line.bytes().all(|byte| byte == b' ')
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// The printed text: no leading newline, one trailing newline unless
    /// nothing was printed.
    pub fn finish(self) -> String {
        let text = self.buffer.trim_start_matches('\n');
        if text.is_empty() {
            return String::new();
        }
        let mut text = text.trim_end_matches('\n').to_string();
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_line_start() {
        let mut printer = Printer::new(PrinterOptions::default());
        printer.write("f(a,");
        assert!(!printer.at_line_start());
        printer.continuation();
        assert!(printer.at_line_start());
        printer.write("# note");
        assert!(!printer.at_line_start());
    }

    #[test]
    fn test_fill_and_indentation() {
        let mut printer = Printer::new(PrinterOptions::default());
        printer.fill("if x:");
        printer.indent();
        printer.fill("pass");
        printer.dedent();
        printer.fill("y");
        assert_eq!(printer.line_number(), 4);
        assert_eq!(printer.finish(), "if x:\n    pass\ny\n");
    }

    #[test]
    fn test_continuation_and_trim() {
        let mut printer = Printer::new(PrinterOptions {
            indent_size: 2,
            eol_padding: 1,
        });
        printer.fill("[1, ");
        printer.trim_trailing_spaces();
        printer.write_padded("# one");
        printer.continuation();
        printer.write("2]");
        assert_eq!(printer.finish(), "[1, # one\n  2]\n");
    }

    #[test]
    fn test_empty_output() {
        let printer = Printer::new(PrinterOptions::default());
        assert_eq!(printer.finish(), "");
    }

    #[test]
    fn test_options_from_configuration() {
        let config = PrinterConfiguration {
            indent_size: Some(2),
            eol_padding: None,
        };
        let options = PrinterOptions::from(&config);
        assert_eq!(options.indent_size, 2);
        assert_eq!(options.eol_padding, DEFAULT_EOL_PADDING);
    }
}
