//! Message Printer
//!
//! Human readable dump of extracted messages for the terminal.

use i18n_extractor::{Message, Part, Placeholder};
use owo_colors::{OwoColorize, Style};

/// Shown in place of a newline inside user text.
const NEWLINE_MARK: &str = "\u{21b5}";
const INDENT: &str = "  ";

fn heading_style() -> Style {
    Style::new().blue().bold()
}

fn label_style() -> Style {
    Style::new().blue()
}

fn placeholder_style() -> Style {
    Style::new().magenta()
}

fn user_text_style() -> Style {
    Style::new().underline()
}

fn mark_style() -> Style {
    Style::new().bold()
}

/// Writes indented text into a buffer. Styles are ignored unless `styled`.
#[derive(Debug, Default)]
struct TermPrinter {
    out: String,
    indent: usize,
    at_newline: bool,
    styled: bool,
}

impl TermPrinter {
    fn new(styled: bool) -> Self {
        TermPrinter {
            out: String::new(),
            indent: 0,
            at_newline: true,
            styled,
        }
    }

    fn write(&mut self, text: &str) {
        self.write_with(text, None);
    }

    /// Escapes are applied per line so indentation stays unstyled.
    fn write_with(&mut self, text: &str, style: Option<Style>) {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.newline();
            }
            if line.is_empty() {
                continue;
            }
            if self.at_newline {
                for _ in 0..self.indent {
                    self.out.push_str(INDENT);
                }
                self.at_newline = false;
            }
            match style {
                Some(style) if self.styled => self.out.push_str(&line.style(style).to_string()),
                _ => self.out.push_str(line),
            }
        }
    }

    fn print(&mut self, text: &str) {
        self.write(text);
        self.newline();
    }

    fn print_with(&mut self, text: &str, style: Style) {
        self.write_with(text, Some(style));
        self.newline();
    }

    fn newline(&mut self) {
        self.out.push('\n');
        self.at_newline = true;
    }

    /// Text from the document. Newlines stay visible.
    fn write_user_text(&mut self, text: &str) {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.write_with(NEWLINE_MARK, Some(mark_style()));
                self.newline();
            }
            self.write_with(line, Some(user_text_style()));
        }
    }

    fn indented(&mut self, f: impl FnOnce(&mut Self)) {
        self.indent += 1;
        f(self);
        self.indent -= 1;
    }
}

#[derive(Debug, Default)]
pub struct MessagePrinter {
    printer: TermPrinter,
}

impl MessagePrinter {
    /// Plain output, for pipes and files.
    pub fn new() -> Self {
        MessagePrinter {
            printer: TermPrinter::new(false),
        }
    }

    /// Output with ANSI styling, for a colour terminal.
    pub fn styled() -> Self {
        MessagePrinter {
            printer: TermPrinter::new(true),
        }
    }

    pub fn print_message(&mut self, message: &Message) {
        let p = &mut self.printer;
        p.write_with("MESSAGE:", Some(heading_style()));
        p.print(&format!(" id={}", message.id()));
        p.indented(|p| {
            write_parts(p, message.parts());
            p.newline();
            if let Some(meaning) = message.meaning() {
                print_label_and_text(p, "meaning", meaning);
            }
            if !message.comment().is_empty() {
                print_label_and_text(p, "comment", message.comment());
            }
            p.print_with("Placeholders", label_style());
            p.indented(|p| {
                for placeholder in message.placeholders_by_name().values() {
                    write_placeholder(p, placeholder);
                }
            });
        });
    }

    pub fn finish(self) -> String {
        self.printer.out
    }
}

/// One message as text, styled for a terminal if `styled`.
pub fn format_message(message: &Message, styled: bool) -> String {
    let mut printer = if styled {
        MessagePrinter::styled()
    } else {
        MessagePrinter::new()
    };
    printer.print_message(message);
    printer.finish()
}

fn print_label_and_text(p: &mut TermPrinter, label: &str, text: &str) {
    p.print_with(label, label_style());
    p.indented(|p| {
        p.write_user_text(text);
        p.newline();
    });
}

fn write_parts(p: &mut TermPrinter, parts: &[Part]) {
    for part in parts {
        match part {
            Part::Text(text) => p.write_user_text(text),
            Part::Placeholder(ph) => p.write_with(&ph.name, Some(placeholder_style())),
            Part::TagPair(tag_pair) => {
                p.write_with(&tag_pair.begin_placeholder.name, Some(placeholder_style()));
                p.write(" ");
                write_parts(p, &tag_pair.parts);
                p.write_with(&tag_pair.end_placeholder.name, Some(placeholder_style()));
            }
        }
        p.write(" ");
    }
}

fn write_placeholder(p: &mut TermPrinter, placeholder: &Placeholder) {
    p.print_with(&placeholder.name, placeholder_style());
    p.indented(|p| {
        if let Some(comment) = &placeholder.comment {
            p.write_with("comment:", Some(label_style()));
            p.write(" ");
            p.write_user_text(comment);
            p.newline();
        }
        match placeholder.examples.as_slice() {
            [] => {}
            [example] => {
                p.write_with("example:", Some(label_style()));
                p.print(&format!(" {}", example));
            }
            examples => {
                p.print_with("examples", label_style());
                p.indented(|p| {
                    for example in examples {
                        p.print(example);
                    }
                });
            }
        }
    });
}
