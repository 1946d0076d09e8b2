//! Styled CLI messages.
//!
//! Status lines go to stderr with a colored tag; command output (link lists,
//! URLs) goes to stdout unstyled so it can be piped. Colors are off when
//! `NO_COLOR` is set or stderr is not a terminal.

use std::io::IsTerminal;

const GREEN: &str = "\x1b[38;2;0;245;212m";
const RED: &str = "\x1b[38;2;255;107;107m";
const AMBER: &str = "\x1b[38;2;255;200;87m";
const BLUE: &str = "\x1b[38;2;72;202;228m";
const DIM: &str = "\x1b[38;2;130;154;177m";
const RESET: &str = "\x1b[0m";

fn colors_enabled() -> bool {
    let no_color = std::env::var("NO_COLOR")
        .map(|v| !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false"))
        .unwrap_or(false);
    !no_color && std::io::stderr().is_terminal()
}

/// Message type for styled output.
#[derive(Debug, Clone, Copy)]
pub enum MessageType {
    Success,
    Error,
    Warning,
    Info,
    Dim,
}

impl MessageType {
    fn tag(self) -> &'static str {
        match self {
            MessageType::Success => "[OK]",
            MessageType::Error => "[ERROR]",
            MessageType::Warning => "[WARN]",
            MessageType::Info => "[INFO]",
            MessageType::Dim => "-",
        }
    }

    fn color(self) -> &'static str {
        match self {
            MessageType::Success => GREEN,
            MessageType::Error => RED,
            MessageType::Warning => AMBER,
            MessageType::Info => BLUE,
            MessageType::Dim => DIM,
        }
    }
}

/// Format a message, colored or plain.
pub fn format_message(kind: MessageType, message: &str, colored: bool) -> String {
    if colored {
        format!("{}{}{} {message}", kind.color(), kind.tag(), RESET)
    } else {
        format!("{} {message}", kind.tag())
    }
}

fn print(kind: MessageType, message: &str) {
    eprintln!("{}", format_message(kind, message, colors_enabled()));
}

pub fn print_success(message: &str) {
    print(MessageType::Success, message);
}

pub fn print_error(message: &str) {
    print(MessageType::Error, message);
}

pub fn print_warning(message: &str) {
    print(MessageType::Warning, message);
}

pub fn print_info(message: &str) {
    print(MessageType::Info, message);
}

pub fn print_dim(message: &str) {
    print(MessageType::Dim, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_format() {
        assert_eq!(
            format_message(MessageType::Success, "Logged in", false),
            "[OK] Logged in"
        );
        assert_eq!(format_message(MessageType::Dim, "note", false), "- note");
    }

    #[test]
    fn test_colored_format_resets() {
        let message = format_message(MessageType::Error, "boom", true);
        assert!(message.starts_with(RED));
        assert!(message.ends_with("[ERROR]\x1b[0m boom"));
    }
}
