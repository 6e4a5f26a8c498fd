//! User-facing output for the `stax` application.
//!
//! Diagnostics go through [tracing]. This module prints the messages a user is meant to read,
//! each prefixed with a colored glyph for its category.

use crate::constants::{ERROR_GLYPH, INFO_GLYPH, SUCCESS_GLYPH, VERBOSE_GLYPH, WARN_GLYPH};
use nu_ansi_term::Color;
use std::fmt::Display;

/// Prints an informational message.
pub fn info(message: impl Display) {
    println!("{} {}", Color::Blue.paint(INFO_GLYPH.to_string()), message);
}

/// Prints a success message.
pub fn success(message: impl Display) {
    println!("{} {}", Color::Green.paint(SUCCESS_GLYPH.to_string()), message);
}

/// Prints a warning to stderr.
pub fn warn(message: impl Display) {
    eprintln!("{} {}", Color::Yellow.paint(WARN_GLYPH.to_string()), message);
}

/// Prints an error to stderr.
pub fn error(message: impl Display) {
    eprintln!("{} {}", Color::Red.paint(ERROR_GLYPH.to_string()), message);
}

/// Prints a message without decoration.
pub fn log(message: impl Display) {
    println!("{}", message);
}

/// Prints a secondary detail, dimmed.
pub fn detail(message: impl Display) {
    println!(
        "{} {}",
        Color::DarkGray.paint(VERBOSE_GLYPH.to_string()),
        Color::DarkGray.paint(message.to_string())
    );
}
