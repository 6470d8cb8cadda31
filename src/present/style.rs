// src/present/style.rs

//! ANSI coloring on top of `colored`.
//!
//! `colored` already stays quiet when stdout is not a terminal or `NO_COLOR`
//! is set; `enabled = false` turns coloring off regardless.

use colored::Colorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Cyan,
    Red,
    None,
}

pub fn paint(text: &str, style: Style, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }
    match style {
        Style::Cyan => text.cyan().to_string(),
        Style::Red => text.red().to_string(),
        Style::None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_is_plain() {
        assert_eq!(paint("x", Style::Red, false), "x");
        assert_eq!(paint("x", Style::None, true), "x");
    }

    #[test]
    fn red_wraps_in_escape_codes() {
        colored::control::set_override(true);
        assert_eq!(paint("x", Style::Red, true), "\u{1b}[31mx\u{1b}[0m");
    }
}
