//! Styling helpers for terminal output.
//!
//! The [`GameStyle`] trait provides a set of convenience methods for
//! applying ANSI styling via the `colored` crate. Implementations for
//! `&str` and `String` are provided so string literals can be styled
//! directly. The engine log itself stays plain text; styling is applied
//! only at render time in the shell.

use colored::{ColoredString, Colorize};

/// Convenience trait for applying color and style to text output.
pub trait GameStyle {
    fn room_style(&self) -> ColoredString;
    fn item_style(&self) -> ColoredString;
    fn npc_style(&self) -> ColoredString;
    fn description_style(&self) -> ColoredString;
    fn prompt_style(&self) -> ColoredString;
    fn banner_style(&self) -> ColoredString;
    fn error_style(&self) -> ColoredString;
}

impl GameStyle for &str {
    fn room_style(&self) -> ColoredString {
        self.truecolor(223, 77, 10)
    }
    fn item_style(&self) -> ColoredString {
        self.truecolor(220, 180, 40)
    }
    fn npc_style(&self) -> ColoredString {
        self.truecolor(13, 130, 60).underline()
    }
    fn description_style(&self) -> ColoredString {
        self.truecolor(102, 208, 250)
    }
    fn prompt_style(&self) -> ColoredString {
        self.bold().truecolor(150, 230, 30)
    }
    fn banner_style(&self) -> ColoredString {
        self.bold().bright_yellow()
    }
    fn error_style(&self) -> ColoredString {
        self.truecolor(230, 30, 30)
    }
}

impl GameStyle for String {
    fn room_style(&self) -> ColoredString {
        self.as_str().room_style()
    }
    fn item_style(&self) -> ColoredString {
        self.as_str().item_style()
    }
    fn npc_style(&self) -> ColoredString {
        self.as_str().npc_style()
    }
    fn description_style(&self) -> ColoredString {
        self.as_str().description_style()
    }
    fn prompt_style(&self) -> ColoredString {
        self.as_str().prompt_style()
    }
    fn banner_style(&self) -> ColoredString {
        self.as_str().banner_style()
    }
    fn error_style(&self) -> ColoredString {
        self.as_str().error_style()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styles_emit_ansi_when_forced() {
        colored::control::set_override(true);
        let styled = "hi".prompt_style().to_string();
        assert!(styled.contains('\u{1b}'));
        colored::control::unset_override();
    }
}
