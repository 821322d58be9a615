use clap::ValueEnum;
use console::style;
use serde::Serialize;

use crate::error::{ObError, Result, StructuredError};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable formatted output with colors (default)
    #[default]
    Human,
    /// Pretty-printed JSON
    Json,
    /// Plain text without colors, one record per line
    Plain,
}

impl OutputFormat {
    /// Check if this format should use colors
    #[must_use]
    pub const fn use_colors(&self) -> bool {
        matches!(self, Self::Human)
    }

    /// Check if this format is machine-readable
    #[must_use]
    pub const fn is_machine_readable(&self) -> bool {
        matches!(self, Self::Json)
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: &'a StructuredError,
}

pub fn emit_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)?;
    println!("{payload}");
    Ok(())
}

/// Report a failed command: structured JSON on stdout in machine mode,
/// `Error: ...` plus a hint on stderr otherwise.
pub fn emit_error(err: &ObError, format: OutputFormat) {
    let structured = err.to_structured();
    if format.is_machine_readable() {
        let envelope = ErrorEnvelope { error: &structured };
        match serde_json::to_string_pretty(&envelope) {
            Ok(payload) => println!("{payload}"),
            Err(_) => eprintln!("Error: {err}"),
        }
        return;
    }

    if format.use_colors() {
        eprintln!("{} {err}", style("Error:").red().bold());
        eprintln!("{} {}", style("hint:").dim(), structured.suggestion);
    } else {
        eprintln!("Error: {err}");
    }
}

pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
    colors: bool,
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanLayout {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 16,
            colors: true,
        }
    }

    /// Layout without ANSI styling.
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 16,
            colors: false,
        }
    }

    #[must_use]
    pub const fn for_format(format: OutputFormat) -> Self {
        if format.use_colors() {
            Self::new()
        } else {
            Self::plain()
        }
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        let line = if self.colors {
            style(text).bold().to_string()
        } else {
            text.to_string()
        };
        self.lines.push(line);
        self.lines.push(String::new());
        self
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        let line = if self.colors {
            style(text).bold().to_string()
        } else {
            text.to_string()
        };
        self.lines.push(line);
        self.lines.push("-".repeat(text.chars().count().max(3)));
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        let padded = format!("{key:width$}", width = self.key_width);
        let key = if self.colors {
            style(padded).dim().to_string()
        } else {
            padded
        };
        self.lines.push(format!("{key} {value}"));
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("- {text}"));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

pub fn emit_human(layout: HumanLayout) {
    println!("{}", layout.build());
}
