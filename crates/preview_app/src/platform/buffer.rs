//! Line-oriented editable surface.
//!
//! Plain input lines are appended to the buffer; lines starting with `:` are
//! commands. A literal leading colon is written as `::`.

use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    Append(String),
    Pop,
    Clear,
    Load(PathBuf),
    Show,
    Quit,
    Unknown(String),
}

pub fn parse_line(line: &str) -> EditCommand {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if let Some(escaped) = line.strip_prefix("::") {
        return EditCommand::Append(format!(":{escaped}"));
    }
    let Some(command) = line.strip_prefix(':') else {
        return EditCommand::Append(line.to_string());
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command.trim(), ""),
    };
    match name {
        "pop" => EditCommand::Pop,
        "clear" => EditCommand::Clear,
        "show" => EditCommand::Show,
        "q" | "quit" => EditCommand::Quit,
        "load" if !arg.is_empty() => EditCommand::Load(PathBuf::from(arg)),
        _ => EditCommand::Unknown(line.to_string()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    lines: Vec<String>,
}

impl EditBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(ToOwned::to_owned).collect(),
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Applies an editing command.
    ///
    /// Returns the full new text when the content changed, `None` otherwise.
    pub fn apply(&mut self, command: &EditCommand) -> io::Result<Option<String>> {
        match command {
            EditCommand::Append(line) => self.lines.push(line.clone()),
            EditCommand::Pop => {
                if self.lines.pop().is_none() {
                    return Ok(None);
                }
            }
            EditCommand::Clear => {
                if self.lines.is_empty() {
                    return Ok(None);
                }
                self.lines.clear();
            }
            EditCommand::Load(path) => {
                let loaded = Self::from_text(&fs::read_to_string(path)?);
                if loaded == *self {
                    return Ok(None);
                }
                *self = loaded;
            }
            EditCommand::Show | EditCommand::Quit | EditCommand::Unknown(_) => return Ok(None),
        }
        Ok(Some(self.text()))
    }
}
