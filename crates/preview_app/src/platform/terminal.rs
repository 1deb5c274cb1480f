//! Terminal output and error surfaces.

use std::io::{self, Write};

use chrono::Local;
use preview_engine::{ErrorSink, OutputSink};

const RULE: &str = "────────────────────────────────────────";

#[derive(Debug, Default)]
pub struct TerminalOutput;

impl OutputSink for TerminalOutput {
    fn set_text(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{RULE}\n output · {}\n{RULE}", Local::now().format("%H:%M:%S"));
        if text.is_empty() {
            let _ = writeln!(out, "(empty)");
        } else {
            let _ = writeln!(out, "{}", text.trim_end_matches('\n'));
        }
        let _ = out.flush();
    }
}

#[derive(Debug, Default)]
pub struct TerminalError;

impl ErrorSink for TerminalError {
    fn set_text(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{RULE}\n error\n{RULE}\n{text}");
        let _ = out.flush();
    }

    fn clear(&mut self) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "(error cleared)");
        let _ = out.flush();
    }
}
