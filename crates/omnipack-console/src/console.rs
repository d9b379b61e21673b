use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use anyhow::{Context, Result};

// Narrow seam over the terminal so interactive flows stay testable with a
// scripted console instead of a live stdin.
pub trait Console: Sync {
    fn write(&self, text: &str) -> Result<()>;
    fn read_line(&self) -> Result<String>;
    fn write_error(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn write(&self, text: &str) -> Result<()> {
        let mut stdout = io::stdout();
        stdout
            .write_all(text.as_bytes())
            .with_context(|| "failed writing to stdout")?;
        stdout.flush().with_context(|| "failed flushing stdout")
    }

    fn read_line(&self) -> Result<String> {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .with_context(|| "failed reading from stdin")?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn write_error(&self, text: &str) -> Result<()> {
        let mut stderr = io::stderr();
        stderr
            .write_all(text.as_bytes())
            .with_context(|| "failed writing to stderr")?;
        stderr.flush().with_context(|| "failed flushing stderr")
    }
}

// Replays canned input lines and records everything written. Reads past
// the scripted input behave like a closed pipe and yield empty lines.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    input: Mutex<Vec<String>>,
    written: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    reads: Mutex<u32>,
}

impl ScriptedConsole {
    pub fn with_input(lines: &[&str]) -> Self {
        Self {
            input: Mutex::new(lines.iter().rev().map(|line| line.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn written(&self) -> Vec<String> {
        self.written.lock().map(|lines| lines.clone()).unwrap_or_default()
    }

    pub fn error_lines(&self) -> Vec<String> {
        self.errors.lock().map(|lines| lines.clone()).unwrap_or_default()
    }

    pub fn read_count(&self) -> u32 {
        self.reads.lock().map(|count| *count).unwrap_or_default()
    }
}

impl Console for ScriptedConsole {
    fn write(&self, text: &str) -> Result<()> {
        if let Ok(mut lines) = self.written.lock() {
            lines.push(text.to_string());
        }
        Ok(())
    }

    fn read_line(&self) -> Result<String> {
        if let Ok(mut count) = self.reads.lock() {
            *count += 1;
        }
        let line = self
            .input
            .lock()
            .ok()
            .and_then(|mut lines| lines.pop())
            .unwrap_or_default();
        Ok(line)
    }

    fn write_error(&self, text: &str) -> Result<()> {
        if let Ok(mut lines) = self.errors.lock() {
            lines.push(text.to_string());
        }
        Ok(())
    }
}
