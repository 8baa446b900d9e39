//! Terminal input handling for the shell.
//!
//! Prefers `rustyline` with persistent history when an interactive
//! terminal is available, falling back to a basic stdin reader otherwise
//! (pipes, tests, dumb terminals).

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use log::{info, warn};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Outcome of reading a line from the shell input.
pub enum InputEvent {
    Line(String),
    Eof,
    Interrupted,
}

/// Manages the interactive input backend.
pub struct InputManager {
    backend: Backend,
}

enum Backend {
    Rustyline {
        editor: DefaultEditor,
        history_path: Option<PathBuf>,
    },
    Plain,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        let backend = if io::stdin().is_terminal() {
            match make_editor() {
                Ok((editor, history_path)) => {
                    info!("using rustyline-backed input");
                    Backend::Rustyline { editor, history_path }
                },
                Err(err) => {
                    warn!("failed to initialize rustyline ({err}); using basic stdin");
                    Backend::Plain
                },
            }
        } else {
            info!("stdin is not a TTY; using basic input mode");
            Backend::Plain
        };
        Self { backend }
    }

    /// Read one line. An unrecoverable interactive-backend error switches
    /// to the plain backend and retries once.
    ///
    /// # Errors
    /// Returns an error only when the plain stdin backend itself fails.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        let outcome = match &mut self.backend {
            Backend::Rustyline { editor, history_path } => match editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                        if let Some(path) = history_path {
                            if let Err(err) = editor.save_history(path) {
                                warn!("failed to persist history to {}: {err}", path.display());
                            }
                        }
                    }
                    Some(Ok(InputEvent::Line(line)))
                },
                Err(ReadlineError::Interrupted) => Some(Ok(InputEvent::Interrupted)),
                Err(ReadlineError::Eof) => Some(Ok(InputEvent::Eof)),
                Err(err) => {
                    warn!("rustyline input failed ({err}); switching to basic stdin");
                    None
                },
            },
            Backend::Plain => Some(read_plain_line(prompt)),
        };
        match outcome {
            Some(result) => result,
            None => {
                self.backend = Backend::Plain;
                read_plain_line(prompt)
            },
        }
    }
}

fn make_editor() -> rustyline::Result<(DefaultEditor, Option<PathBuf>)> {
    let mut editor = DefaultEditor::new()?;
    let history_path = history_file_path();
    if let Some(path) = history_path.as_ref() {
        if let Some(dir) = path.parent() {
            if let Err(err) = fs::create_dir_all(dir) {
                warn!("failed to create history directory {}: {err}", dir.display());
            }
        }
        match editor.load_history(path) {
            Ok(()) => {},
            Err(ReadlineError::Io(ref io_err)) if io_err.kind() == io::ErrorKind::NotFound => {
                info!("no prior history at {}; starting fresh", path.display());
            },
            Err(err) => warn!("failed to load history from {}: {err}", path.display()),
        }
    }
    Ok((editor, history_path))
}

fn read_plain_line(prompt: &str) -> io::Result<InputEvent> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut buffer = String::new();
    let bytes = io::stdin().read_line(&mut buffer)?;
    if bytes == 0 {
        return Ok(InputEvent::Eof);
    }
    while buffer.ends_with('\n') || buffer.ends_with('\r') {
        buffer.pop();
    }
    Ok(InputEvent::Line(buffer))
}

fn history_file_path() -> Option<PathBuf> {
    dirs::data_dir().or_else(dirs::data_local_dir).map(|base| {
        let mut path = base;
        path.push("thornvale_engine");
        path.push("history.txt");
        path
    })
}
