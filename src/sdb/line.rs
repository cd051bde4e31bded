use crate::error::Error;
use rustyline::{error::ReadlineError, DefaultEditor};

/// Where the command loop gets its input from.
pub trait LineSource {
    /// Returns the next line, or None once the input is exhausted.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, Error>;
}

/// Interactive input with line editing and history.
pub struct Readline {
    editor: DefaultEditor,
}

impl Readline {
    pub fn new() -> Result<Readline, Error> {
        Ok(Readline {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for Readline {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, Error> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.is_empty() {
                    _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) => Ok(None),
            // ctrl-c abandons the current line
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(e) => Err(e.into()),
        }
    }
}

/// Canned input for driving the command loop in tests.
#[cfg(test)]
pub struct Script {
    lines: std::collections::VecDeque<String>,
    pub reads: usize,
}

#[cfg(test)]
impl Script {
    pub fn new(lines: &[&str]) -> Script {
        Script {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            reads: 0,
        }
    }
    pub fn remaining(&self) -> usize { self.lines.len() }
}

#[cfg(test)]
impl LineSource for Script {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>, Error> {
        self.reads += 1;
        Ok(self.lines.pop_front())
    }
}
