use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::Path,
    sync::Mutex,
};

/// Kind of record written to the log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// one executed instruction
    Trace,
    Warn,
    /// the error that ended the session
    Fatal,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Warn => "warn",
            Level::Fatal => "fatal",
        }
    }
}

/// Log file shared by the machine and the monitor.
/// Records are dropped until a file has been opened.
#[derive(Debug)]
pub struct Logger {
    sink: Mutex<Option<File>>,
}

impl Logger {
    pub const fn new() -> Logger { Logger { sink: Mutex::new(None) } }

    pub fn open<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        if let Ok(mut sink) = self.sink.lock() {
            *sink = Some(file);
        }
        Ok(())
    }

    /// Writes one "[level] message" line with the console colour codes removed.
    pub fn write(&self, level: Level, msg: &str) {
        if let Ok(mut sink) = self.sink.lock() {
            if let Some(f) = sink.as_mut() {
                _ = writeln!(f, "[{}] {}", level.tag(), strip_colors(msg));
            }
        }
    }
}

fn strip_colors(msg: &str) -> String {
    let mut plain = String::with_capacity(msg.len());
    let mut chars = msg.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // skip the CSI sequence up to and including its final 'm'
            chars.by_ref().find(|&c| c == 'm');
        } else {
            plain.push(c);
        }
    }
    plain
}

static LOGGER: Logger = Logger::new();

pub fn global() -> &'static Logger { &LOGGER }

pub fn write(level: Level, msg: &str) { LOGGER.write(level, msg) }
