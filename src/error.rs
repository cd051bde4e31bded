use rustyline::error::ReadlineError;
use std::{convert::From, fmt};

/// Simple custom Error for the monitor.
/// Every Error that reaches the command loop ends the session; recoverable
/// problems are reported to the console by the command handlers instead.
pub struct Error {
    pub kind: ErrorKind,
    /// program counter of the simulated machine when the error occurred (if known)
    pub pc: Option<u32>,
    pub msg: String,
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// malformed command argument or expression
    Syntax,
    /// error accessing the simulated physical memory
    Memory,
    /// underlying io error (console, image file, log file)
    IO,
    /// feature referenced by a command but not implemented
    Unimplemented,
    /// catch-all for other errors
    General,
}

impl Error {
    pub fn new(kind: ErrorKind, pc: Option<u32>, message: &str) -> Error {
        Error {
            kind,
            pc,
            msg: String::from(message),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self { Error::new(ErrorKind::IO, None, e.to_string().as_str()) }
}

impl From<ReadlineError> for Error {
    fn from(e: ReadlineError) -> Self {
        match e {
            ReadlineError::Io(e) => e.into(),
            e => Error::new(ErrorKind::General, None, e.to_string().as_str()),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}: {}", red!("sdb::Error"), self.msg) }
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut res = write!(f, "{}", self.msg);
        if res.is_ok() {
            if let Some(pc) = self.pc {
                res = write!(f, "\nContext: pc = {:#010x}", pc);
            }
        }
        res
    }
}
impl std::error::Error for Error {}
