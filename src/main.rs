//! # SDB: a simple debugger for an RV32I simulator, written in Rust.
//!
//! ## Getting Started
//! To run an image under the monitor:
//! ```
//! cargo run -- /path/to/image.bin
//! ```
//! ...or run it to completion without the monitor:
//! ```
//! sdb --batch /path/to/image.bin
//! ```
//! Without an image a small built-in program is loaded.
//! ## Options
//! Help for command line options is available using -h or --help.
#[macro_use]
mod macros;
#[macro_use]
mod term;
mod config;
mod core;
mod error;
mod expr;
mod logger;
mod machine;
mod memory;
mod registers;
mod runtime;
mod sdb;
mod watchpoint;
use crate::sdb::{line::Readline, Sdb, SessionMode};
use std::io;
use std::result::Result;
pub(crate) use {crate::core::Core, crate::error::*};

fn main() {
    config::init();
    term::init();
    let code = match run() {
        Ok(core) if core.exit_status_bad() => 1,
        Ok(_) => 0,
        Err(e) => {
            log_file!(Fatal, "{}", e);
            println!("{}", e);
            1
        }
    };
    std::process::exit(code);
}

/// run builds the machine, loads the image and hands control to the monitor
fn run() -> Result<Core, Error> {
    let mut core = Core::new(config::ARGS.mem_base, config::ARGS.mem_size);
    core.trace = config::trace();
    core.load(config::ARGS.image.as_deref())?;
    let mut stdout = io::stdout();
    {
        let mode = if config::batch() { SessionMode::Batch } else { SessionMode::Interactive };
        let mut sdb = Sdb::init(&mut core, &mut stdout, mode)?;
        if config::device() {
            sdb = sdb.with_events(Box::new(term::Keyboard));
        }
        if sdb.mode() == SessionMode::Interactive {
            info!("Welcome to the RV32I monitor! For help, type \"help\"");
        }
        let mut lines = Readline::new()?;
        sdb.mainloop(&mut lines)?;
    }
    Ok(core)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::State;
    use crate::machine::Machine;
    use crate::sdb::Flow;

    #[test]
    fn monitor_drives_reference_machine() -> Result<(), Error> {
        let mut core = Core::new(0x8000_0000, 0x1000);
        core.load(None)?;
        let mut out = Vec::new();
        {
            let mut sdb = Sdb::init(&mut core, &mut out, SessionMode::Interactive)?;
            sdb.dispatch("si 2")?;
            sdb.dispatch("p $t0")?;
            sdb.dispatch("x 1 0x80000010")?;
            sdb.dispatch("c")?;
            sdb.dispatch("px $a0")?;
        }
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("$t0 = 2147483648\n"));
        // sb zero,16(t0) already cleared the low byte of 0xdeadbeef
        assert!(text.contains("0x80000010:\t0x0    0xbe   0xad   0xde  \t0    190  173  222  \n"));
        assert!(text.contains("$a0 = 0x00000000\n"));
        assert_eq!(core.state, State::End);
        assert!(!core.exit_status_bad());
        Ok(())
    }

    #[test]
    fn quit_leaves_machine_untouched() -> Result<(), Error> {
        let mut core = Core::new(0x8000_0000, 0x1000);
        core.load(None)?;
        let mut out = Vec::new();
        let flow = {
            let mut sdb = Sdb::init(&mut core, &mut out, SessionMode::Interactive)?;
            sdb.dispatch("si")?;
            sdb.dispatch("q")?
        };
        assert_eq!(flow, Flow::Quit);
        assert_eq!(core.state, State::Stop);
        assert_eq!(core.reg.pc, 0x8000_0004);
        // quitting before the trap is not a good exit
        assert!(core.exit_status_bad());
        Ok(())
    }

    #[test]
    fn memory_fault_in_dump_is_fatal() -> Result<(), Error> {
        // just big enough for the built-in image
        let mut core = Core::new(0x8000_0000, 0x14);
        core.load(None)?;
        let mut out = Vec::new();
        let mut sdb = Sdb::init(&mut core, &mut out, SessionMode::Interactive)?;
        let e = sdb.dispatch("x 3 0x8000000c").unwrap_err();
        assert_eq!(e.kind, ErrorKind::Memory);
        Ok(())
    }

    #[test]
    fn register_dump_goes_to_console() -> Result<(), Error> {
        let mut core = Core::new(0x8000_0000, 0x1000);
        core.load(None)?;
        let pc = core.reg_value("pc");
        let mut out = Vec::new();
        {
            let mut sdb = Sdb::init(&mut core, &mut out, SessionMode::Interactive)?;
            sdb.dispatch("info r")?;
        }
        let text = String::from_utf8(out).unwrap();
        assert_eq!(pc, Some(0x8000_0000));
        assert!(text.contains("pc   0x80000000  2147483648\n"));
        Ok(())
    }
}
