//! SDB: the interactive monitor that drives a [`Machine`].
//!
//! Each input line is one command: the first word names it and the rest of the
//! line is handed to the command untouched. Commands either report a problem
//! and carry on, or return an [`Error`], which ends the session.
mod args;
mod commands;
pub mod line;

use crate::error::Error;
use crate::expr::Expr;
use crate::machine::{EventQueue, Evaluator, Machine};
use crate::watchpoint;
use line::LineSource;
use std::io::Write;

pub const PROMPT: &str = "(nemu) ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Interactive,
    /// run the machine to completion once, without reading any input
    Batch,
}

/// What the command loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

type Handler = fn(&mut Sdb<'_>, Option<&str>) -> Result<Flow, Error>;

pub struct Command {
    pub name: &'static str,
    pub description: &'static str,
    handler: Handler,
}

/// Every command the monitor understands, in the order `help` lists them.
/// Lookup takes the first entry whose name matches exactly.
#[rustfmt::skip]
pub static CMD_TABLE: &[Command] = &[
    Command { name: "help", description: "Display information about all supported commands", handler: commands::cmd_help },
    Command { name: "c",    description: "Continue the execution of the program", handler: commands::cmd_c },
    Command { name: "q",    description: "Exit the monitor", handler: commands::cmd_q },
    Command { name: "si",   description: "si [N] Step N instructions then pause; N defaults to 1", handler: commands::cmd_si },
    Command { name: "info", description: "info r prints the registers, info w prints the watchpoints", handler: commands::cmd_info },
    Command { name: "x",    description: "x N 0xADDR Dump N consecutive 4-byte words starting at ADDR in hex and decimal", handler: commands::cmd_x },
    Command { name: "p",    description: "p EXPR Evaluate the expression EXPR and print it in decimal", handler: commands::cmd_p },
    Command { name: "px",   description: "px EXPR Same as p but prints the result in hex", handler: commands::cmd_px },
];

pub fn find_command(name: &str) -> Option<&'static Command> { CMD_TABLE.iter().find(|c| c.name == name) }

/// Splits a line into the command word and the rest of the line.
/// The rest is None when nothing but whitespace follows the command.
pub fn split_command(line: &str) -> Option<(&str, Option<&str>)> {
    let line = line.trim_start();
    if line.is_empty() {
        return None;
    }
    match line.find(char::is_whitespace) {
        Some(i) => {
            let rest = line[i..].trim_start();
            Some((&line[..i], if rest.is_empty() { None } else { Some(rest) }))
        }
        None => Some((line, None)),
    }
}

pub struct Sdb<'a> {
    machine: &'a mut dyn Machine,
    out: &'a mut dyn Write,
    evaluator: Box<dyn Evaluator>,
    watchpoints: watchpoint::Pool,
    events: Option<Box<dyn EventQueue>>,
    mode: SessionMode,
}

impl<'a> Sdb<'a> {
    /// Compiles the expression rules and allocates the watchpoint pool.
    /// `mode` is fixed for the life of the session.
    pub fn init(machine: &'a mut dyn Machine, out: &'a mut dyn Write, mode: SessionMode) -> Result<Sdb<'a>, Error> {
        let evaluator = Expr::new()?;
        let watchpoints = watchpoint::Pool::new();
        verbose_println!("sdb: {} watchpoints allocated", watchpoints.capacity());
        Ok(Sdb {
            machine,
            out,
            evaluator: Box::new(evaluator),
            watchpoints,
            events: None,
            mode,
        })
    }
    /// Replaces the expression evaluator.
    pub fn with_evaluator(mut self, evaluator: Box<dyn Evaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }
    /// Drains `events` before every command.
    pub fn with_events(mut self, events: Box<dyn EventQueue>) -> Self {
        self.events = Some(events);
        self
    }
    pub fn mode(&self) -> SessionMode { self.mode }

    /// Reads and runs commands until `q`, the end of input, or a fatal error.
    /// In batch mode the machine is run to completion instead and no input is read.
    pub fn mainloop(mut self, lines: &mut dyn LineSource) -> Result<(), Error> {
        if self.mode == SessionMode::Batch {
            commands::cmd_c(&mut self, None)?;
            return Ok(());
        }
        while let Some(line) = lines.read_line(PROMPT)? {
            if self.dispatch(&line)? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Runs a single command line.
    pub fn dispatch(&mut self, line: &str) -> Result<Flow, Error> {
        let (name, args) = match split_command(line) {
            Some(split) => split,
            None => return Ok(Flow::Continue),
        };
        if let Some(events) = self.events.as_mut() {
            events.clear();
        }
        match find_command(name) {
            Some(cmd) => (cmd.handler)(self, args),
            None => {
                writeln!(self.out, "Unknown command '{}'", name)?;
                Ok(Flow::Continue)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::line::Script;
    use super::*;
    use crate::error::ErrorKind;
    use crate::machine::RUN_FOREVER;
    use std::{cell::Cell, cell::RefCell, io, rc::Rc};

    /// Records what the monitor asked of it. Memory reads return the low byte of the address.
    #[derive(Default)]
    struct FakeMachine {
        steps: Vec<u64>,
        reads: RefCell<Vec<(u32, usize)>>,
    }

    impl Machine for FakeMachine {
        fn exec(&mut self, n: u64) -> Result<(), Error> {
            self.steps.push(n);
            Ok(())
        }
        fn paddr_read(&self, addr: u32, len: usize) -> Result<u32, Error> {
            self.reads.borrow_mut().push((addr, len));
            Ok(addr & 0xff)
        }
        fn reg_display(&self, out: &mut dyn io::Write) -> io::Result<()> { writeln!(out, "pc   0x80000000") }
        fn reg_value(&self, _name: &str) -> Option<u32> { None }
    }

    struct FakeEvaluator;

    impl Evaluator for FakeEvaluator {
        fn expr(&self, _machine: &dyn Machine, text: &str) -> Result<u32, Error> {
            match text {
                "1+1" => Ok(2),
                "255" => Ok(255),
                _ => Err(syntax_err!("cannot evaluate {}", text)),
            }
        }
    }

    struct CountingEvents(Rc<Cell<usize>>);

    impl EventQueue for CountingEvents {
        fn clear(&mut self) { self.0.set(self.0.get() + 1); }
    }

    struct Session {
        result: Result<(), Error>,
        output: String,
        script: Script,
    }

    fn session(
        machine: &mut FakeMachine,
        mode: SessionMode,
        lines: &[&str],
        setup: impl FnOnce(Sdb) -> Sdb,
    ) -> Session {
        let mut out = Vec::new();
        let mut script = Script::new(lines);
        let result = {
            let sdb = Sdb::init(machine, &mut out, mode).unwrap().with_evaluator(Box::new(FakeEvaluator));
            setup(sdb).mainloop(&mut script)
        };
        Session {
            result,
            output: String::from_utf8(out).unwrap(),
            script,
        }
    }

    fn run_with(machine: &mut FakeMachine, lines: &[&str], setup: impl FnOnce(Sdb) -> Sdb) -> Session {
        session(machine, SessionMode::Interactive, lines, setup)
    }

    fn run(machine: &mut FakeMachine, lines: &[&str]) -> Session { run_with(machine, lines, |sdb| sdb) }

    #[test]
    fn split_at_first_whitespace_run() {
        assert_eq!(split_command("si 5"), Some(("si", Some("5"))));
        assert_eq!(split_command("p  1 + 2 "), Some(("p", Some("1 + 2 "))));
        assert_eq!(split_command("  q"), Some(("q", None)));
        assert_eq!(split_command("info   "), Some(("info", None)));
        assert_eq!(split_command("x\t2 0x10"), Some(("x", Some("2 0x10"))));
        assert_eq!(split_command(""), None);
        assert_eq!(split_command("   "), None);
    }

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        assert_eq!(find_command("si").map(|c| c.name), Some("si"));
        assert!(find_command("SI").is_none());
        assert!(find_command("s").is_none());
        assert!(find_command("help ").is_none());
    }

    #[test]
    fn help_lists_every_command_in_order() {
        let mut machine = FakeMachine::default();
        let session = run(&mut machine, &["help"]);
        let expected: String = CMD_TABLE.iter().map(|c| format!("{} - {}\n", c.name, c.description)).collect();
        assert_eq!(session.output, expected);
    }

    #[test]
    fn help_describes_exactly_one_command() {
        for cmd in CMD_TABLE {
            let mut machine = FakeMachine::default();
            let line = format!("help {}", cmd.name);
            let session = run(&mut machine, &[line.as_str()]);
            assert_eq!(session.output, format!("{} - {}\n", cmd.name, cmd.description));
        }
    }

    #[test]
    fn help_unknown_name_is_reported() {
        let mut machine = FakeMachine::default();
        let session = run(&mut machine, &["help zzz", "si"]);
        assert!(session.result.is_ok());
        assert_eq!(session.output, "Unknown command 'zzz'\n");
        assert_eq!(machine.steps, vec![1]);
    }

    #[test]
    fn unknown_command_is_reported_and_loop_continues() {
        let mut machine = FakeMachine::default();
        let session = run(&mut machine, &["zzz", "si 2"]);
        assert!(session.result.is_ok());
        assert!(session.output.contains("zzz"));
        assert_eq!(machine.steps, vec![2]);
    }

    #[test]
    fn empty_lines_are_skipped_silently() {
        let mut machine = FakeMachine::default();
        let clears = Rc::new(Cell::new(0));
        let events = CountingEvents(clears.clone());
        let session = run_with(&mut machine, &["", "   ", "si"], |sdb| sdb.with_events(Box::new(events)));
        assert!(session.result.is_ok());
        assert_eq!(session.output, "");
        assert_eq!(machine.steps, vec![1]);
        // only the real command drained the device queue
        assert_eq!(clears.get(), 1);
    }

    #[test]
    fn events_are_drained_once_per_command() {
        let mut machine = FakeMachine::default();
        let clears = Rc::new(Cell::new(0));
        let events = CountingEvents(clears.clone());
        let session = run_with(&mut machine, &["si", "zzz", "help"], |sdb| sdb.with_events(Box::new(events)));
        assert!(session.result.is_ok());
        assert_eq!(clears.get(), 3);
    }

    #[test]
    fn step_counts() {
        let mut machine = FakeMachine::default();
        let session = run(&mut machine, &["si", "si 5", "si abc", "c"]);
        assert!(session.result.is_ok());
        assert_eq!(machine.steps, vec![1, 5, 1, RUN_FOREVER]);
    }

    #[test]
    fn quit_stops_reading() {
        let mut machine = FakeMachine::default();
        let session = run(&mut machine, &["si", "q", "si", "si"]);
        assert!(session.result.is_ok());
        assert_eq!(session.script.reads, 2);
        assert_eq!(session.script.remaining(), 2);
        assert_eq!(machine.steps, vec![1]);
        // quitting asks nothing of the machine
        assert!(machine.reads.borrow().is_empty());
    }

    #[test]
    fn end_of_input_ends_the_session() {
        let mut machine = FakeMachine::default();
        let session = run(&mut machine, &["si"]);
        assert!(session.result.is_ok());
        assert_eq!(session.script.reads, 2);
        assert_eq!(machine.steps, vec![1]);
    }

    #[test]
    fn batch_mode_continues_once_without_input() {
        let mut machine = FakeMachine::default();
        let session = session(&mut machine, SessionMode::Batch, &["si", "q"], |sdb| {
            assert_eq!(sdb.mode(), SessionMode::Batch);
            sdb
        });
        assert!(session.result.is_ok());
        assert_eq!(session.script.reads, 0);
        assert_eq!(machine.steps, vec![RUN_FOREVER]);
        assert_eq!(session.output, "");
    }

    #[test]
    fn memory_dump_rows() {
        let mut machine = FakeMachine::default();
        let session = run(&mut machine, &["x 2 0x80000000"]);
        assert!(session.result.is_ok());
        let reads = machine.reads.borrow();
        let expected: Vec<(u32, usize)> = (0x8000_0000..0x8000_0008).map(|a| (a, 1)).collect();
        assert_eq!(*reads, expected);

        let lines: Vec<&str> = session.output.lines().collect();
        assert!(lines[0].starts_with("addr\t\thex"));
        assert!(lines[0].contains("dec"));
        let rows: Vec<&str> = lines.iter().copied().filter(|l| l.starts_with("0x8")).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("0x80000000:\t"));
        assert!(rows[1].starts_with("0x80000004:\t"));
        assert_eq!(rows[0].split('\t').nth(2).unwrap().split_whitespace().collect::<Vec<_>>(), ["0", "1", "2", "3"]);
        assert_eq!(rows[1].split('\t').nth(2).unwrap().split_whitespace().collect::<Vec<_>>(), ["4", "5", "6", "7"]);
        // the dump ends with a blank line
        assert!(session.output.ends_with("\n\n"));
    }

    #[test]
    fn memory_dump_cell_format() {
        let mut machine = FakeMachine::default();
        let session = run(&mut machine, &["x 1 0x10"]);
        let expected = format!(
            "{}\t\t{:<34}{:<32}\n0x10:\t0x10   0x11   0x12   0x13  \t16   17   18   19   \n\n",
            "addr", "hex", "dec"
        );
        assert_eq!(session.output, expected);
    }

    #[test]
    fn memory_dump_of_zero_words() {
        let mut machine = FakeMachine::default();
        let session = run(&mut machine, &["x 0 0x80000000", "si"]);
        assert!(session.result.is_ok());
        let expected = format!("{}\t\t{:<34}{:<32}\n0x80000000:\t\n", "addr", "hex", "dec");
        assert_eq!(session.output, expected);
        assert!(machine.reads.borrow().is_empty());
        assert_eq!(machine.steps, vec![1]);
    }

    #[test]
    fn memory_dump_without_prefix_is_fatal() {
        let mut machine = FakeMachine::default();
        let session = run(&mut machine, &["x 1 80000000", "si"]);
        let e = session.result.unwrap_err();
        assert_eq!(e.kind, ErrorKind::Syntax);
        assert!(machine.reads.borrow().is_empty());
        assert!(machine.steps.is_empty());
        assert_eq!(session.script.remaining(), 1);
    }

    #[test]
    fn memory_dump_missing_arguments_is_a_no_op() {
        let mut machine = FakeMachine::default();
        let session = run(&mut machine, &["x", "x 4", "si"]);
        assert!(session.result.is_ok());
        assert_eq!(session.output, "");
        assert_eq!(machine.steps, vec![1]);
    }

    #[test]
    fn print_expressions() {
        let mut machine = FakeMachine::default();
        let session = run(&mut machine, &["p 1+1", "px 255", "p 1+", "px nope", "p"]);
        assert!(session.result.is_ok());
        assert_eq!(session.output, "1+1 = 2\n255 = 0x000000ff\n");
    }

    #[test]
    fn info_registers() {
        let mut machine = FakeMachine::default();
        let session = run(&mut machine, &["info r"]);
        assert!(session.result.is_ok());
        assert_eq!(session.output, "pc   0x80000000\n");
    }

    #[test]
    fn info_bad_arguments_are_recoverable() {
        let mut machine = FakeMachine::default();
        let session = run(&mut machine, &["info", "info zzz", "si"]);
        assert!(session.result.is_ok());
        assert!(session.output.contains("missing argument"));
        assert!(session.output.contains("[zzz]"));
        assert_eq!(machine.steps, vec![1]);
    }

    #[test]
    fn info_watchpoints_is_fatal() {
        let mut machine = FakeMachine::default();
        let session = run(&mut machine, &["info w", "si"]);
        let e = session.result.unwrap_err();
        assert_eq!(e.kind, ErrorKind::Unimplemented);
        assert!(machine.steps.is_empty());
    }

    #[test]
    fn dispatch_reports_flow() {
        let mut machine = FakeMachine::default();
        let mut out = Vec::new();
        let mut sdb = Sdb::init(&mut machine, &mut out, SessionMode::Interactive).unwrap();
        assert_eq!(sdb.dispatch("q").unwrap(), Flow::Quit);
        assert_eq!(sdb.dispatch("help q").unwrap(), Flow::Continue);
        assert_eq!(sdb.dispatch("").unwrap(), Flow::Continue);
        assert_eq!(sdb.watchpoints.capacity(), watchpoint::NR_WP);
    }

    #[test]
    fn real_evaluator_against_fake_machine() {
        let mut machine = FakeMachine::default();
        let mut out = Vec::new();
        {
            let mut sdb = Sdb::init(&mut machine, &mut out, SessionMode::Interactive).unwrap();
            sdb.dispatch("p (2 + 3) * 4").unwrap();
            sdb.dispatch("px *0x80000010").unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "(2 + 3) * 4 = 20\n*0x80000010 = 0x00000010\n");
    }
}
