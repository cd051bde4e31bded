//! Capabilities the monitor needs from the machine it controls.
//!
//! The monitor never touches a concrete simulator; it talks to these traits so
//! it can be driven by the reference RV32I core or by test doubles.
use crate::error::Error;
use std::io;

/// Step count meaning "keep running until the machine stops by itself".
pub const RUN_FOREVER: u64 = u64::MAX;

pub trait Machine {
    /// Execute up to `n` instructions, blocking until they are done or the machine halts.
    fn exec(&mut self, n: u64) -> Result<(), Error>;
    /// Read `len` (1, 2 or 4) bytes of physical memory at `addr`, little endian.
    fn paddr_read(&self, addr: u32, len: usize) -> Result<u32, Error>;
    /// Print every register to `out`.
    fn reg_display(&self, out: &mut dyn io::Write) -> io::Result<()>;
    /// Look up a register by name (`pc`, ABI names, `$0`).
    fn reg_value(&self, name: &str) -> Option<u32>;
}

/// Evaluates operator-typed expressions against a machine.
pub trait Evaluator {
    fn expr(&self, machine: &dyn Machine, text: &str) -> Result<u32, Error>;
}

/// A device input queue that can go stale while the operator is typing.
pub trait EventQueue {
    fn clear(&mut self);
}
