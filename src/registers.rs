/// RV32I register file helpers
use std::io;

/// ABI names of the general purpose registers, indexed by register number.
#[rustfmt::skip]
pub static REG_NAMES: [&str; 32] = [
    "$0", "ra", "sp", "gp", "tp", "t0", "t1", "t2",
    "s0", "s1", "a0", "a1", "a2", "a3", "a4", "a5",
    "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7",
    "s8", "s9", "s10", "s11", "t3", "t4", "t5", "t6",
];

pub const A0: usize = 10;

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Set {
    gpr: [u32; 32],
    pub pc: u32,
}

impl Set {
    pub fn reset(&mut self, pc: u32) {
        self.gpr = [0; 32];
        self.pc = pc;
    }
    pub fn get(&self, r: usize) -> u32 { self.gpr[r] }
    // x0 is hard-wired to zero
    pub fn set(&mut self, r: usize, val: u32) {
        if r != 0 {
            self.gpr[r] = val;
        }
    }
    /// Finds a register by name. Accepts "pc", ABI names, "0" for x0 and xN numbering.
    pub fn get_by_name(&self, name: &str) -> Option<u32> {
        if name == "pc" {
            return Some(self.pc);
        }
        if name == "0" {
            return Some(self.gpr[0]);
        }
        if let Some(i) = REG_NAMES.iter().position(|n| *n == name) {
            return Some(self.gpr[i]);
        }
        let i = name.strip_prefix('x')?.parse::<usize>().ok()?;
        self.gpr.get(i).copied()
    }
    pub fn display(&self, out: &mut dyn io::Write) -> io::Result<()> {
        for (name, val) in REG_NAMES.iter().zip(self.gpr.iter()) {
            writeln!(out, "{:<4} {:#010x} {:>11}", name, val, val)?;
        }
        writeln!(out, "{:<4} {:#010x} {:>11}", "pc", self.pc, self.pc)
    }
}
