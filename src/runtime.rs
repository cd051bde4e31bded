/// Implements the runtime engine of the simulator.
use crate::core::{Core, State};
use crate::error::Error;
use crate::registers::A0;
use std::time::Instant;

/// Stepping fewer instructions than this prints each of them.
const MAX_INST_TO_PRINT: u64 = 10;

fn imm_i(inst: u32) -> u32 { (inst as i32 >> 20) as u32 }
fn imm_s(inst: u32) -> u32 { (((inst as i32) >> 25) << 5) as u32 | bits!(inst, 11, 7) }
fn imm_b(inst: u32) -> u32 {
    (((inst as i32) >> 31) << 12) as u32 | (bits!(inst, 7, 7) << 11) | (bits!(inst, 30, 25) << 5) | (bits!(inst, 11, 8) << 1)
}
fn imm_u(inst: u32) -> u32 { inst & 0xffff_f000 }
fn imm_j(inst: u32) -> u32 {
    (((inst as i32) >> 31) << 20) as u32
        | (bits!(inst, 19, 12) << 12)
        | (bits!(inst, 20, 20) << 11)
        | (bits!(inst, 30, 21) << 1)
}

impl Core {
    /// Displays the trap outcome once the machine has stopped for good.
    fn report_halt(&self) {
        match self.state {
            State::End if self.halt_ret == 0 => info!(green!("HIT GOOD TRAP at pc = {:#010x}"), self.halt_pc),
            State::End => info!(red!("HIT BAD TRAP at pc = {:#010x}"), self.halt_pc),
            State::Abort => info!(red!("ABORT at pc = {:#010x}"), self.halt_pc),
            _ => {}
        }
    }
    /// Displays current perf information to stdout
    fn report_perf(&self) {
        let delta = self.host_time.as_secs_f64();
        info!("host time spent = {:.3} sec", delta);
        info!("total guest instructions = {}", self.instruction_count);
        if delta > 0.0 {
            info!("simulation frequency = {:.0} inst/s", self.instruction_count as f64 / delta);
        }
    }
    fn halt(&mut self, state: State, pc: u32, ret: u32) {
        self.state = state;
        self.halt_pc = pc;
        self.halt_ret = ret;
    }
    /// Executes up to n instructions, stopping early if the machine halts.
    /// Running out of instructions leaves the machine stopped but resumable.
    /// Only memory faults are returned as errors; a bad instruction aborts the machine instead.
    pub fn exec(&mut self, n: u64) -> Result<(), Error> {
        match self.state {
            State::End | State::Abort => {
                println!("Program execution has ended. To restart the program, exit and run again.");
                return Ok(());
            }
            _ => self.state = State::Running,
        }
        let print_step = self.prints_steps(n);
        let start = Instant::now();
        let mut remaining = n;
        while remaining > 0 {
            self.exec_once(print_step)?;
            self.instruction_count += 1;
            if self.state != State::Running {
                break;
            }
            remaining -= 1;
        }
        self.host_time += start.elapsed();
        match self.state {
            State::Running => self.state = State::Stop,
            State::End | State::Abort => {
                self.report_halt();
                self.report_perf();
            }
            _ => {}
        }
        Ok(())
    }
    /// Each instruction is echoed when tracing or when only a few are requested.
    fn prints_steps(&self, n: u64) -> bool { self.trace || n < MAX_INST_TO_PRINT }
    fn invalid(&mut self, pc: u32, inst: u32) -> &'static str {
        warn!("invalid opcode {:08x} at pc = {:#010x}", inst, pc);
        self.halt(State::Abort, pc, u32::MAX);
        "(invalid)"
    }
    /// Fetches, decodes and executes the instruction at pc.
    fn exec_once(&mut self, print_step: bool) -> Result<(), Error> {
        let pc = self.reg.pc;
        let inst = self.pmem.read(pc, 4).map_err(|mut e| {
            e.pc = Some(pc);
            e
        })?;
        let mut dnpc = pc.wrapping_add(4);
        let rd = bits!(inst, 11, 7) as usize;
        let src1 = self.reg.get(bits!(inst, 19, 15) as usize);
        let src2 = self.reg.get(bits!(inst, 24, 20) as usize);
        let funct3 = bits!(inst, 14, 12);
        let funct7 = bits!(inst, 31, 25);
        let name = match bits!(inst, 6, 0) {
            0b0110111 => {
                self.reg.set(rd, imm_u(inst));
                "lui"
            }
            0b0010111 => {
                self.reg.set(rd, pc.wrapping_add(imm_u(inst)));
                "auipc"
            }
            0b1101111 => {
                self.reg.set(rd, pc.wrapping_add(4));
                dnpc = pc.wrapping_add(imm_j(inst));
                "jal"
            }
            0b1100111 if funct3 == 0 => {
                dnpc = src1.wrapping_add(imm_i(inst)) & !1;
                self.reg.set(rd, pc.wrapping_add(4));
                "jalr"
            }
            0b1100011 => {
                let (name, taken) = match funct3 {
                    0 => ("beq", src1 == src2),
                    1 => ("bne", src1 != src2),
                    4 => ("blt", (src1 as i32) < (src2 as i32)),
                    5 => ("bge", (src1 as i32) >= (src2 as i32)),
                    6 => ("bltu", src1 < src2),
                    7 => ("bgeu", src1 >= src2),
                    _ => (self.invalid(pc, inst), false),
                };
                if taken {
                    dnpc = pc.wrapping_add(imm_b(inst));
                }
                name
            }
            0b0000011 => {
                let addr = src1.wrapping_add(imm_i(inst));
                let (name, val) = match funct3 {
                    0 => ("lb", self.pmem.read(addr, 1)? as u8 as i8 as i32 as u32),
                    1 => ("lh", self.pmem.read(addr, 2)? as u16 as i16 as i32 as u32),
                    2 => ("lw", self.pmem.read(addr, 4)?),
                    4 => ("lbu", self.pmem.read(addr, 1)?),
                    5 => ("lhu", self.pmem.read(addr, 2)?),
                    _ => (self.invalid(pc, inst), self.reg.get(rd)),
                };
                self.reg.set(rd, val);
                name
            }
            0b0100011 => {
                let addr = src1.wrapping_add(imm_s(inst));
                match funct3 {
                    0 => self.pmem.write(addr, 1, src2).map(|_| "sb")?,
                    1 => self.pmem.write(addr, 2, src2).map(|_| "sh")?,
                    2 => self.pmem.write(addr, 4, src2).map(|_| "sw")?,
                    _ => self.invalid(pc, inst),
                }
            }
            0b0010011 => {
                let imm = imm_i(inst);
                let shamt = bits!(inst, 24, 20);
                let (name, val) = match (funct3, funct7) {
                    (0, _) => ("addi", src1.wrapping_add(imm)),
                    (2, _) => ("slti", ((src1 as i32) < (imm as i32)) as u32),
                    (3, _) => ("sltiu", (src1 < imm) as u32),
                    (4, _) => ("xori", src1 ^ imm),
                    (6, _) => ("ori", src1 | imm),
                    (7, _) => ("andi", src1 & imm),
                    (1, 0) => ("slli", src1 << shamt),
                    (5, 0) => ("srli", src1 >> shamt),
                    (5, 0b0100000) => ("srai", ((src1 as i32) >> shamt) as u32),
                    _ => (self.invalid(pc, inst), self.reg.get(rd)),
                };
                self.reg.set(rd, val);
                name
            }
            0b0110011 => {
                let shamt = src2 & 0x1f;
                let (name, val) = match (funct7, funct3) {
                    (0, 0) => ("add", src1.wrapping_add(src2)),
                    (0b0100000, 0) => ("sub", src1.wrapping_sub(src2)),
                    (0, 1) => ("sll", src1 << shamt),
                    (0, 2) => ("slt", ((src1 as i32) < (src2 as i32)) as u32),
                    (0, 3) => ("sltu", (src1 < src2) as u32),
                    (0, 4) => ("xor", src1 ^ src2),
                    (0, 5) => ("srl", src1 >> shamt),
                    (0b0100000, 5) => ("sra", ((src1 as i32) >> shamt) as u32),
                    (0, 6) => ("or", src1 | src2),
                    (0, 7) => ("and", src1 & src2),
                    _ => (self.invalid(pc, inst), self.reg.get(rd)),
                };
                self.reg.set(rd, val);
                name
            }
            0b1110011 if inst == 0x0010_0073 => {
                let ret = self.reg.get(A0);
                self.halt(State::End, pc, ret);
                "ebreak"
            }
            _ => self.invalid(pc, inst),
        };
        self.reg.pc = dnpc;
        let line = format!("{:#010x}: {:08x}  {}", pc, inst, name);
        if print_step {
            println!("{}", line);
        }
        log_file!(Trace, "{}", line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{Machine, RUN_FOREVER};

    const BASE: u32 = 0x8000_0000;

    fn core_with(program: &[u32]) -> Core {
        let mut core = Core::new(BASE, 0x100);
        let bytes: Vec<u8> = program.iter().flat_map(|w| w.to_le_bytes()).collect();
        core.pmem.load_bytes(&bytes).unwrap();
        core
    }

    #[test]
    fn builtin_image_hits_good_trap() {
        let mut core = Core::new(BASE, 0x100);
        core.load(None).unwrap();
        core.exec(RUN_FOREVER).unwrap();
        assert_eq!(core.state, State::End);
        assert_eq!(core.halt_ret, 0);
        assert_eq!(core.halt_pc, BASE + 12);
        assert_eq!(core.instruction_count, 4);
        // the sb cleared the low byte of the data word
        assert_eq!(core.paddr_read(BASE + 16, 4).unwrap(), 0xdeadbe00);
        assert!(!core.exit_status_bad());
    }

    #[test]
    fn step_echo_follows_the_trace_flag() {
        let mut core = Core::new(BASE, 0x100);
        assert!(core.prints_steps(1));
        assert!(!core.prints_steps(MAX_INST_TO_PRINT));
        assert!(!core.prints_steps(RUN_FOREVER));
        core.trace = true;
        assert!(core.prints_steps(RUN_FOREVER));
    }

    #[test]
    fn stepping_stops_and_resumes() {
        let mut core = Core::new(BASE, 0x100);
        core.load(None).unwrap();
        core.exec(1).unwrap();
        assert_eq!(core.state, State::Stop);
        assert_eq!(core.reg_value("t0"), Some(BASE));
        assert_eq!(core.reg.pc, BASE + 4);
        core.exec(2).unwrap();
        assert_eq!(core.reg.pc, BASE + 12);
        assert_eq!(core.state, State::Stop);
        core.exec(0).unwrap();
        assert_eq!(core.reg.pc, BASE + 12);
        core.exec(5).unwrap();
        assert_eq!(core.state, State::End);
        // nothing runs once the program has ended
        core.exec(5).unwrap();
        assert_eq!(core.instruction_count, 4);
    }

    #[test]
    fn arithmetic_and_branches() {
        let mut core = core_with(&[
            0x00500093, // addi ra,zero,5
            0xfff00113, // addi sp,zero,-1
            0x002081b3, // add  gp,ra,sp
            0x40208233, // sub  tp,ra,sp
            0x00209463, // bne  ra,sp,+8
            0x00100513, // addi a0,zero,1 (skipped)
            0x0020c2b3, // xor  t0,ra,sp
            0x00100073, // ebreak
        ]);
        core.exec(RUN_FOREVER).unwrap();
        assert_eq!(core.state, State::End);
        assert_eq!(core.reg.get(3), 4);
        assert_eq!(core.reg.get(4), 6);
        assert_eq!(core.reg.get(5), 5 ^ 0xffff_ffff);
        assert_eq!(core.halt_ret, 0);
    }

    #[test]
    fn loads_sign_extend() {
        let mut core = core_with(&[
            0x800000b7, // lui  ra,0x80000
            0x0100c103, // lbu  sp,16(ra)
            0x01008183, // lb   gp,16(ra)
            0x00100073, // ebreak
            0x000000f0, // data
        ]);
        core.exec(RUN_FOREVER).unwrap();
        assert_eq!(core.reg.get(2), 0xf0);
        assert_eq!(core.reg.get(3), 0xffff_fff0);
    }

    #[test]
    fn jal_links_and_jumps() {
        let mut core = core_with(&[
            0x008000ef, // jal ra,+8
            0x00100513, // addi a0,zero,1 (skipped)
            0x00100073, // ebreak
        ]);
        core.exec(RUN_FOREVER).unwrap();
        assert_eq!(core.reg.get(1), BASE + 4);
        assert_eq!(core.halt_pc, BASE + 8);
        assert_eq!(core.halt_ret, 0);
    }

    #[test]
    fn invalid_instruction_aborts() {
        let mut core = core_with(&[0xffff_ffff]);
        core.exec(RUN_FOREVER).unwrap();
        assert_eq!(core.state, State::Abort);
        assert_eq!(core.halt_pc, BASE);
        assert!(core.exit_status_bad());
    }

    #[test]
    fn fetch_fault_is_an_error() {
        let mut core = core_with(&[]);
        core.reg.pc = BASE + 0x100;
        let e = core.exec(1).unwrap_err();
        assert_eq!(e.kind, crate::error::ErrorKind::Memory);
        assert_eq!(e.pc, Some(BASE + 0x100));
    }
}
