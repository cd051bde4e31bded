use crate::machine::Machine;
use crate::memory::PhysMem;
use crate::registers;
use std::{io, path::Path, time::Duration};

/// Program loaded when no image file is given.
#[rustfmt::skip]
const BUILTIN_IMAGE: [u32; 5] = [
    0x00000297, // auipc t0,0
    0x00028823, // sb  zero,16(t0)
    0x0102c503, // lbu a0,16(t0)
    0x00100073, // ebreak (used as the trap)
    0xdeadbeef, // some data
];

/// Run state of the simulated machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Stop,
    End,
    Abort,
}

/// The Core struct implements a small RV32I machine.
/// Its implementation spans multiple files: core.rs, runtime.rs, memory.rs, registers.rs
pub struct Core {
    pub reg: registers::Set,
    pub pmem: PhysMem,
    pub state: State,
    pub halt_pc: u32,
    pub halt_ret: u32,
    /* perf measurement */
    pub instruction_count: u64, // the number of instructions executed since the machine was created
    pub host_time: Duration,    // the total time spent inside exec
    pub trace: bool,            // if true then display each instruction as it's executed
}

impl Core {
    pub fn new(mem_base: u32, mem_size: u32) -> Core {
        let mut core = Core {
            reg: Default::default(),
            pmem: PhysMem::new(mem_base, mem_size),
            state: State::Stop,
            halt_pc: 0,
            halt_ret: 0,
            instruction_count: 0,
            host_time: Duration::ZERO,
            trace: false,
        };
        core.reset();
        core
    }
    /// Clears the registers and points the program counter at the memory base.
    pub fn reset(&mut self) {
        self.reg.reset(self.pmem.base);
        self.state = State::Stop;
    }
    /// Loads the given raw image (or the built-in one) at the memory base.
    pub fn load(&mut self, image: Option<&str>) -> Result<usize, crate::Error> {
        let size = match image {
            Some(path) => {
                let size = self.pmem.load_image(Path::new(path))?;
                info!("The image is {}, size = {}", path, size);
                size
            }
            None => {
                info!("No image is given. Use the default built-in image.");
                let bytes: Vec<u8> = BUILTIN_IMAGE.iter().flat_map(|w| w.to_le_bytes()).collect();
                self.pmem.load_bytes(&bytes)?
            }
        };
        self.reset();
        Ok(size)
    }
    /// Only a trap with a zero halt code is a good exit.
    pub fn exit_status_bad(&self) -> bool { !(self.state == State::End && self.halt_ret == 0) }
}

impl Machine for Core {
    fn exec(&mut self, n: u64) -> Result<(), crate::Error> { Core::exec(self, n) }
    fn paddr_read(&self, addr: u32, len: usize) -> Result<u32, crate::Error> { self.pmem.read(addr, len) }
    fn reg_display(&self, out: &mut dyn io::Write) -> io::Result<()> { self.reg.display(out) }
    fn reg_value(&self, name: &str) -> Option<u32> { self.reg.get_by_name(name) }
}
