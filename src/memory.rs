use crate::error::Error;
use std::{fs::File, io::Read, path::Path};

/// Simulated physical memory: one contiguous block starting at `base`.
pub struct PhysMem {
    pub base: u32,
    mem: Vec<u8>,
}

impl PhysMem {
    pub fn new(base: u32, size: u32) -> PhysMem {
        PhysMem {
            base,
            mem: vec![0; size as usize],
        }
    }

    fn in_pmem(&self, addr: u32, len: usize) -> Option<usize> {
        let offset = addr.checked_sub(self.base)? as usize;
        if offset.checked_add(len)? <= self.mem.len() {
            Some(offset)
        } else {
            None
        }
    }
    fn out_of_bound(&self, addr: u32) -> Error {
        memory_err!(
            "address = {:#010x} is out of bound of pmem [{:#010x}, {:#010x}]",
            addr,
            self.base,
            (self.base as u64 + self.mem.len() as u64).saturating_sub(1)
        )
    }
    // reads 1, 2 or 4 bytes, little endian
    pub fn read(&self, addr: u32, len: usize) -> Result<u32, Error> {
        if !matches!(len, 1 | 2 | 4) {
            return Err(general_err!(format!("invalid read size {}", len)));
        }
        let offset = self.in_pmem(addr, len).ok_or_else(|| self.out_of_bound(addr))?;
        let mut word = 0u32;
        for (i, b) in self.mem[offset..offset + len].iter().enumerate() {
            word |= (*b as u32) << (i * 8);
        }
        Ok(word)
    }
    pub fn write(&mut self, addr: u32, len: usize, data: u32) -> Result<(), Error> {
        if !matches!(len, 1 | 2 | 4) {
            return Err(general_err!(format!("invalid write size {}", len)));
        }
        let offset = self.in_pmem(addr, len).ok_or_else(|| self.out_of_bound(addr))?;
        for (i, b) in self.mem[offset..offset + len].iter_mut().enumerate() {
            *b = (data >> (i * 8)) as u8;
        }
        Ok(())
    }
    /// load_bytes copies bytes into memory starting at the base address
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<usize, Error> {
        if bytes.len() > self.mem.len() {
            return Err(memory_err!(
                "image overflowed physical memory ({} bytes, memory is {} bytes)",
                bytes.len(),
                self.mem.len()
            ));
        }
        self.mem[..bytes.len()].copy_from_slice(bytes);
        Ok(bytes.len())
    }
    /// load_image reads a raw binary file into memory starting at the base address
    pub fn load_image(&mut self, path: &Path) -> Result<usize, Error> {
        let mut bytes = Vec::new();
        File::open(path)?.read_to_end(&mut bytes)?;
        let extent = self.load_bytes(&bytes)?;
        verbose_println!("loaded {} bytes at {:#010x} from \"{}\"", extent, self.base, path.display());
        Ok(extent)
    }
}
