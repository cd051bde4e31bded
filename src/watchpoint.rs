/// Number of watchpoints the pool can hold.
pub const NR_WP: usize = 32;

/// A single watchpoint slot. Only allocation is supported; nothing arms them yet.
#[derive(Debug, Default)]
pub struct Watchpoint {
    pub no: usize,
}

/// Fixed pool of watchpoints split into a free list and an active list.
#[derive(Debug)]
pub struct Pool {
    free: Vec<Watchpoint>,
    active: Vec<Watchpoint>,
}

impl Pool {
    pub fn new() -> Pool {
        Pool {
            // reversed so that pop() hands out the lowest number first
            free: (0..NR_WP).rev().map(|no| Watchpoint { no }).collect(),
            active: Vec::new(),
        }
    }
    pub fn capacity(&self) -> usize { self.free.len() + self.active.len() }
    pub fn free_count(&self) -> usize { self.free.len() }
    pub fn active_count(&self) -> usize { self.active.len() }
    /// Number of the watchpoint the next allocation would hand out.
    pub fn next_free(&self) -> Option<usize> { self.free.last().map(|wp| wp.no) }
}
