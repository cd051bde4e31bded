#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub(crate) use unix::*;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub(crate) use self::windows::*;

use crate::machine::EventQueue;

/// The terminal keyboard acting as the machine's input device.
/// Anything typed while the monitor was busy is stale by the time the next command runs.
#[derive(Debug, Default)]
pub struct Keyboard;

impl EventQueue for Keyboard {
    fn clear(&mut self) {
        let dropped = flush_keyboard_input();
        if dropped > 0 {
            verbose_println!("discarded {} pending keyboard byte(s)", dropped);
        }
    }
}
