use windows::Win32::System::Console::*;

pub fn init() {
    unsafe {
        // make sure VT escape sequences will be honored in the console
        let mut cm: CONSOLE_MODE = CONSOLE_MODE::default();
        if let Ok(h) = GetStdHandle(STD_OUTPUT_HANDLE) {
            GetConsoleMode(h, &mut cm as *mut CONSOLE_MODE);
            if (cm.0 & 0x4) == 0 {
                cm.0 |= 0x4;
                SetConsoleMode(h, cm);
            }
        }
    }
}

/// Discards all pending console input events.
/// The console does not report how many were dropped, so this always returns 0.
pub fn flush_keyboard_input() -> usize {
    unsafe {
        if let Ok(h) = GetStdHandle(STD_INPUT_HANDLE) {
            FlushConsoleInputBuffer(h);
        }
    }
    0
}
