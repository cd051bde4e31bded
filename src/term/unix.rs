/*
Some of the code below was derived from https://github.com/console-rs with the following
license, copyright and permissions:

    The MIT License (MIT)

    Copyright (c) 2017 Armin Ronacher <armin.ronacher@active-4.com>

    Permission is hereby granted, free of charge, to any person obtaining a copy
    of this software and associated documentation files (the "Software"), to deal
    in the Software without restriction, including without limitation the rights
    to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
    copies of the Software, and to permit persons to whom the Software is
    furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in all
    copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
    OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
    SOFTWARE.
*/
use std::fs;
use std::os::unix::io::{AsRawFd, RawFd};

/// Keeps /dev/tty open for as long as we hold its descriptor.
enum Tty {
    Stdin,
    Dev(fs::File),
}

impl Tty {
    fn fd(&self) -> RawFd {
        match self {
            Tty::Stdin => libc::STDIN_FILENO,
            Tty::Dev(f) => f.as_raw_fd(),
        }
    }
}

fn tty() -> Option<Tty> {
    if unsafe { libc::isatty(libc::STDIN_FILENO) } == 1 {
        Some(Tty::Stdin)
    } else {
        fs::File::open("/dev/tty").ok().map(Tty::Dev)
    }
}

/// Returns the number of bytes that were ready on fd (0 or 1), or None on error.
fn discard_single_byte(fd: RawFd) -> Option<usize> {
    let mut pollfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    // timeout of zero means that it will not block
    let ret = unsafe { libc::poll(&mut pollfd as *mut _, 1, 0) };
    if ret < 0 {
        return None;
    }
    if pollfd.revents & libc::POLLIN == 0 {
        return Some(0);
    }
    let mut buf: [u8; 1] = [0];
    let read = unsafe { libc::read(fd, buf.as_mut_ptr() as *mut _, 1) };
    if read <= 0 { None } else { Some(1) }
}

pub fn init() {
    // intentionally left blank
}

/// Discards everything currently waiting on the terminal and returns how many bytes were dropped.
pub fn flush_keyboard_input() -> usize {
    let mut dropped = 0;
    if let Some(tty) = tty() {
        let fd = tty.fd();
        while let Some(1) = discard_single_byte(fd) {
            dropped += 1;
        }
    }
    dropped
}
