macro_rules! verbose_println {
    ($($p:expr),+) => {
        if (crate::config::ARGS.verbose) {
            println!($($p),+);
        }
    }
}
// Explicit carriage returns because the device layer may leave the tty in a
// state where a bare LF does not return the cursor.
macro_rules! info {
    ($($p:expr),+) => {
        println!(concat!(blue!("INFO"),": {}\r"),format_args!($($p),+))
    }
}

macro_rules! warn {
    ($($p:expr),+) => {{
        log_file!(Warn, $($p),+);
        println!(concat!(red!("WARNING"),": {}\r"),format_args!($($p),+))
    }}
}
macro_rules! log_file {
    ($level:ident, $($p:expr),+) => {
        crate::logger::write(crate::logger::Level::$level, format!($($p),+).as_str())
    };
}
macro_rules! general_err {
    ($msg:expr) => {
        crate::error::Error::new(crate::error::ErrorKind::General, None, format!("{}", $msg).as_str())
    };
}
macro_rules! syntax_err {
    ($($msg:expr),*) => {
        crate::error::Error::new(
            crate::error::ErrorKind::Syntax,
            None,
            format!("{} {}", red!("Syntax Error"), format!($($msg),*)).as_str(),
        )
    };
}
macro_rules! memory_err {
    ($($msg:expr),*) => {
        crate::error::Error::new(
            crate::error::ErrorKind::Memory,
            None,
            format!("{} {}", red!("Memory Error"), format!($($msg),*)).as_str(),
        )
    };
}
macro_rules! unimplemented_err {
    ($msg:expr) => {
        crate::error::Error::new(
            crate::error::ErrorKind::Unimplemented,
            None,
            format!("{} {}", red!("Not Implemented"), $msg).as_str(),
        )
    };
}
macro_rules! bits {
    ($val:expr, $hi:expr, $lo:expr) => {
        ((($val) >> ($lo)) & ((1u32 << (($hi) - ($lo) + 1)) - 1))
    };
}
macro_rules! color {
    ($color: literal, $msg: expr) => {
        concat!("\x1b[", $color, "m", $msg, "\x1b[0m")
    };
}
macro_rules! red {
    ($msg:expr) => {
        color!(91, $msg)
    };
}
macro_rules! green {
    ($msg:expr) => {
        color!(92, $msg)
    };
}
macro_rules! blue {
    ($msg:expr) => {
        color!(94, $msg)
    };
}
