use clap::Parser;
use clap_num::maybe_hex;
use lazy_static::lazy_static;

#[derive(Parser, Debug)]
#[command(author,version,about,long_about=None)]
pub struct Args {
    /// Raw binary image to load at the memory base (a built-in image is used if omitted)
    pub image: Option<String>,

    /// Run the program to completion without the interactive monitor
    #[arg(short, long)]
    pub batch: bool,

    /// Write executed instructions and diagnostics to this log file
    #[arg(short, long)]
    pub log: Option<String>,

    /// Physical address at which memory (and the image) begins (hex ok with '0x')
    #[arg(long,value_parser=maybe_hex::<u32>, default_value_t=0x8000_0000_u32)]
    pub mem_base: u32,

    /// Size of physical memory in bytes (hex ok with '0x')
    #[arg(long,value_parser=maybe_hex::<u32>, default_value_t=0x0800_0000_u32)]
    pub mem_size: u32,

    /// Drain pending keyboard input before dispatching each command
    #[arg(long)]
    pub device: bool,

    /// Trace each machine instruction as it is executed
    #[arg(short, long)]
    pub trace: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

lazy_static! {
    pub static ref ARGS: Args = if cfg!(test) {
        // manually set parameters for running tests
        Args::parse_from(["test"])
    } else {
        Args::parse()
    };
}

pub fn init() {
    if let Some(path) = ARGS.log.as_ref() {
        match crate::logger::global().open(path) {
            Ok(()) => info!("Logging to {}", path),
            Err(e) => warn!("Failed to open log file {}: {}", path, e),
        }
    }
}
pub fn batch() -> bool { ARGS.batch }
pub fn trace() -> bool { ARGS.trace }
pub fn device() -> bool { ARGS.device }
