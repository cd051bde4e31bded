use super::args::{step_count, DumpRequest};
use super::{find_command, Flow, Sdb, CMD_TABLE};
use crate::error::Error;
use crate::machine::RUN_FOREVER;
use std::io::Write;

pub fn cmd_help(sdb: &mut Sdb<'_>, args: Option<&str>) -> Result<Flow, Error> {
    // only the first word names the command
    match args.and_then(|a| a.split_whitespace().next()) {
        None => {
            for cmd in CMD_TABLE {
                writeln!(sdb.out, "{} - {}", cmd.name, cmd.description)?;
            }
        }
        Some(name) => match find_command(name) {
            Some(cmd) => writeln!(sdb.out, "{} - {}", cmd.name, cmd.description)?,
            None => writeln!(sdb.out, "Unknown command '{}'", name)?,
        },
    }
    Ok(Flow::Continue)
}

pub fn cmd_c(sdb: &mut Sdb<'_>, _args: Option<&str>) -> Result<Flow, Error> {
    sdb.machine.exec(RUN_FOREVER)?;
    Ok(Flow::Continue)
}

pub fn cmd_q(_sdb: &mut Sdb<'_>, _args: Option<&str>) -> Result<Flow, Error> { Ok(Flow::Quit) }

pub fn cmd_si(sdb: &mut Sdb<'_>, args: Option<&str>) -> Result<Flow, Error> {
    sdb.machine.exec(step_count(args))?;
    Ok(Flow::Continue)
}

pub fn cmd_info(sdb: &mut Sdb<'_>, args: Option<&str>) -> Result<Flow, Error> {
    match args.map(str::trim) {
        None | Some("") => writeln!(sdb.out, "info: missing argument (expected r or w)")?,
        Some("r") => sdb.machine.reg_display(sdb.out)?,
        Some("w") => {
            let pool = &sdb.watchpoints;
            return Err(unimplemented_err!(format!(
                "watchpoints are not implemented yet ({} in use, {} free, next #{})",
                pool.active_count(),
                pool.free_count(),
                pool.next_free().map_or("-".to_string(), |n| n.to_string())
            )));
        }
        Some(other) => writeln!(sdb.out, "info: unknown argument [{}]", other)?,
    }
    Ok(Flow::Continue)
}

/// Prints `count` words as rows of four bytes: each byte in hex, then the same four bytes in decimal.
pub fn cmd_x(sdb: &mut Sdb<'_>, args: Option<&str>) -> Result<Flow, Error> {
    let req = match DumpRequest::parse(args)? {
        Some(req) => req,
        None => return Ok(Flow::Continue),
    };
    let total = req.count as u64 * 4;
    writeln!(sdb.out, "{}\t\t{:<34}{:<32}", "addr", "hex", "dec")?;
    write!(sdb.out, "{}:\t", req.label)?;
    let mut group = [0u8; 4];
    for i in 1..=total {
        let b = sdb.machine.paddr_read(req.address.wrapping_add((i - 1) as u32), 1)? as u8;
        group[((i - 1) % 4) as usize] = b;
        if i % 4 != 0 {
            write!(sdb.out, "0x{:<4x} ", b)?;
            continue;
        }
        write!(sdb.out, "0x{:<4x}\t", b)?;
        for d in group {
            write!(sdb.out, "{:<4} ", d)?;
        }
        writeln!(sdb.out)?;
        if i == total {
            writeln!(sdb.out)?;
        } else {
            write!(sdb.out, "0x{:x}:\t", req.address.wrapping_add(i as u32))?;
        }
    }
    if total == 0 {
        writeln!(sdb.out)?;
    }
    Ok(Flow::Continue)
}

fn print_expr(sdb: &mut Sdb<'_>, args: Option<&str>, hex: bool) -> Result<Flow, Error> {
    let text = args.unwrap_or("");
    match sdb.evaluator.expr(&*sdb.machine, text) {
        Ok(v) if hex => writeln!(sdb.out, "{} = {:#010x}", text, v)?,
        Ok(v) => writeln!(sdb.out, "{} = {}", text, v)?,
        // a failed evaluation prints nothing
        Err(e) => verbose_println!("p: {}", e),
    }
    Ok(Flow::Continue)
}

pub fn cmd_p(sdb: &mut Sdb<'_>, args: Option<&str>) -> Result<Flow, Error> { print_expr(sdb, args, false) }

pub fn cmd_px(sdb: &mut Sdb<'_>, args: Option<&str>) -> Result<Flow, Error> { print_expr(sdb, args, true) }
