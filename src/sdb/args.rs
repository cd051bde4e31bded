//! Argument grammars for the commands that take structured arguments.
//!
//! Numbers are read the way an operator expects from a C-style monitor:
//! leading digits count, trailing garbage is ignored.
use crate::error::Error;

/// Reads an optionally signed decimal integer from the start of `s`, skipping leading whitespace.
/// Returns None if there are no digits.
pub fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end]
        .bytes()
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add((d - b'0') as i64));
    Some(if negative { -magnitude } else { magnitude })
}

/// Reads leading hex digits; anything else ends the number. No digits reads as 0.
pub fn leading_hex(s: &str) -> u32 {
    s.chars()
        .map_while(|c| c.to_digit(16))
        .fold(0u32, |acc, d| acc.wrapping_shl(4) | d)
}

/// `x N 0xADDR`: dump N four-byte words starting at ADDR.
#[derive(Debug, PartialEq, Eq)]
pub struct DumpRequest {
    /// number of words
    pub count: u32,
    pub address: u32,
    /// the address exactly as the operator typed it
    pub label: String,
}

impl DumpRequest {
    /// Parses the `x` arguments.
    /// Ok(None) means an argument is missing and the command does nothing.
    /// An address without the 0x prefix is an error that ends the session.
    pub fn parse(args: Option<&str>) -> Result<Option<DumpRequest>, Error> {
        let mut tokens = args.unwrap_or("").split_whitespace();
        let (count, addr) = match (tokens.next(), tokens.next()) {
            (Some(count), Some(addr)) => (count, addr),
            _ => return Ok(None),
        };
        let hex = match addr.strip_prefix("0x") {
            Some(hex) if !hex.is_empty() => hex,
            _ => return Err(syntax_err!("x: the address must start with 0x, got \"{}\"", addr)),
        };
        let count = leading_int(count).unwrap_or(0).clamp(0, u32::MAX as i64) as u32;
        Ok(Some(DumpRequest {
            count,
            address: leading_hex(hex),
            label: addr.to_string(),
        }))
    }
}

/// `si [N]`: N defaults to 1 when absent or unparsable.
/// A negative N wraps to the unsigned step count, i.e. runs until the machine halts.
pub fn step_count(args: Option<&str>) -> u64 { args.and_then(leading_int).map_or(1, |n| n as u64) }
