//! Command-line value input
//!
//! Turns `--value` text into element payloads according to the requested
//! registry type.

use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bcd::value;
use bcd::RegType;

/// Split a numeric literal into digits and radix: `0x` prefix is hex
///
/// Only bare digits are accepted; signs and `0X` are rejected.
fn radix_of(text: &str) -> Result<(&str, u32), String> {
    let (digits, radix) = match text.strip_prefix("0x") {
        Some(hex) => (hex, 16),
        None => (text, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(format!("invalid number {text:?}"));
    }
    Ok((digits, radix))
}

/// Parse a decimal or `0x` hexadecimal 32-bit literal
pub fn parse_u32(text: &str) -> Result<u32, String> {
    let (digits, radix) = radix_of(text)?;
    u32::from_str_radix(digits, radix).map_err(|e| format!("invalid 32-bit number {text:?}: {e}"))
}

/// Parse a decimal or `0x` hexadecimal 64-bit literal
pub fn parse_u64(text: &str) -> Result<u64, String> {
    let (digits, radix) = radix_of(text)?;
    u64::from_str_radix(digits, radix).map_err(|e| format!("invalid 64-bit number {text:?}: {e}"))
}

fn first(values: &[String], kind: RegType) -> Result<&str> {
    values
        .first()
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{kind} needs a --value"))
}

/// Encode `--value` arguments as a payload of type `kind`
pub fn encode_input(kind: RegType, values: &[String]) -> Result<Vec<u8>> {
    Ok(match kind {
        RegType::None => Vec::new(),
        RegType::Sz => value::encode_sz(first(values, kind)?),
        RegType::MultiSz => value::encode_multi_sz(values),
        RegType::Binary => STANDARD
            .decode(first(values, kind)?)
            .context("RegBinary value is not base64")?,
        RegType::Dword => {
            let number = parse_u32(first(values, kind)?).map_err(|e| anyhow!(e))?;
            value::encode_dword(number)
        }
        RegType::Qword => {
            let number = parse_u64(first(values, kind)?).map_err(|e| anyhow!(e))?;
            value::encode_qword(number)
        }
        other => bail!("not supported type: {other}"),
    })
}

/// Decode a `--raw` payload
pub fn decode_raw(text: &str) -> Result<Vec<u8>> {
    STANDARD.decode(text).context("--raw is not base64")
}
