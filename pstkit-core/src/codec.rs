//! Per-field codec table
//!
//! Decoding turns the bytes of one leaf into the value text of a pst line;
//! encoding is the exact inverse for every kind except terrain grids, which
//! live in [`crate::grid`].

use crate::constants::{MAX_TEXT_LEN, MICRO_SCALE, MILLI_SCALE, ZERO_STRING};
use crate::error::CodecError;
use crate::types::FieldKind;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use bytes::{BufMut, BytesMut};
use core::fmt::Write;

/// Decode a fixed-width leaf (every kind except strings and grids)
pub fn decode_fixed(region: &str, kind: FieldKind, bytes: &[u8]) -> Result<String, CodecError> {
    check_width(region, kind, bytes.len())?;
    let value = match kind {
        FieldKind::Int => {
            // Negative integers print as their unsigned pattern
            let v = i32::from_le_bytes(word(bytes));
            format!("{}", v as u32)
        }
        FieldKind::Hex => {
            let mut out = String::with_capacity(11);
            for (i, b) in bytes.iter().rev().enumerate() {
                if i > 0 {
                    out.push('.');
                }
                let _ = write!(out, "{:02X}", b);
            }
            out
        }
        FieldKind::Binary => format!("{:08b}", bytes[0]),
        FieldKind::Short => format!("{}", i16::from_le_bytes([bytes[0], bytes[1]])),
        FieldKind::Char | FieldKind::LowChar => format!("{}", bytes[0] as i8),
        FieldKind::MilliFloat => format_milli(i32::from_le_bytes(word(bytes))),
        FieldKind::MicroFloat => format_micro(i32::from_le_bytes(word(bytes))),
        FieldKind::Bulk => hex::encode(bytes),
        FieldKind::Zero => {
            if let Some(offset) = bytes.iter().position(|&b| b != 0) {
                return Err(CodecError::NonZeroInZeroField {
                    region: region.into(),
                    offset,
                });
            }
            String::from(ZERO_STRING)
        }
        FieldKind::Text | FieldKind::PaddedText | FieldKind::Grid(_) => {
            return Err(CodecError::KindWidthMismatch {
                region: region.into(),
                kind: kind.code().into(),
                width: bytes.len(),
            });
        }
    };
    Ok(value)
}

/// Encode the value text of a fixed-width leaf into `width` bytes
pub fn encode_fixed(
    region: &str,
    kind: FieldKind,
    width: usize,
    value: &str,
    out: &mut BytesMut,
) -> Result<(), CodecError> {
    check_width(region, kind, width)?;
    let bad = |reason: &str| CodecError::malformed(region, value, reason);
    match kind {
        FieldKind::Int => {
            let v: i64 = value.parse().map_err(|_| bad("not an integer"))?;
            if v < i64::from(i32::MIN) || v > i64::from(u32::MAX) {
                return Err(bad("out of 32-bit range"));
            }
            out.put_u32_le(v as u32);
        }
        FieldKind::Hex => {
            let groups: Vec<&str> = value.split('.').collect();
            if groups.len() != 4
                || groups
                    .iter()
                    .any(|g| g.len() != 2 || !g.bytes().all(|b| b.is_ascii_hexdigit()))
            {
                return Err(bad("expected four dotted hex bytes"));
            }
            for group in groups.iter().rev() {
                let b = u8::from_str_radix(group, 16).map_err(|_| bad("invalid hex digit"))?;
                out.put_u8(b);
            }
        }
        FieldKind::Binary => {
            if value.len() != 8 || !value.bytes().all(|b| b == b'0' || b == b'1') {
                return Err(bad("expected 8 bits"));
            }
            let b = u8::from_str_radix(value, 2).map_err(|_| bad("invalid bit string"))?;
            out.put_u8(b);
        }
        FieldKind::Short => {
            let v: i32 = value.parse().map_err(|_| bad("not an integer"))?;
            if v < i32::from(i16::MIN) || v > i32::from(u16::MAX) {
                return Err(bad("out of 16-bit range"));
            }
            out.put_u16_le(v as u16);
        }
        FieldKind::Char | FieldKind::LowChar => {
            let v: i16 = value.parse().map_err(|_| bad("not an integer"))?;
            if v < i16::from(i8::MIN) || v > i16::from(u8::MAX) {
                return Err(bad("out of 8-bit range"));
            }
            out.put_u8(v as u8);
        }
        FieldKind::MilliFloat => {
            let v = parse_fixed(value, 3, MILLI_SCALE).ok_or_else(|| bad("not a milli value"))?;
            out.put_i32_le(v);
        }
        FieldKind::MicroFloat => {
            let v = parse_fixed(value, 6, MICRO_SCALE).ok_or_else(|| bad("not a micro value"))?;
            out.put_i32_le(v);
        }
        FieldKind::Bulk => {
            let bytes = hex::decode(value).map_err(|_| bad("invalid hex"))?;
            if bytes.len() != width {
                return Err(bad("hex length does not match width"));
            }
            out.put_slice(&bytes);
        }
        FieldKind::Zero => {
            if value != ZERO_STRING {
                return Err(bad("zero fields must read zero_string"));
            }
            out.put_bytes(0, width);
        }
        FieldKind::Text | FieldKind::PaddedText | FieldKind::Grid(_) => {
            return Err(CodecError::KindWidthMismatch {
                region: region.into(),
                kind: kind.code().into(),
                width,
            });
        }
    }
    Ok(())
}

/// Render string bytes one-to-one as Latin-1, escaping bytes that would
/// break the line format
pub fn decode_text(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if b < 0x20 || b == 0x7F || b == b'\\' || b == b':' {
            let _ = write!(out, "\\x{:02x}", b);
        } else {
            out.push(char::from(b));
        }
    }
    out
}

/// Inverse of [`decode_text`]
pub fn encode_text(region: &str, value: &str) -> Result<Vec<u8>, CodecError> {
    let bad = |reason: &str| CodecError::malformed(region, value, reason);
    let mut bytes = Vec::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            let escape: String = chars.by_ref().take(3).collect();
            let digits = escape
                .strip_prefix('x')
                .filter(|d| d.len() == 2)
                .ok_or_else(|| bad("incomplete escape"))?;
            bytes.push(u8::from_str_radix(digits, 16).map_err(|_| bad("invalid escape"))?);
        } else {
            let code = u32::from(c);
            if code > 0xFF {
                return Err(bad("character outside Latin-1"));
            }
            bytes.push(code as u8);
        }
    }
    if bytes.len() > MAX_TEXT_LEN {
        return Err(CodecError::OversizedField {
            region: region.into(),
            length: bytes.len() as u64,
            limit: MAX_TEXT_LEN,
        });
    }
    Ok(bytes)
}

/// `value / 1000` with three decimals, trailing zeros and dot removed
pub fn format_milli(raw: i32) -> String {
    if raw == 0 {
        return String::from("0");
    }
    let mut text = format_scaled(raw, MILLI_SCALE, 3);
    let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
    text.truncate(trimmed);
    text
}

/// `value / 1000000` with six decimals, right-aligned to ten columns
pub fn format_micro(raw: i32) -> String {
    format!("{:>10}", format_scaled(raw, MICRO_SCALE, 6))
}

fn format_scaled(raw: i32, scale: i64, digits: usize) -> String {
    let v = i64::from(raw);
    let sign = if v < 0 { "-" } else { "" };
    let abs = v.abs();
    format!("{}{}.{:0width$}", sign, abs / scale, abs % scale, width = digits)
}

/// Parse a decimal with at most `digits` fraction digits into `value * scale`
fn parse_fixed(text: &str, digits: usize, scale: i64) -> Option<i32> {
    let text = text.trim();
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (whole, frac) = body.split_once('.').unwrap_or((body, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if frac.len() > digits
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !frac.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut fraction: i64 = if frac.is_empty() { 0 } else { frac.parse().ok()? };
    for _ in frac.len()..digits {
        fraction *= 10;
    }
    let magnitude = whole.checked_mul(scale)?.checked_add(fraction)?;
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).ok()
}

fn check_width(region: &str, kind: FieldKind, width: usize) -> Result<(), CodecError> {
    match kind.numeric_width() {
        Some(expected) if expected != width => Err(CodecError::KindWidthMismatch {
            region: region.into(),
            kind: kind.code().into(),
            width,
        }),
        _ => Ok(()),
    }
}

fn word(bytes: &[u8]) -> [u8; 4] {
    [bytes[0], bytes[1], bytes[2], bytes[3]]
}
