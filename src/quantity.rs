// Copyright (c) 2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

//! Parsing of resource quantities as written in workload manifests, e.g.
//! "500m" CPUs or "200Mi" of memory.
//!
//! Fractions that do not fall on a whole unit are rounded up, so "0.0001"
//! CPU is one millicore and "1.5" bytes is two.

use crate::manager::error::{Error, Result};

pub const KB: u128 = 1000;
pub const MB: u128 = 1000 * KB;
pub const GB: u128 = 1000 * MB;
pub const TB: u128 = 1000 * GB;
pub const PB: u128 = 1000 * TB;
pub const EB: u128 = 1000 * PB;

#[allow(non_upper_case_globals)]
pub const KiB: u128 = 1024;
#[allow(non_upper_case_globals)]
pub const MiB: u128 = 1024 * KiB;
#[allow(non_upper_case_globals)]
pub const GiB: u128 = 1024 * MiB;
#[allow(non_upper_case_globals)]
pub const TiB: u128 = 1024 * GiB;
#[allow(non_upper_case_globals)]
pub const PiB: u128 = 1024 * TiB;
#[allow(non_upper_case_globals)]
pub const EiB: u128 = 1024 * PiB;

/// Parse a CPU quantity into millicores: "250m" is 250, "2" is 2000 and
/// "0.5" is 500.
pub fn parse_cpu_millis(s: &str) -> Result<u64> {
    let s = s.trim();
    let (number, multiplier) = match s.strip_suffix('m') {
        Some(number) => (number, 1),
        None => (s, 1000),
    };

    scale(s, number, multiplier)
}

/// Parse a memory quantity into bytes. Binary ("Ki", "Mi", ..., "Ei") and
/// decimal ("k", "M", ..., "E") suffixes are accepted, as is a bare number
/// of bytes.
pub fn parse_memory_bytes(s: &str) -> Result<u64> {
    let s = s.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or_else(|| s.len());
    let (number, suffix) = s.split_at(split);

    let multiplier = match suffix {
        "" => 1,
        "k" => KB,
        "M" => MB,
        "G" => GB,
        "T" => TB,
        "P" => PB,
        "E" => EB,
        "Ki" => KiB,
        "Mi" => MiB,
        "Gi" => GiB,
        "Ti" => TiB,
        "Pi" => PiB,
        "Ei" => EiB,
        _ => return Err(Error::InvalidQuantity(s.to_string())),
    };

    scale(s, number, multiplier)
}

// Multiply the decimal `number` by `multiplier`, rounding up.
fn scale(quantity: &str, number: &str, multiplier: u128) -> Result<u64> {
    let invalid = || Error::InvalidQuantity(quantity.to_string());

    let (int_part, frac_part) = match number.split_once('.') {
        Some((i, f)) => (i, f),
        None => (number, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac_part.len() > 18 {
        return Err(invalid());
    }

    let digits = format!("{}{}", int_part, frac_part);
    let mantissa: u128 = digits.parse().map_err(|_| invalid())?;
    let divisor = 10u128.pow(frac_part.len() as u32);

    let value = mantissa.checked_mul(multiplier).ok_or_else(invalid)?;
    let value = value / divisor + u128::from(value % divisor != 0);

    if value > u64::MAX as u128 {
        return Err(invalid());
    }
    Ok(value as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cpu_millis() {
        assert_eq!(parse_cpu_millis("500m").unwrap(), 500);
        assert_eq!(parse_cpu_millis("2").unwrap(), 2000);
        assert_eq!(parse_cpu_millis("0.5").unwrap(), 500);
        assert_eq!(parse_cpu_millis("1.25").unwrap(), 1250);
        assert_eq!(parse_cpu_millis(" 100m ").unwrap(), 100);
        assert_eq!(parse_cpu_millis("0").unwrap(), 0);
        // Sub-millicore precision rounds up.
        assert_eq!(parse_cpu_millis("0.0001").unwrap(), 1);
    }

    #[test]
    fn test_parse_cpu_millis_invalid() {
        assert!(parse_cpu_millis("").is_err());
        assert!(parse_cpu_millis("m").is_err());
        assert!(parse_cpu_millis("abc").is_err());
        assert!(parse_cpu_millis("-1").is_err());
        assert!(parse_cpu_millis("1.2.3").is_err());
        assert!(parse_cpu_millis("2Gi").is_err());
    }

    #[test]
    fn test_parse_memory_bytes() {
        assert_eq!(parse_memory_bytes("128974848").unwrap(), 128974848);
        assert_eq!(parse_memory_bytes("200Mi").unwrap(), 200 * 1024 * 1024);
        assert_eq!(parse_memory_bytes("1Gi").unwrap(), 1 << 30);
        assert_eq!(parse_memory_bytes("1G").unwrap(), 1_000_000_000);
        assert_eq!(parse_memory_bytes("129M").unwrap(), 129_000_000);
        assert_eq!(parse_memory_bytes("1.5Ki").unwrap(), 1536);
        assert_eq!(parse_memory_bytes("1.5").unwrap(), 2);
    }

    #[test]
    fn test_parse_memory_bytes_invalid() {
        assert!(parse_memory_bytes("").is_err());
        assert!(parse_memory_bytes("Mi").is_err());
        assert!(parse_memory_bytes("12x").is_err());
        // Suffixes are case sensitive.
        assert!(parse_memory_bytes("1mi").is_err());
        assert!(parse_memory_bytes("1K").is_err());
        // Does not fit in 64 bits.
        assert!(parse_memory_bytes("100Ei").is_err());
    }

    #[test]
    fn test_parse_quantity_rounding_near_u128_max() {
        // The mantissa is u128::MAX; rounding up must not wrap to zero.
        let quantity = "340282366920938463463.374607431768211455";

        assert!(matches!(
            parse_memory_bytes(quantity),
            Err(Error::InvalidQuantity(q)) if q == quantity
        ));
        assert!(parse_cpu_millis("340282366920938463463374607431768211.455m").is_err());
        assert_eq!(parse_memory_bytes("0.000000000000000001").unwrap(), 1);
    }
}
