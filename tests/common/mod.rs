// Copyright 2023 IPQualityScore LLC
//! Fixture databases for unit tests, integration tests and benchmarks.
#![allow(dead_code)]

use std::io::Write;

use iploc::Variant;
use rand::Rng;
use tempfile::NamedTempFile;

/// Encodes sorted `(upper bound, description)` ranges in the 17MON layout
pub fn build<S: AsRef<str>>(variant: Variant, ranges: &[(u32, S)]) -> Vec<u8> {
    let width = variant.hint_bucket_width();
    let hint_size = variant.hint_table_size();
    let bucket_of = |ip: u32| (ip >> (32 - 8 * width)) as usize;

    // hint[b] is the first record whose bucket is at least b, or the record
    // count when there is none
    let mut hints = Vec::with_capacity(variant.bucket_count());
    let mut record = 0;
    for bucket in 0..variant.bucket_count() {
        while record < ranges.len() && bucket_of(ranges[record].0) < bucket {
            record += 1;
        }
        hints.push(record as u32);
    }

    let mut index = Vec::with_capacity(ranges.len() * variant.record_width());
    let mut text = Vec::new();
    for (ip, description) in ranges {
        let description = description.as_ref().as_bytes();
        index.extend_from_slice(&ip.to_be_bytes());
        // stored offsets count from one hint table before the text section
        let stored = (text.len() + hint_size) as u32;
        index.extend_from_slice(&stored.to_le_bytes()[..3]);
        match variant {
            Variant::Standard => index.push(description.len() as u8),
            Variant::Extended => {
                index.extend_from_slice(&(description.len() as u16).to_be_bytes())
            }
        }
        text.extend_from_slice(description);
    }

    let text_start = (4 + hint_size + index.len() + hint_size) as u32;
    let mut out = Vec::with_capacity(text_start as usize + text.len());
    out.extend_from_slice(&text_start.to_be_bytes());
    for hint in hints {
        out.extend_from_slice(&hint.to_le_bytes());
    }
    out.extend_from_slice(&index);
    out.resize(out.len() + hint_size, 0);
    out.extend_from_slice(&text);
    out
}

/// Writes a fixture database to a temporary file with the given extension
pub fn write_temp<S: AsRef<str>>(
    variant: Variant,
    ranges: &[(u32, S)],
    suffix: &str,
) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile()?;
    file.write_all(&build(variant, ranges))?;
    file.flush()?;
    Ok(file)
}

/// Ranges covering the whole address space, a few per bucket
pub fn sample() -> Vec<(u32, &'static str)> {
    vec![
        (0x00ff_ffff, "IANA\tReserved"),
        (0x0101_01ff, "Australia\tQueensland\tBrisbane"),
        (0x0808_0807, "United States\tCalifornia"),
        (0x0808_0808, "Example ISP"),
        (0x0aff_ffff, "LAN"),
        (0x7eff_ffff, "United States"),
        (0x7fff_ffff, "Loopback"),
        (0xc0a8_ffff, "Private\tNetwork"),
        (0xdfff_ffff, "Somewhere"),
        (0xffff_ffff, "Reserved"),
    ]
}

/// `count` random ranges with distinct upper bounds, the last one ending at
/// `255.255.255.255`
pub fn random_ranges(rng: &mut impl Rng, count: usize) -> Vec<(u32, String)> {
    let mut bounds: Vec<u32> = (1..count).map(|_| rng.gen_range(1..u32::MAX)).collect();
    bounds.sort_unstable();
    bounds.dedup();
    bounds.push(u32::MAX);
    bounds
        .into_iter()
        .enumerate()
        .map(|(n, ip)| (ip, format!("Region {n}\tCity {}", ip >> 16)))
        .collect()
}

/// Reference answer: the first range whose upper bound is not below `ip`
pub fn expected<S: AsRef<str>>(ranges: &[(u32, S)], ip: u32) -> &str {
    let n = ranges.partition_point(|(bound, _)| *bound < ip);
    ranges[n.min(ranges.len() - 1)].1.as_ref()
}
