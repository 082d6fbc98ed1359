// Copyright 2023 IPQualityScore LLC
//! # 17MON IP Database Reader
//!
//! The iploc library crate resolves IPv4 addresses against 17MON geolocation
//! databases, both the standard `.dat` layout and the extended `.datx` layout.
//!
//! The whole file is read into memory once; every lookup afterwards is a
//! read-only, allocation-free walk over that buffer: a hint table keyed by the
//! leading byte(s) of the address narrows the search to one bucket, and a
//! binary search over the sorted index finds the record whose range covers it.
//!
//! ```no_run
//! use iploc::{Database, Variant};
//!
//! let db = Database::open("17monipdb.dat", Variant::Standard)?;
//! let location = db.locate("8.8.8.8")?;
//! println!("{location}");
//! # Ok::<(), iploc::Error>(())
//! ```

pub mod database;
pub mod error;
pub mod location;
pub mod lookup;
mod parse;

pub use database::record::IndexRecord;
pub use database::Database;
pub use error::{Error, Result};
pub use location::{Entries, Entry, Location};
pub use lookup::LookupEngine;
pub use parse::Variant;

mod utility {
    // interpret two bytes as a Big Endian unsigned integer
    pub(crate) fn two_byte_int_be(bytes: &[u8]) -> u32 {
        let mut buffer = [0u8; 2];
        buffer.copy_from_slice(&bytes[..2]);

        u32::from(u16::from_be_bytes(buffer))
    }
    // interpret three bytes as a Little Endian unsigned integer
    pub(crate) fn three_byte_int_le(bytes: &[u8]) -> u32 {
        let mut buffer = [0u8; 4];
        buffer[..3].copy_from_slice(&bytes[..3]);

        u32::from_le_bytes(buffer)
    }
    // interpret four bytes as a Big Endian unsigned integer
    pub(crate) fn four_byte_int_be(bytes: &[u8]) -> u32 {
        let mut buffer = [0u8; 4];
        buffer.copy_from_slice(&bytes[..4]);

        u32::from_be_bytes(buffer)
    }
    // interpret four bytes as a Little Endian unsigned integer
    pub(crate) fn four_byte_int_le(bytes: &[u8]) -> u32 {
        let mut buffer = [0u8; 4];
        buffer.copy_from_slice(&bytes[..4]);

        u32::from_le_bytes(buffer)
    }

}

// the shared fixture encoder names the crate by its external path
#[cfg(test)]
extern crate self as iploc;

#[cfg(test)]
#[path = "../tests/common/mod.rs"]
mod common;
