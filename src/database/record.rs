// Copyright 2023 IPQualityScore LLC
use std::net::Ipv4Addr;

use crate::{parse::Variant, utility};

/// One entry of the index: the upper bound of an address range and where its
/// description lives in the text section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct IndexRecord {
    /// Last address of the range, host order
    pub ip: u32,
    /// Offset of the description, relative to the text origin
    pub text_offset: u32,
    /// Length of the description in bytes
    pub text_length: u32,
}

/// Reads the range upper bound from the start of a record
#[inline(always)]
pub(crate) fn record_ip(bytes: &[u8]) -> u32 {
    utility::four_byte_int_be(&bytes[..4])
}

impl IndexRecord {
    /// Decodes a record from exactly `variant.record_width()` bytes
    #[inline]
    pub(crate) fn parse(bytes: &[u8], variant: Variant) -> Self {
        let text_offset = utility::three_byte_int_le(&bytes[4..7]);
        let text_length = match variant {
            Variant::Standard => u32::from(bytes[7]),
            Variant::Extended => utility::two_byte_int_be(&bytes[7..9]),
        };
        Self {
            ip: record_ip(bytes),
            text_offset,
            text_length,
        }
    }

    pub fn upper_bound(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.ip)
    }
}
