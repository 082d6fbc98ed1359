// Copyright 2023 IPQualityScore LLC
use std::path::Path;

use crate::{error::Error, error::Result, utility};

// the header starts with the big endian offset of the text section
const TEXT_OFFSET_BYTES: usize = 4;
// index record: 4 byte ip, 3 byte text offset, then the text length
const IP_BYTES: usize = 4;
const TEXT_OFFSET_FIELD_BYTES: usize = 3;

/// On-disk layout of a 17MON database.
///
/// Both variants share the same structure; they differ only in how many
/// leading bytes of an address key the hint table and in the width of the
/// text length field of each index record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub enum Variant {
    /// `.dat` files: 256 hint buckets, 1 byte text lengths
    #[default]
    Standard,
    /// `.datx` files: 65536 hint buckets, 2 byte big endian text lengths
    Extended,
}

impl Variant {
    /// Picks the variant from a file extension, `.datx` being extended
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension() {
            Some(ext) if ext.eq_ignore_ascii_case("datx") => Variant::Extended,
            _ => Variant::Standard,
        }
    }

    /// Number of leading address bytes used as hint key; also the width of
    /// the text length field
    pub const fn hint_bucket_width(self) -> usize {
        match self {
            Variant::Standard => 1,
            Variant::Extended => 2,
        }
    }

    pub const fn bucket_count(self) -> usize {
        1 << (8 * self.hint_bucket_width())
    }

    /// Size in bytes of the hint table, and of the reserved area after the index
    pub const fn hint_table_size(self) -> usize {
        4 * self.bucket_count()
    }

    /// Size in bytes of one index record
    pub const fn record_width(self) -> usize {
        IP_BYTES + TEXT_OFFSET_FIELD_BYTES + self.hint_bucket_width()
    }

    pub const fn is_extended(self) -> bool {
        matches!(self, Variant::Extended)
    }
}

/// Geometry decoded from the header. Every field is an offset or a count
/// into the raw buffer; nothing is copied out of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Layout {
    pub variant: Variant,
    pub index_start: usize,
    pub index_count: usize,
    pub text_start: usize,
}

impl Layout {
    pub fn parse(data: &[u8], variant: Variant) -> Result<Self> {
        let hint_size = variant.hint_table_size();
        let index_start = TEXT_OFFSET_BYTES + hint_size;
        if data.len() < index_start {
            return Err(Error::Format(format!(
                "file holds {} bytes, header needs {index_start}",
                data.len()
            )));
        }

        let text_start = utility::four_byte_int_be(&data[..TEXT_OFFSET_BYTES]) as usize;
        if text_start > data.len() {
            return Err(Error::Format(format!(
                "text section starts at {text_start}, past the end of a {} byte file",
                data.len()
            )));
        }

        // a reserved area as large as the hint table follows the index
        let index_bytes = text_start
            .checked_sub(index_start + hint_size)
            .ok_or_else(|| {
                Error::Format(format!(
                    "text section starts at {text_start}, inside the header or reserved area"
                ))
            })?;
        let record_width = variant.record_width();
        if index_bytes == 0 {
            return Err(Error::Format("index section is empty".into()));
        }
        if index_bytes % record_width != 0 {
            return Err(Error::Format(format!(
                "index section of {index_bytes} bytes is not a multiple of {record_width} byte records"
            )));
        }

        let layout = Layout {
            variant,
            index_start,
            index_count: index_bytes / record_width,
            text_start,
        };
        layout.check_hints(data)?;
        Ok(layout)
    }

    /// The hint table must start at zero and never decrease. Buckets past the
    /// last record hold `index_count`, so that is the largest valid hint.
    fn check_hints(&self, data: &[u8]) -> Result<()> {
        let mut previous = 0;
        for bucket in 0..self.variant.bucket_count() {
            let hint = self.hint(data, bucket);
            if bucket == 0 && hint != 0 {
                return Err(Error::Format(format!("first hint is {hint}, expected 0")));
            }
            if hint < previous {
                return Err(Error::Format(format!(
                    "hint table decreases at bucket {bucket} ({previous} -> {hint})"
                )));
            }
            if hint as usize > self.index_count {
                return Err(Error::Format(format!(
                    "hint for bucket {bucket} points at record {hint} of {}",
                    self.index_count
                )));
            }
            previous = hint;
        }
        Ok(())
    }

    /// Bytes the hint table occupies; also the text-origin shift
    #[inline(always)]
    pub fn hint_size(&self) -> usize {
        self.variant.hint_table_size()
    }

    /// Reads hint `bucket`. Callers keep `bucket` below `bucket_count`, which
    /// `parse` has checked fits in the buffer.
    #[inline(always)]
    pub fn hint(&self, data: &[u8], bucket: usize) -> u32 {
        let at = TEXT_OFFSET_BYTES + 4 * bucket;
        utility::four_byte_int_le(&data[at..at + 4])
    }

    /// Index of the hint bucket holding `ip`
    #[inline(always)]
    pub fn bucket(&self, ip: u32) -> usize {
        (ip >> (32 - 8 * self.variant.hint_bucket_width())) as usize
    }
}
