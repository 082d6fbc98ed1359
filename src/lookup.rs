// Copyright 2023 IPQualityScore LLC
use std::{net::Ipv4Addr, str::FromStr};

use tracing::trace;

use crate::{
    database::Database,
    error::{Error, Result},
    location::Location,
};

/// Resolves addresses against a borrowed [`Database`].
///
/// The engine holds no state of its own; copies of it can be handed to as
/// many threads as needed.
pub struct LookupEngine<'a, T> {
    db: &'a Database<T>,
}

impl<T> Clone for LookupEngine<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for LookupEngine<'_, T> {}

/// Parses a dotted-quad address into its host order value.
///
/// `0.0.0.0` is rejected: the format reserves it and cannot tell it apart
/// from a missing address.
pub fn parse_ip(ip: &str) -> Result<u32> {
    let addr = Ipv4Addr::from_str(ip)
        .map_err(|_| Error::InvalidInput(format!("{ip:?} is not an IPv4 address")))?;
    checked_ip(u32::from(addr))
}

fn checked_ip(ip: u32) -> Result<u32> {
    if ip == 0 {
        return Err(Error::InvalidInput("0.0.0.0 cannot be looked up".into()));
    }
    Ok(ip)
}

impl<'a, T: AsRef<[u8]>> LookupEngine<'a, T> {
    pub fn new(db: &'a Database<T>) -> Self {
        Self { db }
    }

    /// Looks up a dotted-quad IPv4 address
    pub fn locate(&self, ip: &str) -> Result<Location<'a>> {
        self.locate_numeric(parse_ip(ip)?)
    }

    pub fn locate_addr(&self, ip: Ipv4Addr) -> Result<Location<'a>> {
        self.locate_numeric(u32::from(ip))
    }

    /// Looks up an address given as a host order integer
    pub fn locate_numeric(&self, ip: u32) -> Result<Location<'a>> {
        let position = self.position(ip)?;
        self.db.location(position)
    }

    /// Index of the record whose range holds `ip`: the first record, within
    /// the address's hint bucket, whose upper bound is not below it.
    ///
    /// Every non-zero address resolves to some record; the last bucket falls
    /// back to the final record of the index.
    pub fn position(&self, ip: u32) -> Result<usize> {
        let ip = checked_ip(ip)?;
        let layout = self.db.layout();
        let data = self.db.data();

        // hints of buckets past the last record equal index_count
        let last = layout.index_count - 1;
        let bucket = layout.bucket(ip);
        let mut low = (layout.hint(data, bucket) as usize).min(last);
        let mut high = if bucket == layout.variant.bucket_count() - 1 {
            last
        } else {
            (layout.hint(data, bucket + 1) as usize).min(last)
        };

        // lower bound: ties resolve to the leftmost record
        while low < high {
            let mid = low + (high - low) / 2;
            if ip > self.db.ip_at(mid) {
                low = mid + 1;
            } else {
                high = mid;
            }
        }

        trace!(ip = %Ipv4Addr::from(ip), bucket, record = high, "resolved");
        Ok(high)
    }
}
