// Copyright 2023 IPQualityScore LLC
use std::{fmt, iter::FusedIterator, net::Ipv4Addr};

use crate::{
    database::Database,
    error::{Error, Result},
};

/// Description text of an address range, borrowed from the database buffer.
///
/// Extended databases pack several columns (country, region, city, ...) into
/// one tab separated string; [`Location::fields`] splits them.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location<'a> {
    text: &'a str,
}

impl<'a> Location<'a> {
    /// Wraps raw description bytes. The text ends at the first NUL byte, if any.
    pub(crate) fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
        let text = std::str::from_utf8(&bytes[..end])
            .map_err(|err| Error::CorruptData(format!("description is not UTF-8: {err}")))?;
        Ok(Self { text })
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.text.as_bytes()
    }

    /// Tab separated columns of the description
    pub fn fields(&self) -> impl Iterator<Item = &'a str> {
        self.text.split('\t')
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Debug for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.text, f)
    }
}

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

impl AsRef<str> for Location<'_> {
    fn as_ref(&self) -> &str {
        self.text
    }
}

#[cfg(feature = "json")]
impl serde::Serialize for Location<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.text)
    }
}

/// One record of the index with its resolved description
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct Entry<'a> {
    /// Last address of the range
    pub upper_bound: Ipv4Addr,
    pub location: Location<'a>,
}

impl fmt::Display for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t\t{}", self.upper_bound, self.location)
    }
}

/// Walks every index record in order, see [`Database::entries`]
pub struct Entries<'a, T> {
    db: &'a Database<T>,
    next: usize,
    end: usize,
}

impl<'a, T: AsRef<[u8]>> Entries<'a, T> {
    pub(crate) fn new(db: &'a Database<T>) -> Self {
        Self {
            db,
            next: 0,
            end: db.index_count(),
        }
    }

    fn entry(&self, n: usize) -> Result<Entry<'a>> {
        Ok(Entry {
            upper_bound: Ipv4Addr::from(self.db.ip_at(n)),
            location: self.db.location(n)?,
        })
    }
}

impl<'a, T: AsRef<[u8]>> Iterator for Entries<'a, T> {
    type Item = Result<Entry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let n = self.next;
        self.next += 1;
        Some(self.entry(n))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.next = self.next.saturating_add(n).min(self.end);
        self.next()
    }
}

impl<'a, T: AsRef<[u8]>> DoubleEndedIterator for Entries<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        self.end -= 1;
        Some(self.entry(self.end))
    }
}

impl<T: AsRef<[u8]>> ExactSizeIterator for Entries<'_, T> {}

impl<T: AsRef<[u8]>> FusedIterator for Entries<'_, T> {}
