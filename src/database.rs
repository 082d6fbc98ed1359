// Copyright 2023 IPQualityScore LLC
use std::{net::Ipv4Addr, path::Path};

pub mod record;

use record::IndexRecord;
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    location::{Entries, Location},
    lookup::LookupEngine,
    parse::{Layout, Variant},
};

/// A 17MON database loaded into memory.
///
/// The buffer is owned for the lifetime of the database and never modified,
/// so a `Database` can be shared between threads and queried concurrently.
/// Index records and descriptions are decoded from the buffer on demand.
pub struct Database<T = Vec<u8>> {
    data: T,
    layout: Layout,
}

impl Database<Vec<u8>> {
    /// Reads the file at `path` into memory and decodes its header
    /// ```no_run
    /// use iploc::{Database, Variant};
    /// let db = Database::open("17monipdb.datx", Variant::Extended)?;
    /// # Ok::<(), iploc::Error>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P, variant: Variant) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|err| {
            warn!(path = %path.display(), %err, "cannot read database");
            err
        })?;
        let db = Self::from_bytes(data, variant)?;
        debug!(
            path = %path.display(),
            ?variant,
            index_count = db.layout.index_count,
            text_start = db.layout.text_start,
            bytes = db.byte_len(),
            "loaded database"
        );
        Ok(db)
    }

    /// Like [`Database::open`], with the variant taken from the file
    /// extension: `.datx` files are extended, anything else is standard
    pub fn open_inferred<P: AsRef<Path>>(path: P) -> Result<Self> {
        let variant = Variant::from_path(&path);
        Self::open(path, variant)
    }
}

impl<T: AsRef<[u8]>> Database<T> {
    /// Decodes a database already held in memory
    /// ```
    /// use iploc::{Database, Variant};
    /// let err = Database::from_bytes(vec![0u8; 16], Variant::Standard).err();
    /// assert!(matches!(err, Some(iploc::Error::Format(_))));
    /// ```
    pub fn from_bytes(data: T, variant: Variant) -> Result<Self> {
        let layout = Layout::parse(data.as_ref(), variant).map_err(|err| {
            warn!(?variant, %err, "rejected database");
            err
        })?;
        Ok(Self { data, layout })
    }

    /// Releases the database. Dropping it has the same effect.
    pub fn close(self) {
        drop(self)
    }

    pub fn variant(&self) -> Variant {
        self.layout.variant
    }

    /// Number of records in the index
    pub fn index_count(&self) -> usize {
        self.layout.index_count
    }

    /// Size of the loaded file in bytes
    pub fn byte_len(&self) -> usize {
        self.data.as_ref().len()
    }

    /// Offset of the first description byte within the file
    pub fn text_section_offset(&self) -> usize {
        self.layout.text_start
    }

    /// The hint table, one entry per bucket in bucket order
    pub fn hint_table(&self) -> impl ExactSizeIterator<Item = u32> + '_ {
        let data = self.data.as_ref();
        (0..self.layout.variant.bucket_count()).map(move |bucket| self.layout.hint(data, bucket))
    }

    /// Decodes the `n`th index record
    pub fn record(&self, n: usize) -> Result<IndexRecord> {
        if n >= self.layout.index_count {
            return Err(Error::InvalidInput(format!(
                "record {n} requested from an index of {}",
                self.layout.index_count
            )));
        }
        Ok(IndexRecord::parse(self.record_bytes(n), self.layout.variant))
    }

    /// Raw description bytes of the `n`th record, cut neither at NUL nor
    /// checked for UTF-8, for databases whose text is not UTF-8
    pub fn text_bytes(&self, n: usize) -> Result<&[u8]> {
        let record = self.record(n)?;
        self.text(&record)
    }

    /// Looks up a dotted-quad IPv4 address
    /// ```no_run
    /// # let db = iploc::Database::open("17monipdb.dat", iploc::Variant::Standard)?;
    /// let location = db.locate("8.8.8.8")?;
    /// for field in location.fields() {
    ///     println!("{field}");
    /// }
    /// # Ok::<(), iploc::Error>(())
    /// ```
    pub fn locate(&self, ip: &str) -> Result<Location<'_>> {
        self.engine().locate(ip)
    }

    /// Looks up an address given as a host order integer
    pub fn locate_numeric(&self, ip: u32) -> Result<Location<'_>> {
        self.engine().locate_numeric(ip)
    }

    pub fn locate_addr(&self, ip: Ipv4Addr) -> Result<Location<'_>> {
        self.engine().locate_addr(ip)
    }

    /// A lookup engine borrowing this database
    pub fn engine(&self) -> LookupEngine<'_, T> {
        LookupEngine::new(self)
    }

    /// Iterates over every record in index order. Each call starts over.
    pub fn entries(&self) -> Entries<'_, T> {
        Entries::new(self)
    }

    pub(crate) fn layout(&self) -> &Layout {
        &self.layout
    }

    pub(crate) fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    /// Raw bytes of record `n`; `parse` guarantees the whole index is in bounds
    #[inline(always)]
    pub(crate) fn record_bytes(&self, n: usize) -> &[u8] {
        let width = self.layout.variant.record_width();
        let start = self.layout.index_start + n * width;
        &self.data.as_ref()[start..start + width]
    }

    /// Range upper bound of record `n`
    #[inline(always)]
    pub(crate) fn ip_at(&self, n: usize) -> u32 {
        record::record_ip(self.record_bytes(n))
    }

    /// Bounds checked view into the buffer
    pub(crate) fn slice(&self, start: usize, len: usize) -> Result<&[u8]> {
        let data = self.data.as_ref();
        start
            .checked_add(len)
            .and_then(|end| data.get(start..end))
            .ok_or_else(|| {
                Error::CorruptData(format!(
                    "{len} bytes at offset {start} exceed the {} byte buffer",
                    data.len()
                ))
            })
    }

    /// Description bytes referenced by `record`.
    ///
    /// Stored offsets are relative to an origin one hint table before the
    /// text section.
    pub(crate) fn text(&self, record: &IndexRecord) -> Result<&[u8]> {
        let start = (self.layout.text_start + record.text_offset as usize)
            .checked_sub(self.layout.hint_size())
            .ok_or_else(|| {
                Error::CorruptData(format!(
                    "text offset {} of record {} lies before the text section",
                    record.text_offset,
                    Ipv4Addr::from(record.ip)
                ))
            })?;
        self.slice(start, record.text_length as usize)
    }

    /// Description of record `n` as a [`Location`]
    pub(crate) fn location(&self, n: usize) -> Result<Location<'_>> {
        let record = IndexRecord::parse(self.record_bytes(n), self.layout.variant);
        Location::from_bytes(self.text(&record)?)
    }
}

impl<T> std::fmt::Debug for Database<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("variant", &self.layout.variant)
            .field("index_count", &self.layout.index_count)
            .field("text_start", &self.layout.text_start)
            .finish()
    }
}
