use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Terminator, Trim};
use serde::de::DeserializeOwned;
use std::{
    cell::{Cell, RefCell},
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use crate::{
    core::item::{ItemReader, ItemReaderResult},
    error::BatchError,
};

type ReopenFn<R> = Box<dyn Fn() -> Result<StringRecordsIntoIter<R>, BatchError>>;

/// A CSV item reader that implements the `ItemReader` trait.
///
/// This reader deserializes CSV data into Rust structs row by row
/// using Serde's deserialization capabilities. It can process CSV
/// data from files, strings, or any source implementing the `Read` trait.
///
/// # Implementation Details
///
/// - Uses a `RefCell` to provide interior mutability for the CSV record iterator
/// - Skips the configured number of leading records before the first item
/// - Maps fields by name when column names are known, by position otherwise
/// - A reader built with `from_path` reopens its file on `open` once it has
///   been read from, so every step execution starts from the first record.
///   Readers over an arbitrary `Read` source cannot be rewound.
pub struct CsvItemReader<R> {
    /// Iterator over the CSV records
    records: RefCell<StringRecordsIntoIter<R>>,
    /// Column names used to deserialize records
    headers: Option<StringRecord>,
    lines_to_skip: usize,
    /// Leading records still to be skipped
    to_skip: Cell<usize>,
    reopen: Option<ReopenFn<R>>,
    started: Cell<bool>,
}

impl<R: Read> CsvItemReader<R> {
    fn skip_leading_lines(&self) -> Result<(), BatchError> {
        while self.to_skip.get() > 0 {
            self.to_skip.set(self.to_skip.get() - 1);
            if let Some(Err(error)) = self.records.borrow_mut().next() {
                return Err(BatchError::ItemReader(error.to_string()));
            }
        }
        Ok(())
    }
}

impl<R: Read, T: DeserializeOwned> ItemReader<T> for CsvItemReader<R> {
    /// Reads the next item from the CSV source.
    ///
    /// # Returns
    /// - `Ok(Some(record))` if a record is successfully read
    /// - `Ok(None)` if there are no more records to read
    /// - `Err(BatchError::ItemReader(error))` if an error occurs during reading or deserialization
    fn read(&self) -> ItemReaderResult<T> {
        self.started.set(true);
        self.skip_leading_lines()?;

        let next = self.records.borrow_mut().next();

        match next {
            Some(Ok(string_record)) => string_record
                .deserialize(self.headers.as_ref())
                .map(Some)
                .map_err(|error| BatchError::ItemReader(error.to_string())),
            Some(Err(error)) => Err(BatchError::ItemReader(error.to_string())),
            // No more records in the CSV source
            None => Ok(None),
        }
    }

    fn open(&self) -> Result<(), BatchError> {
        if !self.started.get() {
            return Ok(());
        }

        if let Some(reopen) = &self.reopen {
            *self.records.borrow_mut() = reopen()?;
            self.to_skip.set(self.lines_to_skip);
            self.started.set(false);
        }

        Ok(())
    }
}

/// A builder for configuring CSV item reading.
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Terminator: CRLF (accepts `\n`, `\r` and `\r\n`)
/// - Headers: disabled
/// - Lines to skip: none
/// - Trimming: All fields trimmed
#[derive(Default, Clone)]
pub struct CsvItemReaderBuilder {
    /// The delimiter character (default: comma ',')
    delimiter: u8,
    /// The line terminator (default: CRLF)
    terminator: Terminator,
    /// Whether the CSV has headers (default: false)
    has_headers: bool,
    lines_to_skip: usize,
    names: Option<Vec<String>>,
}

impl CsvItemReaderBuilder {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            terminator: Terminator::CRLF,
            has_headers: false,
            lines_to_skip: 0,
            names: None,
        }
    }

    /// Sets the delimiter character for the CSV parsing.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the line terminator for the CSV parsing.
    pub fn terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = terminator;
        self
    }

    /// Sets whether the first row holds column names.
    ///
    /// When enabled, the first row is not returned as an item and its names
    /// are used for deserialization unless [`names`](Self::names) is set.
    pub fn has_headers(mut self, yes: bool) -> Self {
        self.has_headers = yes;
        self
    }

    /// Number of records to discard before the first item, after the header row if any.
    pub fn lines_to_skip(mut self, lines_to_skip: usize) -> Self {
        self.lines_to_skip = lines_to_skip;
        self
    }

    /// Declares the column names, in file order, used to map fields.
    pub fn names(mut self, names: &[&str]) -> Self {
        self.names = Some(names.iter().map(|name| name.to_string()).collect());
        self
    }

    fn reader_builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .trim(Trim::All) // Trim whitespace from all fields
            .delimiter(self.delimiter)
            .terminator(self.terminator)
            .has_headers(self.has_headers)
            .flexible(false); // Use strict parsing to catch formatting errors
        builder
    }

    fn build<R: Read>(
        self,
        mut rdr: csv::Reader<R>,
        reopen: Option<ReopenFn<R>>,
    ) -> CsvItemReader<R> {
        let headers = match &self.names {
            Some(names) => Some(StringRecord::from(names.clone())),
            None if self.has_headers => rdr.headers().ok().cloned(),
            None => None,
        };

        CsvItemReader {
            records: RefCell::new(rdr.into_records()),
            headers,
            lines_to_skip: self.lines_to_skip,
            to_skip: Cell::new(self.lines_to_skip),
            reopen,
            started: Cell::new(false),
        }
    }

    fn open_path(&self, path: &Path) -> Result<csv::Reader<File>, BatchError> {
        self.reader_builder().from_path(path).map_err(|error| {
            BatchError::ItemReader(format!("cannot open {}: {}", path.display(), error))
        })
    }

    /// Creates a `CsvItemReader` from any source implementing `Read`.
    pub fn from_reader<R: Read>(self, rdr: R) -> CsvItemReader<R> {
        let rdr = self.reader_builder().from_reader(rdr);
        self.build(rdr, None)
    }

    /// Creates a `CsvItemReader` reading the UTF-8 file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::ItemReader` if the file cannot be opened.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<CsvItemReader<File>, BatchError> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let rdr = self.open_path(&path)?;

        let builder = self.clone();
        let reopen: ReopenFn<File> =
            Box::new(move || Ok(builder.open_path(&path)?.into_records()));

        Ok(self.build(rdr, Some(reopen)))
    }
}
