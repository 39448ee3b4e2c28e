use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
};

use log::debug;
use sqlx::{Any, Pool, QueryBuilder, any::AnyRow};

use crate::{
    BatchError,
    core::item::{ItemReader, ItemReaderResult},
};

use super::block_on;

/// Maps one result row to an item.
pub trait RdbcRowMapper<T> {
    fn map_row(&self, row: &AnyRow) -> Result<T, BatchError>;
}

impl<T, F> RdbcRowMapper<T> for F
where
    F: Fn(&AnyRow) -> Result<T, BatchError>,
{
    fn map_row(&self, row: &AnyRow) -> Result<T, BatchError> {
        self(row)
    }
}

/// Reads items from the result of a SQL query.
///
/// Without a fetch size the whole result is loaded on the first read. With a
/// fetch size the query is paged with `LIMIT`/`OFFSET`, one page per buffer
/// refill, until a page comes back short. Opening the reader starts over from
/// the first row.
pub struct RdbcItemReader<'a, T> {
    pool: Pool<Any>,
    query: String,
    fetch_size: Option<usize>,
    offset: Cell<usize>,
    row_mapper: Box<dyn RdbcRowMapper<T> + 'a>,
    buffer: RefCell<VecDeque<T>>,
    exhausted: Cell<bool>,
}

impl<T> RdbcItemReader<'_, T> {
    fn read_page(&self) -> Result<(), BatchError> {
        let mut query_builder = QueryBuilder::<Any>::new(self.query.as_str());

        if let Some(fetch_size) = self.fetch_size {
            query_builder.push(format!(" LIMIT {} OFFSET {}", fetch_size, self.offset.get()));
        }

        let rows = block_on(query_builder.build().fetch_all(&self.pool))
            .map_err(BatchError::ItemReader)?;

        debug!("Fetched {} rows at offset {}", rows.len(), self.offset.get());

        match self.fetch_size {
            Some(fetch_size) if rows.len() == fetch_size => {
                self.offset.set(self.offset.get() + rows.len())
            }
            _ => self.exhausted.set(true),
        }

        let mut buffer = self.buffer.borrow_mut();
        for row in &rows {
            buffer.push_back(self.row_mapper.map_row(row)?);
        }

        Ok(())
    }
}

impl<T> ItemReader<T> for RdbcItemReader<'_, T> {
    fn read(&self) -> ItemReaderResult<T> {
        if self.buffer.borrow().is_empty() && !self.exhausted.get() {
            self.read_page()?;
        }

        Ok(self.buffer.borrow_mut().pop_front())
    }

    /// Rewinds to the first row, the query runs again on the next read.
    fn open(&self) -> Result<(), BatchError> {
        self.buffer.borrow_mut().clear();
        self.offset.set(0);
        self.exhausted.set(false);
        Ok(())
    }
}

pub struct RdbcItemReaderBuilder<'a, T> {
    pool: Option<Pool<Any>>,
    query: Option<String>,
    fetch_size: Option<usize>,
    row_mapper: Option<Box<dyn RdbcRowMapper<T> + 'a>>,
}

impl<T> Default for RdbcItemReaderBuilder<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> RdbcItemReaderBuilder<'a, T> {
    pub fn new() -> Self {
        Self {
            pool: None,
            query: None,
            fetch_size: None,
            row_mapper: None,
        }
    }

    /// Number of rows fetched per page.
    pub fn fetch_size(mut self, fetch_size: usize) -> Self {
        self.fetch_size = Some(fetch_size);
        self
    }

    pub fn query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }

    pub fn pool(mut self, pool: Pool<Any>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn row_mapper(mut self, row_mapper: impl RdbcRowMapper<T> + 'a) -> Self {
        self.row_mapper = Some(Box::new(row_mapper));
        self
    }

    /// # Errors
    ///
    /// `BatchError::Configuration` when the pool, the query or the row mapper
    /// is missing, or when the fetch size is zero.
    pub fn build(self) -> Result<RdbcItemReader<'a, T>, BatchError> {
        let missing = |what: &str| BatchError::Configuration(format!("{} is mandatory", what));

        if self.fetch_size == Some(0) {
            return Err(BatchError::Configuration(
                "fetch size must be greater than zero".to_string(),
            ));
        }

        Ok(RdbcItemReader {
            pool: self.pool.ok_or_else(|| missing("pool"))?,
            query: self.query.ok_or_else(|| missing("query"))?,
            fetch_size: self.fetch_size,
            offset: Cell::new(0),
            row_mapper: self.row_mapper.ok_or_else(|| missing("row mapper"))?,
            buffer: RefCell::new(VecDeque::new()),
            exhausted: Cell::new(false),
        })
    }
}
