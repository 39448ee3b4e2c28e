use log::debug;
use sqlx::{Any, Pool, QueryBuilder, query_builder::Separated};

use crate::{
    BatchError,
    core::item::{ItemWriter, ItemWriterResult},
};

use super::block_on;

// SQLite caps host parameters at 32766 since 3.32; MySQL allows more.
const BIND_LIMIT: usize = 32766;

/// Pushes the values of one item, in column order, into an `INSERT` row.
pub trait RdbcItemBinder<W> {
    fn bind(&self, item: &W, query_builder: Separated<'_, '_, Any, &'static str>);
}

/// Writes each chunk with multi-row `INSERT INTO table (columns) VALUES ...`
/// statements, split so no statement exceeds the bind parameter limit.
pub struct RdbcItemWriter<'a, W> {
    pool: Pool<Any>,
    table: String,
    columns: Vec<String>,
    item_binder: Box<dyn RdbcItemBinder<W> + 'a>,
}

impl<W> RdbcItemWriter<'_, W> {
    fn insert(&self, items: &[W]) -> Result<u64, String> {
        let mut query_builder = QueryBuilder::<Any>::new("INSERT INTO ");

        query_builder.push(&self.table);
        query_builder.push(" (");
        query_builder.push(self.columns.join(","));
        query_builder.push(") ");

        query_builder.push_values(items, |separated, item| {
            self.item_binder.bind(item, separated);
        });

        let result = block_on(query_builder.build().execute(&self.pool))?;

        Ok(result.rows_affected())
    }
}

impl<W> ItemWriter<W> for RdbcItemWriter<'_, W> {
    fn write(&self, items: &[W]) -> ItemWriterResult {
        let rows_per_statement = BIND_LIMIT / self.columns.len();

        for batch in items.chunks(rows_per_statement) {
            let inserted = self.insert(batch).map_err(BatchError::ItemWriter)?;
            debug!("Inserted {} rows into {}", inserted, self.table);
        }

        Ok(())
    }
}

pub struct RdbcItemWriterBuilder<'a, W> {
    pool: Option<Pool<Any>>,
    table: Option<String>,
    columns: Vec<String>,
    item_binder: Option<Box<dyn RdbcItemBinder<W> + 'a>>,
}

impl<W> Default for RdbcItemWriterBuilder<'_, W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, W> RdbcItemWriterBuilder<'a, W> {
    pub fn new() -> Self {
        Self {
            pool: None,
            table: None,
            columns: Vec::new(),
            item_binder: None,
        }
    }

    pub fn table(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    pub fn pool(mut self, pool: Pool<Any>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn item_binder(mut self, item_binder: impl RdbcItemBinder<W> + 'a) -> Self {
        self.item_binder = Some(Box::new(item_binder));
        self
    }

    pub fn add_column(mut self, column: &str) -> Self {
        self.columns.push(column.to_string());
        self
    }

    /// # Errors
    ///
    /// `BatchError::Configuration` when the pool, the table, the binder or
    /// every column is missing.
    pub fn build(self) -> Result<RdbcItemWriter<'a, W>, BatchError> {
        let missing = |what: &str| BatchError::Configuration(format!("{} is mandatory", what));

        if self.columns.is_empty() {
            return Err(BatchError::Configuration(
                "one or more columns are required".to_string(),
            ));
        }

        Ok(RdbcItemWriter {
            pool: self.pool.ok_or_else(|| missing("pool"))?,
            table: self.table.ok_or_else(|| missing("table name"))?,
            columns: self.columns,
            item_binder: self.item_binder.ok_or_else(|| missing("item binder"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NameBinder;

    impl RdbcItemBinder<String> for NameBinder {
        fn bind(&self, item: &String, mut query_builder: Separated<'_, '_, Any, &'static str>) {
            query_builder.push_bind(item.clone());
        }
    }

    #[test]
    fn builder_requires_columns() {
        let result = RdbcItemWriterBuilder::new()
            .table("person")
            .item_binder(NameBinder)
            .build();

        match result {
            Err(BatchError::Configuration(message)) => {
                assert_eq!(message, "one or more columns are required")
            }
            _ => panic!("expected a configuration error"),
        }
    }

    #[test]
    fn builder_requires_a_pool() {
        let result = RdbcItemWriterBuilder::new()
            .table("person")
            .add_column("name")
            .item_binder(NameBinder)
            .build();

        assert!(matches!(result, Err(BatchError::Configuration(_))));
    }
}
