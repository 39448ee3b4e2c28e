use log::info;
use serde::{Deserialize, Serialize};
use sqlx::{Any, Row, any::AnyRow, query_builder::Separated};

use crate::{
    BatchError,
    core::item::{ItemWriter, ItemWriterResult},
    item::rdbc::{rdbc_reader::RdbcRowMapper, rdbc_writer::RdbcItemBinder},
};

/// A row of the `person` table and of the CSV fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub age: String,
    pub address: String,
}

impl Person {
    pub fn new(id: i32, name: &str, age: &str, address: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            age: age.to_string(),
            address: address.to_string(),
        }
    }
}

/// The ten people `Person(i + 1, "test name{i}", "test age", "test address")`.
pub fn test_people() -> Vec<Person> {
    (0..10)
        .map(|i| Person::new(i + 1, &format!("test name{}", i), "test age", "test address"))
        .collect()
}

#[derive(Default)]
pub struct PersonRowMapper;

impl RdbcRowMapper<Person> for PersonRowMapper {
    fn map_row(&self, row: &AnyRow) -> Result<Person, BatchError> {
        let to_error = |error: sqlx::Error| BatchError::ItemReader(error.to_string());

        let id: i64 = row.try_get("id").map_err(to_error)?;

        Ok(Person {
            id: i32::try_from(id)
                .map_err(|_| BatchError::ItemReader(format!("person id {} out of range", id)))?,
            name: row.try_get("name").map_err(to_error)?,
            age: row.try_get("age").map_err(to_error)?,
            address: row.try_get("address").map_err(to_error)?,
        })
    }
}

/// Binds `name`, `age` and `address`; the id is left to the database.
#[derive(Default)]
pub struct PersonBinder;

impl RdbcItemBinder<Person> for PersonBinder {
    fn bind(&self, item: &Person, mut query_builder: Separated<'_, '_, Any, &'static str>) {
        query_builder.push_bind(item.name.clone());
        query_builder.push_bind(item.age.clone());
        query_builder.push_bind(item.address.clone());
    }
}

/// Logs the names of each chunk on one line, comma separated.
#[derive(Default)]
pub struct NameLoggingWriter;

impl NameLoggingWriter {
    pub fn names(items: &[Person]) -> String {
        items
            .iter()
            .map(|person| person.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl ItemWriter<Person> for NameLoggingWriter {
    fn write(&self, items: &[Person]) -> ItemWriterResult {
        info!("{}", Self::names(items));
        Ok(())
    }
}
