use std::path::Path;

use sqlx::AnyPool;

use crate::{
    BatchError,
    core::{
        job::{JobBuilder, JobInstance},
        parameters::RunIdIncrementer,
        step::{ChunkOrientedStep, StepBuilder},
    },
    item::{
        csv::csv_reader::CsvItemReaderBuilder,
        list::ListItemReader,
        rdbc::{rdbc_reader::RdbcItemReaderBuilder, rdbc_writer::RdbcItemWriterBuilder},
    },
};

use super::person::{NameLoggingWriter, Person, PersonBinder, PersonRowMapper, test_people};

pub const JOB_NAME: &str = "itemReaderJob";

const CHUNK_SIZE: u16 = 10;

type PersonStep = ChunkOrientedStep<'static, Person, Person>;

/// Reads people from a list, a CSV file and a table, then writes the list
/// into the table.
///
/// The CSV file is opened here, so a missing file fails the build.
pub fn item_reader_job(
    pool: AnyPool,
    csv_path: &Path,
    table: &str,
) -> Result<JobInstance<'static>, BatchError> {
    Ok(JobBuilder::new()
        .name(JOB_NAME)
        .incrementer(RunIdIncrementer::default())
        .start(custom_item_reader_step()?)
        .next(csv_file_step(csv_path)?)
        .next(jdbc_step(pool.clone(), table)?)
        .next(jdbc_batch_item_writer_step(pool, table)?)
        .build())
}

pub fn custom_item_reader_step() -> Result<PersonStep, BatchError> {
    StepBuilder::new("customItemReaderStep")
        .chunk::<Person>(CHUNK_SIZE)
        .reader(ListItemReader::new(test_people()))
        .writer(NameLoggingWriter)
        .build()
}

/// The first line of the file is a header and is skipped.
pub fn csv_file_step(csv_path: &Path) -> Result<PersonStep, BatchError> {
    let reader = CsvItemReaderBuilder::new()
        .lines_to_skip(1)
        .names(&["id", "name", "age", "address"])
        .from_path(csv_path)?;

    StepBuilder::new("csvFileStep")
        .chunk::<Person>(CHUNK_SIZE)
        .reader(reader)
        .writer(NameLoggingWriter)
        .build()
}

pub fn jdbc_step(pool: AnyPool, table: &str) -> Result<PersonStep, BatchError> {
    let reader = RdbcItemReaderBuilder::<Person>::new()
        .pool(pool)
        .query(&format!("select id,name,age,address from {}", table))
        .row_mapper(PersonRowMapper)
        .build()?;

    StepBuilder::new("jdbcStep")
        .chunk::<Person>(CHUNK_SIZE)
        .reader(reader)
        .writer(NameLoggingWriter)
        .build()
}

pub fn jdbc_batch_item_writer_step(pool: AnyPool, table: &str) -> Result<PersonStep, BatchError> {
    let writer = RdbcItemWriterBuilder::<Person>::new()
        .pool(pool)
        .table(table)
        .add_column("name")
        .add_column("age")
        .add_column("address")
        .item_binder(PersonBinder)
        .build()?;

    StepBuilder::new("jdbcBatchItemWriterStep")
        .chunk::<Person>(CHUNK_SIZE)
        .reader(ListItemReader::new(test_people()))
        .writer(writer)
        .build()
}
