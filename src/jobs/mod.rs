//! The tutorial jobs.
//!
//! | Job                  | Steps                                                                 |
//! |----------------------|-----------------------------------------------------------------------|
//! | `helloJob`           | `helloStep`                                                           |
//! | `shareJob`           | `shareStep`, `shareStep2`                                             |
//! | `chunkProcessingJob` | `taskBaseStep`, `chunkBaseStep`                                       |
//! | `itemReaderJob`      | `customItemReaderStep`, `csvFileStep`, `jdbcStep`, `jdbcBatchItemWriterStep` |
//!
//! Every job carries a [`RunIdIncrementer`](crate::core::parameters::RunIdIncrementer).

use crate::{BatchError, core::launcher::JobLauncher};

pub mod chunk_processing;
pub mod hello;
#[cfg(all(feature = "csv", feature = "rdbc"))]
pub mod item_reader;
#[cfg(feature = "rdbc")]
pub mod person;
pub mod shared;

/// Job parameter read by `chunkProcessingJob` for its page and chunk size.
pub const CHUNK_SIZE_KEY: &str = "chunkSize";

pub const DEFAULT_CHUNK_SIZE: u16 = 10;

/// Registers the jobs that need no external resource.
pub fn register_demo_jobs(launcher: &mut JobLauncher<'static>) -> Result<(), BatchError> {
    launcher.register(hello::hello_job())?;
    launcher.register(shared::share_job())?;
    launcher.register(chunk_processing::chunk_processing_job()?)?;
    Ok(())
}

/// Builds a launcher holding every tutorial job.
///
/// `itemReaderJob` is only registered when a pool is given.
#[cfg(all(feature = "csv", feature = "rdbc"))]
pub fn registry(
    config: &crate::config::AppConfig,
    pool: Option<sqlx::AnyPool>,
) -> Result<JobLauncher<'static>, BatchError> {
    let mut launcher = JobLauncher::new();
    register_demo_jobs(&mut launcher)?;

    match pool {
        Some(pool) => launcher.register(item_reader::item_reader_job(
            pool,
            &config.csv_path,
            &config.person_table,
        )?)?,
        None => log::info!(
            "No database configured, {} is not registered",
            item_reader::JOB_NAME
        ),
    }

    Ok(launcher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_jobs_are_registered_in_order() {
        let mut launcher = JobLauncher::new();

        register_demo_jobs(&mut launcher).unwrap();

        assert_eq!(
            launcher.job_names(),
            vec!["helloJob", "shareJob", "chunkProcessingJob"]
        );
    }
}
