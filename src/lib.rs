#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # Spring Batch tutorial

 Four small batch jobs walking through the building blocks of a batch
 application: jobs made of steps, tasklets, execution contexts, run
 parameters and chunk-oriented processing with readers, processors and
 writers.

 ## Core Concepts

- **Job:** the whole batch process, a named sequence of `Step`s run in order.
- **Step:** one phase of a job. Either a `Tasklet` called until it reports it
  is finished, or a chunk-oriented read-process-write loop.
- **ItemReader:** supplies the input of a chunk step, one item at a time.
- **ItemProcessor:** business logic applied to every item read.
- **ItemWriter:** receives the processed items one chunk at a time.
- **JobParameters:** the typed parameters of a run. A `RunIdIncrementer` adds
  a `run.id` so every launch is a new run.
- **ExecutionContext:** key/value state owned by a job run or by a step run.

 ## Jobs

 + `helloJob`: logs a greeting from a tasklet.
 + `shareJob`: shows what a step can see of the job and step contexts.
 + `chunkProcessingJob`: the same hundred items handled by a paging tasklet,
   then by a chunk step. Both honour the `chunkSize` parameter.
 + `itemReaderJob`: people read from a list, a CSV file and a SQL table, then
   inserted in batch into the table.

 ## Features

 | **Feature**   | **Description**                                         |
 |---------------|---------------------------------------------------------|
 | csv           | Enables the CSV `ItemReader`                            |
 | logger        | Enables the logger `ItemWriter`                         |
 | rdbc          | Enables the SQL `ItemReader` and `ItemWriter` over sqlx |
 | rdbc-sqlite   | `rdbc` with the SQLite driver                           |
 | rdbc-postgres | `rdbc` with the PostgreSQL driver                       |
 | rdbc-mysql    | `rdbc` with the MySQL driver                            |
 | cli           | Command line launcher                                   |
 | full          | Enables all features except `rdbc-mysql`                |

 ## Example

 ```
 use spring_batch_tutorial::core::{launcher::JobLauncher, parameters::JobParameters};
 use spring_batch_tutorial::jobs::register_demo_jobs;

 let mut launcher = JobLauncher::new();
 register_demo_jobs(&mut launcher).unwrap();

 let parameters = JobParameters::from_args(["chunkSize=20"]).unwrap();
 let execution = launcher.run("chunkProcessingJob", parameters).unwrap();

 assert_eq!(execution.parameters.get_long("run.id"), Some(1));
 ```
 */

/// Core module for batch operations
pub mod core;

/// Error types for batch operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of items readers / writers  (for example: csv reader and sql writer)
pub mod item;

/// The tutorial jobs
pub mod jobs;

/// Application configuration file
pub mod config;
