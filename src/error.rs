use thiserror::Error;

#[derive(Error, Debug)]
/// Batch error
pub enum BatchError {
    #[error("ItemWriter from: {0}")]
    ItemWriter(String),

    #[error("ItemReader from: {0}")]
    ItemReader(String),

    #[error("ItemProcessor from: {0}")]
    ItemProcessor(String),

    #[error("Tasklet from: {0}")]
    Tasklet(String),

    #[error("Error occurred in step: {0}")]
    Step(String),

    #[error("Invalid job parameter: {0}")]
    JobParameter(String),

    #[error("No job registered with name: {0}")]
    JobNotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
