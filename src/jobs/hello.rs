use log::info;

use crate::core::{
    job::{JobBuilder, JobInstance},
    parameters::RunIdIncrementer,
    step::StepBuilder,
    tasklet::{RepeatStatus, TaskletStep},
};

pub const JOB_NAME: &str = "helloJob";

/// A single tasklet step saying hello.
pub fn hello_job() -> JobInstance<'static> {
    JobBuilder::new()
        .name(JOB_NAME)
        .incrementer(RunIdIncrementer::default())
        .start(hello_step())
        .build()
}

pub fn hello_step() -> TaskletStep<'static> {
    StepBuilder::new("helloStep")
        .tasklet_fn(|_| {
            info!("hello spring batch");
            Ok(RepeatStatus::Finished)
        })
        .build()
}
