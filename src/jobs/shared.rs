use log::info;

use crate::core::{
    context::ExecutionContext,
    job::{JobBuilder, JobInstance},
    parameters::{RUN_ID_KEY, RunIdIncrementer},
    step::StepBuilder,
    tasklet::{RepeatStatus, TaskletStep},
};

pub const JOB_NAME: &str = "shareJob";

pub const JOB_KEY: &str = "jobKey";
pub const STEP_KEY: &str = "stepKey";

/// Two tasklet steps showing what each execution context shares.
///
/// `shareStep` stores a value in its own step context and one in the job
/// context. `shareStep2` then sees the job value but not the step value, which
/// belonged to the previous step's execution.
pub fn share_job() -> JobInstance<'static> {
    JobBuilder::new()
        .name(JOB_NAME)
        .incrementer(RunIdIncrementer::default())
        .start(share_step())
        .next(share_step2())
        .build()
}

pub fn share_step() -> TaskletStep<'static> {
    StepBuilder::new("shareStep")
        .tasklet_fn(|contribution| {
            contribution
                .step_context()
                .put_string(STEP_KEY, "step execution context");
            contribution
                .job_context()
                .put_string(JOB_KEY, "job execution context");

            info!(
                "jobName : {}, stepName : {}, parameter :{}",
                contribution.job_name(),
                contribution.step_name(),
                contribution.job_parameters().get_long_or(RUN_ID_KEY, 0)
            );

            Ok(RepeatStatus::Finished)
        })
        .build()
}

/// Formats what a step sees of the two contexts, with the defaults used when
/// a key is absent.
pub fn describe_contexts(job_context: &ExecutionContext, step_context: &ExecutionContext) -> String {
    format!(
        "jobKey : {}, stepKey : {}",
        job_context.get_string_or(JOB_KEY, "emptyJobKey"),
        step_context.get_string_or(STEP_KEY, "emptyStepKey")
    )
}

pub fn share_step2() -> TaskletStep<'static> {
    StepBuilder::new("shareStep2")
        .tasklet_fn(|contribution| {
            info!(
                "{}",
                describe_contexts(
                    &contribution.job_execution().execution_context,
                    &contribution.step_execution().execution_context
                )
            );

            Ok(RepeatStatus::Finished)
        })
        .build()
}
