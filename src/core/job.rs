use std::time::{Duration, Instant};

use log::{error, info};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    context::ExecutionContext,
    parameters::{JobParameters, JobParametersIncrementer},
    step::{Step, StepExecution},
};

/// Type alias for job execution results.
///
/// A `JobResult` is a `Result` that contains either:
/// - A successful `JobExecution` with execution details
/// - A `BatchError` indicating what went wrong
pub type JobResult<T> = Result<T, BatchError>;

/// Represents a job that can be executed.
///
/// A job is a named container for a sequence of steps executed in order.
/// Its name is the key a [`JobLauncher`](super::launcher::JobLauncher) uses to
/// find it, and its optional incrementer makes every launch a distinct run.
pub trait Job {
    fn name(&self) -> &str;

    /// Computes the parameters of the next run, if this job has one.
    fn incrementer(&self) -> Option<&dyn JobParametersIncrementer>;

    /// Runs the job with the given parameters.
    ///
    /// # Returns
    /// - `Ok(JobExecution)` when every step succeeded
    /// - `Err(BatchError::Step)` naming the first step that failed
    fn run(&self, parameters: JobParameters) -> JobResult<JobExecution>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Status of a job prior to its execution.
    Starting,
    /// Status of a job that is running.
    Started,
    /// The job has successfully completed its execution.
    Completed,
    /// Status of a job that has failed during its execution.
    Failed,
}

/// Represents the execution of a job.
///
/// Besides timing, it carries the parameters of the run, the execution context
/// shared by its steps and the executions of the steps that ran.
#[derive(Debug)]
pub struct JobExecution {
    pub id: Uuid,
    pub job_name: String,
    pub parameters: JobParameters,
    pub status: BatchStatus,
    /// The time when the job started executing
    pub start: Instant,
    /// The time when the job finished executing
    pub end: Instant,
    /// The total duration of the job execution
    pub duration: Duration,
    /// State visible to every step of this run
    pub execution_context: ExecutionContext,
    pub step_executions: Vec<StepExecution>,
}

impl JobExecution {
    pub fn new(job_name: &str, parameters: JobParameters) -> Self {
        let now = Instant::now();
        Self {
            id: Uuid::new_v4(),
            job_name: job_name.to_string(),
            parameters,
            status: BatchStatus::Starting,
            start: now,
            end: now,
            duration: Duration::default(),
            execution_context: ExecutionContext::new(),
            step_executions: Vec::new(),
        }
    }

    /// Records the final status and stops the clock.
    pub fn finish(&mut self, status: BatchStatus) {
        self.status = status;
        self.end = Instant::now();
        self.duration = self.end.duration_since(self.start);
    }

    pub fn step_execution(&self, name: &str) -> Option<&StepExecution> {
        self.step_executions.iter().find(|step| step.name == name)
    }
}

/// Represents an instance of a job.
///
/// A `JobInstance` contains:
/// - A unique identifier
/// - A name for the job
/// - An optional parameters incrementer
/// - A sequence of steps to be executed
pub struct JobInstance<'a> {
    /// Unique identifier for this job instance
    id: Uuid,
    /// Human-readable name for the job
    name: String,
    incrementer: Option<Box<dyn JobParametersIncrementer + 'a>>,
    /// Collection of steps that make up this job, in execution order
    steps: Vec<Box<dyn Step + 'a>>,
}

impl JobInstance<'_> {
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.name()).collect()
    }
}

impl Job for JobInstance<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn incrementer(&self) -> Option<&dyn JobParametersIncrementer> {
        self.incrementer.as_deref()
    }

    /// Runs the job by executing its steps in sequence.
    ///
    /// Steps share the job execution context. The first failing step stops
    /// the job: the remaining steps are not executed.
    fn run(&self, parameters: JobParameters) -> JobResult<JobExecution> {
        let mut job_execution = JobExecution::new(&self.name, parameters);
        job_execution.status = BatchStatus::Started;

        info!(
            "Start of job: {}, id: {}, parameters: {}",
            self.name, self.id, job_execution.parameters
        );

        for step in &self.steps {
            let mut step_execution = StepExecution::new(step.name());
            let result = step.execute(&mut step_execution, &mut job_execution);
            job_execution.step_executions.push(step_execution);

            if let Err(error) = result {
                job_execution.finish(BatchStatus::Failed);
                error!(
                    "Job: {} failed in step: {}: {}, id: {}, status: {:?}, duration: {:?}",
                    self.name,
                    step.name(),
                    error,
                    self.id,
                    job_execution.status,
                    job_execution.duration
                );
                return Err(BatchError::Step(step.name().to_owned()));
            }
        }

        job_execution.finish(BatchStatus::Completed);

        info!(
            "End of job: {}, id: {}, duration: {:?}",
            self.name, self.id, job_execution.duration
        );

        Ok(job_execution)
    }
}

/// Builder for creating a job instance.
///
/// # Example
///
/// ```
/// use spring_batch_tutorial::core::{
///     job::{Job, JobBuilder},
///     parameters::{JobParameters, RunIdIncrementer},
///     step::StepBuilder,
///     tasklet::RepeatStatus,
/// };
///
/// let job = JobBuilder::new()
///     .name("helloJob")
///     .incrementer(RunIdIncrementer::default())
///     .start(
///         StepBuilder::new("helloStep")
///             .tasklet_fn(|_| Ok(RepeatStatus::Finished))
///             .build(),
///     )
///     .build();
///
/// let execution = job.run(JobParameters::new()).unwrap();
/// assert_eq!(execution.step_executions.len(), 1);
/// ```
#[derive(Default)]
pub struct JobBuilder<'a> {
    /// Optional name for the job (generated randomly if not specified)
    name: Option<String>,
    incrementer: Option<Box<dyn JobParametersIncrementer + 'a>>,
    /// Collection of steps to be executed, in order
    steps: Vec<Box<dyn Step + 'a>>,
}

impl<'a> JobBuilder<'a> {
    pub fn new() -> Self {
        Self {
            name: None,
            incrementer: None,
            steps: Vec::new(),
        }
    }

    pub fn name(mut self, name: &str) -> JobBuilder<'a> {
        self.name = Some(name.to_string());
        self
    }

    pub fn incrementer(mut self, incrementer: impl JobParametersIncrementer + 'a) -> JobBuilder<'a> {
        self.incrementer = Some(Box::new(incrementer));
        self
    }

    /// Sets the first step of the job.
    ///
    /// Semantically identical to `next()`, it reads better for the first step.
    pub fn start(self, step: impl Step + 'a) -> JobBuilder<'a> {
        self.next(step)
    }

    /// Adds a step to the job. Steps are executed in the order they are added.
    pub fn next(mut self, step: impl Step + 'a) -> JobBuilder<'a> {
        self.steps.push(Box::new(step));
        self
    }

    /// If no name has been provided, a random name is generated.
    pub fn build(self) -> JobInstance<'a> {
        JobInstance {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_else(build_name),
            incrementer: self.incrementer,
            steps: self.steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::core::{
        parameters::{JobParametersBuilder, RunIdIncrementer},
        step::{StepBuilder, StepStatus},
        tasklet::RepeatStatus,
    };

    fn recording_step(name: &str, log: Rc<RefCell<Vec<String>>>) -> impl Step + 'static {
        let step_name = name.to_string();
        StepBuilder::new(name)
            .tasklet_fn(move |_| {
                log.borrow_mut().push(step_name.clone());
                Ok(RepeatStatus::Finished)
            })
            .build()
    }

    #[test]
    fn steps_run_in_declaration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));

        let job = JobBuilder::new()
            .name("orderedJob")
            .start(recording_step("first", log.clone()))
            .next(recording_step("second", log.clone()))
            .next(recording_step("third", log.clone()))
            .build();

        let execution = job.run(JobParameters::new()).unwrap();

        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
        assert_eq!(execution.status, BatchStatus::Completed);
        assert_eq!(execution.job_name, "orderedJob");
        assert_eq!(job.step_names(), vec!["first", "second", "third"]);
        assert!(
            execution
                .step_executions
                .iter()
                .all(|step| step.status == StepStatus::Success)
        );
    }

    #[test]
    fn failing_step_stops_the_job() {
        let log = Rc::new(RefCell::new(Vec::new()));

        let job = JobBuilder::new()
            .name("failingJob")
            .start(recording_step("first", log.clone()))
            .next(
                StepBuilder::new("broken")
                    .tasklet_fn(|_| Err(BatchError::Tasklet("boom".to_string())))
                    .build(),
            )
            .next(recording_step("never", log.clone()))
            .build();

        let result = job.run(JobParameters::new());

        match result {
            Err(BatchError::Step(name)) => assert_eq!(name, "broken"),
            other => panic!("expected a step error, got {:?}", other),
        }
        assert_eq!(*log.borrow(), vec!["first"]);
    }

    #[test]
    fn job_context_is_shared_between_steps() {
        let seen = Rc::new(RefCell::new(None));
        let seen_by_second = seen.clone();

        let job = JobBuilder::new()
            .start(
                StepBuilder::new("producer")
                    .tasklet_fn(|contribution| {
                        contribution.job_context().put_long("answer", 42);
                        Ok(RepeatStatus::Finished)
                    })
                    .build(),
            )
            .next(
                StepBuilder::new("consumer")
                    .tasklet_fn(move |contribution| {
                        let answer = contribution.job_context().get_long("answer");
                        *seen_by_second.borrow_mut() = answer;
                        Ok(RepeatStatus::Finished)
                    })
                    .build(),
            )
            .build();

        let execution = job.run(JobParameters::new()).unwrap();

        assert_eq!(*seen.borrow(), Some(42));
        assert_eq!(execution.execution_context.get_long("answer"), Some(42));
        assert!(execution.step_execution("producer").is_some());
    }

    #[test]
    fn finishing_stops_the_clock() {
        let mut execution = JobExecution::new("timedJob", JobParameters::new());

        execution.finish(BatchStatus::Failed);

        assert_eq!(execution.status, BatchStatus::Failed);
        assert!(execution.end >= execution.start);
        assert_eq!(execution.duration, execution.end - execution.start);
    }

    #[test]
    fn unnamed_job_gets_a_generated_name() {
        let job = JobBuilder::new().build();

        assert_eq!(job.name().len(), 8);
        assert!(job.incrementer().is_none());
    }

    #[test]
    fn parameters_are_exposed_on_the_execution() {
        let job = JobBuilder::new()
            .name("paramJob")
            .incrementer(RunIdIncrementer::default())
            .build();
        let parameters = JobParametersBuilder::new()
            .add_long("run.id", 3)
            .to_job_parameters();

        let execution = job.run(parameters.clone()).unwrap();

        assert_eq!(execution.parameters, parameters);
        assert!(job.incrementer().is_some());
    }
}
