use log::error;

use crate::BatchError;

use super::{
    context::ExecutionContext,
    job::JobExecution,
    parameters::JobParameters,
    step::{Step, StepExecution, StepStatus},
};

/// Tells a tasklet step whether to call the tasklet again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatStatus {
    /// The tasklet has more work and must be called again.
    Continuable,
    /// The tasklet has finished executing.
    Finished,
}

/// What a tasklet sees of the running job: its own step execution and the
/// enclosing job execution.
pub struct StepContribution<'a> {
    step_execution: &'a mut StepExecution,
    job_execution: &'a mut JobExecution,
}

impl<'a> StepContribution<'a> {
    pub fn new(step_execution: &'a mut StepExecution, job_execution: &'a mut JobExecution) -> Self {
        Self {
            step_execution,
            job_execution,
        }
    }

    pub fn step_name(&self) -> &str {
        &self.step_execution.name
    }

    pub fn job_name(&self) -> &str {
        &self.job_execution.job_name
    }

    pub fn job_parameters(&self) -> &JobParameters {
        &self.job_execution.parameters
    }

    pub fn step_execution(&self) -> &StepExecution {
        &*self.step_execution
    }

    pub fn step_execution_mut(&mut self) -> &mut StepExecution {
        &mut *self.step_execution
    }

    pub fn job_execution(&self) -> &JobExecution {
        &*self.job_execution
    }

    /// Context private to the current step execution.
    pub fn step_context(&mut self) -> &mut ExecutionContext {
        &mut self.step_execution.execution_context
    }

    /// Context shared by all steps of the current job run.
    pub fn job_context(&mut self) -> &mut ExecutionContext {
        &mut self.job_execution.execution_context
    }

    pub fn read_count(&self) -> usize {
        self.step_execution.read_count
    }

    pub fn set_read_count(&mut self, read_count: usize) {
        self.step_execution.read_count = read_count;
    }
}

/// A single task run by a [`TaskletStep`], possibly several times.
pub trait Tasklet {
    fn execute(&self, contribution: &mut StepContribution<'_>) -> Result<RepeatStatus, BatchError>;
}

/// Adapts a closure to [`Tasklet`].
pub struct FnTasklet<F> {
    f: F,
}

impl<F> FnTasklet<F>
where
    F: Fn(&mut StepContribution<'_>) -> Result<RepeatStatus, BatchError>,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Tasklet for FnTasklet<F>
where
    F: Fn(&mut StepContribution<'_>) -> Result<RepeatStatus, BatchError>,
{
    fn execute(&self, contribution: &mut StepContribution<'_>) -> Result<RepeatStatus, BatchError> {
        (self.f)(contribution)
    }
}

/// Step repeatedly executing a tasklet until it reports [`RepeatStatus::Finished`].
pub struct TaskletStep<'a> {
    name: String,
    tasklet: Box<dyn Tasklet + 'a>,
}

impl Step for TaskletStep<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(
        &self,
        step_execution: &mut StepExecution,
        job_execution: &mut JobExecution,
    ) -> Result<(), BatchError> {
        step_execution.start();

        let result = loop {
            let mut contribution = StepContribution::new(step_execution, job_execution);

            match self.tasklet.execute(&mut contribution) {
                Ok(RepeatStatus::Continuable) => step_execution.commit_count += 1,
                Ok(RepeatStatus::Finished) => {
                    step_execution.commit_count += 1;
                    break Ok(());
                }
                Err(error) => break Err(error),
            }
        };

        match &result {
            Ok(()) => step_execution.status = StepStatus::Success,
            Err(error) => {
                step_execution.status = StepStatus::TaskletError;
                error!("Step {} failed: {}", self.name, error);
            }
        }

        step_execution.finish();

        result
    }
}

pub struct TaskletStepBuilder<'a> {
    name: String,
    tasklet: Option<Box<dyn Tasklet + 'a>>,
}

impl<'a> TaskletStepBuilder<'a> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tasklet: None,
        }
    }

    pub fn tasklet(mut self, tasklet: impl Tasklet + 'a) -> Self {
        self.tasklet = Some(Box::new(tasklet));
        self
    }

    pub fn build(self) -> TaskletStep<'a> {
        TaskletStep {
            name: self.name,
            tasklet: self
                .tasklet
                .unwrap_or_else(|| Box::new(FnTasklet::new(|_| Ok(RepeatStatus::Finished)))),
        }
    }
}
