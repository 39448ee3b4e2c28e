use log::info;

use crate::{
    BatchError,
    core::{
        item::{ItemProcessorResult, ItemWriterResult},
        job::{JobBuilder, JobInstance},
        parameters::RunIdIncrementer,
        step::{ChunkOrientedStep, ChunkSize, StepBuilder},
        tasklet::{RepeatStatus, StepContribution, Tasklet, TaskletStep},
    },
    item::list::ListItemReader,
};

#[cfg(feature = "logger")]
use crate::item::logger::LoggerWriter;

use super::{CHUNK_SIZE_KEY, DEFAULT_CHUNK_SIZE};

pub const JOB_NAME: &str = "chunkProcessingJob";

/// The hundred items `"0 hello"` to `"99 hello"`.
pub fn items() -> Vec<String> {
    (0..100).map(|i| format!("{} hello", i)).collect()
}

/// Pages through the items by hand, one tasklet call per page.
///
/// The step's read count is the cursor: each call handles the page starting at
/// it, moves it to the end of the page and asks to be called again, until the
/// cursor passes the last item.
pub struct PagingTasklet {
    items: Vec<String>,
    chunk_size: ChunkSize,
}

impl PagingTasklet {
    pub fn new(items: Vec<String>) -> Self {
        Self {
            items,
            chunk_size: ChunkSize::Parameter {
                key: CHUNK_SIZE_KEY.to_string(),
                default: DEFAULT_CHUNK_SIZE,
            },
        }
    }
}

impl Tasklet for PagingTasklet {
    fn execute(&self, contribution: &mut StepContribution<'_>) -> Result<RepeatStatus, BatchError> {
        let chunk_size = self.chunk_size.resolve(contribution.job_parameters())?;

        let from = contribution.read_count();
        if from >= self.items.len() {
            return Ok(RepeatStatus::Finished);
        }

        let to = (from + chunk_size).min(self.items.len());
        let page = &self.items[from..to];
        info!("task item size : {}", page.len());

        contribution.set_read_count(to);
        Ok(RepeatStatus::Continuable)
    }
}

/// Handles all items in one call.
pub struct ItemCountTasklet {
    items: Vec<String>,
}

impl ItemCountTasklet {
    pub fn new(items: Vec<String>) -> Self {
        Self { items }
    }
}

impl Tasklet for ItemCountTasklet {
    fn execute(&self, contribution: &mut StepContribution<'_>) -> Result<RepeatStatus, BatchError> {
        info!("task item size : {}", self.items.len());
        contribution.set_read_count(self.items.len());
        Ok(RepeatStatus::Finished)
    }
}

#[allow(clippy::ptr_arg)]
pub fn append_spring_batch(item: &String) -> ItemProcessorResult<String> {
    Ok(format!("{}, spring batch", item))
}

fn log_chunk_size(items: &[String]) -> ItemWriterResult {
    info!("chunk Item size : {}", items.len());
    Ok(())
}

/// Same work as [`chunk_base_step`], with the paging written by hand.
pub fn task_base_step() -> TaskletStep<'static> {
    StepBuilder::new("taskBaseStep")
        .tasklet(PagingTasklet::new(items()))
        .build()
}

/// Unpaged variant of [`task_base_step`].
pub fn simple_tasklet() -> TaskletStep<'static> {
    StepBuilder::new("taskBaseStep")
        .tasklet(ItemCountTasklet::new(items()))
        .build()
}

/// Chunk step over the items, sized by the `chunkSize` job parameter.
pub fn chunk_base_step() -> Result<ChunkOrientedStep<'static, String, String>, BatchError> {
    StepBuilder::new("chunkBaseStep")
        .chunk::<String>(DEFAULT_CHUNK_SIZE)
        .chunk_size_parameter(CHUNK_SIZE_KEY)
        .reader(ListItemReader::new(items()))
        .processor(append_spring_batch)
        .writer(log_chunk_size)
        .build()
}

/// Variant of [`chunk_base_step`] that logs every processed item instead of
/// the chunk size.
#[cfg(feature = "logger")]
pub fn item_logging_chunk_step() -> Result<ChunkOrientedStep<'static, String, String>, BatchError> {
    StepBuilder::new("chunkBaseStep")
        .chunk::<String>(DEFAULT_CHUNK_SIZE)
        .chunk_size_parameter(CHUNK_SIZE_KEY)
        .reader(ListItemReader::new(items()))
        .processor(append_spring_batch)
        .writer(LoggerWriter::new())
        .build()
}

pub fn chunk_processing_job() -> Result<JobInstance<'static>, BatchError> {
    Ok(JobBuilder::new()
        .name(JOB_NAME)
        .incrementer(RunIdIncrementer::default())
        .start(task_base_step())
        .next(chunk_base_step()?)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        job::{Job, JobExecution},
        parameters::{JobParameters, JobParametersBuilder},
        step::{Step, StepExecution, StepStatus},
    };

    fn run_step(step: &dyn Step, parameters: JobParameters) -> StepExecution {
        let mut job_execution = JobExecution::new(JOB_NAME, parameters);
        let mut step_execution = StepExecution::new(step.name());
        let _ = step.execute(&mut step_execution, &mut job_execution);
        step_execution
    }

    fn with_chunk_size(size: i64) -> JobParameters {
        JobParametersBuilder::new()
            .add_long(CHUNK_SIZE_KEY, size)
            .to_job_parameters()
    }

    #[test]
    fn tasklet_pages_through_all_items() {
        let execution = run_step(&task_base_step(), with_chunk_size(10));

        assert_eq!(execution.status, StepStatus::Success);
        assert_eq!(execution.read_count, 100);
        // ten pages, then the call that finds nothing left
        assert_eq!(execution.commit_count, 11);
    }

    #[test]
    fn last_page_is_clamped_to_the_list() {
        let execution = run_step(&task_base_step(), with_chunk_size(30));

        assert_eq!(execution.status, StepStatus::Success);
        assert_eq!(execution.read_count, 100);
        assert_eq!(execution.commit_count, 5);
    }

    #[test]
    fn tasklet_defaults_to_ten_items_per_page() {
        let execution = run_step(&task_base_step(), JobParameters::new());

        assert_eq!(execution.commit_count, 11);
    }

    #[test]
    fn unparsable_chunk_size_fails_the_tasklet() {
        let parameters = JobParametersBuilder::new()
            .add_string(CHUNK_SIZE_KEY, "ten")
            .to_job_parameters();

        let execution = run_step(&task_base_step(), parameters);

        assert_eq!(execution.status, StepStatus::TaskletError);
    }

    #[test]
    fn simple_tasklet_handles_everything_at_once() {
        let execution = run_step(&simple_tasklet(), JobParameters::new());

        assert_eq!(execution.read_count, 100);
        assert_eq!(execution.commit_count, 1);
    }

    #[test]
    fn chunk_step_commits_every_chunk() {
        let step = chunk_base_step().unwrap();

        let execution = run_step(&step, with_chunk_size(10));

        assert_eq!(execution.status, StepStatus::Success);
        assert_eq!(execution.read_count, 100);
        assert_eq!(execution.write_count, 100);
        assert_eq!(execution.commit_count, 10);
    }

    #[cfg(feature = "logger")]
    #[test]
    fn item_logging_step_writes_every_item() {
        let step = item_logging_chunk_step().unwrap();

        let execution = run_step(&step, with_chunk_size(25));

        assert_eq!(execution.status, StepStatus::Success);
        assert_eq!(execution.write_count, 100);
        assert_eq!(execution.commit_count, 4);
    }

    #[test]
    fn processor_appends_suffix() {
        assert_eq!(
            append_spring_batch(&"7 hello".to_string()).unwrap(),
            "7 hello, spring batch"
        );
    }

    #[test]
    fn job_runs_both_steps() {
        let job = chunk_processing_job().unwrap();

        let execution = job.run(JobParameters::new()).unwrap();

        assert_eq!(job.step_names(), vec!["taskBaseStep", "chunkBaseStep"]);
        assert_eq!(execution.step_executions.len(), 2);
    }
}
