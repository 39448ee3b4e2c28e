use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use uuid::Uuid;

use crate::BatchError;

use super::{
    context::ExecutionContext,
    item::{ItemProcessor, ItemReader, ItemWriter, PassThroughProcessor},
    job::JobExecution,
    parameters::JobParameters,
    tasklet::{FnTasklet, RepeatStatus, StepContribution, Tasklet, TaskletStepBuilder},
};

// Upper bound of the buffer reserved up front for a chunk.
const MAX_CHUNK_CAPACITY: usize = 1024;

/// Outcome of reading one chunk.
#[derive(Debug, PartialEq)]
pub enum ChunkStatus {
    /// The reader is exhausted
    Finished,
    /// The chunk reached its size, more items may follow
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Starting,
    Started,
    Success,
    ReadError,
    ProcessorError,
    WriteError,
    TaskletError,
    Failed,
}

/// Record of one execution of a step.
#[derive(Debug)]
pub struct StepExecution {
    /// Unique identifier for this step execution
    pub id: Uuid,
    /// Name of the step that was executed
    pub name: String,
    /// Current status of the step execution
    pub status: StepStatus,
    pub start_time: Instant,
    pub end_time: Instant,
    pub duration: Duration,
    /// Number of items successfully read
    pub read_count: usize,
    /// Number of items successfully written
    pub write_count: usize,
    /// Number of chunks (or tasklet iterations) committed
    pub commit_count: usize,
    /// Number of errors encountered during reading
    pub read_error_count: usize,
    /// Number of errors encountered during processing
    pub process_error_count: usize,
    /// Number of errors encountered during writing
    pub write_error_count: usize,
    /// State private to this step execution
    pub execution_context: ExecutionContext,
}

impl StepExecution {
    pub fn new(name: &str) -> Self {
        let now = Instant::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: StepStatus::Starting,
            start_time: now,
            end_time: now,
            duration: Duration::default(),
            read_count: 0,
            write_count: 0,
            commit_count: 0,
            read_error_count: 0,
            process_error_count: 0,
            write_error_count: 0,
            execution_context: ExecutionContext::new(),
        }
    }

    pub(crate) fn start(&mut self) {
        self.start_time = Instant::now();
        self.status = StepStatus::Started;
        info!("Start of step: {}, id: {}", self.name, self.id);
    }

    pub(crate) fn finish(&mut self) {
        self.end_time = Instant::now();
        self.duration = self.start_time.elapsed();
        info!(
            "End of step: {}, id: {}, status: {:?}",
            self.name, self.id, self.status
        );
    }
}

/// A single phase of a job.
pub trait Step {
    fn name(&self) -> &str;

    /// Executes the step, recording its progress in `step_execution`.
    ///
    /// The job execution gives access to the job parameters and to the
    /// execution context shared with the other steps of the run.
    fn execute(
        &self,
        step_execution: &mut StepExecution,
        job_execution: &mut JobExecution,
    ) -> Result<(), BatchError>;
}

/// Commit interval of a chunk-oriented step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkSize {
    Fixed(u16),
    /// Read from a job parameter when the step runs, falling back to `default`
    /// when the parameter is absent or blank.
    Parameter { key: String, default: u16 },
}

impl ChunkSize {
    /// Resolves the chunk size against the parameters of the current run.
    ///
    /// # Examples
    ///
    /// ```
    /// use spring_batch_tutorial::core::parameters::JobParameters;
    /// use spring_batch_tutorial::core::step::ChunkSize;
    ///
    /// let size = ChunkSize::Parameter { key: "chunkSize".to_string(), default: 10 };
    ///
    /// assert_eq!(size.resolve(&JobParameters::new()).unwrap(), 10);
    /// let parameters = JobParameters::from_args(["chunkSize=25"]).unwrap();
    /// assert_eq!(size.resolve(&parameters).unwrap(), 25);
    /// ```
    pub fn resolve(&self, parameters: &JobParameters) -> Result<usize, BatchError> {
        let size = match self {
            ChunkSize::Fixed(size) => u32::from(*size),
            ChunkSize::Parameter { key, default } => match parameters.get_string(key) {
                Some(value) if !value.trim().is_empty() => {
                    value.trim().parse::<u32>().map_err(|_| {
                        BatchError::JobParameter(format!(
                            "{} must be an integer between 1 and {}, got '{}'",
                            key,
                            u32::MAX,
                            value
                        ))
                    })?
                }
                _ => u32::from(*default),
            },
        };

        if size == 0 {
            return Err(BatchError::JobParameter(
                "chunk size must be greater than zero".to_string(),
            ));
        }

        Ok(size as usize)
    }
}

/// A read-process-write loop committing `chunk_size` items at a time.
pub struct ChunkOrientedStep<'a, I, O> {
    name: String,
    /// Component responsible for reading items from the source
    reader: Box<dyn ItemReader<I> + 'a>,
    /// Component responsible for processing items
    processor: Box<dyn ItemProcessor<I, O> + 'a>,
    /// Component responsible for writing items to the destination
    writer: Box<dyn ItemWriter<O> + 'a>,
    chunk_size: ChunkSize,
}

impl<I, O> Step for ChunkOrientedStep<'_, I, O> {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(
        &self,
        step_execution: &mut StepExecution,
        job_execution: &mut JobExecution,
    ) -> Result<(), BatchError> {
        step_execution.start();

        let result = match self.chunk_size.resolve(&job_execution.parameters) {
            Ok(chunk_size) => self.run_chunks(step_execution, chunk_size),
            Err(error) => {
                step_execution.status = StepStatus::Failed;
                Err(error)
            }
        };

        match &result {
            Ok(()) => step_execution.status = StepStatus::Success,
            Err(error) => error!("Step {} failed: {}", self.name, error),
        }

        step_execution.finish();

        result
    }
}

impl<I, O> ChunkOrientedStep<'_, I, O> {
    fn run_chunks(
        &self,
        step_execution: &mut StepExecution,
        chunk_size: usize,
    ) -> Result<(), BatchError> {
        if let Err(error) = self.reader.open() {
            step_execution.status = StepStatus::ReadError;
            return Err(error);
        }

        if let Err(error) = self.writer.open() {
            step_execution.status = StepStatus::WriteError;
            Self::manage_error(self.reader.close());
            return Err(error);
        }

        let result = self.chunk_loop(step_execution, chunk_size);

        Self::manage_error(self.writer.close());
        Self::manage_error(self.reader.close());

        result
    }

    fn chunk_loop(
        &self,
        step_execution: &mut StepExecution,
        chunk_size: usize,
    ) -> Result<(), BatchError> {
        loop {
            let (read_items, chunk_status) = self.read_chunk(step_execution, chunk_size)?;

            if read_items.is_empty() {
                return Ok(());
            }

            let processed_items = self.process_chunk(step_execution, &read_items)?;

            self.write_chunk(step_execution, &processed_items)?;

            step_execution.commit_count += 1;

            if chunk_status == ChunkStatus::Finished {
                return Ok(());
            }
        }
    }

    /// Reads up to `chunk_size` items.
    ///
    /// # Returns
    /// - `Ok((items, ChunkStatus::Full))`: the chunk is full
    /// - `Ok((items, ChunkStatus::Finished))`: the reader is exhausted, `items` may be empty
    /// - `Err(BatchError)`: the reader failed
    fn read_chunk(
        &self,
        step_execution: &mut StepExecution,
        chunk_size: usize,
    ) -> Result<(Vec<I>, ChunkStatus), BatchError> {
        debug!("Start reading chunk");

        let mut read_items = Vec::with_capacity(chunk_size.min(MAX_CHUNK_CAPACITY));

        while read_items.len() < chunk_size {
            match self.reader.read() {
                Ok(Some(item)) => {
                    read_items.push(item);
                    step_execution.read_count += 1;
                }
                Ok(None) => {
                    debug!("End reading chunk: FINISHED");
                    return Ok((read_items, ChunkStatus::Finished));
                }
                Err(error) => {
                    step_execution.read_error_count += 1;
                    step_execution.status = StepStatus::ReadError;
                    return Err(error);
                }
            }
        }

        debug!("End reading chunk: FULL");
        Ok((read_items, ChunkStatus::Full))
    }

    fn process_chunk(
        &self,
        step_execution: &mut StepExecution,
        read_items: &[I],
    ) -> Result<Vec<O>, BatchError> {
        debug!("Processing chunk of {} items", read_items.len());

        let mut result = Vec::with_capacity(read_items.len());

        for item in read_items {
            match self.processor.process(item) {
                Ok(processed_item) => result.push(processed_item),
                Err(error) => {
                    step_execution.process_error_count += 1;
                    step_execution.status = StepStatus::ProcessorError;
                    return Err(error);
                }
            }
        }

        Ok(result)
    }

    fn write_chunk(
        &self,
        step_execution: &mut StepExecution,
        processed_items: &[O],
    ) -> Result<(), BatchError> {
        debug!("Writing chunk of {} items", processed_items.len());

        if let Err(error) = self
            .writer
            .write(processed_items)
            .and_then(|()| self.writer.flush())
        {
            step_execution.write_error_count += processed_items.len();
            step_execution.status = StepStatus::WriteError;
            return Err(error);
        }

        step_execution.write_count += processed_items.len();
        Ok(())
    }

    /// Logs errors of operations that must not fail the step.
    fn manage_error(result: Result<(), BatchError>) {
        if let Err(error) = result {
            warn!("Non-fatal error: {}", error);
        }
    }
}

/// Builder for a [`ChunkOrientedStep`].
///
/// Components are set in pipeline order: calling [`processor`](Self::processor)
/// changes the output type of the step, so the writer is expected afterwards.
pub struct ChunkOrientedStepBuilder<'a, I, O> {
    name: String,
    reader: Option<Box<dyn ItemReader<I> + 'a>>,
    processor: Box<dyn ItemProcessor<I, O> + 'a>,
    writer: Option<Box<dyn ItemWriter<O> + 'a>>,
    chunk_size: ChunkSize,
}

impl<'a, I: Clone + 'a> ChunkOrientedStepBuilder<'a, I, I> {
    pub fn new(name: &str, chunk_size: u16) -> Self {
        Self {
            name: name.to_string(),
            reader: None,
            processor: Box::new(PassThroughProcessor),
            writer: None,
            chunk_size: ChunkSize::Fixed(chunk_size),
        }
    }
}

impl<'a, I, O> ChunkOrientedStepBuilder<'a, I, O> {
    pub fn reader(mut self, reader: impl ItemReader<I> + 'a) -> Self {
        self.reader = Some(Box::new(reader));
        self
    }

    /// Sets the processor, which decides the item type handed to the writer.
    ///
    /// A writer set before this call is discarded.
    pub fn processor<P, T>(self, processor: P) -> ChunkOrientedStepBuilder<'a, I, T>
    where
        P: ItemProcessor<I, T> + 'a,
    {
        ChunkOrientedStepBuilder {
            name: self.name,
            reader: self.reader,
            processor: Box::new(processor),
            writer: None,
            chunk_size: self.chunk_size,
        }
    }

    pub fn writer(mut self, writer: impl ItemWriter<O> + 'a) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    /// Reads the chunk size from the job parameter `key` when the step runs.
    ///
    /// The size given to [`StepBuilder::chunk`] is kept as the default.
    pub fn chunk_size_parameter(mut self, key: &str) -> Self {
        let default = match self.chunk_size {
            ChunkSize::Fixed(size) => size,
            ChunkSize::Parameter { default, .. } => default,
        };
        self.chunk_size = ChunkSize::Parameter {
            key: key.to_string(),
            default,
        };
        self
    }

    pub fn build(self) -> Result<ChunkOrientedStep<'a, I, O>, BatchError> {
        let reader = self.reader.ok_or_else(|| {
            BatchError::Configuration(format!("Reader is required for step {}", self.name))
        })?;
        let writer = self.writer.ok_or_else(|| {
            BatchError::Configuration(format!("Writer is required for step {}", self.name))
        })?;

        Ok(ChunkOrientedStep {
            name: self.name,
            reader,
            processor: self.processor,
            writer,
            chunk_size: self.chunk_size,
        })
    }
}

/// Entry point for declaring a step: a name, then either a tasklet or a chunk.
///
/// # Examples
///
/// ```
/// use spring_batch_tutorial::core::{
///     item::{ItemProcessorResult, ItemWriterResult},
///     step::StepBuilder,
///     tasklet::RepeatStatus,
/// };
/// use spring_batch_tutorial::item::list::ListItemReader;
///
/// let tasklet_step = StepBuilder::new("helloStep")
///     .tasklet_fn(|_| Ok(RepeatStatus::Finished))
///     .build();
///
/// let chunk_step = StepBuilder::new("chunkBaseStep")
///     .chunk::<String>(10)
///     .reader(ListItemReader::new(vec!["0 hello".to_string()]))
///     .processor(|item: &String| -> ItemProcessorResult<usize> { Ok(item.len()) })
///     .writer(|_items: &[usize]| -> ItemWriterResult { Ok(()) })
///     .build()
///     .unwrap();
/// ```
pub struct StepBuilder {
    name: String,
}

impl StepBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn tasklet<'a>(self, tasklet: impl Tasklet + 'a) -> TaskletStepBuilder<'a> {
        TaskletStepBuilder::new(&self.name).tasklet(tasklet)
    }

    /// Declares the tasklet inline as a closure.
    pub fn tasklet_fn<'a, F>(self, tasklet: F) -> TaskletStepBuilder<'a>
    where
        F: Fn(&mut StepContribution<'_>) -> Result<RepeatStatus, BatchError> + 'a,
    {
        self.tasklet(FnTasklet::new(tasklet))
    }

    /// Starts a chunk-oriented step reading items of type `I`.
    pub fn chunk<'a, I: Clone + 'a>(self, chunk_size: u16) -> ChunkOrientedStepBuilder<'a, I, I> {
        ChunkOrientedStepBuilder::new(&self.name, chunk_size)
    }
}
