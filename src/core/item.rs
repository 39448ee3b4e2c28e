use crate::error::BatchError;

/// Result of a single read: `Ok(None)` once the source is exhausted.
pub type ItemReaderResult<I> = Result<Option<I>, BatchError>;

/// Result of processing one item.
pub type ItemProcessorResult<O> = Result<O, BatchError>;

/// Result of writing one chunk.
pub type ItemWriterResult = Result<(), BatchError>;

/// Supplies the input of a chunk-oriented step, one item at a time.
///
/// Readers take `&self` and keep their cursor behind interior mutability so a
/// step can hold them as trait objects.
pub trait ItemReader<I> {
    fn read(&self) -> ItemReaderResult<I>;

    /// Called by the step before its first read of every execution.
    ///
    /// Readers that can be read again rewind or reopen their source here.
    fn open(&self) -> Result<(), BatchError> {
        Ok(())
    }

    fn close(&self) -> Result<(), BatchError> {
        Ok(())
    }
}

/// Business logic applied to every item between read and write.
pub trait ItemProcessor<I, O> {
    fn process(&self, item: &I) -> ItemProcessorResult<O>;
}

/// Output of a chunk-oriented step, one chunk at a time.
pub trait ItemWriter<O> {
    fn write(&self, items: &[O]) -> ItemWriterResult;

    fn flush(&self) -> ItemWriterResult {
        Ok(())
    }

    fn open(&self) -> ItemWriterResult {
        Ok(())
    }

    fn close(&self) -> ItemWriterResult {
        Ok(())
    }
}

impl<I, O, F> ItemProcessor<I, O> for F
where
    F: Fn(&I) -> ItemProcessorResult<O>,
{
    fn process(&self, item: &I) -> ItemProcessorResult<O> {
        self(item)
    }
}

impl<O, F> ItemWriter<O> for F
where
    F: Fn(&[O]) -> ItemWriterResult,
{
    fn write(&self, items: &[O]) -> ItemWriterResult {
        self(items)
    }
}

/// Processor used by chunk steps that declare none: hands every item over unchanged.
#[derive(Default, Debug, Clone, Copy)]
pub struct PassThroughProcessor;

impl<T: Clone> ItemProcessor<T, T> for PassThroughProcessor {
    fn process(&self, item: &T) -> ItemProcessorResult<T> {
        Ok(item.clone())
    }
}
