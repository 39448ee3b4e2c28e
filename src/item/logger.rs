use std::fmt::Display;

use log::{Level, log};

use crate::core::item::{ItemWriter, ItemWriterResult};

/// Writes every item of a chunk to the log, one line per item.
///
/// Items are logged with their `Display` form, at info level unless another
/// level is chosen with [`with_level`](Self::with_level).
pub struct LoggerWriter {
    level: Level,
}

impl Default for LoggerWriter {
    fn default() -> Self {
        Self { level: Level::Info }
    }
}

impl LoggerWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(level: Level) -> Self {
        Self { level }
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl<T> ItemWriter<T> for LoggerWriter
where
    T: Display,
{
    fn write(&self, items: &[T]) -> ItemWriterResult {
        items.iter().for_each(|item| log!(self.level, "{}", item));
        Ok(())
    }
}
