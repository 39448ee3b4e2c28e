/// This module provides an in-memory list item reader.
pub mod list;

#[cfg(feature = "logger")]
/// This module provides a logger item writer, useful for debugging purposes.
pub mod logger;

#[cfg(feature = "csv")]
/// This module provides a CSV item reader.
pub mod csv;

#[cfg(feature = "rdbc")]
/// This module provides an RDBC (SQL database) item reader and writer.
pub mod rdbc;
