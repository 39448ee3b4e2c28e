use tokio::{runtime::Handle, task};

/// This module contains the RDBC reader implementation.
pub mod rdbc_reader;

/// This module contains the RDBC writer implementation.
pub mod rdbc_writer;

/// Runs a database future to completion from synchronous batch code.
///
/// Must be called from inside a multi-threaded tokio runtime: the current
/// worker is handed over to the blocking section while the future runs on
/// the runtime's handle.
pub(crate) fn block_on<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    let handle = Handle::try_current()
        .map_err(|error| format!("no tokio runtime available: {}", error))?;

    task::block_in_place(|| handle.block_on(future)).map_err(|error| error.to_string())
}
