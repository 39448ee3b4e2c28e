use rand::distr::{Alphanumeric, SampleString};

/// Execution contexts shared between and within steps
pub mod context;

pub mod item;

pub mod job;

/// Launching registered jobs by name
pub mod launcher;

/// Job parameters and run id incrementer
pub mod parameters;

pub mod step;

pub mod tasklet;

/// Generates a random name consisting of alphanumeric characters.
///
/// # Returns
///
/// A `String` containing the generated random name.
fn build_name() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), 8)
}
