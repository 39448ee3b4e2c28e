use std::collections::HashMap;

use log::info;

use crate::BatchError;

use super::{
    job::{Job, JobExecution, JobResult},
    parameters::{JobParameters, JobParametersBuilder},
};

/// Registry of jobs, launched by name.
///
/// For a job with an incrementer, the launcher remembers the parameters of
/// the previous launch (in memory, for its own lifetime) so each launch gets
/// the next run id. Caller parameters are merged on top of the incremented
/// ones, except for the incrementer's own key.
///
/// # Examples
///
/// ```
/// use spring_batch_tutorial::core::{
///     job::JobBuilder,
///     launcher::JobLauncher,
///     parameters::{JobParameters, RunIdIncrementer},
///     step::StepBuilder,
///     tasklet::RepeatStatus,
/// };
///
/// let mut launcher = JobLauncher::new();
/// launcher
///     .register(
///         JobBuilder::new()
///             .name("helloJob")
///             .incrementer(RunIdIncrementer::default())
///             .start(
///                 StepBuilder::new("helloStep")
///                     .tasklet_fn(|_| Ok(RepeatStatus::Finished))
///                     .build(),
///             )
///             .build(),
///     )
///     .unwrap();
///
/// let first = launcher.run("helloJob", JobParameters::new()).unwrap();
/// let second = launcher.run("helloJob", JobParameters::new()).unwrap();
///
/// assert_eq!(first.parameters.get_long("run.id"), Some(1));
/// assert_eq!(second.parameters.get_long("run.id"), Some(2));
/// ```
#[derive(Default)]
pub struct JobLauncher<'a> {
    jobs: Vec<Box<dyn Job + 'a>>,
    last_parameters: HashMap<String, JobParameters>,
}

impl<'a> JobLauncher<'a> {
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            last_parameters: HashMap::new(),
        }
    }

    /// Registers a job under its name.
    pub fn register(&mut self, job: impl Job + 'a) -> Result<(), BatchError> {
        if self.jobs.iter().any(|registered| registered.name() == job.name()) {
            return Err(BatchError::Configuration(format!(
                "a job named {} is already registered",
                job.name()
            )));
        }

        info!("Registered job: {}", job.name());
        self.jobs.push(Box::new(job));
        Ok(())
    }

    /// Names of the registered jobs, in registration order.
    pub fn job_names(&self) -> Vec<&str> {
        self.jobs.iter().map(|job| job.name()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.jobs.iter().any(|job| job.name() == name)
    }

    /// Launches the job registered under `name`.
    pub fn run(&mut self, name: &str, parameters: JobParameters) -> JobResult<JobExecution> {
        let job = self
            .jobs
            .iter()
            .find(|job| job.name() == name)
            .ok_or_else(|| BatchError::JobNotFound(name.to_string()))?;

        let parameters = match job.incrementer() {
            Some(incrementer) => {
                let next = incrementer.get_next(self.last_parameters.get(name));
                let incremented_key = incrementer.key();

                let caller_parameters = parameters
                    .iter()
                    .filter(|(key, _)| key.as_str() != incremented_key)
                    .fold(JobParametersBuilder::new(), |builder, (key, value)| {
                        builder.add_parameter(key.clone(), value.clone())
                    })
                    .to_job_parameters();

                JobParametersBuilder::from_parameters(&next)
                    .add_job_parameters(&caller_parameters)
                    .to_job_parameters()
            }
            None => parameters,
        };

        self.last_parameters
            .insert(name.to_string(), parameters.clone());

        job.run(parameters)
    }

    /// Launches every registered job in registration order with the same
    /// caller parameters, stopping at the first failure.
    pub fn run_all(&mut self, parameters: &JobParameters) -> JobResult<Vec<JobExecution>> {
        let names: Vec<String> = self.job_names().into_iter().map(String::from).collect();

        names
            .iter()
            .map(|name| self.run(name, parameters.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::core::{
        job::JobBuilder,
        parameters::{RUN_ID_KEY, RunIdIncrementer},
        step::StepBuilder,
        tasklet::RepeatStatus,
    };

    fn noop_job(name: &str) -> impl Job + 'static {
        JobBuilder::new()
            .name(name)
            .incrementer(RunIdIncrementer::default())
            .start(
                StepBuilder::new("noop")
                    .tasklet_fn(|_| Ok(RepeatStatus::Finished))
                    .build(),
            )
            .build()
    }

    #[test]
    fn run_ids_increase_per_job() {
        let mut launcher = JobLauncher::new();
        launcher.register(noop_job("first")).unwrap();
        launcher.register(noop_job("second")).unwrap();

        let ids: Vec<i64> = (0..3)
            .map(|_| {
                launcher
                    .run("first", JobParameters::new())
                    .unwrap()
                    .parameters
                    .get_long(RUN_ID_KEY)
                    .unwrap()
            })
            .collect();
        let other = launcher.run("second", JobParameters::new()).unwrap();

        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(other.parameters.get_long(RUN_ID_KEY), Some(1));
    }

    #[test]
    fn caller_parameters_are_merged_but_cannot_override_run_id() {
        let mut launcher = JobLauncher::new();
        launcher.register(noop_job("job")).unwrap();

        let parameters = JobParameters::from_args(["chunkSize=20", "run.id=99"]).unwrap();
        let execution = launcher.run("job", parameters).unwrap();

        assert_eq!(execution.parameters.get_long(RUN_ID_KEY), Some(1));
        assert_eq!(execution.parameters.get_long("chunkSize"), Some(20));

        let next = launcher.run("job", JobParameters::new()).unwrap();
        assert_eq!(next.parameters.get_long(RUN_ID_KEY), Some(2));
        assert_eq!(next.parameters.get_long("chunkSize"), Some(20));
    }

    #[test]
    fn job_without_incrementer_keeps_caller_parameters() {
        let mut launcher = JobLauncher::new();
        launcher
            .register(
                JobBuilder::new()
                    .name("plain")
                    .start(
                        StepBuilder::new("noop")
                            .tasklet_fn(|_| Ok(RepeatStatus::Finished))
                            .build(),
                    )
                    .build(),
            )
            .unwrap();

        let execution = launcher
            .run("plain", JobParameters::from_args(["a=1"]).unwrap())
            .unwrap();

        assert_eq!(execution.parameters.len(), 1);
        assert!(!execution.parameters.contains_key(RUN_ID_KEY));
    }

    #[test]
    fn unknown_and_duplicate_jobs_are_rejected() {
        let mut launcher = JobLauncher::new();
        launcher.register(noop_job("job")).unwrap();

        assert!(matches!(
            launcher.register(noop_job("job")),
            Err(BatchError::Configuration(_))
        ));
        assert!(matches!(
            launcher.run("missing", JobParameters::new()),
            Err(BatchError::JobNotFound(_))
        ));
    }

    #[test]
    fn run_all_follows_registration_order_and_stops_on_failure() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut launcher = JobLauncher::new();

        for name in ["a", "b"] {
            let log = log.clone();
            launcher
                .register(
                    JobBuilder::new()
                        .name(name)
                        .start(
                            StepBuilder::new("record")
                                .tasklet_fn(move |contribution| {
                                    log.borrow_mut().push(contribution.job_name().to_string());
                                    Ok(RepeatStatus::Finished)
                                })
                                .build(),
                        )
                        .build(),
                )
                .unwrap();
        }
        launcher
            .register(
                JobBuilder::new()
                    .name("failing")
                    .start(
                        StepBuilder::new("boom")
                            .tasklet_fn(|_| Err(BatchError::Tasklet("boom".to_string())))
                            .build(),
                    )
                    .build(),
            )
            .unwrap();

        let executions = launcher.run_all(&JobParameters::new());

        assert!(matches!(executions, Err(BatchError::Step(_))));
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert_eq!(launcher.job_names(), vec!["a", "b", "failing"]);
    }
}
