use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::BatchError;

/// Name of the parameter maintained by [`RunIdIncrementer`].
pub const RUN_ID_KEY: &str = "run.id";

/// A single typed job parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobParameter {
    String(String),
    Long(i64),
    Double(f64),
}

impl fmt::Display for JobParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobParameter::String(value) => write!(f, "{}", value),
            JobParameter::Long(value) => write!(f, "{}", value),
            JobParameter::Double(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for JobParameter {
    fn from(value: &str) -> Self {
        JobParameter::String(value.to_string())
    }
}

impl From<String> for JobParameter {
    fn from(value: String) -> Self {
        JobParameter::String(value)
    }
}

impl From<i64> for JobParameter {
    fn from(value: i64) -> Self {
        JobParameter::Long(value)
    }
}

impl From<f64> for JobParameter {
    fn from(value: f64) -> Self {
        JobParameter::Double(value)
    }
}

/// The parameters a job is launched with.
///
/// Parameters identify a run: launching the same job twice with identical
/// parameters is what a [`JobParametersIncrementer`] prevents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobParameters {
    parameters: BTreeMap<String, JobParameter>,
}

impl JobParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `key=value` pairs as given on a command line.
    ///
    /// The key may carry a type hint, `key(long)=`, `key(double)=` or
    /// `key(string)=`. Without a hint, integers become `Long`, other numbers
    /// `Double`, and anything else a `String`.
    ///
    /// # Examples
    ///
    /// ```
    /// use spring_batch_tutorial::core::parameters::{JobParameter, JobParameters};
    ///
    /// let parameters = JobParameters::from_args(["chunkSize=20", "label(string)=007"]).unwrap();
    ///
    /// assert_eq!(parameters.get_long("chunkSize"), Some(20));
    /// assert_eq!(
    ///     parameters.get("label"),
    ///     Some(&JobParameter::String("007".to_string()))
    /// );
    /// ```
    pub fn from_args<I, S>(args: I) -> Result<Self, BatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = JobParametersBuilder::new();

        for arg in args {
            let arg = arg.as_ref();
            let (key, value) = arg.split_once('=').ok_or_else(|| {
                BatchError::JobParameter(format!("expected key=value, got '{}'", arg))
            })?;
            let (name, parameter) = parse_parameter(key.trim(), value.trim())?;
            builder = builder.add_parameter(name, parameter);
        }

        Ok(builder.to_job_parameters())
    }

    pub fn get(&self, key: &str) -> Option<&JobParameter> {
        self.parameters.get(key)
    }

    /// Returns the value under `key` if it is a `Long`.
    pub fn get_long(&self, key: &str) -> Option<i64> {
        match self.parameters.get(key) {
            Some(JobParameter::Long(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn get_long_or(&self, key: &str, default: i64) -> i64 {
        self.get_long(key).unwrap_or(default)
    }

    /// Returns the value under `key` rendered as a string, whatever its type.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.parameters.get(key).map(JobParameter::to_string)
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|| default.to_string())
    }

    /// Returns the value under `key` if it is numeric.
    pub fn get_double(&self, key: &str) -> Option<f64> {
        match self.parameters.get(key) {
            Some(JobParameter::Double(value)) => Some(*value),
            Some(JobParameter::Long(value)) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.parameters.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JobParameter)> {
        self.parameters.iter()
    }
}

impl fmt::Display for JobParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (index, (key, value)) in self.parameters.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        write!(f, "}}")
    }
}

fn parse_parameter(key: &str, value: &str) -> Result<(String, JobParameter), BatchError> {
    let invalid = |kind: &str| {
        BatchError::JobParameter(format!("'{}' is not a valid {} for {}", value, kind, key))
    };

    if let Some(name) = key.strip_suffix("(long)") {
        let parsed = value.parse::<i64>().map_err(|_| invalid("long"))?;
        return Ok((name.to_string(), JobParameter::Long(parsed)));
    }

    if let Some(name) = key.strip_suffix("(double)") {
        let parsed = value.parse::<f64>().map_err(|_| invalid("double"))?;
        return Ok((name.to_string(), JobParameter::Double(parsed)));
    }

    if let Some(name) = key.strip_suffix("(string)") {
        return Ok((name.to_string(), JobParameter::from(value)));
    }

    if key.is_empty() {
        return Err(BatchError::JobParameter(format!(
            "missing parameter name before '={}'",
            value
        )));
    }

    let parameter = if let Ok(long) = value.parse::<i64>() {
        JobParameter::Long(long)
    } else if let Ok(double) = value.parse::<f64>() {
        JobParameter::Double(double)
    } else {
        JobParameter::from(value)
    };

    Ok((key.to_string(), parameter))
}

/// Fluent construction of [`JobParameters`].
#[derive(Default)]
pub struct JobParametersBuilder {
    parameters: BTreeMap<String, JobParameter>,
}

impl JobParametersBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a copy of existing parameters.
    pub fn from_parameters(parameters: &JobParameters) -> Self {
        Self {
            parameters: parameters.parameters.clone(),
        }
    }

    pub fn add_parameter(mut self, key: impl Into<String>, parameter: JobParameter) -> Self {
        self.parameters.insert(key.into(), parameter);
        self
    }

    pub fn add_string(self, key: &str, value: &str) -> Self {
        self.add_parameter(key, JobParameter::from(value))
    }

    pub fn add_long(self, key: &str, value: i64) -> Self {
        self.add_parameter(key, JobParameter::Long(value))
    }

    pub fn add_double(self, key: &str, value: f64) -> Self {
        self.add_parameter(key, JobParameter::Double(value))
    }

    /// Copies every parameter of `parameters`, overriding existing keys.
    pub fn add_job_parameters(mut self, parameters: &JobParameters) -> Self {
        for (key, value) in parameters.iter() {
            self.parameters.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn to_job_parameters(self) -> JobParameters {
        JobParameters {
            parameters: self.parameters,
        }
    }
}

/// Computes the parameters of the next run of a job from those of the previous one.
pub trait JobParametersIncrementer {
    /// Name of the parameter this incrementer owns.
    fn key(&self) -> &str;

    fn get_next(&self, previous: Option<&JobParameters>) -> JobParameters;
}

/// Increments a `run.id` long parameter so that every launch is a new run.
///
/// # Examples
///
/// ```
/// use spring_batch_tutorial::core::parameters::{JobParametersIncrementer, RunIdIncrementer};
///
/// let incrementer = RunIdIncrementer::default();
///
/// let first = incrementer.get_next(None);
/// let second = incrementer.get_next(Some(&first));
///
/// assert_eq!(first.get_long("run.id"), Some(1));
/// assert_eq!(second.get_long("run.id"), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct RunIdIncrementer {
    key: String,
}

impl RunIdIncrementer {
    pub fn with_key(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }
}

impl Default for RunIdIncrementer {
    fn default() -> Self {
        Self::with_key(RUN_ID_KEY)
    }
}

impl JobParametersIncrementer for RunIdIncrementer {
    fn key(&self) -> &str {
        &self.key
    }

    fn get_next(&self, previous: Option<&JobParameters>) -> JobParameters {
        let previous = previous.cloned().unwrap_or_default();
        let id = previous.get_long(&self.key).unwrap_or(0) + 1;

        JobParametersBuilder::from_parameters(&previous)
            .add_long(&self.key, id)
            .to_job_parameters()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_args_infers_types() {
        let parameters =
            JobParameters::from_args(["chunkSize=20", "ratio=0.5", "name=hello"]).unwrap();

        assert_eq!(parameters.get("chunkSize"), Some(&JobParameter::Long(20)));
        assert_eq!(parameters.get("ratio"), Some(&JobParameter::Double(0.5)));
        assert_eq!(parameters.get("name"), Some(&JobParameter::from("hello")));
        assert_eq!(parameters.len(), 3);
    }

    #[test]
    fn from_args_honours_type_hints() {
        let parameters =
            JobParameters::from_args(["id(string)=10", "count(long)=3", "rate(double)=2"])
                .unwrap();

        assert_eq!(parameters.get("id"), Some(&JobParameter::from("10")));
        assert_eq!(parameters.get_long("count"), Some(3));
        assert_eq!(parameters.get_double("rate"), Some(2.0));
    }

    #[test]
    fn from_args_rejects_malformed_pairs() {
        assert!(matches!(
            JobParameters::from_args(["chunkSize"]),
            Err(BatchError::JobParameter(_))
        ));
        assert!(matches!(
            JobParameters::from_args(["count(long)=ten"]),
            Err(BatchError::JobParameter(_))
        ));
        assert!(matches!(
            JobParameters::from_args(["=10"]),
            Err(BatchError::JobParameter(_))
        ));
    }

    #[test]
    fn get_string_renders_any_type() {
        let parameters = JobParametersBuilder::new()
            .add_long("chunkSize", 15)
            .add_string("label", "demo")
            .to_job_parameters();

        assert_eq!(parameters.get_string("chunkSize"), Some("15".to_string()));
        assert_eq!(parameters.get_string("label"), Some("demo".to_string()));
        assert_eq!(parameters.get_string_or("missing", "10"), "10");
        assert_eq!(parameters.get_long("label"), None);
        assert_eq!(parameters.get_long_or("label", 4), 4);
    }

    #[test]
    fn run_id_incrementer_keeps_other_parameters() {
        let incrementer = RunIdIncrementer::default();
        let previous = JobParametersBuilder::new()
            .add_long(RUN_ID_KEY, 41)
            .add_string("chunkSize", "20")
            .to_job_parameters();

        let next = incrementer.get_next(Some(&previous));

        assert_eq!(next.get_long(RUN_ID_KEY), Some(42));
        assert_eq!(next.get_string("chunkSize"), Some("20".to_string()));
    }

    #[test]
    fn run_id_incrementer_with_custom_key() {
        let incrementer = RunIdIncrementer::with_key("launch");

        let next = incrementer.get_next(None);

        assert_eq!(incrementer.key(), "launch");
        assert_eq!(next.get_long("launch"), Some(1));
        assert!(!next.contains_key(RUN_ID_KEY));
    }

    #[test]
    fn display_lists_parameters_in_key_order() {
        let parameters = JobParametersBuilder::new()
            .add_long(RUN_ID_KEY, 1)
            .add_string("chunkSize", "20")
            .to_job_parameters();

        assert_eq!(parameters.to_string(), "{chunkSize=20, run.id=1}");
    }
}
