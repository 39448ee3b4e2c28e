use std::path::{Path, PathBuf};

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::BatchError;

/// Settings of the tutorial jobs, read from a TOML file.
///
/// Every field is optional in the file. `${VAR}` placeholders are replaced by
/// the value of the environment variable `VAR` before parsing; unknown
/// variables are left as written.
///
/// # Examples
///
/// ```
/// use spring_batch_tutorial::config::AppConfig;
///
/// let config = AppConfig::from_toml_str(r#"
///     database_url = "sqlite://batch.db"
///     person_table = "people"
/// "#).unwrap();
///
/// assert_eq!(config.database_url.as_deref(), Some("sqlite://batch.db"));
/// assert_eq!(config.person_table, "people");
/// assert_eq!(config.csv_path.to_str(), Some("resources/test.csv"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Connection URL of the database used by `itemReaderJob`
    pub database_url: Option<String>,
    /// CSV file read by `csvFileStep`
    pub csv_path: PathBuf,
    pub person_table: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            csv_path: PathBuf::from("resources/test.csv"),
            person_table: "person".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BatchError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|error| {
            BatchError::Configuration(format!("cannot read {}: {}", path.display(), error))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, BatchError> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|error| BatchError::Configuration(format!("TOML parsing error: {}", error)))
    }

    fn substitute_env_vars(content: &str) -> Result<String, BatchError> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|error| BatchError::Configuration(error.to_string()))?;

        let result = re.replace_all(content, |caps: &Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }
}
