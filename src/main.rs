use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{error, info};
use spring_batch_tutorial::{
    BatchError,
    config::AppConfig,
    core::parameters::JobParameters,
    jobs::{self, item_reader},
};
use sqlx::AnyPool;

#[derive(Parser)]
#[command(name = "spring-batch-tutorial")]
#[command(about = "Runs the Spring Batch tutorial jobs")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Job to run, may be repeated. All registered jobs run when omitted
    #[arg(short, long = "job")]
    jobs: Vec<String>,

    /// Database URL, overrides the configuration file
    #[arg(long)]
    database_url: Option<String>,

    /// Enable debug output
    #[arg(short, long)]
    verbose: bool,

    /// Job parameters as key=value, or key(type)=value with type long, double or string
    parameters: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(error) = run(args).await {
        error!("{:#}", error);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(database_url) = args.database_url {
        config.database_url = Some(database_url);
    }

    let parameters = JobParameters::from_args(&args.parameters)?;

    let pool = match &config.database_url {
        Some(url) => {
            sqlx::any::install_default_drivers();
            let pool = AnyPool::connect(url)
                .await
                .with_context(|| format!("cannot connect to {}", url))?;
            Some(pool)
        }
        None => None,
    };

    let mut launcher = jobs::registry(&config, pool)?;

    if args.jobs.is_empty() {
        let executions = launcher.run_all(&parameters)?;
        info!("{} jobs completed", executions.len());
        return Ok(());
    }

    for name in &args.jobs {
        if name == item_reader::JOB_NAME && !launcher.contains(name) {
            return Err(BatchError::Configuration(format!(
                "{} needs a database, set database_url or --database-url",
                name
            ))
            .into());
        }
        let execution = launcher.run(name, parameters.clone())?;
        info!(
            "Job {} completed in {:?} with parameters {}",
            execution.job_name, execution.duration, execution.parameters
        );
    }

    Ok(())
}
