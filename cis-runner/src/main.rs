//! CIS Runner
//!
//! Sample client for the CIS ClientIntegration API. Submits the files found
//! in `Input/` as one or more jobs, waits for the service to process them,
//! downloads the results into `Output/<job-id>/` and releases the jobs.
//!
//! Architecture:
//! - Configuration: `appsettings.json`, created with defaults when missing
//! - Bootstrap: working directory layout and input discovery
//! - Scheduler: repository selection, fan-out and the per-job lifecycle
//! - Escalation: visible failure with a delayed exit

mod bootstrap;
mod config;
mod error;
mod escalation;
mod job_log;
mod scheduler;

use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bootstrap::WorkspaceLayout;
use crate::config::{Config, DEFAULT_ERROR_CLOSE_SECONDS};
use crate::escalation::FailureEscalation;
use crate::scheduler::{JobSettings, Scheduler};
use cis_client::CisClient;

#[derive(Parser)]
#[command(name = "cis-runner")]
#[command(about = "Submit input files to CIS and download the results", long_about = None)]
struct Cli {
    /// Settings file, relative to the working directory unless absolute
    #[arg(long, env = "CIS_CONFIG", default_value = "appsettings.json")]
    config: PathBuf,

    /// Directory holding Input/, Output/, JobLogs/ and log.txt
    #[arg(long, env = "CIS_WORK_DIR", default_value = ".")]
    work_dir: PathBuf,

    /// Do not wait for Enter before starting and before closing
    #[arg(long)]
    no_prompt: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Console output belongs to the job logs; tracing only reports problems by default
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cis_runner=warn,cis_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let layout = WorkspaceLayout::new(&cli.work_dir);

    if let Err(e) = layout.prepare().await {
        FailureEscalation::new(layout.run_log.clone(), DEFAULT_ERROR_CLOSE_SECONDS)
            .escalate(&e.user_message())
            .await;
        return ExitCode::FAILURE;
    }

    let config = match Config::load_or_create(&cli.work_dir.join(&cli.config)) {
        Ok(config) => config,
        Err(e) => {
            FailureEscalation::new(layout.run_log.clone(), DEFAULT_ERROR_CLOSE_SECONDS)
                .escalate(&format!("{:#}", e))
                .await;
            return ExitCode::FAILURE;
        }
    };
    let escalation = FailureEscalation::new(layout.run_log.clone(), config.error_close_seconds());

    let files = match layout.input_files().await {
        Ok(files) => files,
        Err(e) => {
            escalation.escalate(&e.user_message()).await;
            return ExitCode::FAILURE;
        }
    };

    let client = match CisClient::new(&config.base_url, config.api_key(), config.trust_certs) {
        Ok(client) => client,
        Err(e) => {
            escalation.escalate(&format!("Error: {}", e)).await;
            return ExitCode::FAILURE;
        }
    };
    info!("Client initialized for {}", client.base_url());

    print_settings(&config);
    if !cli.no_prompt {
        wait_for_enter("\nPress enter to start...").await;
    }

    let settings = Arc::new(JobSettings::from_config(&config, layout));
    let scheduler = Scheduler::new(Arc::new(client), settings);

    match scheduler.run(files).await {
        Ok(reports) => {
            for report in &reports {
                debug!(
                    "Job {} finished with {} -> {}",
                    report.job_id,
                    report.status,
                    report.downloaded.display()
                );
            }
            println!("{}", "Demo Completed Successfully.".green());
        }
        Err(e) => {
            escalation.escalate(&e.user_message()).await;
            return ExitCode::FAILURE;
        }
    }

    if !cli.no_prompt {
        wait_for_enter("Press enter to close...").await;
    }

    ExitCode::SUCCESS
}

fn print_settings(config: &Config) {
    let yes_no = |flag: bool| if flag { "Yes" } else { "No" };

    println!("{}", "SETTINGS".bold());
    println!("Url: {}", config.base_url);
    println!("Submit as Separate Jobs: {}", yes_no(config.separate_jobs));
    println!("Skip Cert Verification: {}", yes_no(config.trust_certs));
    println!("Polling Rate: {}s", config.polling_rate_seconds);
    if let Some(max) = config.max_poll_attempts {
        println!("Max Status Checks: {}", max);
    }
}

/// Prints `prompt` and waits for a line on stdin (or end of input)
async fn wait_for_enter(prompt: &str) {
    println!("{}", prompt);
    let mut line = String::new();
    let _ = BufReader::new(tokio::io::stdin()).read_line(&mut line).await;
}
