//! downwatch - cron-driven uptime monitor
//!
//! Checks one URL per invocation, emails every recipient when it is down and
//! sends a daily sanity letter so a dead scheduler does not go unnoticed.

mod cli;
mod courier;
mod error;
mod lookout;
mod manifest;
mod reveille;
mod sickbay;

use cli::{Cli, Commands};
use courier::{Dispatch, DryRun, Notifier, SmtpDispatch};
use error::Result;
use manifest::MonitorConfig;
use sickbay::{CHECK_TIMEOUT, CheckResult, HttpProbe};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; RUST_LOG overrides the level picked by `--verbose`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let load_config = || -> Result<MonitorConfig> {
        if let Some(path) = manifest::load_env_file(cli.env_file.as_deref())? {
            debug!(path = %path.display(), "loaded env file");
        }
        manifest::load(cli.config.as_deref(), |key| std::env::var(key).ok())
    };

    match cli.command.unwrap_or(Commands::Run { dry_run: false }) {
        Commands::Run { dry_run } => {
            let config = load_config()?;
            let notifier = Delivery::from_flag(dry_run).notifier(&config)?;
            let now = chrono::Local::now();

            let watch = lookout::run(&config, &HttpProbe::default(), &notifier, &now)?;
            info!(
                result = %watch.result,
                sanity_sent = watch.sanity_sent,
                alerts_sent = watch.alerts_sent,
                "pass complete"
            );

            if let Some(line) = pass_line(&watch.result) {
                println!("{}", line);
            }
        }

        Commands::Check { json } => {
            let config = load_config()?;
            let result = sickbay::checker::check(&config.url, CHECK_TIMEOUT);

            let (line, code) = check_report(&result, json)?;
            println!("{}", line);
            if code != 0 {
                std::process::exit(code);
            }
        }

        Commands::Sanity { dry_run } => {
            let config = load_config()?;
            let notifier = Delivery::from_flag(dry_run).notifier(&config)?;
            let sent = lookout::send_sanity_round(&config, &notifier)?;
            println!("Sent {} sanity letter(s).", sent);
        }

        Commands::Validate => {
            let config = load_config()?;
            println!("Configuration is valid.\n");
            println!("{}", config.summary());
        }

        Commands::Completion { shell } => {
            Cli::generate_completion(shell);
        }
    }

    Ok(())
}

/// How letters leave the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Smtp,
    DryRun,
}

impl Delivery {
    fn from_flag(dry_run: bool) -> Self {
        if dry_run { Delivery::DryRun } else { Delivery::Smtp }
    }

    fn notifier(self, config: &MonitorConfig) -> Result<Notifier<Box<dyn Dispatch>>> {
        let dispatch: Box<dyn Dispatch> = match self {
            Delivery::DryRun => Box::new(DryRun),
            Delivery::Smtp => Box::new(SmtpDispatch::new(
                &config.smtp,
                &config.sender.email.to_string(),
                &config.password,
            )?),
        };

        Ok(Notifier::new(config.sender.clone(), dispatch))
    }
}

/// Stdout line after a scheduled pass; only an UP target gets one
fn pass_line(result: &CheckResult) -> Option<&'static str> {
    result.is_up().then_some("Website is up.")
}

/// Output line and exit code for the `check` command
fn check_report(result: &CheckResult, json: bool) -> Result<(String, i32)> {
    let line = if json {
        serde_json::to_string(result)?
    } else if result.is_up() {
        "Website is up.".to_string()
    } else {
        format!("Website is down. Error Code: {}", result.error_code_display())
    };

    Ok((line, if result.is_up() { 0 } else { 1 }))
}
