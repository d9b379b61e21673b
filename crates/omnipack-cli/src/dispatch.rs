use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use omnipack_batch::{BatchResults, BatchRunner};
use omnipack_console::StdConsole;
use omnipack_core::{BatchConfig, Settings, TargetSet, TracingSink};
use omnipack_tolerance::RetryPolicy;

use crate::render::{
    batch_progress, current_output_style, render_json, render_outcome_lines,
    render_summary_line, OutputStyle,
};
use crate::state::FileService;

const DEFAULT_STATE_FILE: &str = "omnipack-state.toml";
const DEFAULT_SETTINGS_FILE: &str = "omnipack-settings.toml";
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Parser, Debug)]
#[command(name = "omnipack")]
#[command(about = "Fault-tolerant batch package install and upgrade", long_about = None)]
pub struct Cli {
    #[arg(long)]
    pub state_file: Option<PathBuf>,
    #[arg(long)]
    pub settings_file: Option<PathBuf>,
    #[arg(long)]
    pub debug: bool,
    #[arg(long)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upgrade named packages, or every installed package when no name
    /// (or the literal "all") is given.
    Upgrade {
        names: Vec<String>,
        #[arg(long)]
        attempts: Option<u32>,
    },
    Install {
        #[arg(required = true)]
        names: Vec<String>,
        #[arg(long)]
        skip_missing_provider: bool,
        #[arg(long)]
        attempts: Option<u32>,
    },
    List,
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run_cli(cli: Cli) -> Result<ExitCode> {
    let style = current_output_style();
    let settings = resolve_settings(cli.settings_file.as_deref(), cli.debug);
    let state_path = cli
        .state_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE));

    match cli.command {
        Commands::Upgrade { names, attempts } => {
            let config = BatchConfig::new(resolve_upgrade_targets(names)?);
            let service = FileService::load(&state_path)?;
            let results = run_batch(&service, &settings, attempts, style, "upgrading", |runner| {
                runner.upgrade_run(&config)
            })?;
            report_results(&results, style, cli.json)
        }
        Commands::Install {
            names,
            skip_missing_provider,
            attempts,
        } => {
            let config = BatchConfig::new(TargetSet::from_names(names)?)
                .skip_unavailable_install_provider(skip_missing_provider);
            let service = FileService::load(&state_path)?;
            let results =
                run_batch(&service, &settings, attempts, style, "installing", |runner| {
                    runner.install_run(&config)
                })?;
            report_results(&results, style, cli.json)
        }
        Commands::List => {
            let service = FileService::load(&state_path)?;
            for package in service.installed_snapshot() {
                println!("{} {}", package.name, package.version);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "omnipack", &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}

pub(crate) fn resolve_upgrade_targets(names: Vec<String>) -> Result<TargetSet> {
    if names.is_empty() {
        Ok(TargetSet::All)
    } else {
        TargetSet::from_names(names)
    }
}

pub(crate) fn resolve_settings(path: Option<&Path>, debug_flag: bool) -> Settings {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    let mut settings = Settings::resolve(Some(&path));
    if debug_flag {
        settings.debug = true;
    }
    settings
}

fn run_batch<F>(
    service: &FileService,
    settings: &Settings,
    attempts: Option<u32>,
    style: OutputStyle,
    label: &str,
    run: F,
) -> Result<BatchResults>
where
    F: FnOnce(&BatchRunner) -> Result<BatchResults>,
{
    let console = StdConsole;
    let sink = TracingSink;
    let policy =
        RetryPolicy::from_settings(attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS), settings);
    let runner = BatchRunner::new(service, &console, &sink).retry_policy(policy);

    let progress = batch_progress(style, label);
    let results = run(&runner);
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
    results
}

fn report_results(results: &BatchResults, style: OutputStyle, json: bool) -> Result<ExitCode> {
    if json {
        println!("{}", render_json(results)?);
    } else {
        for line in render_outcome_lines(style, &results.outcomes()) {
            println!("{line}");
        }
        println!("{}", render_summary_line(results));
    }

    if results.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
