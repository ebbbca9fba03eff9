//! Course Enrollment Studio CLI.

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use enroll_cli::commands::{EnrollRequest, run_categories, run_enroll, run_search};
use enroll_cli::logging::{LogConfig, LogFormat, init_logging};
use enroll_cli::store::JsonStore;
use enroll_core::{SessionConfig, Settings, SharedBackend};
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, EnrollArgs, LogFormatArg, LogLevelArg, SettingsArgs};
use crate::summary::{print_categories, print_enroll, print_search};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("error: failed to start async runtime: {error}");
            std::process::exit(1);
        }
    };
    let exit_code = match runtime.block_on(run(&cli)) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    // Commands wait for their own background work; shutdown only has to
    // finish store writes already on the blocking pool.
    drop(runtime);
    std::process::exit(exit_code);
}

async fn run(cli: &Cli) -> Result<i32> {
    let (settings_path, settings) = resolve_settings(cli);
    match &cli.command {
        Command::Categories => {
            let categories = run_categories(&backend(&settings)).await?;
            print_categories(&categories);
            Ok(0)
        }
        Command::Search(args) => {
            let result = run_search(
                &backend(&settings),
                args.text.as_deref(),
                args.category.as_deref(),
            )
            .await?;
            print_search(&result);
            Ok(0)
        }
        Command::Enroll(args) => {
            let config = SessionConfig::from_settings(&settings)
                .context("pass --student or set [student] id in the settings file")?;
            let report = run_enroll(backend(&settings), config, &enroll_request(args)).await?;
            print_enroll(&report);
            Ok(if report.is_success() { 0 } else { 1 })
        }
        Command::Settings(args) => run_settings(args, &settings, &settings_path),
    }
}

fn run_settings(args: &SettingsArgs, settings: &Settings, path: &Path) -> Result<i32> {
    print!("{}", settings.to_toml()?);
    if args.write {
        settings
            .save_to(path)
            .with_context(|| format!("save settings to {}", path.display()))?;
        eprintln!("Saved settings to {}", path.display());
    }
    Ok(0)
}

/// Load settings and apply command-line overrides.
fn resolve_settings(cli: &Cli) -> (PathBuf, Settings) {
    let path = cli.config.clone().unwrap_or_else(Settings::config_path);
    let mut settings = Settings::load_from(&path);
    if let Some(student) = &cli.student {
        settings.student.id = student.clone();
    }
    if let Some(secs) = cli.deadline_secs {
        settings.submission.deadline_secs = secs;
    }
    if let Some(dir) = &cli.data_dir {
        settings.store.data_dir = Some(dir.clone());
    }
    (path, settings)
}

fn backend(settings: &Settings) -> SharedBackend {
    let dir = settings.data_dir();
    tracing::debug!(dir = %dir.display(), "Using JSON store");
    Arc::new(JsonStore::new(dir))
}

fn enroll_request(args: &EnrollArgs) -> EnrollRequest {
    EnrollRequest {
        course_id: args.course_id.clone(),
        academic_year: args.academic_year.clone(),
        name: args.name.clone(),
        grade_level: args.grade_level,
        semester: args.semester,
        credit_hours: args.credit_hours,
        grade: args.grade.clone(),
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let mut config = LogConfig::default()
        .with_level_filter(level_filter)
        .with_format(format)
        .with_log_file(cli.log_file.clone())
        .with_log_data(cli.log_data);
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
