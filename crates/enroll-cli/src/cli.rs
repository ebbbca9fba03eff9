//! CLI argument definitions for the enrollment client.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use enroll_model::Semester;

#[derive(Parser)]
#[command(
    name = "enroll",
    version,
    about = "Course Enrollment Studio - Browse the course catalog and record enrollments",
    long_about = "Browse the reference course catalog and record course enrollments.\n\n\
                  Courses are read from catalog.json in the data directory; recorded\n\
                  enrollments are appended to enrollments.json."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Settings file (default: platform config directory).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Student id stamped on enrollments (overrides settings).
    #[arg(long = "student", value_name = "ID", global = true)]
    pub student: Option<String>,

    /// Seconds to wait for an insert before reporting a timeout.
    #[arg(long = "deadline-secs", value_name = "SECS", global = true)]
    pub deadline_secs: Option<u64>,

    /// Directory holding catalog.json and enrollments.json.
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include student identifiers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List course categories with the number of courses in each.
    Categories,

    /// Search the catalog by course name and category.
    Search(SearchArgs),

    /// Enroll in a course from the catalog.
    Enroll(EnrollArgs),

    /// Show the resolved settings.
    Settings(SettingsArgs),
}

#[derive(Args)]
pub struct SearchArgs {
    /// Case-insensitive text to look for in course names.
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,

    /// Only show courses in this category.
    #[arg(long = "category", value_name = "CATEGORY")]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct EnrollArgs {
    /// Catalog id of the course.
    #[arg(value_name = "COURSE_ID")]
    pub course_id: String,

    /// Academic year, e.g. 2024-2025.
    #[arg(long = "academic-year", value_name = "YEAR")]
    pub academic_year: String,

    /// Grade level (defaults to the lowest recommended level).
    #[arg(long = "grade-level", value_name = "LEVEL")]
    pub grade_level: Option<u8>,

    /// Term: fall, spring, summer or full-year.
    #[arg(long = "semester", value_name = "TERM")]
    pub semester: Option<Semester>,

    /// Credit hours (defaults to 0.5 for semester courses, 1.0 otherwise).
    #[arg(long = "credit-hours", value_name = "HOURS")]
    pub credit_hours: Option<f32>,

    /// Grade received, if any.
    #[arg(long = "grade", value_name = "GRADE")]
    pub grade: Option<String>,

    /// Override the course name recorded on the enrollment.
    #[arg(long = "name", value_name = "NAME")]
    pub name: Option<String>,
}

#[derive(Args)]
pub struct SettingsArgs {
    /// Save the resolved settings to the settings file.
    #[arg(long = "write")]
    pub write: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
