//! CLI entry point for the course grader.
//!
//! Loads the enrollment CSV, derives composite scores, grade points and
//! ranks, and exposes transcript, roster, statistics and score-editing
//! subcommands.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use course_grader::output::{save_table, to_json, write_json};
use course_grader::parser::load_table;
use course_grader::report::{GpaReport, Transcript};
use course_grader::stats::ScoreSummary;
use course_grader::{RosterOrder, ScoreField, ScoreUpdate};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_DATA_PATH: &str = "save_data/all_courses_data.csv";

#[derive(Parser)]
#[command(name = "course_grader")]
#[command(about = "Course enrollment grading and ranking", long_about = None)]
struct Cli {
    /// Enrollment CSV (defaults to $COURSE_GRADER_DATA, then save_data/all_courses_data.csv)
    #[arg(short, long, global = true, value_name = "PATH")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a student's courses, grade points and average GPA
    Transcript {
        #[arg(value_name = "STUDENT_ID")]
        student_id: String,
    },
    /// List a course section's enrollments
    Roster {
        #[arg(value_name = "COURSE_CODE")]
        course_code: String,

        /// original, student-id, midterm, final, continuous or composite
        #[arg(short, long, default_value = "original")]
        order: RosterOrder,
    },
    /// List the courses taught by an instructor or taken by a student
    Courses {
        #[arg(long, conflicts_with = "student", required_unless_present = "student")]
        instructor: Option<String>,

        #[arg(long)]
        student: Option<String>,
    },
    /// Summarize one score field across a course section
    Stats {
        #[arg(value_name = "COURSE_CODE")]
        course_code: String,

        /// midterm, final, continuous or composite
        #[arg(short, long, default_value = "composite")]
        field: ScoreField,
    },
    /// Overwrite a student's three raw scores in one course and save
    Edit {
        /// Student id or, failing that, student name within the course
        #[arg(value_name = "STUDENT")]
        student: String,
        #[arg(value_name = "COURSE_CODE")]
        course_code: String,
        midterm: f64,
        final_score: f64,
        continuous: f64,
    },
    /// Write the average GPA of every student as JSON
    Report {
        /// JSON file to write (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/course_grader.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("course_grader.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let data_path = cli
        .data
        .or_else(|| std::env::var_os("COURSE_GRADER_DATA").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

    let mut table = load_table(&data_path)?;

    match cli.command {
        Commands::Transcript { student_id } => {
            let transcript = Transcript::for_student(&table, &student_id)
                .with_context(|| format!("no enrollments for student {student_id}"))?;
            println!("{}", to_json(&transcript)?);
        }
        Commands::Roster { course_code, order } => {
            let roster = table.roster(&course_code, order);
            if roster.is_empty() {
                bail!("no enrollments for course {course_code}");
            }
            info!(course_code = %course_code, order = %order, size = roster.len(), "Roster");
            println!("{}", to_json(&roster)?);
        }
        Commands::Courses {
            instructor,
            student,
        } => {
            let courses = match (instructor, student) {
                (Some(instructor), _) => table.courses_taught_by(&instructor),
                (None, Some(student)) => table.courses_for_student(&student),
                (None, None) => bail!("either --instructor or --student is required"),
            };
            println!("{}", to_json(&courses)?);
        }
        Commands::Stats { course_code, field } => {
            let summary = ScoreSummary::for_section(&table, &course_code, field)
                .with_context(|| format!("no enrollments for course {course_code}"))?;
            println!("{}", to_json(&summary)?);
        }
        Commands::Edit {
            student,
            course_code,
            midterm,
            final_score,
            continuous,
        } => {
            let student_id = table
                .find_in_section(&course_code, &student)
                .map(|r| r.student_id().to_string())
                .unwrap_or(student);
            let update = ScoreUpdate {
                midterm,
                final_exam: final_score,
                continuous,
            };

            table.mutate(&student_id, &course_code, update)?;
            save_table(&data_path, &table)?;

            if let Some(record) = table.get(&student_id, &course_code) {
                println!("{}", to_json(record)?);
            }
        }
        Commands::Report { output } => {
            let report = GpaReport::from_table(&table);
            info!(students = report.students.len(), "GPA report built");
            match output {
                Some(path) => write_json(&path, &report)?,
                None => println!("{}", to_json(&report)?),
            }
        }
    }

    Ok(())
}
