//! tkb - timetable parser and calendar exporter.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tkb::config::SourceConfig;
use tkb::ics::IcsExporter;
use tkb::roster::parse_roster;
use tkb::source::SourceQuery;
use tkb::timetable::{parse_timetable, Mode, Timetable};

#[derive(Debug, Parser)]
#[command(name = "tkb", version, about = "Parse DLU timetables and export them to iCalendar")]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Instructor,
    Student,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Instructor => Mode::Instructor,
            ModeArg::Student => Mode::Student,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse a saved timetable page into schedule JSON
    Parse {
        #[arg(long, value_enum)]
        mode: ModeArg,
        /// Saved HTML page
        input: PathBuf,
        /// Output file (default: schedule_YYYYMMDD.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export schedule JSON to an .ics calendar
    Export {
        #[arg(long, value_enum)]
        mode: ModeArg,
        /// Schedule JSON written by `parse`
        input: PathBuf,
        /// Output file (default: teaching_schedule_YYYYMMDD.ics or student_schedule_YYYYMMDD.ics)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Parse a saved timetable page straight to an .ics calendar
    Convert {
        #[arg(long, value_enum)]
        mode: ModeArg,
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Extract the instructor roster from the professor picker page
    Roster {
        input: PathBuf,
        /// Output file (default: teachers.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Only list teachers whose name or id contains this text
        #[arg(long)]
        search: Option<String>,
        /// Also replace teachers.json in this config directory
        #[arg(long)]
        config_dir: Option<PathBuf>,
    },
    /// Print the URL of a published timetable page
    Url {
        #[arg(long, value_enum)]
        mode: ModeArg,
        /// Academic year, e.g. 2024-2025
        #[arg(long)]
        year: String,
        /// Term id, e.g. HK02
        #[arg(long)]
        term: String,
        #[arg(long)]
        week: u32,
        /// Professor id or class id
        #[arg(long)]
        id: String,
    },
    /// Write default config files into a directory
    InitConfig {
        #[arg(default_value = "config")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn,tkb=info",
        1 => "info,tkb=debug",
        _ => "debug,tkb=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Parse {
            mode,
            input,
            output,
        } => {
            let timetable = read_timetable_page(&input, mode.into())?;
            println!("{}", timetable.metadata().summary());

            let output = output.unwrap_or_else(|| dated_name("schedule", "json"));
            let json = timetable.to_json_pretty()?;
            write_output(&output, &json)?;
        }
        Commands::Export {
            mode,
            input,
            output,
        } => {
            let mode = Mode::from(mode);
            let json = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let timetable = Timetable::from_json(&json, mode)
                .with_context(|| format!("{} is not a {mode} schedule", input.display()))?;
            export(&timetable, output)?;
        }
        Commands::Convert {
            mode,
            input,
            output,
        } => {
            let timetable = read_timetable_page(&input, mode.into())?;
            export(&timetable, output)?;
        }
        Commands::Roster {
            input,
            output,
            search,
            config_dir,
        } => {
            let html = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let roster = parse_roster(&html);

            if let Some(query) = search {
                for teacher in roster.search(&query) {
                    println!("{}", teacher.display_label());
                }
                return Ok(());
            }

            let output = output.unwrap_or_else(|| PathBuf::from("teachers.json"));
            write_output(&output, &serde_json::to_string_pretty(&roster)?)?;

            if let Some(dir) = config_dir {
                let count = SourceConfig::write_teachers(&dir, roster.teachers)?;
                println!("Updated {} teachers in {}", count, dir.display());
            }
        }
        Commands::Url {
            mode,
            year,
            term,
            week,
            id,
        } => {
            let query = SourceQuery {
                year_study: year,
                term_id: term,
                week,
                owner_id: id,
            };
            println!("{}", query.url_now(mode.into())?);
        }
        Commands::InitConfig { dir } => {
            let written = SourceConfig::ensure_defaults(&dir)?;
            if written.is_empty() {
                println!("All config files already exist in {}", dir.display());
            }
            for name in written {
                println!("Wrote {}", dir.join(name).display());
            }
        }
    }

    Ok(())
}

fn read_timetable_page(input: &Path, mode: Mode) -> Result<Timetable> {
    let html = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let timetable = parse_timetable(&html, mode)
        .with_context(|| format!("Failed to parse {}", input.display()))?;
    Ok(timetable)
}

fn export(timetable: &Timetable, output: Option<PathBuf>) -> Result<()> {
    let calendar = IcsExporter::new().export_timetable(timetable)?;

    let output = output.unwrap_or_else(|| match timetable.mode() {
        Mode::Instructor => dated_name("teaching_schedule", "ics"),
        Mode::Student => dated_name("student_schedule", "ics"),
    });
    write_output(&output, &calendar)
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = content.len(), "Wrote output");
    println!("Saved to {}", path.display());
    Ok(())
}

/// `<stem>_YYYYMMDD.<ext>` for today's local date.
fn dated_name(stem: &str, ext: &str) -> PathBuf {
    let today = chrono::Local::now().format("%Y%m%d");
    PathBuf::from(format!("{stem}_{today}.{ext}"))
}
