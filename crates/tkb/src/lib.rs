//! Extracts DLU's published weekly timetables into a typed schedule and
//! exports them as iCalendar documents.
//!
//! ```no_run
//! use tkb::ics::IcsExporter;
//! use tkb::timetable::{parse_timetable, Mode};
//!
//! let html = std::fs::read_to_string("week.html")?;
//! let timetable = parse_timetable(&html, Mode::Instructor)?;
//! let calendar = IcsExporter::new().export_timetable(&timetable)?;
//! std::fs::write("week.ics", calendar)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod ics;
pub mod roster;
pub mod source;
pub mod timetable;

pub use timetable::{Result, TimetableError};
