//! Timetable page parsing module

mod error;
mod header;
mod periods;
mod session;
mod types;

pub use error::{Result, TimetableError};
pub use header::{parse_header_runs, parse_week_metadata, try_parse_week_metadata};
pub use periods::{PeriodSpan, PeriodTable, PERIOD_MINUTES, SENTINEL_TIME};
pub use session::{
    parse_arrow_period, parse_dash_period, parse_instructor_cell, parse_student_cell,
};
pub use types::*;

use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

static TABLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static ROW_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// Parses a fetched timetable page of the given variant.
///
/// # Arguments
/// * `html` - Raw markup of the page
/// * `mode` - Which page variant the markup is
///
/// # Returns
/// * `Ok(Timetable)` - The week's sessions and header metadata
/// * `Err(TimetableError::StructureChanged)` - If the page has no schedule table
pub fn parse_timetable(html: &str, mode: Mode) -> Result<Timetable> {
    match mode {
        Mode::Instructor => parse_instructor_timetable(html).map(Timetable::Instructor),
        Mode::Student => {
            parse_student_timetable(html, PeriodTable::global()).map(Timetable::Student)
        }
    }
}

/// Parses a per-professor page.
///
/// Every available day row is kept, even when all three of its cells are empty.
pub fn parse_instructor_timetable(html: &str) -> Result<InstructorSchedule> {
    info!("Parsing instructor timetable");

    let document = Html::parse_document(html);
    let mut schedule = BTreeMap::new();

    for (day, cells) in day_rows(&document)? {
        if cells.len() < Slot::ALL.len() {
            warn!(%day, cells = cells.len(), "Instructor row is missing slot cells");
        }

        let mut day_schedule = DaySchedule::new();
        for (slot, cell) in Slot::ALL.into_iter().zip(&cells) {
            if let Some(session) = parse_instructor_cell(cell) {
                debug!(%day, ?slot, subject = %session.subject, "Parsed session");
                day_schedule.slot_mut(slot).push(session);
            }
        }
        schedule.insert(day, day_schedule);
    }

    let metadata = parse_week_metadata(&document, Mode::Instructor);
    let weekly = WeeklySchedule { metadata, schedule };

    info!(
        days = weekly.schedule.len(),
        sessions = weekly.session_count(),
        "Parsed instructor timetable"
    );
    Ok(weekly)
}

/// Parses a per-class page.
///
/// Rows with fewer than three cells are skipped, so their day is absent from
/// the result.
pub fn parse_student_timetable(html: &str, periods: &PeriodTable) -> Result<StudentSchedule> {
    info!("Parsing student timetable");

    let document = Html::parse_document(html);
    let mut schedule = BTreeMap::new();

    for (day, cells) in day_rows(&document)? {
        if cells.len() < Slot::ALL.len() {
            warn!(%day, cells = cells.len(), "Skipping student row with too few cells");
            continue;
        }

        let mut day_schedule = DaySchedule::new();
        for (slot, cell) in Slot::ALL.into_iter().zip(&cells) {
            let sessions = parse_student_cell(cell, periods);
            if !sessions.is_empty() {
                debug!(%day, ?slot, sessions = sessions.len(), "Parsed sessions");
            }
            day_schedule.slot_mut(slot).extend(sessions);
        }
        schedule.insert(day, day_schedule);
    }

    let metadata = parse_week_metadata(&document, Mode::Student);
    let weekly = WeeklySchedule { metadata, schedule };

    info!(
        days = weekly.schedule.len(),
        sessions = weekly.session_count(),
        "Parsed student timetable"
    );
    Ok(weekly)
}

/// Pairs the body rows of the first table with the day names, Monday first.
///
/// The header row is skipped. Extra rows past Sunday are ignored; missing
/// trailing rows just leave their days out.
fn day_rows(document: &Html) -> Result<Vec<(DayName, Vec<ElementRef<'_>>)>> {
    let table = document
        .select(&TABLE_SELECTOR)
        .next()
        .ok_or_else(|| TimetableError::StructureChanged {
            message: "Schedule table not found in HTML content".to_string(),
        })?;

    let rows: Vec<(DayName, Vec<ElementRef>)> = table
        .select(&ROW_SELECTOR)
        .skip(1)
        .zip(DayName::ALL)
        .map(|(row, day)| (day, row.select(&CELL_SELECTOR).collect()))
        .collect();

    Ok(rows)
}
