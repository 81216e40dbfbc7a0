//! iCalendar export of a parsed week.
//!
//! One VEVENT is emitted per session, dated from the week's start date plus
//! the day's offset and timed from the session's period range.

mod uid;

pub use uid::{RandomUids, UidSource};

use crate::timetable::{
    ClassSession, DayName, PeriodTable, Result, Timetable, TimetableError, WeeklySchedule,
};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tracing::{debug, info, warn};

/// Timezone every event is qualified with.
pub const TIMEZONE: &str = "Asia/Ho_Chi_Minh";

/// Longest content line, in octets, before folding.
const MAX_LINE_OCTETS: usize = 75;

/// Separator between description fields: an escaped newline, not a raw one.
const DESCRIPTION_BREAK: &str = "\\n";

/// Writes calendar documents for parsed timetables.
#[derive(Debug, Clone)]
pub struct IcsExporter<'a> {
    periods: &'a PeriodTable,
}

impl IcsExporter<'static> {
    /// Exporter using the process-wide period table.
    pub fn new() -> Self {
        Self::with_periods(PeriodTable::global())
    }
}

impl Default for IcsExporter<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IcsExporter<'a> {
    pub fn with_periods(periods: &'a PeriodTable) -> Self {
        Self { periods }
    }

    /// Exports with fresh random UIDs and the current time as DTSTAMP.
    pub fn export<S: ClassSession>(&self, schedule: &WeeklySchedule<S>) -> Result<String> {
        self.export_with(schedule, &mut RandomUids::new(), Utc::now())
    }

    /// Exports either page variant with fresh UIDs.
    pub fn export_timetable(&self, timetable: &Timetable) -> Result<String> {
        match timetable {
            Timetable::Instructor(schedule) => self.export(schedule),
            Timetable::Student(schedule) => self.export(schedule),
        }
    }

    /// Exports with caller-supplied UIDs and DTSTAMP.
    ///
    /// With a seeded [`UidSource`] and a fixed `dtstamp` the output is
    /// byte-identical across calls.
    ///
    /// # Returns
    /// * `Ok(String)` - The calendar document, CRLF-terminated lines
    /// * `Err(TimetableError::EventDate)` - If the start date or a session time
    ///   cannot be read
    ///
    /// Sessions whose end is not after their start (a period outside the
    /// table or an unreadable label) are left out with a warning.
    pub fn export_with<S: ClassSession>(
        &self,
        schedule: &WeeklySchedule<S>,
        uids: &mut dyn UidSource,
        dtstamp: DateTime<Utc>,
    ) -> Result<String> {
        let base_date = parse_start_date(&schedule.metadata.start_date)?;
        let stamp = dtstamp.format("%Y%m%dT%H%M%SZ").to_string();

        let mut doc = ContentLines::default();
        doc.push("BEGIN:VCALENDAR");
        doc.push(&format!("PRODID:{}", S::MODE.product_id()));
        doc.push("VERSION:2.0");
        doc.push("CALSCALE:GREGORIAN");
        doc.push("METHOD:PUBLISH");
        doc.push(&format!("X-WR-TIMEZONE:{TIMEZONE}"));

        let mut events = 0usize;
        let mut skipped = 0usize;
        for (day, slot, session) in schedule.sessions() {
            if session.is_blank() {
                debug!(%day, ?slot, "Skipping blank session");
                continue;
            }

            let date = event_date(base_date, day)?;
            let (time_begin, time_end) = session.time_range(self.periods);
            let start = event_datetime(date, &time_begin)?;
            let end = event_datetime(date, &time_end)?;
            if end <= start {
                warn!(
                    %day,
                    subject = session.subject(),
                    period = ?session.period_range(),
                    %time_begin,
                    %time_end,
                    "Skipping session without a valid time range"
                );
                skipped += 1;
                continue;
            }

            doc.push("BEGIN:VEVENT");
            doc.push(&format!("UID:{}", uids.next_uid()));
            doc.push(&format!("DTSTAMP:{stamp}"));
            doc.push(&format!("DTSTART;TZID={TIMEZONE}:{}", format_local(start)));
            doc.push(&format!("DTEND;TZID={TIMEZONE}:{}", format_local(end)));
            doc.push(&format!("SUMMARY:{}", escape_text(session.subject())));
            doc.push(&format!("LOCATION:{}", escape_text(session.room())));
            doc.push(&format!("DESCRIPTION:{}", description(session)));
            doc.push("STATUS:CONFIRMED");
            doc.push("SEQUENCE:0");
            doc.push("END:VEVENT");
            events += 1;
        }

        doc.push("END:VCALENDAR");

        info!(
            events,
            skipped,
            week = schedule.metadata.week_number,
            mode = %S::MODE,
            "Generated calendar document"
        );
        Ok(doc.finish())
    }
}

/// Parses the `DD/MM/YYYY` start date of the week.
pub fn parse_start_date(start_date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(start_date.trim(), "%d/%m/%Y").map_err(|e| {
        TimetableError::EventDate {
            message: format!("invalid start_date '{start_date}': {e}"),
        }
    })
}

/// Calendar date of `day` in the week starting at `start_date`, as `DD/MM/YYYY`.
pub fn day_date(start_date: &str, day: DayName) -> Result<String> {
    let date = event_date(parse_start_date(start_date)?, day)?;
    Ok(date.format("%d/%m/%Y").to_string())
}

/// Date of `day` in the week starting at `base_date`.
fn event_date(base_date: NaiveDate, day: DayName) -> Result<NaiveDate> {
    base_date
        .checked_add_days(Days::new(day.offset()))
        .ok_or_else(|| TimetableError::EventDate {
            message: format!("{day} overflows the calendar"),
        })
}

fn event_datetime(date: NaiveDate, time: &str) -> Result<NaiveDateTime> {
    let parsed = NaiveTime::parse_from_str(time.trim(), "%H:%M").map_err(|e| {
        TimetableError::EventDate {
            message: format!("invalid session time '{time}': {e}"),
        }
    })?;
    Ok(date.and_time(parsed))
}

fn format_local(datetime: NaiveDateTime) -> String {
    datetime.format("%Y%m%dT%H%M%S").to_string()
}

fn description<S: ClassSession>(session: &S) -> String {
    session
        .description_fields()
        .into_iter()
        .map(|(label, value)| format!("{label}: {}", escape_text(value)))
        .collect::<Vec<_>>()
        .join(DESCRIPTION_BREAK)
}

/// Escapes a TEXT property value (RFC 5545 section 3.3.11).
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Folds a content line into chunks of at most 75 octets, continuation
/// chunks led by a single space. Never splits a UTF-8 character.
fn fold_line(line: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for c in line.chars() {
        if current.len() + c.len_utf8() > MAX_LINE_OCTETS {
            chunks.push(std::mem::take(&mut current));
            current.push(' ');
        }
        current.push(c);
    }
    chunks.push(current);
    chunks
}

/// Accumulates content lines and joins them with CRLF.
#[derive(Default)]
struct ContentLines {
    lines: Vec<String>,
}

impl ContentLines {
    fn push(&mut self, line: &str) {
        self.lines.extend(fold_line(line));
    }

    fn finish(self) -> String {
        let mut out = self.lines.join("\r\n");
        out.push_str("\r\n");
        out
    }
}
