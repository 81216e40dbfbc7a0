//! Week metadata from the bold header block above the timetable.
//!
//! The block holds two spans: a week run such as
//! `Tuần 23: Từ ngày 03/02/2025 đến ngày 09/02/2025` and an owner run such as
//! `Thời khóa biểu giảng viên: Nguyễn Văn A`.

use super::error::{Result, TimetableError};
use super::types::{Mode, Owner, WeekMetadata};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, warn};

static STYLED_DIV_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div[style]").unwrap());
static SPAN_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());
static DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}/\d{2}/\d{4}").unwrap());

/// Reads the header, degrading to [`WeekMetadata::unknown`] on any anomaly.
///
/// Callers branch on the unknown sentinels, so this never fails.
pub fn parse_week_metadata(document: &Html, mode: Mode) -> WeekMetadata {
    match try_parse_week_metadata(document, mode) {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!(error = %e, %mode, "Falling back to unknown week metadata");
            WeekMetadata::unknown(mode)
        }
    }
}

/// Reads the header, failing if any part of it is unreadable.
pub fn try_parse_week_metadata(document: &Html, mode: Mode) -> Result<WeekMetadata> {
    let header = find_header(document).ok_or_else(|| TimetableError::Header {
        message: "no bold header block".to_string(),
    })?;

    let mut spans = header.select(&SPAN_SELECTOR);
    let week_run = spans
        .next()
        .map(|span| span.text().collect::<String>())
        .ok_or_else(|| TimetableError::Header {
            message: "header has no week span".to_string(),
        })?;
    let owner_run = spans
        .next()
        .map(|span| span.text().collect::<String>())
        .ok_or_else(|| TimetableError::Header {
            message: "header has no owner span".to_string(),
        })?;

    parse_header_runs(week_run.trim(), owner_run.trim(), mode)
}

/// Builds metadata out of the two header runs.
pub fn parse_header_runs(week_run: &str, owner_run: &str, mode: Mode) -> Result<WeekMetadata> {
    debug!(week_run, owner_run, "Parsing header runs");

    let week_number = parse_week_number(week_run)?;

    let dates: Vec<&str> = DATE_REGEX
        .find_iter(week_run)
        .map(|m| m.as_str())
        .take(2)
        .collect();
    let [start_date, end_date] = dates.as_slice() else {
        return Err(TimetableError::Header {
            message: format!("could not find two dates in: {week_run}"),
        });
    };

    let owner = owner_run.replace(mode.owner_prefix(), "").trim().to_string();

    Ok(WeekMetadata {
        week_number,
        start_date: start_date.to_string(),
        end_date: end_date.to_string(),
        owner: Owner::for_mode(mode, owner),
    })
}

/// First run of digits before the first colon, e.g. `Tuần 23: ...` gives 23.
fn parse_week_number(week_run: &str) -> Result<u32> {
    let before_colon = week_run.split(':').next().unwrap_or_default();
    let digits: String = before_colon
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();

    digits.parse::<u32>().map_err(|_| TimetableError::Header {
        message: format!("no week number in: {week_run}"),
    })
}

/// Finds the `font-weight:bold` div, ignoring spacing and case in the style.
fn find_header(document: &Html) -> Option<ElementRef<'_>> {
    document.select(&STYLED_DIV_SELECTOR).find(|div| {
        let style: String = div
            .value()
            .attr("style")
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        style.trim_end_matches(';') == "font-weight:bold"
    })
}
