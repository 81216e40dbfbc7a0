//! Session extraction from a single table cell.
//!
//! A cell packs its fields into sibling `<span>` elements, each led by a
//! fixed label (`-Lớp:`, `- Phòng:` and so on). Instructor cells hold at
//! most one session; student cells stack several, separated by `<hr>`.

use super::periods::PeriodTable;
use super::types::{InstructorSession, StudentSession};
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;
use tracing::debug;

/// Spans an instructor cell needs to count as a session.
pub const INSTRUCTOR_FIELD_COUNT: usize = 7;

/// Spans a student run needs to count as a session.
pub const STUDENT_FIELD_COUNT: usize = 6;

// Static selectors for parsing - compiled once
static SPAN_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());
static RUN_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span, hr").unwrap());

/// Field labels of the instructor page.
mod instructor_labels {
    pub const CLASS_CODE: &str = "-Mã LHP:";
    pub const CLASS_NAME: &str = "-Lớp:";
    pub const PERIOD: &str = "-Tiết:";
    pub const TAUGHT: &str = "-Đã dạy:";
    pub const ROOM: &str = "-Phòng :";
    pub const CONTENT: &str = "-Nội dung :";
}

/// Field labels of the student page.
mod student_labels {
    pub const CLASS_CODE: &str = "- Nhóm:";
    pub const CLASS_NAME: &str = "- Lớp:";
    pub const PERIOD: &str = "- Tiết:";
    pub const ROOM: &str = "- Phòng:";
    pub const TEACHER: &str = "- GV:";
}

/// Parses an instructor period label such as `1->4`.
///
/// Anything that is not two non-negative integers around `->` with
/// begin <= end yields `(0, 0)`.
pub fn parse_arrow_period(label: &str) -> (u32, u32) {
    split_period(label, "->").unwrap_or((0, 0))
}

/// Parses a student period label such as `- Tiết: 1-2`.
///
/// The `- Tiết:` label is optional. Anything else yields `(0, 0)`.
pub fn parse_dash_period(label: &str) -> (u32, u32) {
    let cleaned = label.replace(student_labels::PERIOD, "");
    split_period(cleaned.trim(), "-").unwrap_or((0, 0))
}

fn split_period(text: &str, separator: &str) -> Option<(u32, u32)> {
    let mut parts = text.split(separator);
    let begin = parts.next()?.trim().parse::<u32>().ok()?;
    let end = parts.next()?.trim().parse::<u32>().ok()?;

    if parts.next().is_some() || begin > end {
        return None;
    }
    Some((begin, end))
}

/// Text of an element with `label` removed and surrounding whitespace trimmed.
fn field_text(element: &ElementRef, label: &str) -> String {
    let text = element.text().collect::<String>();
    if label.is_empty() {
        text.trim().to_string()
    } else {
        text.replace(label, "").trim().to_string()
    }
}

/// Reads the single session of an instructor-page cell.
///
/// Returns `None` for an empty cell or one with fewer than
/// [`INSTRUCTOR_FIELD_COUNT`] spans.
pub fn parse_instructor_cell(cell: &ElementRef) -> Option<InstructorSession> {
    let spans: Vec<ElementRef> = cell.select(&SPAN_SELECTOR).collect();

    if spans.is_empty() {
        return None;
    }
    if spans.len() < INSTRUCTOR_FIELD_COUNT {
        debug!(
            spans = spans.len(),
            "Instructor cell has too few fields, treating as empty"
        );
        return None;
    }

    let period = field_text(&spans[3], instructor_labels::PERIOD);
    let (period_begin, period_end) = parse_arrow_period(&period);

    Some(InstructorSession {
        subject: field_text(&spans[0], ""),
        class_code: field_text(&spans[1], instructor_labels::CLASS_CODE),
        class_name: field_text(&spans[2], instructor_labels::CLASS_NAME),
        period,
        period_begin,
        period_end,
        taught_lessons: field_text(&spans[4], instructor_labels::TAUGHT),
        room: field_text(&spans[5], instructor_labels::ROOM),
        content: field_text(&spans[6], instructor_labels::CONTENT),
    })
}

/// Reads every session stacked in a student-page cell.
///
/// Spans are grouped into runs at each `<hr>`; runs that are too short are
/// dropped without affecting their siblings.
pub fn parse_student_cell(cell: &ElementRef, periods: &PeriodTable) -> Vec<StudentSession> {
    let mut sessions = Vec::new();
    let mut run: Vec<ElementRef> = Vec::new();

    for element in cell.select(&RUN_SELECTOR) {
        if element.value().name() == "hr" {
            if !run.is_empty() {
                sessions.extend(parse_student_run(&run, periods));
            }
            run.clear();
        } else {
            run.push(element);
        }
    }

    if !run.is_empty() {
        sessions.extend(parse_student_run(&run, periods));
    }

    sessions
}

/// Builds one student session out of a separator-bounded run of spans.
fn parse_student_run(spans: &[ElementRef], periods: &PeriodTable) -> Option<StudentSession> {
    if spans.len() < STUDENT_FIELD_COUNT {
        debug!(spans = spans.len(), "Dropping malformed student run");
        return None;
    }

    // Kept with its label; only the numbers are parsed out of it
    let period = field_text(&spans[3], "");
    let (period_begin, period_end) = parse_dash_period(&period);

    Some(StudentSession {
        subject: field_text(&spans[0], ""),
        class_code: field_text(&spans[1], student_labels::CLASS_CODE),
        class_name: field_text(&spans[2], student_labels::CLASS_NAME),
        period,
        period_begin,
        period_end,
        time_begin: periods.start_label(period_begin),
        time_end: periods.end_label(period_end),
        room: field_text(&spans[4], student_labels::ROOM),
        teacher_name: field_text(&spans[5], student_labels::TEACHER),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    static TD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

    fn with_cell<T>(inner: &str, f: impl FnOnce(&ElementRef) -> T) -> T {
        let html = format!("<table><tr><td>{inner}</td></tr></table>");
        let document = Html::parse_document(&html);
        let cell = document.select(&TD_SELECTOR).next().unwrap();
        f(&cell)
    }

    fn instructor_spans(fields: [&str; 7]) -> String {
        fields
            .iter()
            .map(|f| format!("<span>{f}</span><br/>"))
            .collect()
    }

    #[test]
    fn test_arrow_period() {
        assert_eq!(parse_arrow_period("1->4"), (1, 4));
        assert_eq!(parse_arrow_period(" 7 -> 9 "), (7, 9));
        assert_eq!(parse_arrow_period("3->3"), (3, 3));
        assert_eq!(parse_arrow_period("1-4"), (0, 0));
        assert_eq!(parse_arrow_period("a->b"), (0, 0));
        assert_eq!(parse_arrow_period("1->2->3"), (0, 0));
        assert_eq!(parse_arrow_period("4->1"), (0, 0));
        assert_eq!(parse_arrow_period(""), (0, 0));
    }

    #[test]
    fn test_dash_period() {
        assert_eq!(parse_dash_period("- Tiết: 1-2"), (1, 2));
        assert_eq!(parse_dash_period("11-14"), (11, 14));
        assert_eq!(parse_dash_period("- Tiết: 1->2"), (0, 0));
        assert_eq!(parse_dash_period("- Tiết: 1-2-3"), (0, 0));
        assert_eq!(parse_dash_period("- Tiết:"), (0, 0));
    }

    #[test]
    fn test_instructor_cell() {
        let inner = instructor_spans([
            "Toán cao cấp",
            "-Mã LHP: C01",
            "-Lớp: K45",
            "-Tiết: 1->2",
            "-Đã dạy: 10",
            "-Phòng : P101",
            "-Nội dung : Chương 2",
        ]);
        let session = with_cell(&inner, parse_instructor_cell).unwrap();

        assert_eq!(session.subject, "Toán cao cấp");
        assert_eq!(session.class_code, "C01");
        assert_eq!(session.class_name, "K45");
        assert_eq!(session.period, "1->2");
        assert_eq!((session.period_begin, session.period_end), (1, 2));
        assert_eq!(session.taught_lessons, "10");
        assert_eq!(session.room, "P101");
        assert_eq!(session.content, "Chương 2");
    }

    #[test]
    fn test_instructor_cell_with_bad_period_uses_sentinel() {
        let inner = instructor_spans([
            "Toán", "-Mã LHP: C01", "-Lớp: K45", "-Tiết: sáng", "-Đã dạy: 1", "-Phòng : P1", "",
        ]);
        let session = with_cell(&inner, parse_instructor_cell).unwrap();
        assert_eq!((session.period_begin, session.period_end), (0, 0));
        assert_eq!(session.period, "sáng");
    }

    #[test]
    fn test_instructor_cell_too_few_fields() {
        let inner = "<span>Toán</span><span>-Mã LHP: C01</span><span>-Lớp: K45</span>";
        assert!(with_cell(inner, parse_instructor_cell).is_none());
    }

    #[test]
    fn test_empty_cells_yield_nothing() {
        assert!(with_cell("", parse_instructor_cell).is_none());
        assert!(with_cell("&nbsp;", parse_instructor_cell).is_none());
        let periods = PeriodTable::global();
        assert!(with_cell("", |cell| parse_student_cell(cell, periods)).is_empty());
    }

    fn student_run(subject: &str, period: &str) -> String {
        format!(
            "<span>{subject}</span><span>- Nhóm: 01</span><span>- Lớp: KTK48A</span>\
             <span>{period}</span><span>- Phòng: A12.101</span><span>- GV: Lê Văn C</span>"
        )
    }

    #[test]
    fn test_student_cell_with_stacked_sessions() {
        let inner = format!(
            "{}<hr/>{}",
            student_run("Kinh tế vi mô", "- Tiết: 1-3"),
            student_run("Tiếng Anh", "- Tiết: 4-5")
        );
        let sessions = with_cell(&inner, |cell| parse_student_cell(cell, PeriodTable::global()));

        assert_eq!(sessions.len(), 2);
        let first = &sessions[0];
        assert_eq!(first.subject, "Kinh tế vi mô");
        assert_eq!(first.class_code, "01");
        assert_eq!(first.class_name, "KTK48A");
        assert_eq!(first.period, "- Tiết: 1-3");
        assert_eq!((first.period_begin, first.period_end), (1, 3));
        assert_eq!((first.time_begin.as_str(), first.time_end.as_str()), ("07:30", "09:55"));
        assert_eq!(first.room, "A12.101");
        assert_eq!(first.teacher_name, "Lê Văn C");

        let second = &sessions[1];
        assert_eq!(second.subject, "Tiếng Anh");
        assert_eq!((second.time_begin.as_str(), second.time_end.as_str()), ("10:15", "11:50"));
    }

    #[test]
    fn test_malformed_run_does_not_drop_siblings() {
        let inner = format!(
            "<span>Lạc</span><span>- Nhóm: 02</span><hr/>{}<hr/>",
            student_run("Triết học", "- Tiết: 7-8")
        );
        let sessions = with_cell(&inner, |cell| parse_student_cell(cell, PeriodTable::global()));
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].subject, "Triết học");
        assert_eq!(sessions[0].time_begin, "13:00");
        assert_eq!(sessions[0].time_end, "14:35");
    }

    #[test]
    fn test_student_out_of_range_period_resolves_to_sentinel_time() {
        let inner = student_run("Thể dục", "- Tiết: 15-16");
        let sessions = with_cell(&inner, |cell| parse_student_cell(cell, PeriodTable::global()));
        assert_eq!(sessions.len(), 1);
        assert_eq!((sessions[0].period_begin, sessions[0].period_end), (15, 16));
        assert_eq!(sessions[0].time_begin, "00:00");
        assert_eq!(sessions[0].time_end, "00:00");
    }
}
