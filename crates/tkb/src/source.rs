//! URLs of the published timetable pages.
//!
//! Fetching is left to the caller; this only builds the address.

use crate::timetable::{Mode, Result};
use url::Url;

/// Published pages of the course management system.
const PROFESSOR_SCHEDULE_URL: &str = "https://qlgd.dlu.edu.vn/public/DrawingProfessorSchedule";
const CLASS_SCHEDULE_URL: &str =
    "https://qlgd.dlu.edu.vn/public/DrawingClassStudentSchedules_Mau2";

/// What to ask the timetable server for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    /// e.g. "2024-2025"
    pub year_study: String,
    /// e.g. "HK02"
    pub term_id: String,
    pub week: u32,
    /// Professor id (instructor mode) or class id (student mode)
    pub owner_id: String,
}

impl SourceQuery {
    /// Page URL for `mode`.
    ///
    /// `cache_buster` becomes the `t` parameter.
    pub fn url(&self, mode: Mode, cache_buster: f64) -> Result<Url> {
        let (base, owner_key) = match mode {
            Mode::Instructor => (PROFESSOR_SCHEDULE_URL, "ProfessorID"),
            Mode::Student => (CLASS_SCHEDULE_URL, "ClassStudentID"),
        };

        let mut url = Url::parse(base)?;
        url.query_pairs_mut()
            .append_pair("YearStudy", &self.year_study)
            .append_pair("TermID", &self.term_id)
            .append_pair("Week", &self.week.to_string())
            .append_pair(owner_key, &self.owner_id)
            .append_pair("t", &cache_buster.to_string());
        Ok(url)
    }

    /// Page URL stamped with the current time.
    pub fn url_now(&self, mode: Mode) -> Result<Url> {
        let now = chrono::Utc::now();
        let stamp = now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1e6;
        self.url(mode, stamp)
    }
}
