//! Types for parsed timetable data

use super::periods::PeriodTable;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which published page a timetable was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Per-professor page (`DrawingProfessorSchedule`)
    Instructor,
    /// Per-class page (`DrawingClassStudentSchedules_Mau2`)
    Student,
}

impl Mode {
    /// Label stripped from the owner run of the page header.
    pub fn owner_prefix(&self) -> &'static str {
        match self {
            Mode::Instructor => "Thời khóa biểu giảng viên:",
            Mode::Student => "Thời khóa biểu lớp:",
        }
    }

    /// PRODID of calendar documents exported for this mode.
    pub fn product_id(&self) -> &'static str {
        match self {
            Mode::Instructor => "-//DalatCoder//Schedule Exporter//EN",
            Mode::Student => "-//DalatCoder//Student Schedule Exporter//EN",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Instructor => write!(f, "instructor"),
            Mode::Student => write!(f, "student"),
        }
    }
}

/// Day of the week as labelled on the published table.
///
/// Declaration order is Monday..Sunday; `Ord` and [`DayName::offset`] rely on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayName {
    #[serde(rename = "Thứ 2")]
    Monday,
    #[serde(rename = "Thứ 3")]
    Tuesday,
    #[serde(rename = "Thứ 4")]
    Wednesday,
    #[serde(rename = "Thứ 5")]
    Thursday,
    #[serde(rename = "Thứ 6")]
    Friday,
    #[serde(rename = "Thứ 7")]
    Saturday,
    #[serde(rename = "Chủ nhật")]
    Sunday,
}

impl DayName {
    /// Row order of the table body.
    pub const ALL: [DayName; 7] = [
        DayName::Monday,
        DayName::Tuesday,
        DayName::Wednesday,
        DayName::Thursday,
        DayName::Friday,
        DayName::Saturday,
        DayName::Sunday,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DayName::Monday => "Thứ 2",
            DayName::Tuesday => "Thứ 3",
            DayName::Wednesday => "Thứ 4",
            DayName::Thursday => "Thứ 5",
            DayName::Friday => "Thứ 6",
            DayName::Saturday => "Thứ 7",
            DayName::Sunday => "Chủ nhật",
        }
    }

    /// Days after the week's start date (Monday = 0).
    pub fn offset(&self) -> u64 {
        *self as u64
    }
}

impl fmt::Display for DayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the three day partitions (table columns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Morning,
    Afternoon,
    Evening,
}

impl Slot {
    /// Column order of the table body.
    pub const ALL: [Slot; 3] = [Slot::Morning, Slot::Afternoon, Slot::Evening];
}

/// Capability shared by the instructor and student session records.
pub trait ClassSession: Clone + fmt::Debug + Serialize + DeserializeOwned {
    /// Page variant this record is parsed from.
    const MODE: Mode;

    fn subject(&self) -> &str;
    fn class_code(&self) -> &str;
    fn class_name(&self) -> &str;
    /// Period label as printed on the page.
    fn period(&self) -> &str;
    /// Inclusive 1-based period range, `(0, 0)` when the label was unreadable.
    fn period_range(&self) -> (u32, u32);
    fn room(&self) -> &str;

    /// Wall-clock start and end as `HH:MM`.
    fn time_range(&self, periods: &PeriodTable) -> (String, String);

    /// The labelled field that differs between modes, closing the description.
    fn detail(&self) -> (&'static str, &str);

    /// Returns true if the record carries no text at all.
    fn is_blank(&self) -> bool;

    /// Labelled fields of an event description, in display order.
    fn description_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Mã lớp", self.class_code()),
            ("Lớp", self.class_name()),
            ("Tiết", self.period()),
            self.detail(),
        ]
    }
}

/// A class read from the instructor page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorSession {
    pub subject: String,
    pub class_code: String,
    pub class_name: String,
    pub period: String, // e.g. "1->4"
    pub period_begin: u32,
    pub period_end: u32,
    pub taught_lessons: String,
    pub room: String,
    pub content: String,
}

impl ClassSession for InstructorSession {
    const MODE: Mode = Mode::Instructor;

    fn subject(&self) -> &str {
        &self.subject
    }

    fn class_code(&self) -> &str {
        &self.class_code
    }

    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn period(&self) -> &str {
        &self.period
    }

    fn period_range(&self) -> (u32, u32) {
        (self.period_begin, self.period_end)
    }

    fn room(&self) -> &str {
        &self.room
    }

    /// Instructor pages carry no clock times, so they come from the period table.
    fn time_range(&self, periods: &PeriodTable) -> (String, String) {
        (
            periods.start_label(self.period_begin),
            periods.end_label(self.period_end),
        )
    }

    fn detail(&self) -> (&'static str, &str) {
        ("Đã dạy", &self.taught_lessons)
    }

    fn is_blank(&self) -> bool {
        [
            &self.subject,
            &self.class_code,
            &self.class_name,
            &self.period,
            &self.taught_lessons,
            &self.room,
            &self.content,
        ]
        .iter()
        .all(|s| s.is_empty())
    }
}

/// A class read from the student (per-class) page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSession {
    pub subject: String,
    pub class_code: String,
    pub class_name: String,
    pub period: String, // e.g. "- Tiết: 1-2"
    pub period_begin: u32,
    pub period_end: u32,
    pub time_begin: String,
    pub time_end: String,
    pub room: String,
    pub teacher_name: String,
}

impl ClassSession for StudentSession {
    const MODE: Mode = Mode::Student;

    fn subject(&self) -> &str {
        &self.subject
    }

    fn class_code(&self) -> &str {
        &self.class_code
    }

    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn period(&self) -> &str {
        &self.period
    }

    fn period_range(&self) -> (u32, u32) {
        (self.period_begin, self.period_end)
    }

    fn room(&self) -> &str {
        &self.room
    }

    fn time_range(&self, _periods: &PeriodTable) -> (String, String) {
        (self.time_begin.clone(), self.time_end.clone())
    }

    fn detail(&self) -> (&'static str, &str) {
        ("Giảng viên", &self.teacher_name)
    }

    fn is_blank(&self) -> bool {
        [
            &self.subject,
            &self.class_code,
            &self.class_name,
            &self.period,
            &self.room,
            &self.teacher_name,
        ]
        .iter()
        .all(|s| s.is_empty())
    }
}

/// Sessions of one day, grouped by slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule<S> {
    pub morning: Vec<S>,
    pub afternoon: Vec<S>,
    pub evening: Vec<S>,
}

impl<S> DaySchedule<S> {
    pub fn new() -> Self {
        Self {
            morning: Vec::new(),
            afternoon: Vec::new(),
            evening: Vec::new(),
        }
    }

    pub fn slot(&self, slot: Slot) -> &[S] {
        match slot {
            Slot::Morning => &self.morning,
            Slot::Afternoon => &self.afternoon,
            Slot::Evening => &self.evening,
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut Vec<S> {
        match slot {
            Slot::Morning => &mut self.morning,
            Slot::Afternoon => &mut self.afternoon,
            Slot::Evening => &mut self.evening,
        }
    }

    pub fn len(&self) -> usize {
        self.morning.len() + self.afternoon.len() + self.evening.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S> Default for DaySchedule<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Whose timetable a page shows. Serialized flat into the metadata as
/// `professor_name` or `class_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Owner {
    ProfessorName(String),
    ClassName(String),
}

impl Owner {
    pub fn for_mode(mode: Mode, name: impl Into<String>) -> Self {
        match mode {
            Mode::Instructor => Owner::ProfessorName(name.into()),
            Mode::Student => Owner::ClassName(name.into()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Owner::ProfessorName(name) | Owner::ClassName(name) => name,
        }
    }
}

/// Sentinel used for every unreadable header field.
pub const UNKNOWN: &str = "Unknown";

/// Week number, date range and owner read from the page header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekMetadata {
    pub week_number: u32,
    pub start_date: String, // DD/MM/YYYY
    pub end_date: String,   // DD/MM/YYYY
    #[serde(flatten)]
    pub owner: Owner,
}

impl WeekMetadata {
    /// Metadata for a header that could not be read.
    pub fn unknown(mode: Mode) -> Self {
        Self {
            week_number: 0,
            start_date: UNKNOWN.to_string(),
            end_date: UNKNOWN.to_string(),
            owner: Owner::for_mode(mode, UNKNOWN),
        }
    }

    /// Returns true if this is the degraded metadata of an unreadable header.
    pub fn is_unknown(&self) -> bool {
        self.week_number == 0 && self.start_date == UNKNOWN
    }

    /// Three-line human readable summary.
    pub fn summary(&self) -> String {
        let owner_label = match self.owner {
            Owner::ProfessorName(_) => "Professor",
            Owner::ClassName(_) => "Class",
        };
        format!(
            "Week: {}\nPeriod: {} - {}\n{}: {}",
            self.week_number,
            self.start_date,
            self.end_date,
            owner_label,
            self.owner.name()
        )
    }
}

/// One week of sessions plus its metadata, as read from a single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule<S> {
    pub metadata: WeekMetadata,
    pub schedule: BTreeMap<DayName, DaySchedule<S>>,
}

impl<S: ClassSession> WeeklySchedule<S> {
    /// Every session in day then slot order.
    pub fn sessions(&self) -> impl Iterator<Item = (DayName, Slot, &S)> + '_ {
        self.schedule.iter().flat_map(|(day, day_schedule)| {
            Slot::ALL.into_iter().flat_map(move |slot| {
                day_schedule
                    .slot(slot)
                    .iter()
                    .map(move |session| (*day, slot, session))
            })
        })
    }

    pub fn session_count(&self) -> usize {
        self.schedule.values().map(DaySchedule::len).sum()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

pub type InstructorSchedule = WeeklySchedule<InstructorSession>;
pub type StudentSchedule = WeeklySchedule<StudentSession>;

/// A parsed timetable of either page variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Timetable {
    Instructor(InstructorSchedule),
    Student(StudentSchedule),
}

impl Timetable {
    pub fn mode(&self) -> Mode {
        match self {
            Timetable::Instructor(_) => Mode::Instructor,
            Timetable::Student(_) => Mode::Student,
        }
    }

    pub fn metadata(&self) -> &WeekMetadata {
        match self {
            Timetable::Instructor(s) => &s.metadata,
            Timetable::Student(s) => &s.metadata,
        }
    }

    pub fn session_count(&self) -> usize {
        match self {
            Timetable::Instructor(s) => s.session_count(),
            Timetable::Student(s) => s.session_count(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Reads the nested-mapping form back. The mode has to be known up front:
    /// an empty week looks the same in both variants.
    pub fn from_json(json: &str, mode: Mode) -> serde_json::Result<Self> {
        match mode {
            Mode::Instructor => WeeklySchedule::from_json(json).map(Timetable::Instructor),
            Mode::Student => WeeklySchedule::from_json(json).map(Timetable::Student),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn student_session() -> StudentSession {
        StudentSession {
            subject: "Lập trình Web".to_string(),
            class_code: "02".to_string(),
            class_name: "CTK46A".to_string(),
            period: "- Tiết: 7-9".to_string(),
            period_begin: 7,
            period_end: 9,
            time_begin: "13:00".to_string(),
            time_end: "15:35".to_string(),
            room: "A21.301".to_string(),
            teacher_name: "Nguyễn Văn A".to_string(),
        }
    }

    #[test]
    fn test_day_labels_and_offsets_agree() {
        for (i, day) in DayName::ALL.iter().enumerate() {
            assert_eq!(day.offset(), i as u64);
            assert_eq!(serde_json::to_value(day).unwrap(), json!(day.label()));
        }
        let sunday: DayName = serde_json::from_value(json!("Chủ nhật")).unwrap();
        assert_eq!(sunday, DayName::Sunday);
        assert!(serde_json::from_value::<DayName>(json!("Sunday")).is_err());
    }

    #[test]
    fn test_metadata_owner_key_follows_mode() {
        let mut meta = WeekMetadata::unknown(Mode::Instructor);
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(
            value,
            json!({
                "week_number": 0,
                "start_date": "Unknown",
                "end_date": "Unknown",
                "professor_name": "Unknown"
            })
        );

        meta.owner = Owner::for_mode(Mode::Student, "KTK48A");
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["class_name"], "KTK48A");
        assert!(value.get("professor_name").is_none());

        let back: WeekMetadata = serde_json::from_value(value).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn test_schedule_json_shape() {
        let mut schedule = BTreeMap::new();
        let mut monday = DaySchedule::new();
        monday.afternoon.push(student_session());
        schedule.insert(DayName::Monday, monday);
        schedule.insert(DayName::Sunday, DaySchedule::new());

        let weekly = StudentSchedule {
            metadata: WeekMetadata {
                week_number: 3,
                start_date: "05/02/2024".to_string(),
                end_date: "11/02/2024".to_string(),
                owner: Owner::ClassName("CTK46A".to_string()),
            },
            schedule,
        };

        let value = serde_json::to_value(&weekly).unwrap();
        let session = &value["schedule"]["Thứ 2"]["afternoon"][0];
        assert_eq!(session["time_begin"], "13:00");
        assert_eq!(session["teacher_name"], "Nguyễn Văn A");
        assert_eq!(value["schedule"]["Chủ nhật"]["morning"], json!([]));

        let text = weekly.to_json_pretty().unwrap();
        assert_eq!(StudentSchedule::from_json(&text).unwrap(), weekly);
    }

    #[test]
    fn test_sessions_iterate_in_day_then_slot_order() {
        let mut schedule = BTreeMap::new();
        let mut tuesday = DaySchedule::new();
        tuesday.evening.push(student_session());
        tuesday.morning.push(student_session());
        schedule.insert(DayName::Tuesday, tuesday);
        let mut monday = DaySchedule::new();
        monday.afternoon.push(student_session());
        schedule.insert(DayName::Monday, monday);

        let weekly = StudentSchedule {
            metadata: WeekMetadata::unknown(Mode::Student),
            schedule,
        };

        let order: Vec<_> = weekly.sessions().map(|(day, slot, _)| (day, slot)).collect();
        assert_eq!(
            order,
            vec![
                (DayName::Monday, Slot::Afternoon),
                (DayName::Tuesday, Slot::Morning),
                (DayName::Tuesday, Slot::Evening),
            ]
        );
        assert_eq!(weekly.session_count(), 3);
    }

    #[test]
    fn test_summary() {
        let meta = WeekMetadata {
            week_number: 23,
            start_date: "03/02/2025".to_string(),
            end_date: "09/02/2025".to_string(),
            owner: Owner::ProfessorName("Trần Thị B".to_string()),
        };
        assert_eq!(
            meta.summary(),
            "Week: 23\nPeriod: 03/02/2025 - 09/02/2025\nProfessor: Trần Thị B"
        );
        assert!(!meta.is_unknown());
        assert!(WeekMetadata::unknown(Mode::Student).is_unknown());
    }

    #[test]
    fn test_blank_sessions() {
        let mut session = student_session();
        assert!(!session.is_blank());
        session = StudentSession {
            subject: String::new(),
            class_code: String::new(),
            class_name: String::new(),
            period: String::new(),
            period_begin: 0,
            period_end: 0,
            time_begin: "00:00".to_string(),
            time_end: "00:00".to_string(),
            room: String::new(),
            teacher_name: String::new(),
        };
        assert!(session.is_blank());
    }
}
