//! Instructor roster extraction from the professor picker page.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::info;

static OPTION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("option").unwrap());

/// One selectable instructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: String,
    pub last_name: String,
    pub first_name: String,
    pub full_name: String,
}

impl Teacher {
    pub fn new(id: impl Into<String>, full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let (last_name, first_name) = split_name(&full_name);
        Self {
            id: id.into(),
            last_name,
            first_name,
            full_name,
        }
    }

    /// Picker label, e.g. `Nguyễn, Văn A (011.031.00125)`.
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.full_name, self.id)
    }
}

/// Splits `Last, First Middle` at the first comma. Without a comma the whole
/// name is the last name.
pub fn split_name(full_name: &str) -> (String, String) {
    match full_name.split_once(',') {
        Some((last, first)) => (last.trim().to_string(), first.trim().to_string()),
        None => (full_name.to_string(), String::new()),
    }
}

/// Every instructor listed on the picker page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub count: usize,
    pub teachers: Vec<Teacher>,
}

impl Roster {
    pub fn new(teachers: Vec<Teacher>) -> Self {
        Self {
            count: teachers.len(),
            teachers,
        }
    }

    /// Case-insensitive match on full name or id. An empty query matches all.
    pub fn search(&self, query: &str) -> Vec<&Teacher> {
        let query = query.to_lowercase();
        self.teachers
            .iter()
            .filter(|t| {
                t.full_name.to_lowercase().contains(&query) || t.id.to_lowercase().contains(&query)
            })
            .collect()
    }
}

/// Reads every `<option value=...>` into a teacher. Options without a value
/// are skipped.
pub fn parse_roster(html: &str) -> Roster {
    let document = Html::parse_document(html);

    let teachers: Vec<Teacher> = document
        .select(&OPTION_SELECTOR)
        .filter_map(|option| {
            let id = option.value().attr("value")?;
            let full_name = option.text().collect::<String>();
            Some(Teacher::new(id, full_name.trim()))
        })
        .collect();

    info!(count = teachers.len(), "Parsed instructor roster");
    Roster::new(teachers)
}
