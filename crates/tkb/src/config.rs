//! Configuration directory of selectable years, terms, teachers and weeks.

use crate::roster::Teacher;
use crate::timetable::{Result, TimetableError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

pub const YEAR_STUDIES_FILE: &str = "year_studies.json";
pub const TERMS_FILE: &str = "terms.json";
pub const TEACHERS_FILE: &str = "teachers.json";
pub const WEEKS_FILE: &str = "weeks.json";

/// A selectable value with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOption<T> {
    pub value: T,
    pub label: T,
}

/// Teacher entry of `teachers.json`; only the id and full name are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherEntry {
    pub id: String,
    pub full_name: String,
}

impl From<Teacher> for TeacherEntry {
    fn from(teacher: Teacher) -> Self {
        Self {
            id: teacher.id,
            full_name: teacher.full_name,
        }
    }
}

/// Everything a caller can pick from when building a source query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub year_studies: Vec<ConfigOption<String>>,
    pub terms: Vec<ConfigOption<String>>,
    pub teachers: Vec<TeacherEntry>,
    pub weeks: Vec<ConfigOption<u32>>,
}

impl SourceConfig {
    /// Loads all four config files from `config_dir`.
    ///
    /// # Arguments
    /// * `config_dir` - Directory holding the JSON files
    ///
    /// # Returns
    /// * `Ok(SourceConfig)` - Loaded configuration
    /// * `Err(TimetableError::Config)` - If a file is missing or can't be parsed
    pub fn load_from_directory(config_dir: &Path) -> Result<Self> {
        let config = SourceConfig {
            year_studies: load_file(config_dir, YEAR_STUDIES_FILE)?,
            terms: load_file(config_dir, TERMS_FILE)?,
            teachers: load_file(config_dir, TEACHERS_FILE)?,
            weeks: load_file(config_dir, WEEKS_FILE)?,
        };

        info!(
            years = config.year_studies.len(),
            terms = config.terms.len(),
            teachers = config.teachers.len(),
            weeks = config.weeks.len(),
            "Loaded source configuration"
        );
        Ok(config)
    }

    /// Writes a default file for each config file missing from `config_dir`,
    /// creating the directory if needed. Existing files are left alone.
    ///
    /// Returns the names of the files written.
    pub fn ensure_defaults(config_dir: &Path) -> Result<Vec<&'static str>> {
        fs::create_dir_all(config_dir)?;
        let defaults = SourceConfig::default();
        let mut written = Vec::new();

        let files: [(&'static str, serde_json::Value); 4] = [
            (YEAR_STUDIES_FILE, serde_json::to_value(&defaults.year_studies)?),
            (TERMS_FILE, serde_json::to_value(&defaults.terms)?),
            (TEACHERS_FILE, serde_json::to_value(&defaults.teachers)?),
            (WEEKS_FILE, serde_json::to_value(&defaults.weeks)?),
        ];

        for (name, value) in files {
            let path = config_dir.join(name);
            if path.exists() {
                continue;
            }
            fs::write(&path, serde_json::to_string_pretty(&value)?)?;
            info!(path = %path.display(), "Wrote default config file");
            written.push(name);
        }

        Ok(written)
    }

    pub fn find_teacher(&self, id: &str) -> Option<&TeacherEntry> {
        self.teachers.iter().find(|t| t.id == id)
    }

    /// Replaces `teachers.json` in `config_dir` with an extracted roster.
    pub fn write_teachers(config_dir: &Path, teachers: Vec<Teacher>) -> Result<usize> {
        fs::create_dir_all(config_dir)?;
        let entries: Vec<TeacherEntry> = teachers.into_iter().map(TeacherEntry::from).collect();

        let path = config_dir.join(TEACHERS_FILE);
        fs::write(&path, serde_json::to_string_pretty(&entries)?)?;
        info!(path = %path.display(), teachers = entries.len(), "Wrote teacher list");
        Ok(entries.len())
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            year_studies: vec![ConfigOption {
                value: "2023-2024".to_string(),
                label: "2023-2024".to_string(),
            }],
            terms: vec![ConfigOption {
                value: "HK01".to_string(),
                label: "Học kỳ 1".to_string(),
            }],
            teachers: vec![TeacherEntry {
                id: "011.031.00125".to_string(),
                full_name: "Default Teacher".to_string(),
            }],
            weeks: vec![ConfigOption { value: 1, label: 1 }],
        }
    }
}

fn load_file<T: DeserializeOwned>(config_dir: &Path, name: &str) -> Result<T> {
    let path = config_dir.join(name);
    let content = fs::read_to_string(&path).map_err(|e| TimetableError::Config {
        message: format!("{}: {}", path.display(), e),
    })?;
    serde_json::from_str(&content).map_err(|e| TimetableError::Config {
        message: format!("{}: {}", path.display(), e),
    })
}
