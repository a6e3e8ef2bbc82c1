//! CSV export of research entries.
//!
//! Song titles and notes are wrapped in double quotes and nothing else is
//! escaped, so a quote inside either field produces a malformed row. Files
//! already exported this way are read by downstream spreadsheets, so the
//! behavior is kept as is.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;
use serde::Serialize;

use crate::app_response::AppResponse;
use crate::research_model::{ReadingKind, ResearchEntry, SchemaVariant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

impl CsvExport {
    /// Writes the artifact into `dir` and returns the full path.
    pub fn write_into(&self, dir: impl AsRef<Path>) -> Result<PathBuf, AppResponse> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, self.content.as_bytes())?;
        info!("Exported {} bytes to {}", self.content.len(), path.display());
        Ok(path)
    }
}

pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}-{}.csv", date.format("%Y-%m-%d"))
}

pub fn header(variant: SchemaVariant) -> Vec<&'static str> {
    match (variant.reading_kind(), variant.subject_label()) {
        (ReadingKind::BeforeAfter, _) => vec![
            "Timestamp",
            variant.category_label(),
            "Song Title",
            "Duration (min)",
            "Heart Rate Before (BPM)",
            "Heart Rate After (BPM)",
            "Blood Pressure Before",
            "Blood Pressure After",
            "Emotional State",
            "Energy Level",
            "Focus Level",
            "Notes",
        ],
        (ReadingKind::Single, subject) => {
            let mut columns = vec!["Timestamp"];
            columns.extend(subject);
            columns.extend([
                variant.category_label(),
                "Song Title",
                "Duration (min)",
                "Heart Rate (BPM)",
                "Blood Pressure",
                "Emotional State",
                "Energy Level",
                "Focus Level",
                "Notes",
            ]);
            columns
        }
    }
}

fn quoted(value: &str) -> String {
    format!("\"{value}\"")
}

fn row(entry: &ResearchEntry, variant: SchemaVariant) -> String {
    let readings = &entry.readings;
    let mut cells = vec![entry.created_at.clone()];
    if variant.reading_kind() == ReadingKind::Single && variant.subject_label().is_some() {
        cells.push(entry.subject_id.clone().unwrap_or_default());
    }
    cells.push(entry.music_category.clone());
    cells.push(quoted(&entry.song_title));
    cells.push(entry.duration_minutes.to_string());

    match variant.reading_kind() {
        ReadingKind::BeforeAfter => {
            cells.push(readings.heart_rate_before().to_string());
            cells.push(readings.heart_rate_after().to_string());
            cells.push(readings.blood_pressure_before().to_string());
            cells.push(readings.blood_pressure_after().to_string());
        }
        ReadingKind::Single => {
            cells.push(readings.heart_rate_before().to_string());
            cells.push(readings.blood_pressure_before().to_string());
        }
    }

    cells.push(entry.emotional_state.to_string());
    cells.push(entry.energy_level.to_string());
    cells.push(entry.focus_level.to_string());
    cells.push(quoted(entry.notes.as_deref().unwrap_or("")));
    cells.join(",")
}

/// Header plus one row per entry, in storage order.
pub fn to_csv(entries: &[ResearchEntry], variant: SchemaVariant) -> String {
    std::iter::once(header(variant).join(","))
        .chain(entries.iter().map(|entry| row(entry, variant)))
        .collect::<Vec<_>>()
        .join("\n")
}
