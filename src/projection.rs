//! Display-ready projections of records. Rendering itself belongs to the
//! presentation layer; it only gets strings from here.

use serde::Serialize;

use crate::blog_model::BlogPost;
use crate::clock::long_date_label;
use crate::id_source::RecordId;
use crate::research_model::{ReadingKind, ResearchEntry, SchemaVariant};
use crate::stats::PLACEHOLDER;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRow {
    pub id: RecordId,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogCard {
    pub id: RecordId,
    pub title: String,
    pub date_label: String,
    pub week_label: String,
    pub lines: Vec<String>,
    pub tags: Vec<String>,
}

fn or_placeholder(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

pub fn column_labels(variant: SchemaVariant) -> Vec<&'static str> {
    let mut labels = vec!["Date/Time"];
    labels.extend(variant.subject_label());
    labels.extend([variant.category_label(), "Song", "Duration"]);
    match variant.reading_kind() {
        ReadingKind::BeforeAfter => labels.extend(["HR Before", "HR After", "BP Before", "BP After"]),
        ReadingKind::Single => labels.extend(["Heart Rate", "Blood Pressure"]),
    }
    labels.extend(["Emotional", "Energy", "Focus", "Notes"]);
    labels
}

pub fn research_row(entry: &ResearchEntry, variant: SchemaVariant) -> ResearchRow {
    let readings = &entry.readings;
    let mut cells = vec![entry.created_at.clone()];
    if variant.subject_label().is_some() {
        cells.push(or_placeholder(entry.subject_id.as_deref()));
    }
    cells.push(entry.music_category.clone());
    cells.push(entry.song_title.clone());
    cells.push(format!("{} min", entry.duration_minutes));

    match variant.reading_kind() {
        ReadingKind::BeforeAfter => {
            cells.push(format!("{} BPM", readings.heart_rate_before()));
            cells.push(format!("{} BPM", readings.heart_rate_after()));
            cells.push(or_placeholder(Some(readings.blood_pressure_before())));
            cells.push(or_placeholder(Some(readings.blood_pressure_after())));
        }
        ReadingKind::Single => {
            cells.push(format!("{} BPM", readings.heart_rate_before()));
            cells.push(or_placeholder(Some(readings.blood_pressure_before())));
        }
    }

    cells.push(format!("{}/10", entry.emotional_state));
    cells.push(format!("{}/10", entry.energy_level));
    cells.push(format!("{}/10", entry.focus_level));
    cells.push(or_placeholder(entry.notes.as_deref()));

    ResearchRow { id: entry.id, cells }
}

pub fn blog_card(post: &BlogPost) -> BlogCard {
    BlogCard {
        id: post.id,
        title: post.title.clone(),
        date_label: long_date_label(&post.date).unwrap_or_else(|| PLACEHOLDER.to_string()),
        week_label: format!("Week {}", post.week),
        lines: post.content.lines().map(str::to_string).collect(),
        tags: post.tags.clone(),
    }
}
