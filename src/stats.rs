//! Summary statistics over research entries, recomputed on every call.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::record_store::Categorized;
use crate::research_model::{ReadingKind, ResearchEntry};

pub const PLACEHOLDER: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum HeartRateMean {
    Single { bpm: u32 },
    BeforeAfter { before: u32, after: u32 },
}

impl Display for HeartRateMean {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HeartRateMean::Single { bpm } => write!(f, "{bpm} BPM"),
            HeartRateMean::BeforeAfter { before, after } => write!(f, "{before} → {after} BPM"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub count: usize,
    pub mean_heart_rate: Option<HeartRateMean>,
    pub dominant_category: Option<String>,
    /// Rounded to one decimal.
    pub mean_emotional_state: Option<f64>,
}

/// The strings a summary panel shows; sentinels stand in for an empty store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDisplay {
    pub total_records: String,
    pub mean_heart_rate: String,
    pub dominant_category: String,
    pub mean_emotional_state: String,
}

impl Summary {
    pub fn display(&self) -> SummaryDisplay {
        SummaryDisplay {
            total_records: self.count.to_string(),
            mean_heart_rate: self
                .mean_heart_rate
                .map(|mean| mean.to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            dominant_category: self.dominant_category.clone().unwrap_or_else(|| PLACEHOLDER.to_string()),
            mean_emotional_state: self
                .mean_emotional_state
                .map(|mean| format!("{mean:.1}/10"))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        }
    }
}

/// Half-up rounding to an integer, matching how the pages rounded means.
fn round_half_up(value: f64) -> u32 {
    (value + 0.5).floor().max(0.0) as u32
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

fn mean(total: u64, count: usize) -> f64 {
    total as f64 / count as f64
}

/// Most frequent category. On a tie the one that appeared first wins.
pub fn dominant_category<'a>(categories: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    for category in categories {
        match counts.iter_mut().find(|(seen, _)| *seen == category) {
            Some((_, count)) => *count += 1,
            None => counts.push((category, 1)),
        }
    }

    let mut best: Option<(&'a str, usize)> = None;
    for (category, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((category, count));
        }
    }
    best.map(|(category, _)| category)
}

pub fn summarize(entries: &[ResearchEntry], kind: ReadingKind) -> Summary {
    if entries.is_empty() {
        return Summary { count: 0, mean_heart_rate: None, dominant_category: None, mean_emotional_state: None };
    }

    let count = entries.len();
    let before: u64 = entries.iter().map(|e| e.readings.heart_rate_before() as u64).sum();
    let after: u64 = entries.iter().map(|e| e.readings.heart_rate_after() as u64).sum();
    let emotional: u64 = entries.iter().map(|e| e.emotional_state as u64).sum();

    let mean_heart_rate = match kind {
        ReadingKind::Single => HeartRateMean::Single { bpm: round_half_up(mean(before, count)) },
        ReadingKind::BeforeAfter => HeartRateMean::BeforeAfter {
            before: round_half_up(mean(before, count)),
            after: round_half_up(mean(after, count)),
        },
    };

    Summary {
        count,
        mean_heart_rate: Some(mean_heart_rate),
        dominant_category: dominant_category(entries.iter().map(Categorized::category)).map(str::to_string),
        mean_emotional_state: Some(round_tenths(mean(emotional, count))),
    }
}
