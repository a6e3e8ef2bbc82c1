//! Listening-session records.
//!
//! The data page went through several layouts. They all share one
//! [`ResearchEntry`]; the layout a store writes is picked by its
//! [`SchemaVariant`] and the heart-rate readings are a [`Readings`] union.
//! Stored JSON keeps the field names the pages used, and older spellings are
//! accepted on read.

use serde::{Deserialize, Serialize};

use crate::coerce;
use crate::id_source::RecordId;
use crate::record_store::{Categorized, Record};

/// Which record layout a research store produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemaVariant {
    /// Music era, heart rate and blood pressure before and after listening, no
    /// subject identifier. Entries can only be removed all at once.
    #[default]
    EraBeforeAfter,
    /// Participant identifier, music era, one reading per session.
    ParticipantEra,
    /// Patient identifier, genre, one reading per session.
    PatientGenre,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReadingKind {
    Single,
    BeforeAfter,
}

impl SchemaVariant {
    pub fn reading_kind(self) -> ReadingKind {
        match self {
            SchemaVariant::EraBeforeAfter => ReadingKind::BeforeAfter,
            SchemaVariant::ParticipantEra | SchemaVariant::PatientGenre => ReadingKind::Single,
        }
    }

    pub fn subject_label(self) -> Option<&'static str> {
        match self {
            SchemaVariant::EraBeforeAfter => None,
            SchemaVariant::ParticipantEra => Some("Participant ID"),
            SchemaVariant::PatientGenre => Some("Patient ID"),
        }
    }

    pub fn category_label(self) -> &'static str {
        match self {
            SchemaVariant::EraBeforeAfter | SchemaVariant::ParticipantEra => "Music Era",
            SchemaVariant::PatientGenre => "Genre",
        }
    }

    /// Whether single entries can be deleted or pulled back for editing.
    pub fn allows_entry_removal(self) -> bool {
        !matches!(self, SchemaVariant::EraBeforeAfter)
    }
}

/// Physiological readings. Untagged so the stored JSON stays flat; an entry
/// is before/after exactly when it carries `heartRateBefore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Readings {
    BeforeAfter {
        #[serde(rename = "heartRateBefore", deserialize_with = "coerce::number")]
        heart_rate_before: u32,
        #[serde(rename = "heartRateAfter", default, deserialize_with = "coerce::number")]
        heart_rate_after: u32,
        #[serde(rename = "bloodPressureBefore", default, deserialize_with = "coerce::text")]
        blood_pressure_before: String,
        #[serde(rename = "bloodPressureAfter", default, deserialize_with = "coerce::text")]
        blood_pressure_after: String,
    },
    Single {
        #[serde(rename = "heartRate", default, deserialize_with = "coerce::number")]
        heart_rate: u32,
        #[serde(rename = "bloodPressure", default, deserialize_with = "coerce::text")]
        blood_pressure: String,
    },
}

impl Readings {
    pub fn kind(&self) -> ReadingKind {
        match self {
            Readings::BeforeAfter { .. } => ReadingKind::BeforeAfter,
            Readings::Single { .. } => ReadingKind::Single,
        }
    }

    /// Heart rate before listening; a single reading counts for both sides.
    pub fn heart_rate_before(&self) -> u32 {
        match self {
            Readings::BeforeAfter { heart_rate_before, .. } => *heart_rate_before,
            Readings::Single { heart_rate, .. } => *heart_rate,
        }
    }

    pub fn heart_rate_after(&self) -> u32 {
        match self {
            Readings::BeforeAfter { heart_rate_after, .. } => *heart_rate_after,
            Readings::Single { heart_rate, .. } => *heart_rate,
        }
    }

    pub fn blood_pressure_before(&self) -> &str {
        match self {
            Readings::BeforeAfter { blood_pressure_before, .. } => blood_pressure_before,
            Readings::Single { blood_pressure, .. } => blood_pressure,
        }
    }

    pub fn blood_pressure_after(&self) -> &str {
        match self {
            Readings::BeforeAfter { blood_pressure_after, .. } => blood_pressure_after,
            Readings::Single { blood_pressure, .. } => blood_pressure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchEntry {
    pub id: RecordId,
    #[serde(
        default,
        alias = "participantId",
        alias = "patientId",
        deserialize_with = "coerce::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub subject_id: Option<String>,
    #[serde(default, alias = "musicEra", alias = "genre", deserialize_with = "coerce::text")]
    pub music_category: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub song_title: String,
    #[serde(default, alias = "duration", deserialize_with = "coerce::number")]
    pub duration_minutes: u32,
    #[serde(flatten)]
    pub readings: Readings,
    #[serde(default, deserialize_with = "coerce::number")]
    pub emotional_state: u32,
    #[serde(default, deserialize_with = "coerce::number")]
    pub energy_level: u32,
    #[serde(default, deserialize_with = "coerce::number")]
    pub focus_level: u32,
    #[serde(default, deserialize_with = "coerce::optional_text", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, alias = "timestamp", deserialize_with = "coerce::text")]
    pub created_at: String,
}

impl Record for ResearchEntry {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl Categorized for ResearchEntry {
    fn category(&self) -> &str {
        &self.music_category
    }
}

/// Raw form values for a new entry. Anything missing becomes empty or zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResearchEntryFields {
    #[serde(alias = "participantId", alias = "patientId", deserialize_with = "coerce::optional_text")]
    pub subject_id: Option<String>,
    #[serde(alias = "musicEra", alias = "genre", deserialize_with = "coerce::text")]
    pub music_category: String,
    #[serde(deserialize_with = "coerce::text")]
    pub song_title: String,
    #[serde(alias = "duration", deserialize_with = "coerce::number")]
    pub duration_minutes: u32,
    #[serde(deserialize_with = "coerce::number")]
    pub heart_rate: u32,
    #[serde(deserialize_with = "coerce::text")]
    pub blood_pressure: String,
    #[serde(deserialize_with = "coerce::number")]
    pub heart_rate_before: u32,
    #[serde(deserialize_with = "coerce::number")]
    pub heart_rate_after: u32,
    #[serde(deserialize_with = "coerce::text")]
    pub blood_pressure_before: String,
    #[serde(deserialize_with = "coerce::text")]
    pub blood_pressure_after: String,
    #[serde(deserialize_with = "coerce::number")]
    pub emotional_state: u32,
    #[serde(deserialize_with = "coerce::number")]
    pub energy_level: u32,
    #[serde(deserialize_with = "coerce::number")]
    pub focus_level: u32,
    #[serde(deserialize_with = "coerce::optional_text")]
    pub notes: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ResearchEntry {
    /// Builds an entry in the layout of `variant`. Fields the variant has no
    /// place for are dropped.
    pub fn from_fields(id: RecordId, created_at: String, fields: ResearchEntryFields, variant: SchemaVariant) -> Self {
        let readings = match variant.reading_kind() {
            ReadingKind::BeforeAfter => Readings::BeforeAfter {
                heart_rate_before: fields.heart_rate_before,
                heart_rate_after: fields.heart_rate_after,
                blood_pressure_before: fields.blood_pressure_before,
                blood_pressure_after: fields.blood_pressure_after,
            },
            ReadingKind::Single => Readings::Single {
                heart_rate: fields.heart_rate,
                blood_pressure: fields.blood_pressure,
            },
        };

        Self {
            id,
            subject_id: variant.subject_label().and(non_blank(fields.subject_id)),
            music_category: fields.music_category,
            song_title: fields.song_title,
            duration_minutes: fields.duration_minutes,
            readings,
            emotional_state: fields.emotional_state,
            energy_level: fields.energy_level,
            focus_level: fields.focus_level,
            notes: non_blank(fields.notes),
            created_at,
        }
    }

    /// Form values that recreate this entry, used to refill the form on edit.
    pub fn to_fields(&self) -> ResearchEntryFields {
        let mut fields = ResearchEntryFields {
            subject_id: self.subject_id.clone(),
            music_category: self.music_category.clone(),
            song_title: self.song_title.clone(),
            duration_minutes: self.duration_minutes,
            emotional_state: self.emotional_state,
            energy_level: self.energy_level,
            focus_level: self.focus_level,
            notes: self.notes.clone(),
            ..ResearchEntryFields::default()
        };

        match &self.readings {
            Readings::BeforeAfter { heart_rate_before, heart_rate_after, blood_pressure_before, blood_pressure_after } => {
                fields.heart_rate_before = *heart_rate_before;
                fields.heart_rate_after = *heart_rate_after;
                fields.blood_pressure_before = blood_pressure_before.clone();
                fields.blood_pressure_after = blood_pressure_after.clone();
            }
            Readings::Single { heart_rate, blood_pressure } => {
                fields.heart_rate = *heart_rate;
                fields.blood_pressure = blood_pressure.clone();
            }
        }
        fields
    }
}
