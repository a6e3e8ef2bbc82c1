//! Weekly reflection posts.

use serde::{Deserialize, Serialize};

use crate::coerce;
use crate::id_source::RecordId;
use crate::record_store::Record;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: RecordId,
    #[serde(default, deserialize_with = "coerce::text")]
    pub title: String,
    /// ISO calendar date as entered, e.g. `2026-10-19`.
    #[serde(default, deserialize_with = "coerce::text")]
    pub date: String,
    #[serde(default, deserialize_with = "coerce::number")]
    pub week: u32,
    #[serde(default, deserialize_with = "coerce::text")]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "timestamp", deserialize_with = "coerce::text")]
    pub created_at: String,
}

impl Record for BlogPost {
    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlogPostFields {
    #[serde(alias = "postTitle", deserialize_with = "coerce::text")]
    pub title: String,
    #[serde(alias = "postDate", deserialize_with = "coerce::text")]
    pub date: String,
    #[serde(alias = "postWeek", deserialize_with = "coerce::number")]
    pub week: u32,
    #[serde(alias = "postContent", deserialize_with = "coerce::text")]
    pub content: String,
    /// Comma-separated, as typed into the tags box.
    #[serde(alias = "postTags", deserialize_with = "coerce::text")]
    pub tags: String,
}

/// `"memory, focus,, jazz "` -> `["memory", "focus", "jazz"]`
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

impl BlogPost {
    pub fn from_fields(id: RecordId, created_at: String, fields: BlogPostFields) -> Self {
        Self {
            id,
            title: fields.title,
            date: fields.date,
            week: fields.week,
            content: fields.content,
            tags: parse_tags(&fields.tags),
            created_at,
        }
    }

    pub fn to_fields(&self) -> BlogPostFields {
        BlogPostFields {
            title: self.title.clone(),
            date: self.date.clone(),
            week: self.week,
            content: self.content.clone(),
            tags: self.tags.join(", "),
        }
    }
}
