//! Content records and the shapes used to create and filter them.
//!
//! Field names on the wire follow the `content` table columns
//! (`isStorageFile`, `storagePath`, ...), so every type here serializes in
//! camelCase and renames `content_type` to `type`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::relay::StoredFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Quiz,
    Note,
    Course,
    Quote,
}

impl ContentType {
    pub const ALL: [ContentType; 4] = [
        ContentType::Quiz,
        ContentType::Note,
        ContentType::Course,
        ContentType::Quote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Quiz => "quiz",
            ContentType::Note => "note",
            ContentType::Course => "course",
            ContentType::Quote => "quote",
        }
    }

    /// Label for the "Open ..." action shown next to a record.
    pub fn open_label(&self) -> &'static str {
        match self {
            ContentType::Quiz => "Test",
            ContentType::Note => "PDF",
            ContentType::Course | ContentType::Quote => "Course",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content type '{0}' (expected quiz, note, course or quote)")]
pub struct ContentTypeParseError(pub String);

impl FromStr for ContentType {
    type Err = ContentTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiz" => Ok(ContentType::Quiz),
            "note" => Ok(ContentType::Note),
            "course" => Ok(ContentType::Course),
            "quote" => Ok(ContentType::Quote),
            _ => Err(ContentTypeParseError(s.to_string())),
        }
    }
}

/// A stored quiz/note/course/quote entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub link: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub board: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub class: String,
    #[serde(deserialize_with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<String>,
    #[serde(default, deserialize_with = "bool_or_null")]
    pub is_storage_file: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
}

/// What an operator submits when creating content. The timestamp and storage
/// fields are filled in by the sync layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDraft {
    #[serde(rename = "type", default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub board: String,
    #[serde(default)]
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title is required")]
    MissingTitle,
    #[error("either a link or a file is required")]
    MissingLink,
}

impl ContentDraft {
    /// `has_file` is true when the caller is uploading a file alongside the draft.
    pub fn validate(&self, has_file: bool) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        let has_link = self
            .link
            .as_deref()
            .map(|l| !l.trim().is_empty())
            .unwrap_or(false);
        if !has_link && !has_file {
            return Err(ValidationError::MissingLink);
        }
        Ok(())
    }
}

/// A row ready to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContent {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: String,
    pub link: String,
    pub board: String,
    pub class: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marks: Option<String>,
    pub is_storage_file: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
}

impl NewContent {
    /// Build the row for `draft`. Quiz-only fields are dropped for other
    /// types, and an uploaded file's public URL replaces the link.
    pub fn from_draft(
        draft: ContentDraft,
        timestamp: DateTime<Utc>,
        stored: Option<&StoredFile>,
    ) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let (time, marks) = if draft.content_type == ContentType::Quiz {
            (non_empty(draft.time), non_empty(draft.marks))
        } else {
            (None, None)
        };

        let (link, is_storage_file, file_name, storage_path) = match stored {
            Some(file) => (
                file.public_url.clone(),
                true,
                Some(file.file_name.clone()),
                Some(file.storage_path.clone()),
            ),
            None => (draft.link.unwrap_or_default(), false, None, None),
        };

        Self {
            content_type: draft.content_type,
            title: draft.title.trim().to_string(),
            link,
            board: draft.board,
            class: draft.class,
            timestamp,
            time,
            marks,
            is_storage_file,
            file_name,
            storage_path,
        }
    }

    pub fn into_record(self, id: String) -> ContentRecord {
        ContentRecord {
            id,
            content_type: self.content_type,
            title: self.title,
            link: self.link,
            board: self.board,
            class: self.class,
            timestamp: self.timestamp,
            time: self.time,
            marks: self.marks,
            is_storage_file: self.is_storage_file,
            file_name: self.file_name,
            storage_path: self.storage_path,
        }
    }
}

/// Equality filters over the content table. `None` matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilter {
    pub content_type: Option<ContentType>,
    pub board: Option<String>,
    pub class: Option<String>,
}

impl ContentFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn of_type(content_type: ContentType) -> Self {
        Self {
            content_type: Some(content_type),
            ..Self::default()
        }
    }

    pub fn scope(board: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            board: Some(board.into()),
            class: Some(class.into()),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn matches(&self, record: &ContentRecord) -> bool {
        self.content_type.map_or(true, |t| t == record.content_type)
            && self.board.as_deref().map_or(true, |b| b == record.board)
            && self.class.as_deref().map_or(true, |c| c == record.class)
    }
}

/// Sort newest first; the timestamp is the only ordering key.
pub fn sort_newest_first(records: &mut [ContentRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn bool_or_null<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

// Postgres `timestamp` columns come back without an offset; treat those as UTC.
fn flexible_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
}
