use chrono::DateTime;
use chrono::Utc;

use crate::classify::classify;

/// Classification tag assigned to every captured entry.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
    strum_macros::Display,
    strum_macros::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContentType {
    Empty,
    Url,
    Email,
    Phone,
    Number,
    Code,
    #[serde(rename = "longtext")]
    #[strum(serialize = "longtext")]
    LongText,
    Text,
}

impl ContentType {
    pub const ALL: [ContentType; 8] = [
        ContentType::Empty,
        ContentType::Url,
        ContentType::Email,
        ContentType::Phone,
        ContentType::Number,
        ContentType::Code,
        ContentType::LongText,
        ContentType::Text,
    ];

    pub fn parse(s: &str) -> anyhow::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_ref() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown content type: {s}"))
    }
}

/// One captured unit of text.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Entry {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub r#type: ContentType,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Build a fresh entry for already-trimmed text captured at `created_at`.
    pub fn new(text: String, created_at: DateTime<Utc>) -> Self {
        let r#type = classify(&text);
        Self {
            id: new_entry_id(created_at),
            text,
            r#type,
            created_at,
        }
    }
}

/// Millisecond timestamp plus a random suffix so same-millisecond captures
/// still get distinct ids.
pub fn new_entry_id(created_at: DateTime<Utc>) -> String {
    let millis = created_at.timestamp_millis();
    let tiebreak: u32 = rand::random();
    format!("{millis}-{tiebreak:08x}")
}
