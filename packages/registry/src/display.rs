use chrono::{DateTime, Utc};

use crate::id::FileId;
use crate::record::FileRecord;

/// Broad category of a file, derived from its MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Video,
    Audio,
    Other,
}

impl FileKind {
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            Self::Image
        } else if mime_type.starts_with("video/") {
            Self::Video
        } else if mime_type.starts_with("audio/") {
            Self::Audio
        } else {
            Self::Other
        }
    }

    /// Whether the content can be previewed inline.
    pub fn is_previewable(self) -> bool {
        !matches!(self, Self::Other)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Other => "file",
        }
    }
}

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Human-readable byte count: `0 Bytes`, `2 KB`, `1.5 MB`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut threshold: u64 = 1024;
    while unit < SIZE_UNITS.len() - 1 && bytes >= threshold {
        unit += 1;
        threshold = threshold.saturating_mul(1024);
    }

    let value = bytes as f64 / 1024f64.powi(unit as i32);
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_UNITS[unit])
}

/// Distance between `then` and `now` in words, e.g. `3 minutes ago`.
pub fn format_relative(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(then);
    let future = delta.num_seconds() < 0;
    let seconds = delta.num_seconds().unsigned_abs();
    let distance = distance_in_words(seconds);

    if future {
        format!("in {distance}")
    } else {
        format!("{distance} ago")
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

fn distance_in_words(seconds: u64) -> String {
    const MINUTES_IN_DAY: u64 = 1440;
    const MINUTES_IN_MONTH: u64 = 43_200;
    const MINUTES_IN_YEAR: u64 = 525_600;

    if seconds < 30 {
        return "less than a minute".to_string();
    }

    // Round to the nearest minute.
    let minutes = (seconds + 30) / 60;
    match minutes {
        0..=1 => "1 minute".to_string(),
        2..=44 => plural(minutes, "minute"),
        45..=89 => "about 1 hour".to_string(),
        90..=1439 => format!("about {}", plural((minutes + 30) / 60, "hour")),
        1440..=2519 => "1 day".to_string(),
        2520..=43_199 => plural((minutes + MINUTES_IN_DAY / 2) / MINUTES_IN_DAY, "day"),
        43_200..=86_399 => {
            let months = (minutes + MINUTES_IN_MONTH / 2) / MINUTES_IN_MONTH;
            format!("about {}", plural(months, "month"))
        }
        86_400..=525_599 => plural((minutes + MINUTES_IN_MONTH / 2) / MINUTES_IN_MONTH, "month"),
        _ => {
            let years = minutes / MINUTES_IN_YEAR;
            let remainder = minutes % MINUTES_IN_YEAR;
            if remainder < MINUTES_IN_YEAR / 4 {
                format!("about {}", plural(years, "year"))
            } else if remainder < MINUTES_IN_YEAR * 3 / 4 {
                format!("over {}", plural(years, "year"))
            } else {
                format!("almost {}", plural(years + 1, "year"))
            }
        }
    }
}

/// Everything the detail view shows for one record.
#[derive(Debug, Clone)]
pub struct FileDetails {
    pub id: FileId,
    pub name: String,
    pub mime_type: String,
    pub kind: FileKind,
    pub size: String,
    pub created: String,
    /// Whether the content is available in this session.
    pub available: bool,
    /// Whether the detail view can render the content inline.
    pub previewable: bool,
}

impl FileDetails {
    pub fn describe(record: &FileRecord, now: DateTime<Utc>) -> Self {
        let kind = FileKind::from_mime(record.mime_type());
        let available = record.blob_url().is_some();
        Self {
            id: record.id().clone(),
            name: record.name().to_string(),
            mime_type: record.mime_type().to_string(),
            kind,
            size: format_size(record.size_bytes()),
            created: format_relative(record.created_at(), now),
            available,
            previewable: available && kind.is_previewable(),
        }
    }
}
