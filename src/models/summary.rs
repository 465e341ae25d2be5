use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub channel_title: String,
    pub description: String,
    pub publish_date: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
}

impl VideoMetadata {
    /// First line of the description, used for the preview in the metadata box.
    pub fn description_first_line(&self) -> &str {
        self.description.lines().next().unwrap_or("")
    }

    /// Publish date formatted for display. The server sends an ISO-ish date
    /// string; anything unparseable is shown as-is.
    pub fn publish_date_display(&self) -> String {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.publish_date) {
            return dt.format("%d %b %Y").to_string();
        }
        if let Ok(date) = NaiveDate::parse_from_str(&self.publish_date, "%Y-%m-%d") {
            return date.format("%d %b %Y").to_string();
        }
        self.publish_date.clone()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeResult {
    pub metadata: VideoMetadata,
    pub summary: String,
    pub word_count: u32,
}

impl SummarizeResult {
    /// Summary paragraphs, split on blank-line boundaries.
    pub fn paragraphs(&self) -> Vec<&str> {
        self.summary
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    LoggingIn,
    InFlight,
    Done,
    Failed,
}

impl RequestStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestStatus::LoggingIn | RequestStatus::InFlight)
    }
}
