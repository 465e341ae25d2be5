use serde::Serialize;

/// Models offered by the summarization service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryModel {
    #[default]
    Gpt35Turbo,
    Gpt4,
    Gpt4Turbo,
}

impl SummaryModel {
    pub fn all() -> &'static [SummaryModel] {
        &[
            SummaryModel::Gpt35Turbo,
            SummaryModel::Gpt4,
            SummaryModel::Gpt4Turbo,
        ]
    }

    /// Wire value sent in the `used_model` request field.
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryModel::Gpt35Turbo => "gpt-3.5-turbo",
            SummaryModel::Gpt4 => "gpt-4",
            SummaryModel::Gpt4Turbo => "gpt-4-turbo",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        Self::all().iter().copied().find(|m| m.as_str() == value)
    }
}

/// Payload for the summarize endpoint. Built fresh from the form on every
/// submission; field names match the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummarizeRequest {
    pub video_url: String,
    pub summary_length: u32,
    pub used_model: String,
}

impl SummarizeRequest {
    pub fn new(video_url: String, summary_length: u32, model: SummaryModel) -> Self {
        Self {
            video_url,
            summary_length,
            used_model: model.as_str().to_string(),
        }
    }
}
