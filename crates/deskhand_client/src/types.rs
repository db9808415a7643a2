use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

/// Everything an API call can fail with. `AuthRequired` is not a data error:
/// the caller must navigate to the login location instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("http status {status}: {detail}")]
    HttpStatus { status: u16, detail: String },
    #[error("malformed response body: {0}")]
    Parse(String),
    #[error("authentication required at {location}")]
    AuthRequired { location: String },
    #[error("file error: {0}")]
    File(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatisticsDto {
    pub total_documents: u64,
    #[serde(default)]
    pub status: StatusCountsDto,
    #[serde(default)]
    pub categories: Vec<CategoryCountDto>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct StatusCountsDto {
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub processing: u64,
    #[serde(default)]
    pub failed: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryCountDto {
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatusDto {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentDto {
    pub id: u64,
    pub filename: String,
    #[serde(default)]
    pub category: Option<String>,
    pub status: DocumentStatusDto,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub processed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct DocumentListDto {
    pub documents: Vec<DocumentDto>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadAckDto {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchUploadDto {
    pub success: u64,
    pub failed: u64,
    #[serde(default)]
    pub errors: Vec<BatchErrorDto>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchErrorDto {
    pub filename: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct HistoryDto {
    pub history: Vec<ImportRecordDto>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportRecordDto {
    pub filename: String,
    pub import_date: String,
    #[serde(default)]
    pub record_count: u64,
    pub status: String,
}

/// Wire shape of `GET /api/dictionary`: entries nested per category key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct DictionaryDto {
    pub entries: BTreeMap<String, DictionaryCategoryDto>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct DictionaryCategoryDto {
    pub entries: BTreeMap<String, String>,
}

/// Flattened dictionary row as handed to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntryDto {
    pub category: String,
    pub source: String,
    pub replacement: String,
}

pub(crate) fn flatten_dictionary(dto: DictionaryDto) -> Vec<DictionaryEntryDto> {
    dto.entries
        .into_iter()
        .flat_map(|(category, group)| {
            group.entries.into_iter().map(move |(source, replacement)| {
                DictionaryEntryDto {
                    category: category.clone(),
                    source,
                    replacement,
                }
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemplateDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemplateListDto {
    pub templates: Vec<TemplateDto>,
    #[serde(default)]
    pub default_template_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummaryDto {
    #[serde(default)]
    pub status: Option<String>,
    pub filename: String,
    pub summary: String,
}

/// Declared parameters accompanying a minutes upload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadForm {
    pub meeting_date: String,
    pub participants: String,
    pub conditions: String,
    pub email: String,
    pub template_id: Option<String>,
}

/// Payload of a `progress_update` push event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressUpdateDto {
    pub step: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub progress_percent: Option<f64>,
    #[serde(default)]
    pub data: Option<BTreeMap<String, serde_json::Value>>,
}

/// Payload of an `email_status_update` push event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeliveryStatusDto {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}
