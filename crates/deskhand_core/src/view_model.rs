use crate::state::{
    AppState, DeliveryOutcome, DocumentId, DocumentStatus, ImportStatus, RelayState, Screen,
    UploadPhase,
};

pub const NO_DOCUMENTS: &str = "No documents match the current filters.";
pub const NO_HISTORY: &str = "No import history.";
pub const NO_DICTIONARY_ENTRIES: &str = "The dictionary is empty.";
pub const NO_SEARCH_RESULTS: &str = "No matching entries.";
pub const NO_TEMPLATES: &str = "No templates defined.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRowView {
    pub id: DocumentId,
    pub filename: String,
    pub category: Option<String>,
    pub status: DocumentStatus,
    pub size_bytes: u64,
    pub processed_at: Option<String>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentsView {
    pub rows: Vec<DocumentRowView>,
    /// Set instead of an empty table body when nothing is rendered.
    pub placeholder: Option<&'static str>,
    pub selected_count: usize,
    /// Batch buttons are enabled only with a non-empty selection and no
    /// batch call in flight.
    pub batch_enabled: bool,
    pub busy: bool,
    pub last_action: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsView {
    pub total_documents: u64,
    pub completed: u64,
    pub processing: u64,
    pub failed: u64,
    pub categories: Vec<(String, u64)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRowView {
    pub filename: String,
    pub imported_at: String,
    pub record_count: u64,
    pub succeeded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub step: String,
    pub message: String,
    pub percent: Option<u8>,
    pub details: Vec<(String, String)>,
}

/// Which card the upload screen shows, derived from the job phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadCardView {
    Form,
    Progress(ProgressView),
    Result {
        filename: Option<String>,
    },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadView {
    pub card: UploadCardView,
    pub file: Option<(String, u64)>,
    pub meeting_date: String,
    pub participants: String,
    pub recipient: String,
    pub template_id: Option<String>,
    pub email: DeliveryOutcome,
    pub notion: DeliveryOutcome,
    pub error: Option<String>,
    pub can_submit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryRowView {
    pub category: &'static str,
    pub source: String,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DictionaryView {
    pub rows: Vec<DictionaryRowView>,
    pub placeholder: Option<&'static str>,
    pub query: String,
    pub search_results: Vec<DictionaryRowView>,
    pub search_placeholder: Option<&'static str>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRowView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub screen: Screen,
    pub relay: RelayState,
    pub upload: UploadView,
    pub documents: DocumentsView,
    pub statistics: Option<StatisticsView>,
    pub history: Vec<HistoryRowView>,
    pub history_placeholder: Option<&'static str>,
    pub dictionary: DictionaryView,
    pub templates: Vec<TemplateRowView>,
    pub templates_placeholder: Option<&'static str>,
    pub templates_error: Option<String>,
}

impl AppState {
    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            screen: self.screen,
            relay: self.relay.clone(),
            upload: self.upload_view(),
            documents: self.documents_view(),
            statistics: self.statistics.as_ref().map(|stats| StatisticsView {
                total_documents: stats.total_documents,
                completed: stats.completed,
                processing: stats.processing,
                failed: stats.failed,
                categories: stats
                    .categories
                    .iter()
                    .map(|c| (c.name.clone(), c.count))
                    .collect(),
            }),
            history: self
                .history
                .iter()
                .map(|record| HistoryRowView {
                    filename: record.filename.clone(),
                    imported_at: record.imported_at.clone(),
                    record_count: record.record_count,
                    succeeded: record.status == ImportStatus::Success,
                })
                .collect(),
            history_placeholder: placeholder(self.history.len(), NO_HISTORY),
            dictionary: self.dictionary_view(),
            templates: self
                .templates
                .templates
                .iter()
                .map(|t| TemplateRowView {
                    id: t.id.clone(),
                    name: t.name.clone(),
                    description: t.description.clone(),
                    is_default: t.is_default,
                })
                .collect(),
            templates_placeholder: placeholder(self.templates.templates.len(), NO_TEMPLATES),
            templates_error: self.templates.last_error.clone(),
        }
    }

    fn upload_view(&self) -> UploadView {
        let card = match &self.upload.phase {
            UploadPhase::Idle => UploadCardView::Form,
            UploadPhase::Uploading => UploadCardView::Progress(ProgressView {
                step: "uploading".to_string(),
                message: "Uploading the recording".to_string(),
                percent: None,
                details: Vec::new(),
            }),
            UploadPhase::Processing(event) | UploadPhase::Finishing(event) => {
                UploadCardView::Progress(ProgressView {
                    step: event.step.clone(),
                    message: event.message.clone(),
                    percent: event.percent,
                    details: event.details.clone(),
                })
            }
            UploadPhase::Done(outcome) => UploadCardView::Result {
                filename: outcome.filename.clone(),
            },
            UploadPhase::Failed(reason) => UploadCardView::Failed(reason.clone()),
        };
        UploadView {
            card,
            file: self
                .upload
                .file
                .as_ref()
                .map(|f| (f.name.clone(), f.size)),
            meeting_date: self.upload.params.meeting_date.clone(),
            participants: self.upload.params.participants.clone(),
            recipient: self.upload.params.recipient.clone(),
            template_id: self.upload.params.template_id.clone(),
            email: self.upload.email.clone(),
            notion: self.upload.notion.clone(),
            error: self.upload.last_error.clone(),
            can_submit: self.upload.file.is_some()
                && !self.upload.params.recipient.trim().is_empty()
                && !self.upload.in_flight(),
        }
    }

    fn documents_view(&self) -> DocumentsView {
        let rows: Vec<DocumentRowView> = self
            .documents
            .rows
            .iter()
            .map(|row| DocumentRowView {
                id: row.id,
                filename: row.filename.clone(),
                category: row.category.clone(),
                status: row.status,
                size_bytes: row.size_bytes,
                processed_at: row.processed_at.clone(),
                selected: self.documents.selection.contains(&row.id),
            })
            .collect();
        DocumentsView {
            placeholder: placeholder(rows.len(), NO_DOCUMENTS),
            selected_count: self.documents.selection.len(),
            batch_enabled: !self.documents.selection.is_empty() && !self.documents.busy,
            busy: self.documents.busy,
            last_action: self.documents.last_action.clone(),
            error: self.documents.last_error.clone(),
            rows,
        }
    }

    fn dictionary_view(&self) -> DictionaryView {
        let rows: Vec<DictionaryRowView> = self
            .dictionary
            .entries
            .iter()
            .map(|entry| DictionaryRowView {
                category: entry.category.label(),
                source: entry.source.clone(),
                replacement: entry.replacement.clone(),
            })
            .collect();
        let search_results: Vec<DictionaryRowView> = self
            .dictionary
            .search(&self.dictionary.query)
            .into_iter()
            .map(|entry| DictionaryRowView {
                category: entry.category.label(),
                source: entry.source.clone(),
                replacement: entry.replacement.clone(),
            })
            .collect();
        let searching = !self.dictionary.query.trim().is_empty();
        DictionaryView {
            placeholder: placeholder(rows.len(), NO_DICTIONARY_ENTRIES),
            search_placeholder: if searching {
                placeholder(search_results.len(), NO_SEARCH_RESULTS)
            } else {
                None
            },
            query: self.dictionary.query.clone(),
            rows,
            search_results,
            error: self.dictionary.last_error.clone(),
        }
    }
}

fn placeholder(len: usize, text: &'static str) -> Option<&'static str> {
    if len == 0 {
        Some(text)
    } else {
        None
    }
}
