use std::collections::BTreeSet;

pub type DocumentId = u64;
pub type RequestSeq = u64;

/// Extensions accepted for a minutes recording, checked before any upload
/// effect is emitted.
pub const ALLOWED_AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "flac", "ogg", "webm"];

/// Upload size ceiling, matching the server-side limit.
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// How long the finished progress card stays visible before the result card
/// replaces it.
pub const RESULT_REVEAL_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Upload,
    Documents,
    Dictionary,
    Templates,
}

/// Connection lifecycle of the push-event subscription.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RelayState {
    #[default]
    Disconnected,
    Connecting,
    Connected {
        channel: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: String,
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadParams {
    pub meeting_date: String,
    pub participants: String,
    pub conditions: String,
    pub recipient: String,
    pub template_id: Option<String>,
}

/// Subset of upload parameters worth restoring across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadPrefs {
    pub recipient: String,
    pub participants: String,
    pub template_id: Option<String>,
}

/// A single server-pushed progress message, consumed immediately.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressEvent {
    pub step: String,
    pub message: String,
    pub percent: Option<u8>,
    pub details: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryChannel {
    Email,
    Notion,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeliveryOutcome {
    #[default]
    Pending,
    Success,
    Failure(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadOutcome {
    pub filename: Option<String>,
}

/// Lifecycle of the single in-flight upload job. `Finishing` is the window
/// between the terminal progress event and the result card reveal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Uploading,
    Processing(ProgressEvent),
    Finishing(ProgressEvent),
    Done(UploadOutcome),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadState {
    pub(crate) file: Option<SelectedFile>,
    pub(crate) params: UploadParams,
    pub(crate) phase: UploadPhase,
    pub(crate) email: DeliveryOutcome,
    pub(crate) notion: DeliveryOutcome,
    pub(crate) last_error: Option<String>,
}

impl UploadState {
    pub(crate) fn in_flight(&self) -> bool {
        matches!(
            self.phase,
            UploadPhase::Uploading | UploadPhase::Processing(_) | UploadPhase::Finishing(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRow {
    pub id: DocumentId,
    pub filename: String,
    pub category: Option<String>,
    pub status: DocumentStatus,
    pub size_bytes: u64,
    pub processed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentFilters {
    pub search: String,
    pub status: Option<DocumentStatus>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentsState {
    pub(crate) rows: Vec<DocumentRow>,
    pub(crate) selection: BTreeSet<DocumentId>,
    pub(crate) filters: DocumentFilters,
    /// Sequence number of the most recently issued list request; responses
    /// carrying an older number are stale and dropped.
    pub(crate) list_seq: RequestSeq,
    pub(crate) busy: bool,
    pub(crate) last_action: Option<String>,
    pub(crate) last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Statistics {
    pub total_documents: u64,
    pub completed: u64,
    pub processing: u64,
    pub failed: u64,
    pub categories: Vec<CategoryCount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub filename: String,
    pub imported_at: String,
    pub record_count: u64,
    pub status: ImportStatus,
}

/// Result summary of a batch file ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchOutcome {
    pub succeeded: u64,
    pub failed: u64,
    pub errors: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum DictionaryCategory {
    CompanyNames,
    TechnicalTerms,
    PersonNames,
    #[default]
    CommonPhrases,
}

impl DictionaryCategory {
    pub const ALL: &'static [DictionaryCategory] = &[
        DictionaryCategory::CompanyNames,
        DictionaryCategory::TechnicalTerms,
        DictionaryCategory::PersonNames,
        DictionaryCategory::CommonPhrases,
    ];

    /// Wire key used by the dictionary endpoints.
    pub fn key(&self) -> &'static str {
        match self {
            DictionaryCategory::CompanyNames => "company_names",
            DictionaryCategory::TechnicalTerms => "technical_terms",
            DictionaryCategory::PersonNames => "person_names",
            DictionaryCategory::CommonPhrases => "common_phrases",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DictionaryCategory::CompanyNames => "Company names",
            DictionaryCategory::TechnicalTerms => "Technical terms",
            DictionaryCategory::PersonNames => "Person names",
            DictionaryCategory::CommonPhrases => "Common phrases",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.key() == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub category: DictionaryCategory,
    pub source: String,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryDraft {
    pub(crate) category: DictionaryCategory,
    pub(crate) source: String,
    pub(crate) replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DictionaryState {
    pub(crate) entries: Vec<DictionaryEntry>,
    pub(crate) query: String,
    pub(crate) draft: EntryDraft,
    pub(crate) last_error: Option<String>,
}

impl DictionaryState {
    /// Case-insensitive substring search over source and replacement terms.
    pub(crate) fn search(&self, query: &str) -> Vec<&DictionaryEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|entry| {
                entry.source.to_lowercase().contains(&needle)
                    || entry.replacement.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TemplatesState {
    pub(crate) templates: Vec<TemplateSummary>,
    pub(crate) last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) screen: Screen,
    pub(crate) relay: RelayState,
    pub(crate) relay_channel: String,
    pub(crate) upload: UploadState,
    pub(crate) documents: DocumentsState,
    pub(crate) statistics: Option<Statistics>,
    pub(crate) history: Vec<ImportRecord>,
    pub(crate) dictionary: DictionaryState,
    pub(crate) templates: TemplatesState,
    pub(crate) next_seq: RequestSeq,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns and clears the render-dirty flag. The shell re-renders only
    /// when this was set by the last batch of messages.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn touch(&mut self) {
        self.dirty = true;
    }

    /// Allocates the next document-list request sequence number and records
    /// it as the one whose response is allowed to land.
    pub(crate) fn next_list_seq(&mut self) -> RequestSeq {
        self.next_seq += 1;
        self.documents.list_seq = self.next_seq;
        self.next_seq
    }

    /// Drops selection entries whose rows are no longer rendered.
    pub(crate) fn prune_selection(&mut self) {
        let rendered: BTreeSet<DocumentId> =
            self.documents.rows.iter().map(|row| row.id).collect();
        self.documents.selection.retain(|id| rendered.contains(id));
    }

    pub fn upload_prefs(&self) -> UploadPrefs {
        UploadPrefs {
            recipient: self.upload.params.recipient.clone(),
            participants: self.upload.params.participants.clone(),
            template_id: self.upload.params.template_id.clone(),
        }
    }
}
