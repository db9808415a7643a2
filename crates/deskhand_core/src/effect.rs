use crate::state::{
    DictionaryCategory, DictionaryEntry, DocumentFilters, DocumentId, RequestSeq, UploadParams,
    UploadPrefs,
};

/// IO the update function asked for. The shell owns execution; the core only
/// describes intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ConnectRelay { channel: String },

    LoadDocuments { seq: RequestSeq, filters: DocumentFilters },
    LoadStatistics,
    LoadHistory,
    LoadDictionary,
    LoadTemplates,

    UploadMinutes { path: String, file_name: String, params: UploadParams },
    IngestFiles { paths: Vec<String> },
    ExportBatch { ids: Vec<DocumentId> },
    SummarizeBatch { ids: Vec<DocumentId> },
    DeleteDocument { id: DocumentId },
    DownloadDocument { id: DocumentId },

    AddDictionaryEntry { entry: DictionaryEntry },
    RemoveDictionaryEntry { category: DictionaryCategory, source: String },

    CreateTemplate { id: String, name: String, description: String, prompt: String },
    UpdateTemplate { id: String, name: String, description: String, prompt: String },
    DeleteTemplate { id: String },
    SetDefaultTemplate { id: String },

    /// Arm the one-shot timer that reveals the result card.
    ScheduleResultReveal { delay_ms: u64 },
    /// Navigate to the login page; the session cannot continue here.
    OpenLogin { location: String },
    SavePrefs(UploadPrefs),
}
