use crate::state::{
    BatchOutcome, DeliveryChannel, DeliveryOutcome, DictionaryCategory, DictionaryEntry,
    DocumentId, DocumentRow, DocumentStatus, ImportRecord, ProgressEvent, RequestSeq, Screen,
    Statistics, TemplateSummary, UploadPrefs,
};

/// Everything that can happen to the application, user input and IO results
/// alike. API failures arrive as display-ready strings; the gateway keeps the
/// structured error for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Shell finished wiring; kick off the initial loads and the relay join.
    Started { channel: String },
    ScreenSelected(Screen),

    // Upload flow.
    FileChosen { path: String, name: String, size: u64 },
    MeetingDateChanged(String),
    ParticipantsChanged(String),
    ConditionsChanged(String),
    RecipientChanged(String),
    TemplateSelected(String),
    UploadClicked,
    UploadAccepted,
    UploadFailed(String),
    ResetUpload,
    RestorePrefs(UploadPrefs),

    // Push-event relay.
    RelayConnected,
    RelayDropped { reason: String },
    ProgressReceived(ProgressEvent),
    DeliveryStatusReceived {
        channel: DeliveryChannel,
        outcome: DeliveryOutcome,
    },
    /// The fixed post-completion display delay elapsed.
    ResultRevealElapsed,

    // Document console.
    SearchChanged(String),
    StatusFilterChanged(Option<DocumentStatus>),
    CategoryFilterChanged(Option<String>),
    RefreshClicked,
    DocumentsLoaded {
        seq: RequestSeq,
        result: Result<Vec<DocumentRow>, String>,
    },
    StatisticsLoaded(Result<Statistics, String>),
    HistoryLoaded(Result<Vec<ImportRecord>, String>),
    SelectionToggled(DocumentId),
    SelectAllToggled(bool),
    IngestFiles(Vec<String>),
    IngestFinished(Result<BatchOutcome, String>),
    BatchExportClicked,
    BatchSummaryClicked,
    DeleteDocumentClicked(DocumentId),
    DownloadDocumentClicked(DocumentId),
    BatchExportFinished(Result<String, String>),
    BatchSummaryFinished(Result<String, String>),
    DocumentDeleted {
        id: DocumentId,
        result: Result<(), String>,
    },
    DocumentDownloadFinished(Result<String, String>),

    // Dictionary console.
    DictionaryLoaded(Result<Vec<DictionaryEntry>, String>),
    DictionarySearchChanged(String),
    EntryDraftCategoryChanged(DictionaryCategory),
    EntryDraftSourceChanged(String),
    EntryDraftReplacementChanged(String),
    AddEntryClicked,
    EntryAdded {
        entry: DictionaryEntry,
        result: Result<(), String>,
    },
    RemoveEntryClicked {
        category: DictionaryCategory,
        source: String,
    },
    EntryRemoved {
        category: DictionaryCategory,
        source: String,
        result: Result<(), String>,
    },

    // Template console.
    TemplatesLoaded(Result<Vec<TemplateSummary>, String>),
    CreateTemplateSubmitted {
        id: String,
        name: String,
        description: String,
        prompt: String,
    },
    UpdateTemplateSubmitted {
        id: String,
        name: String,
        description: String,
        prompt: String,
    },
    DeleteTemplateClicked(String),
    SetDefaultTemplateClicked(String),
    TemplateMutationFinished(Result<(), String>),

    /// The server signalled session expiry via a redirect to the login path.
    AuthRequired { location: String },

    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
