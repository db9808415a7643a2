//! Deskhand core: pure state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{
    AppState, BatchOutcome, CategoryCount, DeliveryChannel, DeliveryOutcome, DictionaryCategory,
    DictionaryEntry, DocumentFilters, DocumentId, DocumentRow, DocumentStatus, ImportRecord,
    ImportStatus, ProgressEvent, RelayState, RequestSeq, Screen, SelectedFile, Statistics,
    TemplateSummary, UploadOutcome, UploadParams, UploadPhase, UploadPrefs,
    ALLOWED_AUDIO_EXTENSIONS, MAX_UPLOAD_BYTES, RESULT_REVEAL_DELAY_MS,
};
pub use update::update;
pub use view_model::{
    AppViewModel, DictionaryRowView, DictionaryView, DocumentRowView, DocumentsView,
    HistoryRowView, ProgressView, StatisticsView, TemplateRowView, UploadCardView, UploadView,
    NO_DICTIONARY_ENTRIES, NO_DOCUMENTS, NO_HISTORY, NO_SEARCH_RESULTS, NO_TEMPLATES,
};
