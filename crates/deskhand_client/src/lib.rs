//! Deskhand client: API transport, push-event relay and download persistence.
mod download;
mod endpoints;
mod gateway;
mod http;
mod relay;
mod types;

pub use download::{
    disposition_filename, ensure_download_dir, sanitize_filename, AtomicFileWriter, DownloadStore,
    PersistError,
};
pub use gateway::{
    ClientEvent, DownloadSettings, GatewayCommand, GatewayHandle, GatewaySender, GatewaySettings,
};
pub use http::{ApiClient, BinaryBody, ClientSettings};
pub use relay::{decode_frame, EventRelay, EventSink, FrameParser, RelayEvent, RelaySettings, SseFrame};
pub use types::{
    ApiError, BatchErrorDto, BatchUploadDto, CategoryCountDto, DeliveryStatusDto,
    DictionaryEntryDto, DocumentDto, DocumentStatusDto, ImportRecordDto, ProgressUpdateDto,
    StatisticsDto, StatusCountsDto, SummaryDto, TemplateDto, TemplateListDto, UploadAckDto,
    UploadForm,
};
