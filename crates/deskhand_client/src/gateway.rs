use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use client_logging::{client_info, client_warn, set_op_seq};

use crate::download::DownloadStore;
use crate::http::{ApiClient, ClientSettings};
use crate::relay::{EventRelay, EventSink, RelayEvent, RelaySettings};
use crate::types::{
    ApiError, BatchUploadDto, DictionaryEntryDto, DocumentDto, ImportRecordDto, StatisticsDto,
    TemplateListDto, UploadAckDto, UploadForm,
};

/// Work the shell hands to the gateway. One command maps onto one API call
/// (or the one-shot relay subscription).
#[derive(Debug, Clone)]
pub enum GatewayCommand {
    Subscribe { channel: String },
    FetchStatistics,
    FetchDocuments {
        seq: u64,
        search: String,
        status: Option<String>,
        category: Option<String>,
    },
    FetchHistory,
    FetchDictionary,
    FetchTemplates,
    UploadMinutes { path: PathBuf, file_name: String, form: UploadForm },
    IngestFiles { paths: Vec<PathBuf> },
    ExportBatch { ids: Vec<u64> },
    SummarizeBatch { ids: Vec<u64>, title: String },
    DeleteDocument { id: u64 },
    DownloadDocument { id: u64 },
    AddDictionaryEntry { category: String, source: String, replacement: String },
    RemoveDictionaryEntry { category: String, source: String },
    CreateTemplate { id: String, name: String, description: String, prompt: String },
    UpdateTemplate { id: String, name: String, description: String, prompt: String },
    DeleteTemplate { id: String },
    SetDefaultTemplate { id: String },
}

/// Results and relay pushes flowing back to the shell.
#[derive(Debug)]
pub enum ClientEvent {
    Relay(RelayEvent),
    StatisticsLoaded(Result<StatisticsDto, ApiError>),
    DocumentsLoaded { seq: u64, result: Result<Vec<DocumentDto>, ApiError> },
    HistoryLoaded(Result<Vec<ImportRecordDto>, ApiError>),
    DictionaryLoaded(Result<Vec<DictionaryEntryDto>, ApiError>),
    TemplatesLoaded(Result<TemplateListDto, ApiError>),
    UploadFinished(Result<UploadAckDto, ApiError>),
    IngestFinished(Result<BatchUploadDto, ApiError>),
    ExportSaved(Result<PathBuf, ApiError>),
    SummarySaved(Result<PathBuf, ApiError>),
    DocumentSaved(Result<PathBuf, ApiError>),
    DocumentDeleted { id: u64, result: Result<(), ApiError> },
    DictionaryEntryAdded {
        category: String,
        source: String,
        replacement: String,
        result: Result<(), ApiError>,
    },
    DictionaryEntryRemoved {
        category: String,
        source: String,
        result: Result<(), ApiError>,
    },
    TemplateMutated(Result<(), ApiError>),
}

#[derive(Clone)]
pub struct DownloadSettings {
    pub dir: PathBuf,
    /// Timestamp used in fallback download names, injected by the shell.
    pub now_stamp: Arc<dyn Fn() -> String + Send + Sync>,
}

#[derive(Clone)]
pub struct GatewaySettings {
    pub client: ClientSettings,
    pub events_path: String,
    pub downloads: DownloadSettings,
}

/// Command side of the gateway, cheap to clone into input threads.
#[derive(Clone)]
pub struct GatewaySender {
    cmd_tx: mpsc::Sender<GatewayCommand>,
}

impl GatewaySender {
    pub fn send(&self, command: GatewayCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

/// Bridges the synchronous shell to async IO: a background thread owns the
/// tokio runtime, commands fan out as tasks, events funnel back over a
/// std channel.
pub struct GatewayHandle {
    cmd_tx: mpsc::Sender<GatewayCommand>,
    event_rx: mpsc::Receiver<ClientEvent>,
}

impl GatewayHandle {
    pub fn new(settings: GatewaySettings) -> Result<Self, ApiError> {
        let client = Arc::new(ApiClient::new(settings.client.clone())?);
        let store = Arc::new(DownloadStore::new(
            settings.downloads.dir.clone(),
            settings.downloads.now_stamp.clone(),
        ));
        let events_path = settings.events_path.clone();
        let (cmd_tx, cmd_rx) = mpsc::channel::<GatewayCommand>();
        let (event_tx, event_rx) = mpsc::channel::<ClientEvent>();
        let op_counter = AtomicU64::new(0);

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let client = client.clone();
                let store = store.clone();
                let event_tx = event_tx.clone();
                let events_path = events_path.clone();
                let seq = op_counter.fetch_add(1, Ordering::Relaxed) + 1;
                runtime.spawn(async move {
                    set_op_seq(seq);
                    handle_command(client.as_ref(), store.as_ref(), &events_path, command, event_tx)
                        .await;
                });
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn sender(&self) -> GatewaySender {
        GatewaySender {
            cmd_tx: self.cmd_tx.clone(),
        }
    }

    pub fn send(&self, command: GatewayCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<ClientEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<ClientEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

struct ChannelEventSink {
    event_tx: mpsc::Sender<ClientEvent>,
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: RelayEvent) {
        let _ = self.event_tx.send(ClientEvent::Relay(event));
    }
}

async fn handle_command(
    client: &ApiClient,
    store: &DownloadStore,
    events_path: &str,
    command: GatewayCommand,
    event_tx: mpsc::Sender<ClientEvent>,
) {
    match command {
        GatewayCommand::Subscribe { channel } => {
            client_info!("joining event channel '{channel}'");
            let settings = RelaySettings {
                events_path: events_path.to_string(),
                channel,
            };
            let sink = ChannelEventSink {
                event_tx: event_tx.clone(),
            };
            match EventRelay::new(client, &settings) {
                Ok(relay) => relay.run(&sink).await,
                Err(err) => {
                    client_warn!("relay setup failed: {err}");
                    sink.emit(RelayEvent::Disconnected {
                        reason: err.to_string(),
                    });
                }
            }
        }
        GatewayCommand::FetchStatistics => {
            let result = client.statistics().await;
            let _ = event_tx.send(ClientEvent::StatisticsLoaded(result));
        }
        GatewayCommand::FetchDocuments {
            seq,
            search,
            status,
            category,
        } => {
            let result = client
                .documents(&search, status.as_deref(), category.as_deref())
                .await;
            let _ = event_tx.send(ClientEvent::DocumentsLoaded { seq, result });
        }
        GatewayCommand::FetchHistory => {
            let result = client.import_history().await;
            let _ = event_tx.send(ClientEvent::HistoryLoaded(result));
        }
        GatewayCommand::FetchDictionary => {
            let result = client.dictionary().await;
            let _ = event_tx.send(ClientEvent::DictionaryLoaded(result));
        }
        GatewayCommand::FetchTemplates => {
            let result = client.templates().await;
            let _ = event_tx.send(ClientEvent::TemplatesLoaded(result));
        }
        GatewayCommand::UploadMinutes {
            path,
            file_name,
            form,
        } => {
            client_info!("uploading '{file_name}'");
            let result = match tokio::fs::read(&path).await {
                Ok(bytes) => client.upload_minutes(&file_name, bytes, &form).await,
                Err(err) => Err(ApiError::File(format!("{}: {err}", path.display()))),
            };
            let _ = event_tx.send(ClientEvent::UploadFinished(result));
        }
        GatewayCommand::IngestFiles { paths } => {
            let mut files = Vec::with_capacity(paths.len());
            let mut read_error = None;
            for path in &paths {
                match tokio::fs::read(path).await {
                    Ok(bytes) => {
                        let name = path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_else(|| "unnamed".to_string());
                        files.push((name, bytes));
                    }
                    Err(err) => {
                        read_error = Some(ApiError::File(format!("{}: {err}", path.display())));
                        break;
                    }
                }
            }
            let result = match read_error {
                Some(err) => Err(err),
                None => client.ingest_files(files).await,
            };
            let _ = event_tx.send(ClientEvent::IngestFinished(result));
        }
        GatewayCommand::ExportBatch { ids } => {
            let result = match client.export_markdown_zip(&ids).await {
                Ok(body) => store
                    .save_body(&body, "markdown_export", "zip")
                    .map_err(|err| ApiError::File(err.to_string())),
                Err(err) => Err(err),
            };
            let _ = event_tx.send(ClientEvent::ExportSaved(result));
        }
        GatewayCommand::SummarizeBatch { ids, title } => {
            let result = match client.summarize(&ids, &title).await {
                Ok(summary) => store
                    .save_named(&summary.filename, summary.summary.as_bytes())
                    .map_err(|err| ApiError::File(err.to_string())),
                Err(err) => Err(err),
            };
            let _ = event_tx.send(ClientEvent::SummarySaved(result));
        }
        GatewayCommand::DeleteDocument { id } => {
            let result = client.delete_document(id).await;
            let _ = event_tx.send(ClientEvent::DocumentDeleted { id, result });
        }
        GatewayCommand::DownloadDocument { id } => {
            let result = match client.download_document(id).await {
                Ok(body) => store
                    .save_body(&body, &format!("document_{id}"), "bin")
                    .map_err(|err| ApiError::File(err.to_string())),
                Err(err) => Err(err),
            };
            let _ = event_tx.send(ClientEvent::DocumentSaved(result));
        }
        GatewayCommand::AddDictionaryEntry {
            category,
            source,
            replacement,
        } => {
            let result = client
                .add_dictionary_entry(&category, &source, &replacement)
                .await;
            let _ = event_tx.send(ClientEvent::DictionaryEntryAdded {
                category,
                source,
                replacement,
                result,
            });
        }
        GatewayCommand::RemoveDictionaryEntry { category, source } => {
            let result = client.remove_dictionary_entry(&category, &source).await;
            let _ = event_tx.send(ClientEvent::DictionaryEntryRemoved {
                category,
                source,
                result,
            });
        }
        GatewayCommand::CreateTemplate {
            id,
            name,
            description,
            prompt,
        } => {
            let result = client.create_template(&id, &name, &description, &prompt).await;
            let _ = event_tx.send(ClientEvent::TemplateMutated(result));
        }
        GatewayCommand::UpdateTemplate {
            id,
            name,
            description,
            prompt,
        } => {
            let result = client.update_template(&id, &name, &description, &prompt).await;
            let _ = event_tx.send(ClientEvent::TemplateMutated(result));
        }
        GatewayCommand::DeleteTemplate { id } => {
            let result = client.delete_template(&id).await;
            let _ = event_tx.send(ClientEvent::TemplateMutated(result));
        }
        GatewayCommand::SetDefaultTemplate { id } => {
            let result = client.set_default_template(&id).await;
            let _ = event_tx.send(ClientEvent::TemplateMutated(result));
        }
    }
}
