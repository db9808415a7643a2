use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use client_logging::{client_info, client_warn};
use deskhand_client::{
    ApiError, ClientEvent, ClientSettings, DeliveryStatusDto, DictionaryEntryDto, DocumentDto,
    DownloadSettings, GatewayCommand, GatewayHandle, GatewaySender, GatewaySettings,
    ImportRecordDto, ProgressUpdateDto, RelayEvent, StatisticsDto, TemplateListDto, UploadForm,
};
use deskhand_core::{
    BatchOutcome, CategoryCount, DeliveryChannel, DeliveryOutcome, DictionaryCategory,
    DictionaryEntry, DocumentRow, DocumentStatus, Effect, ImportRecord, ImportStatus, Msg,
    ProgressEvent, Statistics, TemplateSummary,
};

use super::config::AppConfig;

/// Executes core effects against the gateway and pumps gateway events back
/// into the message loop.
pub struct EffectRunner {
    sender: GatewaySender,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(config: &AppConfig, msg_tx: mpsc::Sender<Msg>) -> anyhow::Result<Self> {
        let settings = GatewaySettings {
            client: ClientSettings {
                base_url: config.base_url.clone(),
                ..ClientSettings::default()
            },
            events_path: "/api/events".to_string(),
            downloads: DownloadSettings {
                dir: config.downloads_dir.clone(),
                now_stamp: std::sync::Arc::new(|| {
                    Local::now().format("%Y%m%d-%H%M%S").to_string()
                }),
            },
        };
        let gateway = GatewayHandle::new(settings).context("build api gateway")?;
        let sender = gateway.sender();
        Self::spawn_event_pump(gateway, msg_tx.clone());
        Ok(Self { sender, msg_tx })
    }

    pub fn run(&self, effect: Effect) {
        match effect {
            Effect::ConnectRelay { channel } => {
                client_info!("ConnectRelay channel={}", channel);
                self.sender.send(GatewayCommand::Subscribe { channel });
            }
            Effect::LoadDocuments { seq, filters } => {
                self.sender.send(GatewayCommand::FetchDocuments {
                    seq,
                    search: filters.search,
                    status: filters.status.map(|s| status_key(s).to_string()),
                    category: filters.category,
                });
            }
            Effect::LoadStatistics => self.sender.send(GatewayCommand::FetchStatistics),
            Effect::LoadHistory => self.sender.send(GatewayCommand::FetchHistory),
            Effect::LoadDictionary => self.sender.send(GatewayCommand::FetchDictionary),
            Effect::LoadTemplates => self.sender.send(GatewayCommand::FetchTemplates),
            Effect::UploadMinutes {
                path,
                file_name,
                params,
            } => {
                client_info!("UploadMinutes file={} recipient={}", file_name, params.recipient);
                self.sender.send(GatewayCommand::UploadMinutes {
                    path: PathBuf::from(path),
                    file_name,
                    form: UploadForm {
                        meeting_date: params.meeting_date,
                        participants: params.participants,
                        conditions: params.conditions,
                        email: params.recipient,
                        template_id: params.template_id,
                    },
                });
            }
            Effect::IngestFiles { paths } => {
                self.sender.send(GatewayCommand::IngestFiles {
                    paths: paths.into_iter().map(PathBuf::from).collect(),
                });
            }
            Effect::ExportBatch { ids } => {
                client_info!("ExportBatch count={}", ids.len());
                self.sender.send(GatewayCommand::ExportBatch { ids });
            }
            Effect::SummarizeBatch { ids } => {
                let title = format!(
                    "Combined summary {} ({} documents)",
                    Local::now().format("%Y-%m-%d"),
                    ids.len()
                );
                self.sender.send(GatewayCommand::SummarizeBatch { ids, title });
            }
            Effect::DeleteDocument { id } => {
                self.sender.send(GatewayCommand::DeleteDocument { id });
            }
            Effect::DownloadDocument { id } => {
                self.sender.send(GatewayCommand::DownloadDocument { id });
            }
            Effect::AddDictionaryEntry { entry } => {
                self.sender.send(GatewayCommand::AddDictionaryEntry {
                    category: entry.category.key().to_string(),
                    source: entry.source,
                    replacement: entry.replacement,
                });
            }
            Effect::RemoveDictionaryEntry { category, source } => {
                self.sender.send(GatewayCommand::RemoveDictionaryEntry {
                    category: category.key().to_string(),
                    source,
                });
            }
            Effect::CreateTemplate {
                id,
                name,
                description,
                prompt,
            } => {
                self.sender.send(GatewayCommand::CreateTemplate {
                    id,
                    name,
                    description,
                    prompt,
                });
            }
            Effect::UpdateTemplate {
                id,
                name,
                description,
                prompt,
            } => {
                self.sender.send(GatewayCommand::UpdateTemplate {
                    id,
                    name,
                    description,
                    prompt,
                });
            }
            Effect::DeleteTemplate { id } => {
                self.sender.send(GatewayCommand::DeleteTemplate { id });
            }
            Effect::SetDefaultTemplate { id } => {
                self.sender.send(GatewayCommand::SetDefaultTemplate { id });
            }
            Effect::ScheduleResultReveal { delay_ms } => {
                let msg_tx = self.msg_tx.clone();
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(delay_ms));
                    let _ = msg_tx.send(Msg::ResultRevealElapsed);
                });
            }
            Effect::OpenLogin { .. } | Effect::SavePrefs(_) => {
                // Handled by the shell before effects reach the gateway.
            }
        }
    }

    fn spawn_event_pump(gateway: GatewayHandle, msg_tx: mpsc::Sender<Msg>) {
        thread::spawn(move || loop {
            if let Some(event) = gateway.recv_timeout(Duration::from_millis(50)) {
                for msg in map_event(event) {
                    if msg_tx.send(msg).is_err() {
                        return;
                    }
                }
            }
        });
    }
}

fn status_key(status: DocumentStatus) -> &'static str {
    match status {
        DocumentStatus::Pending => "pending",
        DocumentStatus::Processing => "processing",
        DocumentStatus::Completed => "completed",
        DocumentStatus::Failed => "failed",
    }
}

/// Maps an API result into the core's display-ready form, routing session
/// expiry to its dedicated message.
fn convert<T, U>(
    result: Result<T, ApiError>,
    map: impl FnOnce(T) -> U,
) -> Result<Result<U, String>, Msg> {
    match result {
        Ok(value) => Ok(Ok(map(value))),
        Err(ApiError::AuthRequired { location }) => Err(Msg::AuthRequired { location }),
        Err(err) => Ok(Err(err.to_string())),
    }
}

fn map_event(event: ClientEvent) -> Vec<Msg> {
    match event {
        ClientEvent::Relay(relay) => map_relay_event(relay),
        ClientEvent::StatisticsLoaded(result) => vec![match convert(result, map_statistics) {
            Ok(result) => Msg::StatisticsLoaded(result),
            Err(msg) => msg,
        }],
        ClientEvent::DocumentsLoaded { seq, result } => {
            vec![
                match convert(result, |docs| docs.into_iter().map(map_document).collect()) {
                    Ok(result) => Msg::DocumentsLoaded { seq, result },
                    Err(msg) => msg,
                },
            ]
        }
        ClientEvent::HistoryLoaded(result) => vec![
            match convert(result, |records| {
                records.into_iter().map(map_import_record).collect()
            }) {
                Ok(result) => Msg::HistoryLoaded(result),
                Err(msg) => msg,
            },
        ],
        ClientEvent::DictionaryLoaded(result) => vec![
            match convert(result, |entries| {
                entries.into_iter().filter_map(map_dictionary_entry).collect()
            }) {
                Ok(result) => Msg::DictionaryLoaded(result),
                Err(msg) => msg,
            },
        ],
        ClientEvent::TemplatesLoaded(result) => vec![match convert(result, map_templates) {
            Ok(result) => Msg::TemplatesLoaded(result),
            Err(msg) => msg,
        }],
        ClientEvent::UploadFinished(result) => vec![match result {
            Ok(_) => Msg::UploadAccepted,
            Err(ApiError::AuthRequired { location }) => Msg::AuthRequired { location },
            Err(err) => Msg::UploadFailed(err.to_string()),
        }],
        ClientEvent::IngestFinished(result) => vec![
            match convert(result, |batch| BatchOutcome {
                succeeded: batch.success,
                failed: batch.failed,
                errors: batch
                    .errors
                    .into_iter()
                    .map(|e| (e.filename, e.error))
                    .collect(),
            }) {
                Ok(result) => Msg::IngestFinished(result),
                Err(msg) => msg,
            },
        ],
        ClientEvent::ExportSaved(result) => vec![
            match convert(result, |path| path.display().to_string()) {
                Ok(result) => Msg::BatchExportFinished(result),
                Err(msg) => msg,
            },
        ],
        ClientEvent::SummarySaved(result) => vec![
            match convert(result, |path| path.display().to_string()) {
                Ok(result) => Msg::BatchSummaryFinished(result),
                Err(msg) => msg,
            },
        ],
        ClientEvent::DocumentSaved(result) => vec![
            match convert(result, |path| path.display().to_string()) {
                Ok(result) => Msg::DocumentDownloadFinished(result),
                Err(msg) => msg,
            },
        ],
        ClientEvent::DocumentDeleted { id, result } => vec![match convert(result, |()| ()) {
            Ok(result) => Msg::DocumentDeleted { id, result },
            Err(msg) => msg,
        }],
        ClientEvent::DictionaryEntryAdded {
            category,
            source,
            replacement,
            result,
        } => {
            let entry = DictionaryEntry {
                category: DictionaryCategory::from_key(&category)
                    .unwrap_or(DictionaryCategory::CommonPhrases),
                source,
                replacement,
            };
            vec![match convert(result, |()| ()) {
                Ok(result) => Msg::EntryAdded { entry, result },
                Err(msg) => msg,
            }]
        }
        ClientEvent::DictionaryEntryRemoved {
            category,
            source,
            result,
        } => {
            let category = DictionaryCategory::from_key(&category)
                .unwrap_or(DictionaryCategory::CommonPhrases);
            vec![match convert(result, |()| ()) {
                Ok(result) => Msg::EntryRemoved {
                    category,
                    source,
                    result,
                },
                Err(msg) => msg,
            }]
        }
        ClientEvent::TemplateMutated(result) => vec![match convert(result, |()| ()) {
            Ok(result) => Msg::TemplateMutationFinished(result),
            Err(msg) => msg,
        }],
    }
}

fn map_relay_event(event: RelayEvent) -> Vec<Msg> {
    match event {
        RelayEvent::Connected => vec![Msg::RelayConnected],
        RelayEvent::Disconnected { reason } => {
            client_warn!("relay dropped: {}", reason);
            vec![Msg::RelayDropped { reason }]
        }
        RelayEvent::Progress(update) => map_progress(update),
        RelayEvent::DeliveryStatus(status) => vec![Msg::DeliveryStatusReceived {
            channel: DeliveryChannel::Email,
            outcome: map_delivery(status),
        }],
    }
}

fn map_progress(update: ProgressUpdateDto) -> Vec<Msg> {
    let details: Vec<(String, String)> = update
        .data
        .as_ref()
        .map(|data| {
            data.iter()
                .map(|(key, value)| (key.clone(), json_to_display(value)))
                .collect()
        })
        .unwrap_or_default();

    let mut msgs = Vec::with_capacity(2);
    // The terminal event carries the delivery summary for channels that have
    // no dedicated status event.
    if update.step == "complete" && details.iter().any(|(key, _)| key == "notion_page_id") {
        msgs.push(Msg::DeliveryStatusReceived {
            channel: DeliveryChannel::Notion,
            outcome: DeliveryOutcome::Success,
        });
    }
    msgs.push(Msg::ProgressReceived(ProgressEvent {
        step: update.step,
        message: update.message,
        percent: update
            .progress_percent
            .map(|p| p.clamp(0.0, 100.0).round() as u8),
        details,
    }));
    msgs
}

fn map_delivery(status: DeliveryStatusDto) -> DeliveryOutcome {
    match status.status.as_str() {
        "queued" | "sending" => DeliveryOutcome::Pending,
        "sent" | "success" => DeliveryOutcome::Success,
        "error" | "failed" => DeliveryOutcome::Failure(
            status.message.unwrap_or_else(|| "delivery failed".to_string()),
        ),
        other => {
            client_warn!("unknown delivery status '{}'", other);
            DeliveryOutcome::Pending
        }
    }
}

fn json_to_display(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn map_statistics(stats: StatisticsDto) -> Statistics {
    Statistics {
        total_documents: stats.total_documents,
        completed: stats.status.completed,
        processing: stats.status.processing,
        failed: stats.status.failed,
        categories: stats
            .categories
            .into_iter()
            .map(|c| CategoryCount {
                name: c.name,
                count: c.count,
            })
            .collect(),
    }
}

fn map_document(doc: DocumentDto) -> DocumentRow {
    use deskhand_client::DocumentStatusDto;
    DocumentRow {
        id: doc.id,
        filename: doc.filename,
        category: doc.category,
        status: match doc.status {
            DocumentStatusDto::Pending => DocumentStatus::Pending,
            DocumentStatusDto::Processing => DocumentStatus::Processing,
            DocumentStatusDto::Completed => DocumentStatus::Completed,
            DocumentStatusDto::Failed => DocumentStatus::Failed,
        },
        size_bytes: doc.file_size,
        processed_at: doc.processed_at,
    }
}

fn map_import_record(record: ImportRecordDto) -> ImportRecord {
    ImportRecord {
        filename: record.filename,
        imported_at: record.import_date,
        record_count: record.record_count,
        status: if record.status == "success" {
            ImportStatus::Success
        } else {
            ImportStatus::Failed
        },
    }
}

fn map_dictionary_entry(entry: DictionaryEntryDto) -> Option<DictionaryEntry> {
    let Some(category) = DictionaryCategory::from_key(&entry.category) else {
        client_warn!("dropping entry with unknown dictionary category '{}'", entry.category);
        return None;
    };
    Some(DictionaryEntry {
        category,
        source: entry.source,
        replacement: entry.replacement,
    })
}

fn map_templates(list: TemplateListDto) -> Vec<TemplateSummary> {
    let default_id = list.default_template_id;
    list.templates
        .into_iter()
        .map(|t| TemplateSummary {
            is_default: t.is_default || default_id.as_deref() == Some(t.id.as_str()),
            id: t.id,
            name: t.name,
            description: t.description,
        })
        .collect()
}
