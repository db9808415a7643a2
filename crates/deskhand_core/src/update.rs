use crate::state::{
    AppState, DeliveryChannel, DeliveryOutcome, ProgressEvent, RelayState, Screen, SelectedFile,
    UploadOutcome, UploadPhase, ALLOWED_AUDIO_EXTENSIONS, MAX_UPLOAD_BYTES,
    RESULT_REVEAL_DELAY_MS,
};
use crate::{Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started { channel } => {
            state.relay = RelayState::Connecting;
            state.relay_channel = channel.clone();
            state.touch();
            let seq = state.next_list_seq();
            vec![
                Effect::ConnectRelay { channel },
                Effect::LoadDocuments {
                    seq,
                    filters: state.documents.filters.clone(),
                },
                Effect::LoadStatistics,
                Effect::LoadHistory,
                Effect::LoadDictionary,
                Effect::LoadTemplates,
            ]
        }
        Msg::ScreenSelected(screen) => {
            if state.screen == screen {
                return (state, Vec::new());
            }
            state.screen = screen;
            state.touch();
            match screen {
                Screen::Upload => Vec::new(),
                Screen::Documents => {
                    let seq = state.next_list_seq();
                    vec![
                        Effect::LoadDocuments {
                            seq,
                            filters: state.documents.filters.clone(),
                        },
                        Effect::LoadStatistics,
                        Effect::LoadHistory,
                    ]
                }
                Screen::Dictionary => vec![Effect::LoadDictionary],
                Screen::Templates => vec![Effect::LoadTemplates],
            }
        }

        // ----- upload flow -----
        Msg::FileChosen { path, name, size } => {
            if state.upload.in_flight() {
                return (state, Vec::new());
            }
            if !has_allowed_extension(&name) {
                state.upload.last_error = Some(format!(
                    "unsupported file type: {name} (accepted: {})",
                    ALLOWED_AUDIO_EXTENSIONS.join(", ")
                ));
                state.touch();
                return (state, Vec::new());
            }
            if size > MAX_UPLOAD_BYTES {
                state.upload.last_error =
                    Some(format!("file too large: {size} bytes (max {MAX_UPLOAD_BYTES})"));
                state.touch();
                return (state, Vec::new());
            }
            state.upload.file = Some(SelectedFile { path, name, size });
            state.upload.last_error = None;
            state.touch();
            Vec::new()
        }
        Msg::MeetingDateChanged(value) => {
            state.upload.params.meeting_date = value;
            state.touch();
            Vec::new()
        }
        Msg::ParticipantsChanged(value) => {
            state.upload.params.participants = value;
            state.touch();
            Vec::new()
        }
        Msg::ConditionsChanged(value) => {
            state.upload.params.conditions = value;
            state.touch();
            Vec::new()
        }
        Msg::RecipientChanged(value) => {
            state.upload.params.recipient = value;
            state.touch();
            Vec::new()
        }
        Msg::TemplateSelected(id) => {
            state.upload.params.template_id = Some(id);
            state.touch();
            Vec::new()
        }
        Msg::UploadClicked => {
            if state.upload.in_flight() {
                return (state, Vec::new());
            }
            let Some(file) = state.upload.file.clone() else {
                state.upload.last_error = Some("no file selected".to_string());
                state.touch();
                return (state, Vec::new());
            };
            if state.upload.params.recipient.trim().is_empty() {
                state.upload.last_error = Some("recipient address is required".to_string());
                state.touch();
                return (state, Vec::new());
            }
            state.upload.phase = UploadPhase::Uploading;
            state.upload.email = DeliveryOutcome::Pending;
            state.upload.notion = DeliveryOutcome::Pending;
            state.upload.last_error = None;
            state.touch();
            vec![
                Effect::UploadMinutes {
                    path: file.path,
                    file_name: file.name,
                    params: state.upload.params.clone(),
                },
                Effect::SavePrefs(state.upload_prefs()),
            ]
        }
        Msg::UploadAccepted => {
            if state.upload.phase == UploadPhase::Uploading {
                state.upload.phase = UploadPhase::Processing(ProgressEvent {
                    step: "queued".to_string(),
                    message: "Waiting for the processing pipeline".to_string(),
                    percent: None,
                    details: Vec::new(),
                });
                state.touch();
            }
            Vec::new()
        }
        Msg::UploadFailed(reason) => {
            if state.upload.in_flight() {
                state.upload.phase = UploadPhase::Failed(reason);
                state.touch();
            }
            Vec::new()
        }
        Msg::ResetUpload => {
            state.upload.phase = UploadPhase::Idle;
            state.upload.file = None;
            state.upload.email = DeliveryOutcome::Pending;
            state.upload.notion = DeliveryOutcome::Pending;
            state.upload.last_error = None;
            state.touch();
            Vec::new()
        }
        Msg::RestorePrefs(prefs) => {
            state.upload.params.recipient = prefs.recipient;
            state.upload.params.participants = prefs.participants;
            if prefs.template_id.is_some() {
                state.upload.params.template_id = prefs.template_id;
            }
            state.touch();
            Vec::new()
        }

        // ----- push-event relay -----
        Msg::RelayConnected => {
            state.relay = RelayState::Connected {
                channel: state.relay_channel.clone(),
            };
            state.touch();
            Vec::new()
        }
        Msg::RelayDropped { .. } => {
            // A dropped subscription is terminal: missed events are lost and
            // the progress card stays wherever it was.
            state.relay = RelayState::Disconnected;
            state.touch();
            Vec::new()
        }
        Msg::ProgressReceived(event) => match &state.upload.phase {
            UploadPhase::Uploading | UploadPhase::Processing(_) => {
                state.touch();
                if event.step == "complete" {
                    state.upload.phase = UploadPhase::Finishing(event);
                    vec![Effect::ScheduleResultReveal {
                        delay_ms: RESULT_REVEAL_DELAY_MS,
                    }]
                } else {
                    state.upload.phase = UploadPhase::Processing(event);
                    Vec::new()
                }
            }
            // Late or duplicate events after the terminal transition are
            // dropped; the reveal fires exactly once.
            _ => Vec::new(),
        },
        Msg::DeliveryStatusReceived { channel, outcome } => {
            match channel {
                DeliveryChannel::Email => state.upload.email = outcome,
                DeliveryChannel::Notion => state.upload.notion = outcome,
            }
            state.touch();
            Vec::new()
        }
        Msg::ResultRevealElapsed => {
            if let UploadPhase::Finishing(event) = &state.upload.phase {
                let filename = event
                    .details
                    .iter()
                    .find(|(key, _)| key == "filename")
                    .map(|(_, value)| value.clone());
                state.upload.phase = UploadPhase::Done(UploadOutcome { filename });
                state.touch();
            }
            Vec::new()
        }

        // ----- document console -----
        Msg::SearchChanged(query) => {
            state.documents.filters.search = query;
            state.touch();
            reload_documents(&mut state)
        }
        Msg::StatusFilterChanged(status) => {
            state.documents.filters.status = status;
            state.touch();
            reload_documents(&mut state)
        }
        Msg::CategoryFilterChanged(category) => {
            state.documents.filters.category = category;
            state.touch();
            reload_documents(&mut state)
        }
        Msg::RefreshClicked => {
            state.touch();
            let mut effects = reload_documents(&mut state);
            effects.push(Effect::LoadStatistics);
            effects
        }
        Msg::DocumentsLoaded { seq, result } => {
            if seq != state.documents.list_seq {
                // Superseded request; a newer list is already on its way.
                return (state, Vec::new());
            }
            match result {
                Ok(rows) => {
                    state.documents.rows = rows;
                    state.documents.last_error = None;
                    state.prune_selection();
                }
                Err(message) => state.documents.last_error = Some(message),
            }
            state.touch();
            Vec::new()
        }
        Msg::StatisticsLoaded(result) => {
            match result {
                Ok(stats) => state.statistics = Some(stats),
                Err(message) => state.documents.last_error = Some(message),
            }
            state.touch();
            Vec::new()
        }
        Msg::HistoryLoaded(result) => {
            match result {
                Ok(history) => state.history = history,
                Err(message) => state.documents.last_error = Some(message),
            }
            state.touch();
            Vec::new()
        }
        Msg::SelectionToggled(id) => {
            if !state.documents.rows.iter().any(|row| row.id == id) {
                return (state, Vec::new());
            }
            if !state.documents.selection.remove(&id) {
                state.documents.selection.insert(id);
            }
            state.touch();
            Vec::new()
        }
        Msg::SelectAllToggled(checked) => {
            if checked {
                state.documents.selection =
                    state.documents.rows.iter().map(|row| row.id).collect();
            } else {
                state.documents.selection.clear();
            }
            state.touch();
            Vec::new()
        }
        Msg::IngestFiles(paths) => {
            if paths.is_empty() || state.documents.busy {
                return (state, Vec::new());
            }
            state.documents.busy = true;
            state.touch();
            vec![Effect::IngestFiles { paths }]
        }
        Msg::IngestFinished(result) => {
            state.documents.busy = false;
            match result {
                Ok(outcome) => {
                    state.documents.last_action = Some(format!(
                        "ingested {} file(s), {} failed",
                        outcome.succeeded, outcome.failed
                    ));
                    state.documents.last_error = None;
                }
                Err(message) => state.documents.last_error = Some(message),
            }
            state.touch();
            let mut effects = reload_documents(&mut state);
            effects.push(Effect::LoadStatistics);
            effects
        }
        Msg::BatchExportClicked => match batch_ids(&mut state) {
            Some(ids) => vec![Effect::ExportBatch { ids }],
            None => Vec::new(),
        },
        Msg::BatchSummaryClicked => match batch_ids(&mut state) {
            Some(ids) => vec![Effect::SummarizeBatch { ids }],
            None => Vec::new(),
        },
        Msg::DeleteDocumentClicked(id) => {
            if !state.documents.rows.iter().any(|row| row.id == id) {
                return (state, Vec::new());
            }
            state.touch();
            vec![Effect::DeleteDocument { id }]
        }
        Msg::DownloadDocumentClicked(id) => {
            if !state.documents.rows.iter().any(|row| row.id == id) {
                return (state, Vec::new());
            }
            state.touch();
            vec![Effect::DownloadDocument { id }]
        }
        Msg::BatchExportFinished(result) => finish_batch(&mut state, result, "exported to"),
        Msg::BatchSummaryFinished(result) => finish_batch(&mut state, result, "summary saved to"),
        Msg::DocumentDeleted { id, result } => {
            match result {
                Ok(()) => {
                    state.documents.rows.retain(|row| row.id != id);
                    state.documents.selection.remove(&id);
                    state.documents.last_action = Some(format!("deleted document {id}"));
                    state.touch();
                    let mut effects = reload_documents(&mut state);
                    effects.push(Effect::LoadStatistics);
                    return (state, effects);
                }
                Err(message) => state.documents.last_error = Some(message),
            }
            state.touch();
            Vec::new()
        }
        Msg::DocumentDownloadFinished(result) => {
            match result {
                Ok(path) => state.documents.last_action = Some(format!("downloaded to {path}")),
                Err(message) => state.documents.last_error = Some(message),
            }
            state.touch();
            Vec::new()
        }

        // ----- dictionary console -----
        Msg::DictionaryLoaded(result) => {
            match result {
                Ok(entries) => {
                    state.dictionary.entries = entries;
                    state.dictionary.last_error = None;
                }
                Err(message) => state.dictionary.last_error = Some(message),
            }
            state.touch();
            Vec::new()
        }
        Msg::DictionarySearchChanged(query) => {
            state.dictionary.query = query;
            state.touch();
            Vec::new()
        }
        Msg::EntryDraftCategoryChanged(category) => {
            state.dictionary.draft.category = category;
            state.touch();
            Vec::new()
        }
        Msg::EntryDraftSourceChanged(value) => {
            state.dictionary.draft.source = value;
            state.touch();
            Vec::new()
        }
        Msg::EntryDraftReplacementChanged(value) => {
            state.dictionary.draft.replacement = value;
            state.touch();
            Vec::new()
        }
        Msg::AddEntryClicked => {
            let category = state.dictionary.draft.category;
            let source = state.dictionary.draft.source.trim().to_string();
            let replacement = state.dictionary.draft.replacement.trim().to_string();
            if source.is_empty() || replacement.is_empty() {
                state.dictionary.last_error =
                    Some("both the source and the replacement term are required".to_string());
                state.touch();
                return (state, Vec::new());
            }
            state.dictionary.last_error = None;
            state.touch();
            vec![Effect::AddDictionaryEntry {
                entry: crate::DictionaryEntry {
                    category,
                    source,
                    replacement,
                },
            }]
        }
        Msg::EntryAdded { entry, result } => {
            match result {
                Ok(()) => {
                    state
                        .dictionary
                        .entries
                        .retain(|e| !(e.category == entry.category && e.source == entry.source));
                    state.dictionary.entries.push(entry);
                    state.dictionary.draft.source.clear();
                    state.dictionary.draft.replacement.clear();
                    state.dictionary.last_error = None;
                }
                Err(message) => state.dictionary.last_error = Some(message),
            }
            state.touch();
            Vec::new()
        }
        Msg::RemoveEntryClicked { category, source } => {
            state.touch();
            vec![Effect::RemoveDictionaryEntry { category, source }]
        }
        Msg::EntryRemoved {
            category,
            source,
            result,
        } => {
            match result {
                Ok(()) => {
                    state
                        .dictionary
                        .entries
                        .retain(|e| !(e.category == category && e.source == source));
                    state.dictionary.last_error = None;
                }
                Err(message) => state.dictionary.last_error = Some(message),
            }
            state.touch();
            Vec::new()
        }

        // ----- template console -----
        Msg::TemplatesLoaded(result) => {
            match result {
                Ok(templates) => {
                    if state.upload.params.template_id.is_none() {
                        state.upload.params.template_id = templates
                            .iter()
                            .find(|t| t.is_default)
                            .map(|t| t.id.clone());
                    }
                    state.templates.templates = templates;
                    state.templates.last_error = None;
                }
                Err(message) => state.templates.last_error = Some(message),
            }
            state.touch();
            Vec::new()
        }
        Msg::CreateTemplateSubmitted {
            id,
            name,
            description,
            prompt,
        } => {
            if validate_template(&mut state, &id, &name, &prompt) {
                vec![Effect::CreateTemplate {
                    id,
                    name,
                    description,
                    prompt,
                }]
            } else {
                Vec::new()
            }
        }
        Msg::UpdateTemplateSubmitted {
            id,
            name,
            description,
            prompt,
        } => {
            if validate_template(&mut state, &id, &name, &prompt) {
                vec![Effect::UpdateTemplate {
                    id,
                    name,
                    description,
                    prompt,
                }]
            } else {
                Vec::new()
            }
        }
        Msg::DeleteTemplateClicked(id) => {
            state.touch();
            vec![Effect::DeleteTemplate { id }]
        }
        Msg::SetDefaultTemplateClicked(id) => {
            state.touch();
            vec![Effect::SetDefaultTemplate { id }]
        }
        Msg::TemplateMutationFinished(result) => {
            match result {
                Ok(()) => {
                    state.templates.last_error = None;
                    state.touch();
                    return (state, vec![Effect::LoadTemplates]);
                }
                Err(message) => state.templates.last_error = Some(message),
            }
            state.touch();
            Vec::new()
        }

        Msg::AuthRequired { location } => vec![Effect::OpenLogin { location }],

        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn has_allowed_extension(name: &str) -> bool {
    let Some((_, extension)) = name.rsplit_once('.') else {
        return false;
    };
    let extension = extension.to_lowercase();
    ALLOWED_AUDIO_EXTENSIONS.iter().any(|e| *e == extension)
}

fn reload_documents(state: &mut AppState) -> Vec<Effect> {
    let seq = state.next_list_seq();
    vec![Effect::LoadDocuments {
        seq,
        filters: state.documents.filters.clone(),
    }]
}

/// Collects the selection for a batch call, enforcing the empty-selection and
/// single-in-flight guards. Marks the controller busy when it returns ids.
fn batch_ids(state: &mut AppState) -> Option<Vec<crate::DocumentId>> {
    if state.documents.selection.is_empty() || state.documents.busy {
        return None;
    }
    state.documents.busy = true;
    state.touch();
    Some(state.documents.selection.iter().copied().collect())
}

fn finish_batch(
    state: &mut AppState,
    result: Result<String, String>,
    verb: &str,
) -> Vec<Effect> {
    state.documents.busy = false;
    let effects = match result {
        Ok(path) => {
            state.documents.selection.clear();
            state.documents.last_action = Some(format!("{verb} {path}"));
            state.documents.last_error = None;
            let mut effects = reload_documents(state);
            effects.push(Effect::LoadStatistics);
            effects
        }
        Err(message) => {
            state.documents.last_error = Some(message);
            Vec::new()
        }
    };
    state.touch();
    effects
}

fn validate_template(state: &mut AppState, id: &str, name: &str, prompt: &str) -> bool {
    if id.trim().is_empty() || name.trim().is_empty() || prompt.trim().is_empty() {
        state.templates.last_error =
            Some("template id, name and prompt are required".to_string());
        state.touch();
        return false;
    }
    state.templates.last_error = None;
    state.touch();
    true
}
