//! Renders the view model into terminal lines. Pure string building; the
//! shell decides when to print.

use std::fmt::Write as _;

use deskhand_core::{
    AppViewModel, DeliveryOutcome, DocumentStatus, RelayState, Screen, UploadCardView,
};

pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "── deskhand · relay: {} ──", relay_label(&view.relay));
    match view.screen {
        Screen::Upload => render_upload(&mut out, view),
        Screen::Documents => render_documents(&mut out, view),
        Screen::Dictionary => render_dictionary(&mut out, view),
        Screen::Templates => render_templates(&mut out, view),
    }
    out.push_str("(type 'help' for commands)\n");
    out
}

fn relay_label(relay: &RelayState) -> String {
    match relay {
        RelayState::Disconnected => "disconnected".to_string(),
        RelayState::Connecting => "connecting".to_string(),
        RelayState::Connected { channel } => format!("connected[{channel}]"),
    }
}

fn render_upload(out: &mut String, view: &AppViewModel) {
    let upload = &view.upload;
    match &upload.card {
        UploadCardView::Form => {
            out.push_str("[upload]\n");
            match &upload.file {
                Some((name, size)) => {
                    let _ = writeln!(out, "  file: {name} ({})", format_size(*size));
                }
                None => out.push_str("  file: (none chosen)\n"),
            }
            let _ = writeln!(out, "  date: {}", blank_as_dash(&upload.meeting_date));
            let _ = writeln!(out, "  participants: {}", blank_as_dash(&upload.participants));
            let _ = writeln!(out, "  recipient: {}", blank_as_dash(&upload.recipient));
            let _ = writeln!(
                out,
                "  template: {}",
                upload.template_id.as_deref().unwrap_or("-")
            );
            if upload.can_submit {
                out.push_str("  ready: type 'upload' to submit\n");
            }
        }
        UploadCardView::Progress(progress) => {
            out.push_str("[processing]\n");
            let _ = writeln!(out, "  {} {}", progress_bar(progress.percent), progress.message);
            for (key, value) in &progress.details {
                let _ = writeln!(out, "    {key}: {value}");
            }
        }
        UploadCardView::Result { filename } => {
            out.push_str("[result]\n");
            out.push_str("  transcription and minutes generation finished\n");
            if let Some(filename) = filename {
                let _ = writeln!(out, "  minutes: {filename}");
            }
            let _ = writeln!(out, "  email: {}", delivery_label(&upload.email));
            let _ = writeln!(out, "  notion: {}", delivery_label(&upload.notion));
        }
        UploadCardView::Failed(reason) => {
            let _ = writeln!(out, "[failed] {reason}");
            out.push_str("  type 'reset' to try again\n");
        }
    }
    if let Some(error) = &upload.error {
        let _ = writeln!(out, "  ! {error}");
    }
}

fn render_documents(out: &mut String, view: &AppViewModel) {
    if let Some(stats) = &view.statistics {
        let _ = writeln!(
            out,
            "[stats] total {} · completed {} · processing {} · failed {}",
            stats.total_documents, stats.completed, stats.processing, stats.failed
        );
    }

    out.push_str("[documents]\n");
    if let Some(placeholder) = view.documents.placeholder {
        let _ = writeln!(out, "  {placeholder}");
    } else {
        for row in &view.documents.rows {
            let _ = writeln!(
                out,
                "  [{}] {:>4}  {:10}  {}  {}",
                if row.selected { "x" } else { " " },
                row.id,
                status_label(row.status),
                format_size(row.size_bytes),
                row.filename,
            );
        }
        let _ = writeln!(out, "  selected: {}", view.documents.selected_count);
    }
    if view.documents.busy {
        out.push_str("  (batch request in flight)\n");
    }
    if let Some(action) = &view.documents.last_action {
        let _ = writeln!(out, "  {action}");
    }
    if let Some(error) = &view.documents.error {
        let _ = writeln!(out, "  ! {error}");
    }

    out.push_str("[history]\n");
    if let Some(placeholder) = view.history_placeholder {
        let _ = writeln!(out, "  {placeholder}");
    } else {
        for record in &view.history {
            let _ = writeln!(
                out,
                "  {}  {} ({} records) {}",
                record.imported_at,
                record.filename,
                record.record_count,
                if record.succeeded { "ok" } else { "failed" },
            );
        }
    }
}

fn render_dictionary(out: &mut String, view: &AppViewModel) {
    out.push_str("[dictionary]\n");
    if let Some(placeholder) = view.dictionary.placeholder {
        let _ = writeln!(out, "  {placeholder}");
    } else {
        for row in &view.dictionary.rows {
            let _ = writeln!(out, "  {}: {} -> {}", row.category, row.source, row.replacement);
        }
    }
    if !view.dictionary.query.trim().is_empty() {
        let _ = writeln!(out, "[search '{}']", view.dictionary.query);
        if let Some(placeholder) = view.dictionary.search_placeholder {
            let _ = writeln!(out, "  {placeholder}");
        } else {
            for row in &view.dictionary.search_results {
                let _ = writeln!(out, "  {}: {} -> {}", row.category, row.source, row.replacement);
            }
        }
    }
    if let Some(error) = &view.dictionary.error {
        let _ = writeln!(out, "  ! {error}");
    }
}

fn render_templates(out: &mut String, view: &AppViewModel) {
    out.push_str("[templates]\n");
    if let Some(placeholder) = view.templates_placeholder {
        let _ = writeln!(out, "  {placeholder}");
    } else {
        for row in &view.templates {
            let _ = writeln!(
                out,
                "  {}{}  {} - {}",
                row.id,
                if row.is_default { " (default)" } else { "" },
                row.name,
                row.description,
            );
        }
    }
    if let Some(error) = &view.templates_error {
        let _ = writeln!(out, "  ! {error}");
    }
}

fn blank_as_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

fn delivery_label(outcome: &DeliveryOutcome) -> String {
    match outcome {
        DeliveryOutcome::Pending => "pending".to_string(),
        DeliveryOutcome::Success => "done".to_string(),
        DeliveryOutcome::Failure(reason) => format!("failed ({reason})"),
    }
}

fn status_label(status: DocumentStatus) -> &'static str {
    match status {
        DocumentStatus::Pending => "pending",
        DocumentStatus::Processing => "processing",
        DocumentStatus::Completed => "completed",
        DocumentStatus::Failed => "failed",
    }
}

fn progress_bar(percent: Option<u8>) -> String {
    match percent {
        Some(percent) => {
            let filled = usize::from(percent.min(100)) / 10;
            format!("[{}{}] {percent:>3}%", "#".repeat(filled), ".".repeat(10 - filled))
        }
        None => "[..........]   -".to_string(),
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
