//! Console command table: one row per command, mapping input lines onto core
//! messages. Keeping the wiring in a table makes the binding surface
//! auditable and testable without a terminal attached.

use std::fmt::Write as _;
use std::fs;

use deskhand_core::{DictionaryCategory, DocumentStatus, Msg, Screen};

#[derive(Debug)]
pub enum Command {
    Dispatch(Vec<Msg>),
    Help,
    Quit,
}

pub struct Binding {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    parse: fn(&str) -> Result<Command, String>,
}

pub const BINDINGS: &[Binding] = &[
    Binding {
        name: "help",
        usage: "help",
        help: "show this command table",
        parse: |_| Ok(Command::Help),
    },
    Binding {
        name: "quit",
        usage: "quit",
        help: "leave the console",
        parse: |_| Ok(Command::Quit),
    },
    Binding {
        name: "screen",
        usage: "screen <upload|docs|dict|templates>",
        help: "switch the active screen",
        parse: parse_screen,
    },
    Binding {
        name: "file",
        usage: "file <path>",
        help: "choose a recording for upload",
        parse: parse_file,
    },
    Binding {
        name: "date",
        usage: "date <datetime>",
        help: "set the meeting date",
        parse: |rest| dispatch_one(Msg::MeetingDateChanged(rest.to_string())),
    },
    Binding {
        name: "participants",
        usage: "participants <names>",
        help: "set the participant list",
        parse: |rest| dispatch_one(Msg::ParticipantsChanged(rest.to_string())),
    },
    Binding {
        name: "conditions",
        usage: "conditions <notes>",
        help: "set free-form meeting conditions",
        parse: |rest| dispatch_one(Msg::ConditionsChanged(rest.to_string())),
    },
    Binding {
        name: "recipient",
        usage: "recipient <email>",
        help: "set the minutes recipient",
        parse: |rest| dispatch_one(Msg::RecipientChanged(rest.to_string())),
    },
    Binding {
        name: "template",
        usage: "template <id>",
        help: "pick the minutes template",
        parse: |rest| require(rest, "template id").map(|id| one(Msg::TemplateSelected(id))),
    },
    Binding {
        name: "upload",
        usage: "upload",
        help: "submit the chosen recording",
        parse: |_| dispatch_one(Msg::UploadClicked),
    },
    Binding {
        name: "reset",
        usage: "reset",
        help: "back to the upload form",
        parse: |_| dispatch_one(Msg::ResetUpload),
    },
    Binding {
        name: "search",
        usage: "search [text]",
        help: "filter documents by text",
        parse: |rest| dispatch_one(Msg::SearchChanged(rest.to_string())),
    },
    Binding {
        name: "status",
        usage: "status <all|pending|processing|completed|failed>",
        help: "filter documents by status",
        parse: parse_status_filter,
    },
    Binding {
        name: "category",
        usage: "category <all|name>",
        help: "filter documents by category",
        parse: |rest| {
            let filter = match rest {
                "" | "all" => None,
                name => Some(name.to_string()),
            };
            dispatch_one(Msg::CategoryFilterChanged(filter))
        },
    },
    Binding {
        name: "refresh",
        usage: "refresh",
        help: "reload documents and statistics",
        parse: |_| dispatch_one(Msg::RefreshClicked),
    },
    Binding {
        name: "select",
        usage: "select <id>",
        help: "toggle one document row",
        parse: |rest| parse_id(rest).map(|id| one(Msg::SelectionToggled(id))),
    },
    Binding {
        name: "all",
        usage: "all",
        help: "select every rendered row",
        parse: |_| dispatch_one(Msg::SelectAllToggled(true)),
    },
    Binding {
        name: "none",
        usage: "none",
        help: "clear the selection",
        parse: |_| dispatch_one(Msg::SelectAllToggled(false)),
    },
    Binding {
        name: "ingest",
        usage: "ingest <path> [path...]",
        help: "upload documents for processing",
        parse: parse_ingest,
    },
    Binding {
        name: "export",
        usage: "export",
        help: "export the selection as a markdown zip",
        parse: |_| dispatch_one(Msg::BatchExportClicked),
    },
    Binding {
        name: "summarize",
        usage: "summarize",
        help: "generate a combined summary of the selection",
        parse: |_| dispatch_one(Msg::BatchSummaryClicked),
    },
    Binding {
        name: "delete",
        usage: "delete <id>",
        help: "delete one document",
        parse: |rest| parse_id(rest).map(|id| one(Msg::DeleteDocumentClicked(id))),
    },
    Binding {
        name: "fetch",
        usage: "fetch <id>",
        help: "download one original document",
        parse: |rest| parse_id(rest).map(|id| one(Msg::DownloadDocumentClicked(id))),
    },
    Binding {
        name: "dict-find",
        usage: "dict-find [term]",
        help: "search the dictionary",
        parse: |rest| dispatch_one(Msg::DictionarySearchChanged(rest.to_string())),
    },
    Binding {
        name: "dict-add",
        usage: "dict-add <category> <source> <replacement>",
        help: "add a dictionary entry",
        parse: parse_dict_add,
    },
    Binding {
        name: "dict-rm",
        usage: "dict-rm <category> <source>",
        help: "remove a dictionary entry",
        parse: parse_dict_rm,
    },
    Binding {
        name: "tpl-add",
        usage: "tpl-add <id>|<name>|<description>|<prompt>",
        help: "create a minutes template",
        parse: |rest| parse_template_fields(rest, false),
    },
    Binding {
        name: "tpl-edit",
        usage: "tpl-edit <id>|<name>|<description>|<prompt>",
        help: "update a minutes template",
        parse: |rest| parse_template_fields(rest, true),
    },
    Binding {
        name: "tpl-rm",
        usage: "tpl-rm <id>",
        help: "delete a template",
        parse: |rest| require(rest, "template id").map(|id| one(Msg::DeleteTemplateClicked(id))),
    },
    Binding {
        name: "tpl-default",
        usage: "tpl-default <id>",
        help: "make a template the default",
        parse: |rest| require(rest, "template id").map(|id| one(Msg::SetDefaultTemplateClicked(id))),
    },
];

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Dispatch(Vec::new()));
    }
    let (name, rest) = line
        .split_once(char::is_whitespace)
        .map(|(name, rest)| (name, rest.trim()))
        .unwrap_or((line, ""));
    let binding = BINDINGS
        .iter()
        .find(|binding| binding.name == name)
        .ok_or_else(|| format!("unknown command '{name}' (try 'help')"))?;
    (binding.parse)(rest)
}

pub fn help_text() -> String {
    let width = BINDINGS.iter().map(|b| b.usage.len()).max().unwrap_or(0);
    let mut text = String::from("commands:\n");
    for binding in BINDINGS {
        let _ = writeln!(text, "  {:width$}  {}", binding.usage, binding.help);
    }
    text
}

fn one(msg: Msg) -> Command {
    Command::Dispatch(vec![msg])
}

fn dispatch_one(msg: Msg) -> Result<Command, String> {
    Ok(one(msg))
}

fn require(rest: &str, what: &str) -> Result<String, String> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(format!("missing {what}"));
    }
    Ok(rest.to_string())
}

fn parse_id(rest: &str) -> Result<u64, String> {
    rest.trim()
        .parse()
        .map_err(|_| format!("'{rest}' is not a document id"))
}

fn parse_screen(rest: &str) -> Result<Command, String> {
    let screen = match rest {
        "upload" => Screen::Upload,
        "docs" | "documents" => Screen::Documents,
        "dict" | "dictionary" => Screen::Dictionary,
        "templates" => Screen::Templates,
        other => return Err(format!("unknown screen '{other}'")),
    };
    dispatch_one(Msg::ScreenSelected(screen))
}

fn parse_file(rest: &str) -> Result<Command, String> {
    let path = require(rest, "file path")?;
    let meta = fs::metadata(&path).map_err(|err| format!("{path}: {err}"))?;
    if !meta.is_file() {
        return Err(format!("{path}: not a file"));
    }
    let name = std::path::Path::new(&path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.clone());
    dispatch_one(Msg::FileChosen {
        path,
        name,
        size: meta.len(),
    })
}

fn parse_status_filter(rest: &str) -> Result<Command, String> {
    let filter = match rest {
        "" | "all" => None,
        "pending" => Some(DocumentStatus::Pending),
        "processing" => Some(DocumentStatus::Processing),
        "completed" => Some(DocumentStatus::Completed),
        "failed" => Some(DocumentStatus::Failed),
        other => return Err(format!("unknown status '{other}'")),
    };
    dispatch_one(Msg::StatusFilterChanged(filter))
}

fn parse_ingest(rest: &str) -> Result<Command, String> {
    let paths: Vec<String> = rest.split_whitespace().map(ToOwned::to_owned).collect();
    if paths.is_empty() {
        return Err("missing file paths".to_string());
    }
    dispatch_one(Msg::IngestFiles(paths))
}

fn parse_category_key(token: &str) -> Result<DictionaryCategory, String> {
    DictionaryCategory::from_key(token)
        .ok_or_else(|| format!("unknown dictionary category '{token}'"))
}

fn parse_dict_add(rest: &str) -> Result<Command, String> {
    let mut parts = rest.splitn(3, char::is_whitespace);
    let (Some(category), Some(source), Some(replacement)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return Err("usage: dict-add <category> <source> <replacement>".to_string());
    };
    let category = parse_category_key(category)?;
    Ok(Command::Dispatch(vec![
        Msg::EntryDraftCategoryChanged(category),
        Msg::EntryDraftSourceChanged(source.trim().to_string()),
        Msg::EntryDraftReplacementChanged(replacement.trim().to_string()),
        Msg::AddEntryClicked,
    ]))
}

fn parse_dict_rm(rest: &str) -> Result<Command, String> {
    let mut parts = rest.splitn(2, char::is_whitespace);
    let (Some(category), Some(source)) = (parts.next(), parts.next()) else {
        return Err("usage: dict-rm <category> <source>".to_string());
    };
    let category = parse_category_key(category)?;
    dispatch_one(Msg::RemoveEntryClicked {
        category,
        source: source.trim().to_string(),
    })
}

fn parse_template_fields(rest: &str, update: bool) -> Result<Command, String> {
    let fields: Vec<&str> = rest.splitn(4, '|').map(str::trim).collect();
    let &[id, name, description, prompt] = fields.as_slice() else {
        return Err("expected <id>|<name>|<description>|<prompt>".to_string());
    };
    let msg = if update {
        Msg::UpdateTemplateSubmitted {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            prompt: prompt.to_string(),
        }
    } else {
        Msg::CreateTemplateSubmitted {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            prompt: prompt.to_string(),
        }
    };
    dispatch_one(msg)
}

#[cfg(test)]
mod tests {
    use super::{parse_command, Command};
    use deskhand_core::{DictionaryCategory, DocumentStatus, Msg, Screen};
    use std::io::Write;

    fn msgs(line: &str) -> Vec<Msg> {
        match parse_command(line).expect("parse") {
            Command::Dispatch(msgs) => msgs,
            _ => panic!("expected dispatch"),
        }
    }

    #[test]
    fn unknown_commands_are_rejected() {
        let err = parse_command("reboot").unwrap_err();
        assert!(err.contains("unknown command"));
    }

    #[test]
    fn blank_input_dispatches_nothing() {
        assert!(msgs("   ").is_empty());
    }

    #[test]
    fn screen_names_map_to_screens() {
        assert_eq!(
            msgs("screen docs"),
            vec![Msg::ScreenSelected(Screen::Documents)]
        );
        assert!(parse_command("screen nowhere").is_err());
    }

    #[test]
    fn select_parses_the_row_id() {
        assert_eq!(msgs("select 42"), vec![Msg::SelectionToggled(42)]);
        assert!(parse_command("select forty-two").is_err());
    }

    #[test]
    fn status_filter_accepts_all_and_known_states() {
        assert_eq!(msgs("status all"), vec![Msg::StatusFilterChanged(None)]);
        assert_eq!(
            msgs("status failed"),
            vec![Msg::StatusFilterChanged(Some(DocumentStatus::Failed))]
        );
        assert!(parse_command("status broken").is_err());
    }

    #[test]
    fn file_command_stats_the_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(b"RIFF").expect("write");
        let path = file.path().to_string_lossy().into_owned();

        let dispatched = msgs(&format!("file {path}"));
        assert_eq!(dispatched.len(), 1);
        match &dispatched[0] {
            Msg::FileChosen { size, .. } => assert_eq!(*size, 4),
            other => panic!("expected FileChosen, got {other:?}"),
        }

        assert!(parse_command("file /no/such/recording.mp3").is_err());
    }

    #[test]
    fn dict_add_fills_the_draft_then_submits() {
        let dispatched = msgs("dict-add technical_terms kube Kubernetes");
        assert_eq!(
            dispatched,
            vec![
                Msg::EntryDraftCategoryChanged(DictionaryCategory::TechnicalTerms),
                Msg::EntryDraftSourceChanged("kube".to_string()),
                Msg::EntryDraftReplacementChanged("Kubernetes".to_string()),
                Msg::AddEntryClicked,
            ]
        );
        assert!(parse_command("dict-add nouns kube Kubernetes").is_err());
        assert!(parse_command("dict-add technical_terms kube").is_err());
    }

    #[test]
    fn template_fields_split_on_pipes() {
        let dispatched = msgs("tpl-add retro|Retro|Sprint retro|Summarize the retro");
        assert_eq!(
            dispatched,
            vec![Msg::CreateTemplateSubmitted {
                id: "retro".to_string(),
                name: "Retro".to_string(),
                description: "Sprint retro".to_string(),
                prompt: "Summarize the retro".to_string(),
            }]
        );
        assert!(parse_command("tpl-add retro|Retro").is_err());
    }
}
