use std::fs;
use std::path::Path;

use client_logging::{client_error, client_info, client_warn};
use deskhand_client::{ensure_download_dir, AtomicFileWriter};
use deskhand_core::UploadPrefs;
use serde::{Deserialize, Serialize};

const PREFS_FILENAME: &str = ".deskhand_prefs.ron";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedPrefs {
    recipient: String,
    participants: String,
    template_id: Option<String>,
}

pub(crate) fn load_prefs(dir: &Path) -> Option<UploadPrefs> {
    let path = dir.join(PREFS_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return None;
        }
        Err(err) => {
            client_warn!("Failed to read prefs from {:?}: {}", path, err);
            return None;
        }
    };

    let prefs: PersistedPrefs = match ron::from_str(&content) {
        Ok(prefs) => prefs,
        Err(err) => {
            client_warn!("Failed to parse prefs from {:?}: {}", path, err);
            return None;
        }
    };

    client_info!("Loaded upload prefs from {:?}", path);
    Some(UploadPrefs {
        recipient: prefs.recipient,
        participants: prefs.participants,
        template_id: prefs.template_id,
    })
}

pub(crate) fn save_prefs(dir: &Path, prefs: &UploadPrefs) {
    if let Err(err) = ensure_download_dir(dir) {
        client_error!("Failed to ensure downloads dir {:?}: {}", dir, err);
        return;
    }

    let persisted = PersistedPrefs {
        recipient: prefs.recipient.clone(),
        participants: prefs.participants.clone(),
        template_id: prefs.template_id.clone(),
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&persisted, pretty) {
        Ok(text) => text,
        Err(err) => {
            client_error!("Failed to serialize prefs: {}", err);
            return;
        }
    };

    let writer = AtomicFileWriter::new(dir.to_path_buf());
    if let Err(err) = writer.write(PREFS_FILENAME, content.as_bytes()) {
        client_error!("Failed to write prefs to {:?}: {}", dir, err);
    }
}

#[cfg(test)]
mod tests {
    use super::{load_prefs, save_prefs};
    use deskhand_core::UploadPrefs;

    #[test]
    fn prefs_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prefs = UploadPrefs {
            recipient: "team@example.com".to_string(),
            participants: "Ann, Ben".to_string(),
            template_id: Some("weekly".to_string()),
        };

        save_prefs(dir.path(), &prefs);
        assert_eq!(load_prefs(dir.path()), Some(prefs));
    }

    #[test]
    fn missing_file_loads_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(load_prefs(dir.path()), None);
    }
}
