use std::env;
use std::path::PathBuf;

/// Runtime configuration, all overridable from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub channel: String,
    pub downloads_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let base_url =
            env::var("DESKHAND_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());
        let channel = env::var("DESKHAND_CHANNEL").unwrap_or_else(|_| "default".to_string());
        let downloads_dir = env::var("DESKHAND_DOWNLOADS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .join("downloads")
            });
        Self {
            base_url,
            channel,
            downloads_dir,
        }
    }
}
