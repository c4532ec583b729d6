use serde::Serialize;

use crate::id::FileId;

/// User-facing notification emitted after a registry operation succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "topic", rename_all = "snake_case")]
pub enum RegistryEvent {
    FilesAdded { count: usize },
    FileRemoved { id: FileId, name: String },
    FilesCleared { count: usize },
    DownloadStarted { id: FileId, name: String },
}

impl RegistryEvent {
    /// Event topic, e.g. `files_added`.
    pub fn topic(&self) -> &'static str {
        match self {
            Self::FilesAdded { .. } => "files_added",
            Self::FileRemoved { .. } => "file_removed",
            Self::FilesCleared { .. } => "files_cleared",
            Self::DownloadStarted { .. } => "download_started",
        }
    }

    pub fn title(&self) -> String {
        match self {
            Self::FilesAdded { count: 1 } => "1 file added".to_string(),
            Self::FilesAdded { count } => format!("{count} files added"),
            Self::FileRemoved { .. } => "File deleted".to_string(),
            Self::FilesCleared { .. } => "All files deleted".to_string(),
            Self::DownloadStarted { .. } => "Download started".to_string(),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::FilesAdded { .. } => "Your files have been added successfully.".to_string(),
            Self::FileRemoved { .. } => "The file has been removed from your storage.".to_string(),
            Self::FilesCleared { .. } => {
                "All files have been removed from your storage.".to_string()
            }
            Self::DownloadStarted { name, .. } => {
                format!("{name} will be downloaded to your device.")
            }
        }
    }

    /// Whether the notification reports a destructive action.
    pub fn is_destructive(&self) -> bool {
        matches!(self, Self::FileRemoved { .. } | Self::FilesCleared { .. })
    }
}
