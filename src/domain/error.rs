//! 작업 실패 분류.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum OpError {
    #[error("{tool} not found or not working")]
    MissingTool { tool: String },

    #[error("`{command}` failed: {detail}")]
    CommandFailed { command: String, detail: String },

    #[error("`{command}` interrupted by user")]
    Interrupted { command: String },

    #[error("cosa is not initialized")]
    NotInitialized,

    #[error("no build found for stream '{stream}'")]
    NoBuild { stream: String },

    #[error("working directory is not empty ({entries} items found)")]
    DirectoryNotEmpty { entries: usize },

    #[error("failed to switch to stream '{stream}'")]
    StreamNotFound {
        stream: String,
        available: Vec<String>,
    },

    #[error("critically low disk space ({free_gib:.1} GB free)")]
    InsufficientDiskSpace { free_gib: f64 },

    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("cancelled")]
    Cancelled,
}

impl OpError {
    /// 사용자에게 보여 줄 해결 방법.
    pub fn hint(&self) -> Option<String> {
        match self {
            OpError::MissingTool { tool } => Some(format!("install {tool} first")),
            OpError::NotInitialized => Some("run 'init' first".to_string()),
            OpError::NoBuild { .. } => {
                Some("run 'build' (or 'build <stream>') first".to_string())
            }
            OpError::DirectoryNotEmpty { .. } => Some(
                "use 'force-init', clean it with 'clean-dir', or pick another --work-dir"
                    .to_string(),
            ),
            OpError::StreamNotFound { available, .. } if !available.is_empty() => {
                Some(format!("available streams: {}", available.join(", ")))
            }
            OpError::InsufficientDiskSpace { .. } => {
                Some("try 'clean' or 'clean-all' to free up space".to_string())
            }
            _ => None,
        }
    }
}
