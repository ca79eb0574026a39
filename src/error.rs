//! Error types for the desktop, the launch registry and the command parser

use thiserror::Error;

use crate::wm::WindowId;

/// Invariant violations inside the desktop
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DesktopError {
    #[error("window id {0} is already present on the desktop")]
    DuplicateId(WindowId),
}

/// Failure reported by a tool factory while building its window content
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ToolError {
    pub message: String,
}

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors returned by `LaunchRegistry::launch`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    #[error("no tool registered under '{0}'")]
    ToolNotFound(String),

    #[error("tool '{tool}' failed to start: {message}")]
    Failed { tool: String, message: String },

    #[error(transparent)]
    Desktop(#[from] DesktopError),
}

impl LaunchError {
    /// Fatal errors mean the id space is corrupted; everything else is a
    /// recoverable, user-facing tool failure.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LaunchError::Desktop(_))
    }

    /// Tool identifier the failure refers to, if any
    pub fn tool(&self) -> Option<&str> {
        match self {
            LaunchError::ToolNotFound(tool) => Some(tool),
            LaunchError::Failed { tool, .. } => Some(tool),
            LaunchError::Desktop(_) => None,
        }
    }
}

/// Errors while parsing a textual shell command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("'{command}' expects an argument: {expected}")]
    MissingArgument {
        command: String,
        expected: &'static str,
    },

    #[error("invalid window id '{0}'")]
    InvalidWindowId(String),

    #[error("invalid {expected} '{value}'")]
    InvalidArgument {
        expected: &'static str,
        value: String,
    },

    #[error("no entry {section}.{item} in the {menu}")]
    NoMenuEntry {
        menu: &'static str,
        section: usize,
        item: usize,
    },

    #[error("invalid JSON command: {0}")]
    Json(String),
}
