//! Javaows
//!
//! A multi-document desktop shell: one virtual desktop hosting any number of
//! independent tool windows, with a taskbar, a start menu and the classic
//! cascade / tile / close-all window commands.

pub mod config;
pub mod error;
pub mod shared;
pub mod shell;
pub mod tools;
pub mod wm;

pub use config::Config;
pub use error::{CommandError, DesktopError, LaunchError, ToolError};
pub use shell::Shell;
