//! Displayable window content
//!
//! The desktop never looks inside a surface; tools hand one over and the
//! window owns it until it closes or the content is swapped.

use std::fmt;

/// Opaque content produced by a tool factory
pub trait Surface: fmt::Debug + Send {
    /// One-line description used by listings and snapshots
    fn describe(&self) -> String;
}

/// Stand-in content shown while a tool is still preparing its real surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub text: String,
}

impl Placeholder {
    pub fn loading() -> Self {
        Self {
            text: "Loading...".to_string(),
        }
    }
}

impl Surface for Placeholder {
    fn describe(&self) -> String {
        self.text.clone()
    }
}
