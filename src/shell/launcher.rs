//! Tool launcher
//!
//! Maps tool identifiers to window-producing factories and turns a launch
//! request into a new child window on the desktop.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::config::WindowsConfig;
use crate::error::{LaunchError, ToolError};
use crate::wm::desktop::Desktop;
use crate::wm::menu::Menu;
use crate::wm::surface::Surface;
use crate::wm::window::{ChildWindow, WindowId};

/// Content a tool finishes preparing in the background
pub type DeferredSurface = oneshot::Receiver<Box<dyn Surface>>;

/// Zero-argument window factory
pub type ToolFactory = Box<dyn Fn() -> Result<ToolOutput, ToolError>>;

/// What a tool factory hands back to the shell
pub struct ToolOutput {
    pub surface: Box<dyn Surface>,
    pub menu: Option<Menu>,
    pub icon: String,
    pub display_name: String,
    /// Real content still being prepared; `surface` is a placeholder until it arrives
    pub deferred: Option<DeferredSurface>,
}

impl ToolOutput {
    pub fn new(
        display_name: impl Into<String>,
        icon: impl Into<String>,
        surface: impl Surface + 'static,
    ) -> Self {
        Self {
            surface: Box::new(surface),
            menu: None,
            icon: icon.into(),
            display_name: display_name.into(),
            deferred: None,
        }
    }

    pub fn with_menu(mut self, menu: Menu) -> Self {
        self.menu = Some(menu);
        self
    }

    pub fn with_deferred(mut self, deferred: DeferredSurface) -> Self {
        self.deferred = Some(deferred);
        self
    }
}

/// Result of a successful launch
#[derive(Debug)]
pub struct Launched {
    pub id: WindowId,
    pub deferred: Option<DeferredSurface>,
}

/// Registry of launchable tools
pub struct LaunchRegistry {
    factories: HashMap<String, ToolFactory>,

    /// Next window id. Never reset, never decremented.
    next_id: u64,

    /// Launches since the last close-all; only drives initial offsets
    session_count: u64,

    window_defaults: WindowsConfig,
}

impl LaunchRegistry {
    pub fn new(window_defaults: WindowsConfig) -> Self {
        Self {
            factories: HashMap::new(),
            next_id: 0,
            session_count: 0,
            window_defaults,
        }
    }

    /// Register a factory. A second registration under the same id wins.
    pub fn register<F>(&mut self, tool_id: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<ToolOutput, ToolError> + 'static,
    {
        let tool_id = tool_id.into();
        if self.factories.insert(tool_id.clone(), Box::new(factory)).is_some() {
            debug!("Factory for '{}' replaced", tool_id);
        } else {
            debug!("Registered tool '{}'", tool_id);
        }
    }

    pub fn contains(&self, tool_id: &str) -> bool {
        self.factories.contains_key(tool_id)
    }

    /// Registered tool ids, sorted
    pub fn tool_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Id the next launch will receive
    pub fn next_id(&self) -> WindowId {
        WindowId::new(self.next_id)
    }

    pub fn session_count(&self) -> u64 {
        self.session_count
    }

    /// Restart the cosmetic launch offsets. Ids are unaffected.
    pub fn reset_session(&mut self) {
        self.session_count = 0;
    }

    /// Build a window for `tool_id` and put it on the desktop.
    ///
    /// The id is consumed before the factory runs, so a failing factory
    /// leaves a gap in the id sequence rather than risking reuse.
    pub fn launch(&mut self, tool_id: &str, desktop: &mut Desktop) -> Result<Launched, LaunchError> {
        let Some(factory) = self.factories.get(tool_id) else {
            warn!("Launch requested for unknown tool '{}'", tool_id);
            return Err(LaunchError::ToolNotFound(tool_id.to_string()));
        };

        let id = WindowId::new(self.next_id);
        self.next_id += 1;
        let slot = self.session_count;
        self.session_count += 1;

        let mut output = match panic::catch_unwind(AssertUnwindSafe(|| factory())) {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!("Tool '{}' failed to build window {}: {}", tool_id, id, e);
                return Err(LaunchError::Failed {
                    tool: tool_id.to_string(),
                    message: e.message,
                });
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!("Tool '{}' panicked while building window {}: {}", tool_id, id, message);
                return Err(LaunchError::Failed {
                    tool: tool_id.to_string(),
                    message,
                });
            }
        };

        let deferred = output.deferred.take();
        let window = ChildWindow::create_at(output, id, slot, &self.window_defaults);
        desktop.add(window)?;

        info!("Launched '{}' as window {}", tool_id, id);
        Ok(Launched { id, deferred })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "tool panicked".to_string()
    }
}
