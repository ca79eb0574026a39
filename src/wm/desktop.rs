//! Desktop Module
//!
//! Owns every child window, keeps their z-order (back to front) and the
//! selection. The last window in the stack is the selected one whenever a
//! selection exists.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::DesktopError;
use crate::shared::{Geometry, WindowFlags};
use crate::wm::events::DesktopEvent;
use crate::wm::surface::Surface;
use crate::wm::window::{ChildWindow, WindowId, WindowState};

/// Snapshot of one window, detached from desktop storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowInfo {
    pub id: WindowId,
    pub title: String,
    /// Display name of the tool that built the window
    pub tool: String,
    pub icon: String,
    pub state: String,
    #[serde(skip)]
    pub flags: WindowFlags,
    pub bounds: Geometry,
    pub content: String,
    /// Top-level titles of the window's menu bar
    pub menu: Vec<String>,
}

impl From<&ChildWindow> for WindowInfo {
    fn from(window: &ChildWindow) -> Self {
        Self {
            id: window.id(),
            title: window.title().to_string(),
            tool: window.tool_name().to_string(),
            icon: window.icon().to_string(),
            state: window.flags().describe(),
            flags: window.flags(),
            bounds: window.bounds(),
            content: window.surface().describe(),
            menu: window
                .menu()
                .map(|menu| menu.titles().into_iter().map(str::to_string).collect())
                .unwrap_or_default(),
        }
    }
}

/// The virtual desktop surface
#[derive(Debug)]
pub struct Desktop {
    /// Stacking order (bottom to top)
    windows: Vec<ChildWindow>,

    /// Desktop area used by layouts and maximize
    width: u32,
    height: u32,

    /// Events raised since the last `take_events`
    events: Vec<DesktopEvent>,
}

impl Desktop {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            windows: Vec::new(),
            width,
            height,
            events: Vec::new(),
        }
    }

    /// Desktop area in its own coordinate space
    pub fn area(&self) -> Geometry {
        Geometry::new(0, 0, self.width, self.height)
    }

    /// Add a window on top of the stack and select it
    pub fn add(&mut self, window: ChildWindow) -> Result<(), DesktopError> {
        let id = window.id();
        if self.position(id).is_some() {
            warn!("Refusing to add window {}: id already present", id);
            return Err(DesktopError::DuplicateId(id));
        }

        info!("Adding window {} '{}'", id, window.title());
        self.events.push(DesktopEvent::WindowAdded {
            id,
            icon: window.icon().to_string(),
            title: window.title().to_string(),
        });
        self.windows.push(window);
        self.activate(id);

        Ok(())
    }

    /// Remove a window. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: WindowId) -> Option<ChildWindow> {
        let pos = self.position(id)?;
        let window = self.windows.remove(pos);
        debug!("Removed window {} '{}'", id, window.title());

        self.events.push(DesktopEvent::WindowRemoved(id));
        if window.is_selected() {
            self.select_top();
        }

        Some(window)
    }

    /// Raise a window to the top of the stack and make it the only selected one.
    ///
    /// Returns false if the id is unknown or the window is closed.
    pub fn activate(&mut self, id: WindowId) -> bool {
        let Some(pos) = self.position(id) else {
            debug!("Activate ignored: window {} not found", id);
            return false;
        };
        if self.windows[pos].is_closed() {
            return false;
        }

        let top = self.windows.len() - 1;
        if pos == top && self.windows[pos].is_selected() {
            return true;
        }

        for other in self.windows.iter_mut().filter(|w| w.id() != id) {
            if other.is_selected() {
                other.deselect();
                self.events.push(DesktopEvent::WindowDeactivated(other.id()));
            }
        }

        let mut window = self.windows.remove(pos);
        window.set_state(WindowState::Selected);
        self.windows.push(window);
        self.events.push(DesktopEvent::WindowActivated(id));

        debug!("Activated window {}", id);
        true
    }

    /// Minimize a window. The next visible window takes over the selection.
    pub fn iconify(&mut self, id: WindowId) -> bool {
        let Some(window) = self.window_mut(id) else {
            return false;
        };
        if window.is_iconified() {
            return false;
        }

        let was_selected = window.is_selected();
        window.set_state(WindowState::Iconified);

        if was_selected {
            self.events.push(DesktopEvent::WindowDeactivated(id));
        }
        self.events.push(DesktopEvent::WindowIconified(id));
        info!("Iconified window {}", id);

        if was_selected {
            self.select_top();
        }
        true
    }

    /// Bring a window back to its normal state (de-iconify, un-maximize) and activate it
    pub fn restore(&mut self, id: WindowId) -> bool {
        let Some(window) = self.window_mut(id) else {
            return false;
        };

        let was_iconified = window.is_iconified();
        if let Some(bounds) = window.take_restore_bounds() {
            window.set_bounds(bounds);
        }
        window.set_state(WindowState::Normal);

        if was_iconified {
            self.events.push(DesktopEvent::WindowRestored(id));
        }
        debug!("Restored window {}", id);

        self.activate(id)
    }

    /// Clear the iconified flag only, keeping geometry untouched
    pub fn deiconify(&mut self, id: WindowId) -> bool {
        let Some(window) = self.window_mut(id) else {
            return false;
        };
        if !window.is_iconified() {
            return false;
        }

        window.set_state(WindowState::Normal);
        self.events.push(DesktopEvent::WindowRestored(id));
        true
    }

    /// Fill the whole desktop area with a window and activate it
    pub fn maximize(&mut self, id: WindowId) -> bool {
        let area = self.area();
        let Some(window) = self.window_mut(id) else {
            return false;
        };

        let was_iconified = window.is_iconified();
        window.remember_restore_bounds();
        window.set_bounds(area);
        window.set_state(WindowState::Maximized);

        if was_iconified {
            self.events.push(DesktopEvent::WindowRestored(id));
        }
        info!("Maximized window {}", id);

        self.activate(id)
    }

    /// Close a window and drop it from the desktop
    pub fn close(&mut self, id: WindowId) -> bool {
        if !self.is_open(id) {
            return false;
        }
        info!("Closing window {}", id);

        // Take it off the stack first so the selection can move on
        match self.remove(id) {
            Some(mut window) => {
                window.close();
                true
            }
            None => false,
        }
    }

    /// Move/resize a window. A maximized window drops back to normal.
    pub fn set_bounds(&mut self, id: WindowId, bounds: Geometry) -> bool {
        let Some(window) = self.window_mut(id) else {
            return false;
        };

        if window.is_maximized() {
            window.take_restore_bounds();
            window.set_state(WindowState::Normal);
        }
        window.set_bounds(bounds);
        true
    }

    /// Swap a window's content in place. Returns false if the window is gone.
    pub fn replace_surface(&mut self, id: WindowId, surface: Box<dyn Surface>) -> bool {
        match self.window_mut(id) {
            Some(window) => {
                window.replace_surface(surface);
                true
            }
            None => false,
        }
    }

    /// Snapshot of all windows in z-order (back to front)
    pub fn all_windows(&self) -> Vec<WindowInfo> {
        self.windows.iter().map(WindowInfo::from).collect()
    }

    /// Window ids in z-order (back to front)
    pub fn ids(&self) -> Vec<WindowId> {
        self.windows.iter().map(|w| w.id()).collect()
    }

    /// Number of open windows
    pub fn count(&self) -> usize {
        self.windows.iter().filter(|w| !w.is_closed()).count()
    }

    pub fn is_open(&self, id: WindowId) -> bool {
        self.get(id).map(|w| !w.is_closed()).unwrap_or(false)
    }

    pub fn get(&self, id: WindowId) -> Option<&ChildWindow> {
        self.windows.iter().find(|w| w.id() == id)
    }

    /// Currently selected window, if any
    pub fn selected(&self) -> Option<WindowId> {
        self.windows.iter().find(|w| w.is_selected()).map(|w| w.id())
    }

    /// Drain the events raised since the previous call
    pub fn take_events(&mut self) -> Vec<DesktopEvent> {
        std::mem::take(&mut self.events)
    }

    fn position(&self, id: WindowId) -> Option<usize> {
        self.windows.iter().position(|w| w.id() == id)
    }

    /// Mutable access to an open window
    fn window_mut(&mut self, id: WindowId) -> Option<&mut ChildWindow> {
        self.windows
            .iter_mut()
            .find(|w| w.id() == id)
            .filter(|w| !w.is_closed())
    }

    /// Hand the selection to the topmost visible window
    fn select_top(&mut self) {
        let next = self
            .windows
            .iter()
            .rev()
            .find(|w| !w.is_iconified() && !w.is_closed())
            .map(|w| w.id());

        if let Some(next) = next {
            self.activate(next);
        }
    }
}
