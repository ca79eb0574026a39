//! Child window records
//!
//! A `ChildWindow` is a passive record: it knows its own flags and bounds but
//! never reaches out to the desktop or the taskbar. Cross-window rules such as
//! "only one window is selected" are enforced by `Desktop`.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::config::WindowsConfig;
use crate::shared::{Geometry, WindowFlags};
use crate::shell::launcher::ToolOutput;
use crate::wm::menu::Menu;
use crate::wm::surface::Surface;

/// Process-unique window identifier. Never reused, even after close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(u64);

impl WindowId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State transitions accepted by `ChildWindow::set_state`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Normal,
    Iconified,
    Maximized,
    Selected,
    Closed,
}

/// A tool window hosted on the desktop
#[derive(Debug)]
pub struct ChildWindow {
    id: WindowId,
    title: String,
    tool_name: String,
    icon: String,
    surface: Box<dyn Surface>,
    menu: Option<Menu>,
    flags: WindowFlags,
    bounds: Geometry,
    /// Bounds to go back to when a maximized window is restored
    restore_bounds: Option<Geometry>,
}

impl ChildWindow {
    /// Build a window from factory output, offset by its own id
    pub fn create(output: ToolOutput, id: WindowId) -> Self {
        Self::create_at(output, id, id.get(), &WindowsConfig::default())
    }

    /// Build a window whose initial position comes from `slot` rather than the id
    pub fn create_at(output: ToolOutput, id: WindowId, slot: u64, defaults: &WindowsConfig) -> Self {
        let ToolOutput {
            surface,
            menu,
            icon,
            display_name,
            ..
        } = output;

        let bounds = initial_bounds(slot, defaults);
        let title = format!("{} #{}", display_name, id);
        debug!("Created window {} '{}' at {:?}", id, title, bounds);

        Self {
            id,
            title,
            tool_name: display_name,
            icon,
            surface,
            menu,
            flags: WindowFlags::default(),
            bounds,
            restore_bounds: None,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn surface(&self) -> &dyn Surface {
        self.surface.as_ref()
    }

    pub fn menu(&self) -> Option<&Menu> {
        self.menu.as_ref()
    }

    pub fn flags(&self) -> WindowFlags {
        self.flags
    }

    pub fn bounds(&self) -> Geometry {
        self.bounds
    }

    pub fn is_selected(&self) -> bool {
        self.flags.contains(WindowFlags::SELECTED)
    }

    pub fn is_iconified(&self) -> bool {
        self.flags.contains(WindowFlags::ICONIFIED)
    }

    pub fn is_maximized(&self) -> bool {
        self.flags.contains(WindowFlags::MAXIMIZED)
    }

    pub fn is_closed(&self) -> bool {
        self.flags.contains(WindowFlags::CLOSED)
    }

    /// Apply a state transition. Closed windows ignore every transition.
    pub fn set_state(&mut self, state: WindowState) {
        if self.is_closed() {
            return;
        }

        match state {
            WindowState::Normal => {
                self.flags.remove(WindowFlags::ICONIFIED | WindowFlags::MAXIMIZED);
            }
            WindowState::Iconified => {
                self.flags.remove(WindowFlags::SELECTED | WindowFlags::MAXIMIZED);
                self.flags.insert(WindowFlags::ICONIFIED);
            }
            WindowState::Maximized => {
                self.flags.remove(WindowFlags::ICONIFIED);
                self.flags.insert(WindowFlags::MAXIMIZED);
            }
            WindowState::Selected => {
                self.flags.insert(WindowFlags::SELECTED);
            }
            WindowState::Closed => self.close(),
        }
    }

    /// Drop the SELECTED modifier, leaving the base state alone
    pub fn deselect(&mut self) {
        self.flags.remove(WindowFlags::SELECTED);
    }

    /// Mark the window closed. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.is_closed() {
            return;
        }
        self.flags.remove(WindowFlags::SELECTED);
        self.flags.insert(WindowFlags::CLOSED);
        debug!("Window {} closed", self.id);
    }

    pub fn set_bounds(&mut self, bounds: Geometry) {
        self.bounds = bounds;
    }

    pub(crate) fn remember_restore_bounds(&mut self) {
        if self.restore_bounds.is_none() {
            self.restore_bounds = Some(self.bounds);
        }
    }

    pub(crate) fn take_restore_bounds(&mut self) -> Option<Geometry> {
        self.restore_bounds.take()
    }

    /// Swap the displayed content in place
    pub fn replace_surface(&mut self, surface: Box<dyn Surface>) {
        self.surface = surface;
    }
}

/// Diagonal launch offset: `step * (slot mod slots)` on both axes
fn initial_bounds(slot: u64, defaults: &WindowsConfig) -> Geometry {
    let index = slot % defaults.launch_offset_slots.max(1);
    let offset = defaults.launch_offset_step * index as i32;
    Geometry::new(offset, offset, defaults.default_width, defaults.default_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::surface::Placeholder;

    fn output(name: &str) -> ToolOutput {
        ToolOutput::new(name, "🔢", Placeholder::loading())
    }

    #[test]
    fn test_create_formats_title_and_offset() {
        let window = ChildWindow::create(output("计算器"), WindowId::new(12));

        assert_eq!(window.title(), "计算器 #12");
        assert_eq!(window.icon(), "🔢");
        assert_eq!(window.flags(), WindowFlags::empty());
        // 12 mod 10 = 2
        assert_eq!(window.bounds(), Geometry::new(60, 60, 800, 600));
    }

    #[test]
    fn test_create_at_uses_slot_for_offset() {
        let window = ChildWindow::create_at(
            output("扫雷"),
            WindowId::new(7),
            0,
            &WindowsConfig::default(),
        );
        assert_eq!(window.title(), "扫雷 #7");
        assert_eq!(window.bounds(), Geometry::new(0, 0, 800, 600));
    }

    #[test]
    fn test_iconify_clears_selected() {
        let mut window = ChildWindow::create(output("a"), WindowId::new(0));
        window.set_state(WindowState::Maximized);
        window.set_state(WindowState::Selected);
        window.set_state(WindowState::Iconified);

        assert!(window.is_iconified());
        assert!(!window.is_selected());
        assert!(!window.is_maximized());
    }

    #[test]
    fn test_selected_is_a_modifier() {
        let mut window = ChildWindow::create(output("a"), WindowId::new(0));
        window.set_state(WindowState::Maximized);
        window.set_state(WindowState::Selected);
        assert!(window.is_maximized());
        assert!(window.is_selected());

        window.set_state(WindowState::Normal);
        assert!(!window.is_maximized());
        assert!(window.is_selected());
    }

    #[test]
    fn test_close_is_idempotent_and_terminal() {
        let mut window = ChildWindow::create(output("a"), WindowId::new(0));
        window.set_state(WindowState::Selected);
        window.close();
        window.close();
        assert!(window.is_closed());
        assert!(!window.is_selected());

        window.set_state(WindowState::Selected);
        window.set_state(WindowState::Normal);
        assert_eq!(window.flags(), WindowFlags::CLOSED);
    }
}
