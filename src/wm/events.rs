//! Desktop events
//!
//! The desktop never calls the taskbar. It queues these events and the shell
//! forwards them once the operation that raised them has finished.

use crate::wm::window::WindowId;

/// Events raised by `Desktop`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesktopEvent {
    /// A window was added to the desktop
    WindowAdded {
        id: WindowId,
        icon: String,
        title: String,
    },

    /// A window left the desktop
    WindowRemoved(WindowId),

    /// A window became the selected one
    WindowActivated(WindowId),

    /// A window lost the selection
    WindowDeactivated(WindowId),

    /// A window was minimized
    WindowIconified(WindowId),

    /// A minimized window was brought back
    WindowRestored(WindowId),
}

impl DesktopEvent {
    pub fn window(&self) -> WindowId {
        match self {
            DesktopEvent::WindowAdded { id, .. } => *id,
            DesktopEvent::WindowRemoved(id)
            | DesktopEvent::WindowActivated(id)
            | DesktopEvent::WindowDeactivated(id)
            | DesktopEvent::WindowIconified(id)
            | DesktopEvent::WindowRestored(id) => *id,
        }
    }
}
