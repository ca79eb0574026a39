//! Window Manager Module
//!
//! Hosts child windows inside the virtual desktop: window records, z-order,
//! activation, desktop events and the cascade / tile layouts.

pub mod desktop;
pub mod events;
pub mod layout;
pub mod menu;
pub mod surface;
pub mod window;

pub use desktop::{Desktop, WindowInfo};
pub use events::DesktopEvent;
pub use layout::LayoutEngine;
pub use menu::{Menu, MenuEntry};
pub use surface::{Placeholder, Surface};
pub use window::{ChildWindow, WindowId, WindowState};
