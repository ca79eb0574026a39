//! Shared window state between the desktop, the layout engine and the taskbar
//!
//! Geometry and lifecycle flags live here so every component agrees on the
//! same representation of a window.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Window geometry in desktop coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge (exclusive)
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Bottom edge (exclusive)
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// True if the two rectangles share interior area (touching edges do not count)
    pub fn overlaps(&self, other: &Geometry) -> bool {
        !(self.right() <= other.x
            || other.right() <= self.x
            || self.bottom() <= other.y
            || other.bottom() <= self.y)
    }
}

bitflags! {
    /// Window lifecycle flags. The empty set is the NORMAL state.
    ///
    /// SELECTED is a modifier on top of NORMAL / MAXIMIZED / ICONIFIED.
    /// CLOSED is terminal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WindowFlags: u8 {
        const ICONIFIED = 1 << 0;
        const MAXIMIZED = 1 << 1;
        const SELECTED  = 1 << 2;
        const CLOSED    = 1 << 3;
    }
}

impl Default for WindowFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl WindowFlags {
    /// Short human readable form used by listings and snapshots
    pub fn describe(&self) -> String {
        if self.contains(Self::CLOSED) {
            return "closed".to_string();
        }

        let base = if self.contains(Self::ICONIFIED) {
            "iconified"
        } else if self.contains(Self::MAXIMIZED) {
            "maximized"
        } else {
            "normal"
        };

        if self.contains(Self::SELECTED) {
            format!("{base}+selected")
        } else {
            base.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_edge_is_not_overlap() {
        let left = Geometry::new(0, 0, 100, 100);
        let right = Geometry::new(100, 0, 100, 100);
        assert!(!left.overlaps(&right));
        assert!(left.overlaps(&Geometry::new(99, 99, 10, 10)));
    }

    #[test]
    fn test_describe_flags() {
        assert_eq!(WindowFlags::default().describe(), "normal");
        assert_eq!(
            (WindowFlags::MAXIMIZED | WindowFlags::SELECTED).describe(),
            "maximized+selected"
        );
        assert_eq!(
            (WindowFlags::CLOSED | WindowFlags::SELECTED).describe(),
            "closed"
        );
    }
}
