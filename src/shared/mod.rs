//! Types shared across the window manager and the shell

pub mod window_state;

pub use window_state::{Geometry, WindowFlags};
