//! Layout Module
//!
//! Cascade, tile and close-all over the windows currently on the desktop.
//! Both layouts walk the windows in z-order (back to front).

use tracing::{debug, info};

use crate::config::LayoutConfig;
use crate::shared::Geometry;
use crate::shell::launcher::LaunchRegistry;
use crate::wm::desktop::Desktop;

/// Window layout engine
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Bounds of the i-th window in a cascade
    pub fn cascade_bounds(&self, index: usize) -> Geometry {
        let offset = self.config.cascade_step * index as i32;
        Geometry::new(
            offset,
            offset,
            self.config.cascade_width,
            self.config.cascade_height,
        )
    }

    /// Stack all windows diagonally, then select the topmost one
    pub fn cascade(&self, desktop: &mut Desktop) {
        let ids = desktop.ids();
        if ids.is_empty() {
            return;
        }

        for (index, id) in ids.iter().enumerate() {
            desktop.set_bounds(*id, self.cascade_bounds(index));
        }

        if let Some(top) = ids.last() {
            desktop.activate(*top);
        }
        info!("Cascaded {} windows", ids.len());
    }

    /// Arrange all windows row-major in a rows x cols grid over the desktop area.
    ///
    /// Remainder cells of the last row stay empty. Z-order and selection are
    /// left untouched. Cell sizes use integer division, so a desktop narrower
    /// than `cols` (or shorter than `rows`) pixels yields zero-sized cells.
    pub fn tile(&self, desktop: &mut Desktop) {
        let ids = desktop.ids();
        let Some((rows, cols)) = tile_grid(ids.len()) else {
            return;
        };

        let area = desktop.area();
        let cell_width = area.width / cols as u32;
        let cell_height = area.height / rows as u32;

        for (index, id) in ids.iter().enumerate() {
            let (row, col) = tile_cell(index, cols);
            let bounds = Geometry::new(
                area.x + (col as u32 * cell_width) as i32,
                area.y + (row as u32 * cell_height) as i32,
                cell_width,
                cell_height,
            );
            desktop.set_bounds(*id, bounds);
        }

        debug!(
            "Tiled {} windows into {}x{} grid ({}x{} cells)",
            ids.len(),
            rows,
            cols,
            cell_width,
            cell_height
        );
    }

    /// Close every window and restart the cosmetic launch offsets.
    /// Window ids keep counting up.
    pub fn close_all(&self, desktop: &mut Desktop, registry: &mut LaunchRegistry) {
        let ids = desktop.ids();
        for id in &ids {
            desktop.close(*id);
        }
        registry.reset_session();
        info!("Closed all windows ({})", ids.len());
    }
}

/// Grid shape for `n` windows: rows = floor(sqrt(n)), cols = ceil(n / rows)
pub fn tile_grid(n: usize) -> Option<(usize, usize)> {
    if n == 0 {
        return None;
    }

    let mut rows = 1;
    while (rows + 1) * (rows + 1) <= n {
        rows += 1;
    }
    let cols = n.div_ceil(rows);

    Some((rows, cols))
}

/// Row-major cell for the window at `index`
pub fn tile_cell(index: usize, cols: usize) -> (usize, usize) {
    (index / cols, index % cols)
}
