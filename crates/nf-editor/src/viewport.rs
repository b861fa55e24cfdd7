//! Viewport state: zoom, pan and canvas display toggles.

use crate::config::CanvasConfig;
use nf_core::geometry::{self, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;
/// Wheel/keyboard zoom factors.
pub const ZOOM_IN_FACTOR: f64 = 1.1;
pub const ZOOM_OUT_FACTOR: f64 = 0.9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    zoom: f64,
    pan: Vec2,
    pub show_guides: bool,
    pub show_grid: bool,
    pub show_rulers: bool,
    pub snap_to_grid: bool,
    grid_size: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::from_config(&CanvasConfig::default())
    }
}

impl ViewportState {
    pub fn from_config(config: &CanvasConfig) -> Self {
        let grid_size = if config.grid_size.is_finite() && config.grid_size > 0.0 {
            config.grid_size
        } else {
            CanvasConfig::default().grid_size
        };
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            show_guides: config.show_guides,
            show_grid: config.show_grid,
            show_rulers: config.show_rulers,
            snap_to_grid: config.snap_to_grid,
            grid_size,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    /// Set zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`. Pan is left alone.
    /// Non-finite input is ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            log::warn!("ignoring non-finite zoom {zoom}");
            return;
        }
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn set_pan(&mut self, pan: Vec2) {
        if !pan.is_finite() {
            log::warn!("ignoring non-finite pan {pan:?}");
            return;
        }
        self.pan = pan;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.set_pan(self.pan + delta);
    }

    /// Back to 100% at the origin. Display toggles are kept.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Vec2::ZERO;
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * ZOOM_IN_FACTOR);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom * ZOOM_OUT_FACTOR);
    }

    /// Scroll-wheel handling: with the zoom modifier held, scrolling down
    /// zooms out and anything else zooms in; plain scrolling pans against
    /// the scroll direction.
    pub fn wheel(&mut self, delta: Vec2, zoom_modifier: bool) {
        if zoom_modifier {
            let factor = if delta.y > 0.0 {
                ZOOM_OUT_FACTOR
            } else {
                ZOOM_IN_FACTOR
            };
            self.set_zoom(self.zoom * factor);
        } else {
            self.pan_by(-delta);
        }
    }

    /// Fit `content` inside a viewport of `viewport_size`, centered, with
    /// `padding` pixels on every side.
    pub fn zoom_to_fit(&mut self, content: Rect, viewport_size: Size, padding: f64) {
        if content.width() <= 0.0 || content.height() <= 0.0 {
            self.reset();
            return;
        }
        let avail_w = (viewport_size.width - 2.0 * padding).max(1.0);
        let avail_h = (viewport_size.height - 2.0 * padding).max(1.0);
        self.set_zoom((avail_w / content.width()).min(avail_h / content.height()));

        let screen_center = Vec2::new(viewport_size.width / 2.0, viewport_size.height / 2.0);
        self.set_pan(screen_center - content.center().to_vec2() * self.zoom);
    }

    /// Viewport (screen) point → canvas point.
    pub fn to_canvas(&self, p: Point) -> Point {
        geometry::viewport_to_canvas(p, self.pan, self.zoom)
    }

    /// Canvas point → viewport (screen) point.
    pub fn to_viewport(&self, p: Point) -> Point {
        geometry::canvas_to_viewport(p, self.pan, self.zoom)
    }

    pub fn set_grid_size(&mut self, size: f64) {
        if size.is_finite() && size > 0.0 {
            self.grid_size = size;
        } else {
            log::warn!("ignoring invalid grid size {size}");
        }
    }

    pub fn toggle_grid(&mut self) {
        self.show_grid = !self.show_grid;
    }

    pub fn toggle_guides(&mut self) {
        self.show_guides = !self.show_guides;
    }

    pub fn toggle_rulers(&mut self) {
        self.show_rulers = !self.show_rulers;
    }

    pub fn toggle_snap(&mut self) {
        self.snap_to_grid = !self.snap_to_grid;
    }

    /// Snap `p` to the grid when snapping is on.
    pub fn snap(&self, p: Point) -> Point {
        if self.snap_to_grid {
            geometry::snap(p, self.grid_size)
        } else {
            p
        }
    }
}
