//! Scroll-driven header mode.
//!
//! The header sits transparently over the hero until the page has scrolled
//! past `max(0.6 * viewport_height, 400px)`, then switches to solid. Scroll
//! and resize events only mark a frame as pending; the mode is recomputed
//! once per animation frame.

const VIEWPORT_FRACTION: f64 = 0.6;
const MIN_THRESHOLD_PX: f64 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMode {
    /// Over the hero banner.
    Transparent,
    /// Past the hero.
    Solid,
}

/// Scroll offset past which the header turns solid.
pub fn threshold(viewport_height: f64) -> f64 {
    (VIEWPORT_FRACTION * viewport_height).max(MIN_THRESHOLD_PX)
}

pub fn mode_for(scroll_y: f64, viewport_height: f64) -> HeaderMode {
    if scroll_y > threshold(viewport_height) { HeaderMode::Solid } else { HeaderMode::Transparent }
}

/// Frame-throttled header mode derived from scroll position.
#[derive(Debug, Clone)]
pub struct ScrollHeader {
    scroll_y: f64,
    viewport_height: f64,
    frame_pending: bool,
    mode: HeaderMode,
}

impl ScrollHeader {
    pub fn new(scroll_y: f64, viewport_height: f64) -> Self {
        Self { scroll_y, viewport_height, frame_pending: false, mode: mode_for(scroll_y, viewport_height) }
    }

    pub fn mode(&self) -> HeaderMode {
        self.mode
    }

    /// Record a scroll. Returns true when the caller must request a frame.
    pub fn on_scroll(&mut self, scroll_y: f64) -> bool {
        self.scroll_y = scroll_y;
        self.request_frame()
    }

    /// Record a resize. Returns true when the caller must request a frame.
    pub fn on_resize(&mut self, viewport_height: f64) -> bool {
        self.viewport_height = viewport_height;
        self.request_frame()
    }

    fn request_frame(&mut self) -> bool {
        if self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        true
    }

    /// Animation frame callback: recompute from the latest offsets.
    pub fn on_frame(&mut self) -> HeaderMode {
        if self.frame_pending {
            self.frame_pending = false;
            self.mode = mode_for(self.scroll_y, self.viewport_height);
        }
        self.mode
    }
}
