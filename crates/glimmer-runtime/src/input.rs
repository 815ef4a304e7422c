//! Pointer state in normalized device coordinates

use glimmer_core::Vec2;

/// Tracks the cursor relative to the window.
///
/// The windowing layer feeds raw pixel events; consumers read the pointer as
/// NDC (`x` left→right and `y` bottom→top, both in `[-1, 1]`), which is what
/// the interaction resolver casts rays through.
#[derive(Clone, Debug)]
pub struct PointerState {
    /// Current cursor position in window pixels, `None` while outside
    position: Option<(f64, f64)>,
    /// Window size in pixels
    window_size: (f64, f64),
    /// Directly supplied NDC (scripted/headless input), takes precedence
    override_ndc: Option<Vec2>,
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

impl PointerState {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            position: None,
            window_size: (width.max(1.0), height.max(1.0)),
            override_ndc: None,
        }
    }

    /// Process cursor movement in window pixels
    pub fn process_cursor_moved(&mut self, x: f64, y: f64) {
        self.position = Some((x, y));
        self.override_ndc = None;
    }

    /// Cursor left the window
    pub fn process_cursor_left(&mut self) {
        self.position = None;
        self.override_ndc = None;
    }

    /// Set the pointer directly in NDC, clamped to `[-1, 1]`
    pub fn set_ndc(&mut self, ndc: Vec2) {
        self.override_ndc = Some(ndc.clamp(Vec2::splat(-1.0), Vec2::splat(1.0)));
    }

    pub fn aspect(&self) -> f32 {
        (self.window_size.0 / self.window_size.1) as f32
    }

    /// Pointer in normalized device coordinates, if the pointer is present
    pub fn ndc(&self) -> Option<Vec2> {
        if let Some(ndc) = self.override_ndc {
            return Some(ndc);
        }
        let (x, y) = self.position?;
        let (w, h) = self.window_size;
        let ndc = Vec2::new(((x / w) * 2.0 - 1.0) as f32, (1.0 - (y / h) * 2.0) as f32);
        Some(ndc.clamp(Vec2::splat(-1.0), Vec2::splat(1.0)))
    }
}
