//! The user-facing drawing settings new actions are recorded with.

use std::sync::Arc;

use crate::{
    brush::{BrushShape, BrushStamp, StampCache},
    commands::Mode,
    Color,
};

/// Current color, mode and brush. Every action copies these when it's recorded, so changing them never
/// affects history.
#[derive(Clone, Debug)]
pub struct DrawContext {
    pub color: Color,
    pub mode: Mode,
    /// Brush diameter in pixels. Zero is treated as one.
    pub brush_size: u32,
    pub brush_shape: BrushShape,
    /// Stamps built so far. Can be shared with another context to keep reusing them.
    pub stamps: StampCache,
}
impl Default for DrawContext {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            mode: Mode::Draw,
            brush_size: 1,
            brush_shape: BrushShape::Circle,
            stamps: StampCache::new(),
        }
    }
}
impl DrawContext {
    /// The stamp for the current brush settings, shared with every other action using the same settings.
    pub fn brush(&mut self) -> Arc<BrushStamp> {
        self.stamps.get(self.brush_size, self.brush_shape)
    }
}
