//! # Layers
//!
//! Layers live in an append-only arena and are only ever soft-removed, as history refers to them by ID.
//! Whether a layer is removed is decided by the `AddLayer`/`RemoveLayer` actions of the timeline, see
//! [`crate::queue::replay`].

use crate::{commands::CommandError, geometry::Point, raster::PixelBuffer, util::Opacity, Color};

pub type LayerID = crate::ArenaID<Layer>;

#[derive(Clone, PartialEq, Debug)]
pub enum LayerKind {
    /// Owns pixels that actions draw on.
    Raster(PixelBuffer),
    /// Shows an external image. Nothing draws on these.
    Reference { source: String },
}

#[derive(Clone, PartialEq, Debug)]
pub struct Layer {
    pub name: String,
    pub kind: LayerKind,
    /// Position of the layer's top-left pixel on the canvas.
    pub offset: Point,
    /// Nearest-neighbor magnification applied when compositing.
    pub scale: f32,
    pub opacity: Opacity,
    /// User visibility toggle. Not part of history.
    pub visible: bool,
    /// Soft-delete flag.
    pub removed: bool,
}
impl Layer {
    /// A transparent raster layer.
    #[must_use]
    pub fn raster(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self::with_kind(name, LayerKind::Raster(PixelBuffer::new(width, height)))
    }
    #[must_use]
    pub fn reference(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            LayerKind::Reference {
                source: source.into(),
            },
        )
    }
    fn with_kind(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            name: name.into(),
            kind,
            offset: Point::ORIGIN,
            scale: 1.0,
            opacity: Opacity::OPAQUE,
            visible: true,
            removed: false,
        }
    }
    #[must_use]
    pub fn buffer(&self) -> Option<&PixelBuffer> {
        match &self.kind {
            LayerKind::Raster(buffer) => Some(buffer),
            LayerKind::Reference { .. } => None,
        }
    }
    pub fn buffer_mut(&mut self) -> Option<&mut PixelBuffer> {
        match &mut self.kind {
            LayerKind::Raster(buffer) => Some(buffer),
            LayerKind::Reference { .. } => None,
        }
    }
    #[must_use]
    pub fn is_raster(&self) -> bool {
        matches!(self.kind, LayerKind::Raster(_))
    }
}

#[derive(Clone, Default, Debug)]
pub struct LayerArena {
    /// Bottom to top.
    layers: Vec<Layer>,
}
impl LayerArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Insert a layer on top of all others.
    ///
    /// # Panics
    /// If there are more than `u32::MAX` layers.
    pub fn push(&mut self, layer: Layer) -> LayerID {
        let id = LayerID::next_for_len(self.layers.len()).expect("layer arena exhausted");
        self.layers.push(layer);
        id
    }
    #[must_use]
    pub fn get(&self, id: LayerID) -> Option<&Layer> {
        self.layers.get(id.as_usize())
    }
    pub fn get_mut(&mut self, id: LayerID) -> Option<&mut Layer> {
        self.layers.get_mut(id.as_usize())
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
    /// All layers, removed ones included, bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (LayerID, &Layer)> + '_ {
        self.layers
            .iter()
            .enumerate()
            .map(|(idx, layer)| (LayerID::from_index(idx as u32), layer))
    }
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Layer> + '_ {
        self.layers.iter_mut()
    }
    /// Drop layers allocated after the first `len`. Only for discarding layers nothing refers to anymore.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.layers.truncate(len);
    }
    /// Pixels of a layer that may be drawn on right now.
    pub fn drawable_mut(&mut self, id: LayerID) -> Result<&mut PixelBuffer, CommandError> {
        let layer = self.get_mut(id).ok_or(CommandError::UnknownLayer(id))?;
        if layer.removed {
            return Err(CommandError::LayerRemoved(id));
        }
        layer.buffer_mut().ok_or(CommandError::NotRaster(id))
    }
    /// The highest raster layer that isn't removed, where drawing goes when the active layer disappears.
    #[must_use]
    pub fn topmost_drawable(&self) -> Option<LayerID> {
        self.iter()
            .rev()
            .find(|(_, layer)| !layer.removed && layer.is_raster())
            .map(|(id, _)| id)
    }
    /// Flatten every visible raster layer, bottom to top, over a solid background.
    #[must_use]
    pub fn composite(&self, width: u32, height: u32, background: Color) -> PixelBuffer {
        let mut out = PixelBuffer::new(width, height);
        out.fill_rect(Point::ORIGIN, width, height, background);
        if out.pixels().is_empty() {
            return out;
        }
        let mut pixels = out.pixels().to_vec();
        for (id, layer) in self.iter() {
            if layer.removed || !layer.visible {
                continue;
            }
            let Some(buffer) = layer.buffer() else {
                log::debug!("skipping reference layer {id} in composite");
                continue;
            };
            let scale = if layer.scale.is_finite() && layer.scale > 0.0 {
                layer.scale
            } else {
                1.0
            };
            for (y, row) in pixels.chunks_exact_mut(width as usize).enumerate() {
                for (x, pixel) in row.iter_mut().enumerate() {
                    // Canvas position back into layer space.
                    let lx = ((x as f32 - layer.offset.x as f32) / scale).floor();
                    let ly = ((y as f32 - layer.offset.y as f32) / scale).floor();
                    let Some(src) = buffer.get(Point::new(lx as i32, ly as i32)) else {
                        continue;
                    };
                    *pixel = src.over(*pixel, layer.opacity);
                }
            }
        }
        out.replace_pixels(pixels);
        out
    }
}
