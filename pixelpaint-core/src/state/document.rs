//! # Document
//!
//! A document owns its layers and the timeline that produces their pixels. Layers are never edited
//! directly: every change goes through a [`StrokeWriter`] from [`Document::write_with`], and undo or redo
//! rebuild the layers by replay.

use crate::{
    brush::{BrushShape, BrushStamp},
    commands::{Action, ActionFlags, CommandError, Mode, Tool},
    queue::{
        replay::{self, Summary},
        writer::StrokeWriter,
        Timeline,
    },
    raster::PixelBuffer,
    state::{
        context::DrawContext,
        layers::{Layer, LayerArena, LayerID},
    },
    util::Opacity,
    Color,
};

/// Canvas metadata, which is not part of history.
#[derive(Clone, PartialEq, Debug)]
pub struct DocumentInfo {
    /// Name of the document, inferred from its path or given on creation.
    pub name: String,
    /// The path from which the file was loaded or saved, or None if created as new.
    pub path: Option<std::path::PathBuf>,
    /// Canvas width and height in pixels. Raster layers are allocated at this size.
    pub size: [u32; 2],
    pub created: chrono::DateTime<chrono::Utc>,
}

#[derive(Clone, Debug)]
pub struct Document {
    pub(crate) info: DocumentInfo,
    pub(crate) layers: LayerArena,
    pub(crate) timeline: Timeline,
    /// The layer drawing operations target.
    pub(crate) active_layer: LayerID,
}
impl Document {
    /// A blank document with a single transparent layer. The layer is created by the first stroke, which can
    /// never be undone.
    #[must_use]
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        let info = DocumentInfo {
            name: name.into(),
            path: None,
            size: [width, height],
            created: chrono::Utc::now(),
        };
        let mut layers = LayerArena::new();
        let base = layers.push(Layer::raster("Background", width, height));
        let mut timeline = Timeline::new();
        timeline.push_pending(Action {
            tool: Tool::AddLayer,
            color: Color::BLACK,
            brush: std::sync::Arc::new(BrushStamp::new(1, BrushShape::default())),
            mode: Mode::Draw,
            layer: base,
            flags: ActionFlags::empty(),
        });
        timeline.commit_pending();
        Self {
            info,
            layers,
            timeline,
            active_layer: base,
        }
    }
    /// Assemble a loaded document, then replay to build its pixels.
    pub(crate) fn from_parts(info: DocumentInfo, layers: LayerArena, timeline: Timeline) -> Self {
        let active_layer = layers
            .topmost_drawable()
            .unwrap_or_else(|| LayerID::from_index(0));
        let mut document = Self {
            info,
            layers,
            timeline,
            active_layer,
        };
        document.replay();
        document
    }

    #[must_use]
    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }
    pub fn info_mut(&mut self) -> &mut DocumentInfo {
        &mut self.info
    }
    #[must_use]
    pub fn layers(&self) -> &LayerArena {
        &self.layers
    }
    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }
    #[must_use]
    pub fn active_layer(&self) -> LayerID {
        self.active_layer
    }
    /// Choose the layer drawing goes to. It must be a raster layer that isn't removed.
    pub fn set_active_layer(&mut self, id: LayerID) -> Result<(), CommandError> {
        self.layers.drawable_mut(id)?;
        self.active_layer = id;
        Ok(())
    }
    /// Toggle whether a layer shows in the composite. Not recorded in history.
    pub fn set_visible(&mut self, id: LayerID, visible: bool) -> Result<(), CommandError> {
        self.layers.get_mut(id).ok_or(CommandError::UnknownLayer(id))?.visible = visible;
        Ok(())
    }
    /// Not recorded in history.
    pub fn set_opacity(&mut self, id: LayerID, opacity: Opacity) -> Result<(), CommandError> {
        self.layers.get_mut(id).ok_or(CommandError::UnknownLayer(id))?.opacity = opacity;
        Ok(())
    }

    /// Record one stroke. Everything `f` writes is committed as a single undo step once it returns,
    /// unless it was cancelled.
    pub fn write_with<T>(
        &mut self,
        context: &mut DrawContext,
        f: impl FnOnce(&mut StrokeWriter<'_>) -> T,
    ) -> T {
        let mut writer = StrokeWriter::new(self, context);
        f(&mut writer)
    }

    /// Undo the latest stroke. Returns `false`, changing nothing, if only the initial stroke is left.
    pub fn undo(&mut self) -> bool {
        self.undo_n(1) == 1
    }
    /// Redo the most recently undone stroke. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.redo_n(1) == 1
    }
    /// Undo up to `num` strokes, replaying once. Returns how many were undone.
    pub fn undo_n(&mut self, num: usize) -> usize {
        let undone = (0..num).take_while(|_| self.timeline.step_undo()).count();
        log::debug!("undid {undone} of {num} requested stroke(s)");
        if undone != 0 {
            self.replay();
        }
        undone
    }
    /// Redo up to `num` strokes, replaying once. Returns how many were redone.
    pub fn redo_n(&mut self, num: usize) -> usize {
        let redone = (0..num).take_while(|_| self.timeline.step_redo()).count();
        log::debug!("redid {redone} of {num} requested stroke(s)");
        if redone != 0 {
            self.replay();
        }
        redone
    }
    /// Rebuild every layer from the timeline.
    pub fn replay(&mut self) -> Summary {
        let summary = replay::replay(&mut self.timeline, &mut self.layers);
        self.fix_active_layer();
        summary
    }
    /// If the active layer can't be drawn on anymore, fall back to the topmost one that can.
    pub(crate) fn fix_active_layer(&mut self) {
        if self.layers.drawable_mut(self.active_layer).is_ok() {
            return;
        }
        match self.layers.topmost_drawable() {
            Some(fallback) => {
                log::debug!("active layer {} gone, falling back to {fallback}", self.active_layer);
                self.active_layer = fallback;
            }
            None => log::warn!("no drawable layers remain"),
        }
    }
    /// Flatten every visible layer over `background`.
    #[must_use]
    pub fn composite(&self, background: Color) -> PixelBuffer {
        let [width, height] = self.info.size;
        self.layers.composite(width, height, background)
    }
}

#[cfg(test)]
mod test {
    use super::Document;
    use crate::{
        commands::{CommandError, Tool},
        geometry::Point,
        state::context::DrawContext,
        util::Opacity,
        Color,
    };

    #[test]
    fn new_has_base_layer() {
        let document = Document::new("blank", 3, 2);
        assert_eq!(document.layers().len(), 1);
        assert_eq!(document.info().size, [3, 2]);
        let base = document.timeline().undo_stack()[0].ids()[0];
        assert_eq!(document.timeline().action(base).unwrap().tool, Tool::AddLayer);
        assert_eq!(document.composite(Color::WHITE).pixels(), &[Color::WHITE; 6]);
    }
    #[test]
    fn visibility_and_opacity() {
        let mut document = Document::new("test", 2, 1);
        let mut context = DrawContext {
            color: Color::BLACK,
            brush_size: 1,
            ..DrawContext::default()
        };
        document
            .write_with(&mut context, |writer| writer.draw(Point::ORIGIN))
            .unwrap();
        let base = document.active_layer();
        assert_eq!(document.composite(Color::WHITE).get(Point::ORIGIN), Some(Color::BLACK));

        document.set_opacity(base, Opacity::CLEAR).unwrap();
        assert_eq!(document.composite(Color::WHITE).get(Point::ORIGIN), Some(Color::WHITE));
        document.set_opacity(base, Opacity::OPAQUE).unwrap();
        document.set_visible(base, false).unwrap();
        assert_eq!(document.composite(Color::WHITE).get(Point::ORIGIN), Some(Color::WHITE));

        let missing = crate::state::layers::LayerID::from_index(9);
        assert_eq!(
            document.set_visible(missing, true),
            Err(CommandError::UnknownLayer(missing))
        );
    }
}
