//! # Stroke writer
//!
//! All changes to a document go through a [`StrokeWriter`], which records each one as an action of a single
//! stroke. Drawing actions land on their layer immediately, by the same code replay uses, so what is shown
//! mid-gesture is exactly what replay will rebuild later.
//!
//! The stroke is committed when the writer is dropped. [`StrokeWriter::cancel`] discards it instead, so a
//! gesture is never left half-committed.

use crate::{
    commands::{Action, ActionFlags, ActionID, CommandError, Mode, Tool},
    geometry::Point,
    raster::Ellipse,
    state::{
        context::DrawContext,
        layers::{Layer, LayerID},
        Document,
    },
    Color,
};

pub struct StrokeWriter<'a> {
    document: &'a mut Document,
    context: &'a mut DrawContext,
    /// Arena lengths and selection when the stroke began, restored by cancel.
    layers_start: usize,
    active_start: LayerID,
    /// Previous pointer sample of a freehand drag.
    last_sample: Option<Point>,
}

impl Drop for StrokeWriter<'_> {
    fn drop(&mut self) {
        if self.document.timeline.pending().is_empty() {
            return;
        }
        // Actions already reached the layers, leaving them off the stacks would desync replay.
        if std::thread::panicking() {
            log::warn!("stroke writer panicked, committing partial stroke");
        }
        self.document.timeline.commit_pending();
    }
}

impl<'a> StrokeWriter<'a> {
    pub(crate) fn new(document: &'a mut Document, context: &'a mut DrawContext) -> Self {
        let layers_start = document.layers.len();
        let active_start = document.active_layer;
        Self {
            document,
            context,
            layers_start,
            active_start,
            last_sample: None,
        }
    }
    /// Whether anything has been recorded so far.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.document.timeline.pending().is_empty()
    }
    #[must_use]
    pub fn document(&self) -> &Document {
        self.document
    }

    fn record(&mut self, tool: Tool, layer: LayerID) -> ActionID {
        let action = Action {
            tool,
            color: self.context.color,
            brush: self.context.brush(),
            mode: self.context.mode,
            layer,
            flags: ActionFlags::empty(),
        };
        self.document.timeline.push_pending(action)
    }
    /// Record a drawing action on the active layer, and paint it.
    fn paint(&mut self, tool: Tool) -> Result<ActionID, CommandError> {
        let layer = self.document.active_layer;
        self.document.layers.drawable_mut(layer)?;
        let id = self.record(tool, layer);
        let Document {
            timeline, layers, ..
        } = &mut *self.document;
        if let (Some(action), Ok(buffer)) = (timeline.action(id), layers.drawable_mut(layer)) {
            action.paint(buffer);
        }
        Ok(id)
    }
    /// The color drawing would put down right now.
    fn paint_color(&self) -> Color {
        match self.context.mode {
            Mode::Draw => self.context.color,
            Mode::Erase => Color::TRANSPARENT,
        }
    }

    pub fn draw(&mut self, at: Point) -> Result<ActionID, CommandError> {
        self.paint(Tool::Draw { at })
    }
    pub fn line(&mut self, from: Point, to: Point) -> Result<ActionID, CommandError> {
        self.paint(Tool::Line { from, to })
    }
    /// Start, control, end.
    pub fn quad_curve(&mut self, points: [Point; 3]) -> Result<ActionID, CommandError> {
        self.paint(Tool::QuadCurve { points })
    }
    /// Start, two controls, end.
    pub fn cubic_curve(&mut self, points: [Point; 4]) -> Result<ActionID, CommandError> {
        self.paint(Tool::CubicCurve { points })
    }
    pub fn ellipse(&mut self, shape: Ellipse) -> Result<ActionID, CommandError> {
        self.paint(Tool::Ellipse(shape))
    }
    /// Follow the pointer. The first sample is stamped as is, then each sample is joined to the previous one by
    /// a line. A sample that didn't move records nothing.
    pub fn drag_to(&mut self, at: Point) -> Result<Option<ActionID>, CommandError> {
        let id = match self.last_sample {
            None => self.draw(at)?,
            Some(last) if last == at => return Ok(None),
            Some(last) => self.line(last, at)?,
        };
        self.last_sample = Some(at);
        Ok(Some(id))
    }
    /// Flood fill from `at`. Records nothing if `at` is outside the layer or already the fill color.
    pub fn fill(&mut self, at: Point) -> Result<Option<ActionID>, CommandError> {
        let color = self.paint_color();
        let under = self.document.layers.drawable_mut(self.document.active_layer)?.get(at);
        if under.map_or(true, |under| under == color) {
            return Ok(None);
        }
        self.paint(Tool::Fill { at }).map(Some)
    }
    /// Recolor every pixel of the active layer that is exactly `from`. Records nothing if no pixel would
    /// change.
    pub fn replace(&mut self, from: Color) -> Result<Option<ActionID>, CommandError> {
        let to = self.paint_color();
        let buffer = self.document.layers.drawable_mut(self.document.active_layer)?;
        if from == to || !buffer.pixels().contains(&from) {
            return Ok(None);
        }
        self.paint(Tool::Replace { from }).map(Some)
    }
    /// Wipe the active layer. Earlier actions stay in history, marked as cleared.
    pub fn clear(&mut self) -> Result<ActionID, CommandError> {
        let layer = self.document.active_layer;
        self.document.layers.drawable_mut(layer)?;
        let upto = self.document.timeline.next_id();
        let id = self.record(Tool::Clear { upto }, layer);
        self.document.replay();
        Ok(id)
    }

    /// Add a transparent raster layer on top, and make it active.
    pub fn add_layer(&mut self, name: impl Into<String>) -> LayerID {
        let [width, height] = self.document.info.size;
        self.insert_layer(Layer::raster(name, width, height))
    }
    /// Add a layer showing an external image. The active layer is unchanged, as nothing draws on these.
    pub fn add_reference_layer(&mut self, name: impl Into<String>, source: impl Into<String>) -> LayerID {
        let active = self.document.active_layer;
        let id = self.insert_layer(Layer::reference(name, source));
        self.document.active_layer = active;
        id
    }
    fn insert_layer(&mut self, layer: Layer) -> LayerID {
        let id = self.document.layers.push(layer);
        self.record(Tool::AddLayer, id);
        self.document.active_layer = id;
        id
    }
    /// Soft-remove a layer. If it was active, the topmost remaining raster layer becomes active.
    pub fn remove_layer(&mut self, id: LayerID) -> Result<ActionID, CommandError> {
        let layer = self
            .document
            .layers
            .get_mut(id)
            .ok_or(CommandError::UnknownLayer(id))?;
        if layer.removed {
            return Err(CommandError::LayerRemoved(id));
        }
        layer.removed = true;
        let action = self.record(Tool::RemoveLayer, id);
        self.document.fix_active_layer();
        Ok(action)
    }

    /// Look up a meta-action target. It must be a live drawing action.
    fn meta_target(&self, target: ActionID) -> Result<&Action, CommandError> {
        let timeline = &self.document.timeline;
        let action = timeline
            .action(target)
            .filter(|_| timeline.is_live(target))
            .ok_or(CommandError::UnknownAction(target))?;
        if action.kind().is_drawing() {
            Ok(action)
        } else {
            Err(CommandError::MismatchedState)
        }
    }
    fn record_meta(&mut self, tool: Tool, layer: LayerID) -> ActionID {
        let id = self.record(tool, layer);
        self.document.timeline.apply_meta(id, true);
        self.document.replay();
        id
    }
    /// Change the geometry of an earlier drawing action. The tool kind can't change.
    pub fn modify(&mut self, target: ActionID, to: Tool) -> Result<ActionID, CommandError> {
        let action = self.meta_target(target)?;
        if action.kind() != to.kind() {
            return Err(CommandError::MismatchedState);
        }
        if action.tool == to {
            return Err(CommandError::NoOp);
        }
        let from = Box::new(action.tool.clone());
        let layer = action.layer;
        Ok(self.record_meta(
            Tool::Modify {
                target,
                from,
                to: Box::new(to),
            },
            layer,
        ))
    }
    pub fn change_color(&mut self, target: ActionID, to: Color) -> Result<ActionID, CommandError> {
        let action = self.meta_target(target)?;
        if action.color == to {
            return Err(CommandError::NoOp);
        }
        let (from, layer) = (action.color, action.layer);
        Ok(self.record_meta(Tool::ChangeColor { target, from, to }, layer))
    }
    /// Remove a single earlier drawing action from the image.
    pub fn remove(&mut self, target: ActionID) -> Result<ActionID, CommandError> {
        let action = self.meta_target(target)?;
        if action.flags.contains(ActionFlags::REMOVED) {
            return Err(CommandError::NoOp);
        }
        let layer = action.layer;
        Ok(self.record_meta(Tool::Remove { target }, layer))
    }

    /// Discard everything recorded by this writer so far and restore the layers, as if the gesture never
    /// happened. The writer can be used again afterwards, starting a fresh stroke.
    pub fn cancel(&mut self) {
        let discarded = self.document.timeline.pending().len();
        self.document.timeline.discard_pending();
        self.document.layers.truncate(self.layers_start);
        self.document.active_layer = self.active_start;
        self.last_sample = None;
        self.document.replay();
        log::debug!("cancelled stroke of {discarded} action(s)");
    }
}
