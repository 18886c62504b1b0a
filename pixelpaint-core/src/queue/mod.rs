//! # Timeline
//!
//! The timeline manages every action performed on a document, keeping track of strokes and undo/redo state.
//! It is the ground truth for the document: layer pixels are only ever a product of replaying it.
//!
//! Actions are stored once, in an append-only arena, and strokes refer to them by [`ActionID`]. Undo and redo
//! move whole strokes between the two stacks and never touch the actions themselves. A new commit discards
//! the redo stack, leaving its actions in the arena unreferenced.

use crate::commands::{Action, ActionFlags, ActionID, DoUndo, Stroke};

pub mod replay;
pub mod writer;

#[derive(Clone, Default, Debug)]
pub struct Timeline {
    actions: Vec<Action>,
    /// Committed strokes, oldest first. The first stroke creates the initial layers and is never undone.
    undo: Vec<Stroke>,
    /// Undone strokes. The last is the next to be redone, so the first is the newest.
    redo: Vec<Stroke>,
    /// Actions of the stroke being written, already in the arena but not yet on a stack.
    pending: Stroke,
}
impl Timeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn action(&self, id: ActionID) -> Option<&Action> {
        self.actions.get(id.as_usize())
    }
    /// Every action ever recorded, including undone and discarded ones.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
    #[must_use]
    pub fn undo_stack(&self) -> &[Stroke] {
        &self.undo
    }
    #[must_use]
    pub fn redo_stack(&self) -> &[Stroke] {
        &self.redo
    }
    #[must_use]
    pub fn pending(&self) -> &Stroke {
        &self.pending
    }
    /// Whether there is anything besides the initial stroke to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
    /// IDs replay should consider, in order: the undo stack, then the pending stroke.
    pub fn live_ids(&self) -> impl Iterator<Item = ActionID> + '_ {
        self.undo
            .iter()
            .flat_map(|stroke| stroke.ids().iter().copied())
            .chain(self.pending.ids().iter().copied())
    }
    /// Whether an action is part of the present, rather than undone or discarded.
    #[must_use]
    pub fn is_live(&self, id: ActionID) -> bool {
        self.live_ids().any(|live| live == id)
    }
    /// The ID the next recorded action will get.
    ///
    /// # Panics
    /// If the arena is full.
    #[must_use]
    pub fn next_id(&self) -> ActionID {
        ActionID::next_for_len(self.actions.len()).expect("action arena exhausted")
    }

    /// Record an action as part of the pending stroke.
    pub(crate) fn push_pending(&mut self, action: Action) -> ActionID {
        let id = self.next_id();
        log::trace!("recording {id}: {:?} on {}", action.kind(), action.layer);
        self.actions.push(action);
        self.pending.0.push(id);
        id
    }
    /// Move the pending stroke onto the undo stack. A new commit invalidates everything that was undone.
    pub(crate) fn commit_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let stroke = std::mem::take(&mut self.pending);
        log::trace!(
            "committing stroke of {} action(s), discarding {} undone",
            stroke.len(),
            self.redo.len()
        );
        self.undo.push(stroke);
        self.redo.clear();
    }
    /// Roll back every meta-action of the pending stroke, newest first, then forget the stroke and its actions.
    pub(crate) fn discard_pending(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        for &id in pending.ids().iter().rev() {
            self.apply_meta(id, false);
        }
        if let Some(first) = pending.ids().iter().min() {
            self.actions.truncate(first.as_usize());
        }
    }
    /// Apply a meta-action's new (`forward`) or old snapshot onto its target.
    pub(crate) fn apply_meta(&mut self, id: ActionID, forward: bool) -> Option<ActionID> {
        let idx = id.as_usize();
        if idx >= self.actions.len() {
            return None;
        }
        // Targets always precede the meta-action.
        let (before, rest) = self.actions.split_at_mut(idx);
        let tool = &rest[0].tool;
        if forward {
            DoUndo::Do(tool).apply(before)
        } else {
            DoUndo::Undo(tool).apply(before)
        }
    }
    /// Move the newest committed stroke to the redo stack. Returns `false` if there was nothing to undo.
    pub(crate) fn step_undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        // Checked by can_undo
        let Some(stroke) = self.undo.pop() else {
            return false;
        };
        self.redo.push(stroke);
        true
    }
    /// Move the most recently undone stroke back. Returns `false` if there was nothing to redo.
    pub(crate) fn step_redo(&mut self) -> bool {
        let Some(stroke) = self.redo.pop() else {
            return false;
        };
        self.undo.push(stroke);
        true
    }
    pub(crate) fn actions_mut(&mut self) -> &mut [Action] {
        &mut self.actions
    }
    /// Rebuild from loaded parts. Every stroke must refer to actions within the arena.
    pub(crate) fn from_parts(actions: Vec<Action>, undo: Vec<Stroke>, redo: Vec<Stroke>) -> Self {
        Self {
            actions,
            undo,
            redo,
            pending: Stroke::default(),
        }
    }
    /// Reset the replay-derived flags, leaving `REMOVED` as it is.
    pub(crate) fn reset_derived_flags(&mut self) {
        for action in &mut self.actions {
            action.flags.remove(ActionFlags::HIDDEN | ActionFlags::CLEARED);
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        brush::BrushShape,
        commands::{ActionFlags, Tool},
        geometry::Point,
        raster::PixelBuffer,
        state::{context::DrawContext, Document},
        Color,
    };

    const RED: Color = Color::opaque(255, 0, 0);

    fn single_pixel_context() -> DrawContext {
        DrawContext {
            color: RED,
            brush_size: 1,
            brush_shape: BrushShape::Square,
            ..DrawContext::default()
        }
    }
    fn pixels(document: &Document) -> PixelBuffer {
        document
            .layers()
            .get(document.active_layer())
            .and_then(|layer| layer.buffer())
            .cloned()
            .unwrap()
    }

    #[test]
    fn single_pixel_undo_redo() {
        let mut document = Document::new("test", 10, 10);
        let mut context = single_pixel_context();
        document
            .write_with(&mut context, |writer| writer.draw(Point::new(5, 5)))
            .unwrap();
        assert_eq!(pixels(&document).get(Point::new(5, 5)), Some(RED));

        assert!(document.undo());
        assert_eq!(pixels(&document), PixelBuffer::new(10, 10));

        assert!(document.redo());
        let after = pixels(&document);
        for y in 0..10 {
            for x in 0..10 {
                let expected = if (x, y) == (5, 5) { RED } else { Color::TRANSPARENT };
                assert_eq!(after.get(Point::new(x, y)), Some(expected));
            }
        }
    }
    #[test]
    fn underflow_is_noop() {
        let mut document = Document::new("test", 4, 4);
        assert!(!document.timeline().can_undo());
        assert!(!document.undo());
        assert!(!document.redo());
        // The base layer survives.
        assert_eq!(document.timeline().undo_stack().len(), 1);
        assert!(!document.layers().get(document.active_layer()).unwrap().removed);
    }
    #[test]
    fn round_trip() {
        let mut document = Document::new("test", 16, 16);
        let mut context = single_pixel_context();
        let mut snapshots = vec![pixels(&document)];
        for i in 0..6 {
            context.color = Color::opaque(40 * i, 255 - 40 * i, 7);
            context.brush_size = u32::from(i) + 1;
            let i = i32::from(i);
            document
                .write_with(&mut context, |writer| {
                    writer.line(Point::new(i, 0), Point::new(15 - i, 15))?;
                    if i % 2 == 0 {
                        writer.fill(Point::new(15, 0))?;
                    }
                    writer.quad_curve([Point::new(0, 15), Point::new(i * 2, i), Point::new(15, 8)])
                })
                .unwrap();
            snapshots.push(pixels(&document));
        }
        for expected in snapshots.iter().rev().skip(1) {
            assert!(document.undo());
            assert_eq!(&pixels(&document), expected);
        }
        assert!(!document.undo());
        for expected in snapshots.iter().skip(1) {
            assert!(document.redo());
            assert_eq!(&pixels(&document), expected);
        }
        assert!(!document.redo());
    }
    #[test]
    fn replay_deterministic() {
        let mut document = Document::new("test", 12, 12);
        let mut context = single_pixel_context();
        context.brush_size = 3;
        context.brush_shape = BrushShape::Circle;
        document
            .write_with(&mut context, |writer| {
                writer.cubic_curve([
                    Point::new(0, 0),
                    Point::new(12, 0),
                    Point::new(0, 12),
                    Point::new(11, 11),
                ])?;
                writer.fill(Point::new(11, 0))
            })
            .unwrap();
        let live = pixels(&document);
        document.replay();
        let first = pixels(&document);
        document.replay();
        assert_eq!(first.as_bytes(), pixels(&document).as_bytes());
        assert_eq!(live, first);
    }
    #[test]
    fn commit_discards_redo() {
        let mut document = Document::new("test", 4, 4);
        let mut context = single_pixel_context();
        document
            .write_with(&mut context, |writer| writer.draw(Point::new(0, 0)))
            .unwrap();
        assert!(document.undo());
        assert_eq!(document.timeline().redo_stack().len(), 1);
        document
            .write_with(&mut context, |writer| writer.draw(Point::new(1, 1)))
            .unwrap();
        assert!(!document.timeline().can_redo());
        assert_eq!(pixels(&document).get(Point::new(0, 0)), Some(Color::TRANSPARENT));
        assert_eq!(pixels(&document).get(Point::new(1, 1)), Some(RED));
    }
    #[test]
    fn undone_actions_hidden() {
        let mut document = Document::new("test", 4, 4);
        let mut context = single_pixel_context();
        let id = document
            .write_with(&mut context, |writer| writer.draw(Point::new(0, 0)))
            .unwrap();
        assert!(document.undo());
        let action = document.timeline().action(id).unwrap();
        assert!(action.flags.contains(ActionFlags::HIDDEN));
        assert_eq!(action.tool, Tool::Draw { at: Point::ORIGIN });
        assert!(document.redo());
        assert!(document.timeline().action(id).unwrap().is_live());
    }
    #[test]
    fn undo_n_redo_n() {
        let mut document = Document::new("test", 4, 4);
        let mut context = single_pixel_context();
        for x in 0..3 {
            document
                .write_with(&mut context, |writer| writer.draw(Point::new(x, 0)))
                .unwrap();
        }
        assert_eq!(document.undo_n(10), 3);
        assert_eq!(pixels(&document), PixelBuffer::new(4, 4));
        assert_eq!(document.redo_n(2), 2);
        assert_eq!(pixels(&document).get(Point::new(1, 0)), Some(RED));
        assert_eq!(pixels(&document).get(Point::new(2, 0)), Some(Color::TRANSPARENT));
    }
}
