//! # Replay
//!
//! Rebuilds every layer from the timeline. Replay never patches pixels incrementally: it settles what each
//! action should look like, wipes every raster layer, and rasterizes the live actions from the start.
//!
//! Settling happens in two passes over the strokes:
//! * Undone strokes are walked newest first. Their meta-actions are rolled back to their old snapshots, and
//!   their actions are marked [`ActionFlags::HIDDEN`].
//! * Live strokes (the undo stack followed by the pending stroke) are walked oldest first. Layers are added and
//!   removed, meta-actions have their new snapshots applied, and clears mark what they wipe.
//!
//! Every step writes absolute state, so replaying twice gives the same result as replaying once.

use super::Timeline;
use crate::{
    commands::{ActionFlags, ActionID, Tool, ToolKind},
    state::layers::LayerArena,
};

/// Counts from one replay, for logging.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct Summary {
    /// Drawing actions rasterized.
    pub painted: usize,
    /// Drawing actions skipped for being removed or cleared.
    pub skipped: usize,
    /// Drawing actions that refer to a layer that can't be drawn on.
    pub orphaned: usize,
}

pub fn replay(timeline: &mut Timeline, layers: &mut LayerArena) -> Summary {
    roll_back_undone(timeline);
    settle_live(timeline, layers);
    let summary = rasterize(timeline, layers);
    log::debug!(
        "replayed {} stroke(s): {} painted, {} skipped, {} orphaned",
        timeline.undo_stack().len(),
        summary.painted,
        summary.skipped,
        summary.orphaned
    );
    summary
}

fn roll_back_undone(timeline: &mut Timeline) {
    timeline.reset_derived_flags();
    // Redo stack is newest-first from the bottom.
    let undone: Vec<ActionID> = timeline
        .redo_stack()
        .iter()
        .flat_map(|stroke| stroke.ids().iter().rev().copied())
        .collect();
    for id in undone {
        timeline.apply_meta(id, false);
        if let Some(action) = timeline.actions_mut().get_mut(id.as_usize()) {
            action.flags.insert(ActionFlags::HIDDEN);
        }
    }
}

fn settle_live(timeline: &mut Timeline, layers: &mut LayerArena) {
    // Layers only exist through their live AddLayer.
    for layer in layers.iter_mut() {
        layer.removed = true;
    }
    let live: Vec<ActionID> = timeline.live_ids().collect();
    for id in live {
        let Some(action) = timeline.action(id) else {
            log::warn!("stroke refers to missing action {id}");
            continue;
        };
        let layer_id = action.layer;
        let kind = action.kind();
        let clear_upto = match action.tool {
            Tool::Clear { upto } => Some(upto),
            _ => None,
        };
        match kind {
            ToolKind::AddLayer | ToolKind::RemoveLayer => match layers.get_mut(layer_id) {
                Some(layer) => layer.removed = kind == ToolKind::RemoveLayer,
                None => log::warn!("{id} refers to missing layer {layer_id}"),
            },
            ToolKind::Clear => {
                let upto = clear_upto.map_or(0, |upto| upto.as_usize());
                for earlier in timeline.actions_mut().iter_mut().take(upto) {
                    if earlier.layer == layer_id && earlier.kind().is_drawing() {
                        earlier.flags.insert(ActionFlags::CLEARED);
                    }
                }
            }
            kind if kind.is_meta() => {
                if timeline.apply_meta(id, true).is_none() {
                    log::warn!("{id} refers to an action that doesn't precede it");
                }
            }
            _ => (),
        }
    }
}

fn rasterize(timeline: &Timeline, layers: &mut LayerArena) -> Summary {
    for layer in layers.iter_mut() {
        if let Some(buffer) = layer.buffer_mut() {
            buffer.clear();
        }
    }
    let mut summary = Summary::default();
    for id in timeline.live_ids() {
        let Some(action) = timeline.action(id) else {
            continue;
        };
        if !action.kind().is_drawing() {
            continue;
        }
        if !action.is_live() {
            summary.skipped += 1;
            continue;
        }
        // Removed layers still get their pixels, ready for when the removal is undone.
        let Some(buffer) = layers.get_mut(action.layer).and_then(|layer| layer.buffer_mut()) else {
            log::warn!("{id} draws on {}, which has no pixels", action.layer);
            summary.orphaned += 1;
            continue;
        };
        action.paint(buffer);
        summary.painted += 1;
    }
    summary
}
