//! # Commands
//!
//! Every change to a document is recorded as an [`Action`], the atomic replayable unit of history. Actions
//! are grouped into [`Stroke`]s, one per gesture, which are what undo and redo move around.
//!
//! Drawing actions store the parameters of the rasterizer that produced them, so they can be replayed from
//! scratch. Meta-actions ([`Tool::Modify`], [`Tool::ChangeColor`], [`Tool::Remove`]) instead refer to an
//! earlier action and store a snapshot of both its old and new state, so they can be rolled either way
//! without ever editing history in place.

use std::sync::Arc;

use crate::{
    brush::BrushStamp,
    geometry::Point,
    raster::{self, Ellipse, PixelBuffer},
    state::layers::LayerID,
    Color,
};

pub type ActionID = crate::ArenaID<Action>;

bitflags::bitflags! {
    /// Reasons for an action to be skipped by replay.
    #[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
    pub struct ActionFlags: u8 {
        /// Removed by a [`Tool::Remove`] meta-action, or loaded as removed.
        const REMOVED = 0b001;
        /// Sitting in the redo stack.
        const HIDDEN = 0b010;
        /// Wiped by a later [`Tool::Clear`] of its layer.
        const CLEARED = 0b100;
    }
}

#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Default,
    serde::Serialize,
    serde::Deserialize,
    strum::AsRefStr,
    strum::EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Mode {
    #[default]
    Draw,
    /// Paint with full transparency instead of the action's color.
    Erase,
}

/// What an action does, and its tool-specific parameters.
#[derive(Clone, PartialEq, Debug)]
pub enum Tool {
    /// A single stamp.
    Draw { at: Point },
    Line { from: Point, to: Point },
    /// Start, control, end.
    QuadCurve { points: [Point; 3] },
    /// Start, two controls, end.
    CubicCurve { points: [Point; 4] },
    Ellipse(Ellipse),
    Fill { at: Point },
    /// Recolor every pixel exactly equal to `from` with the action's color.
    Replace { from: Color },
    AddLayer,
    RemoveLayer,
    /// Wipe every drawing action on the layer with an ID below `upto`.
    Clear { upto: ActionID },
    Modify {
        target: ActionID,
        from: Box<Tool>,
        to: Box<Tool>,
    },
    ChangeColor {
        target: ActionID,
        from: Color,
        to: Color,
    },
    Remove { target: ActionID },
}

/// The discriminant of a [`Tool`], as it's named in saved documents.
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    strum::AsRefStr,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ToolKind {
    Draw,
    Line,
    QuadCurve,
    CubicCurve,
    Ellipse,
    Fill,
    Replace,
    AddLayer,
    RemoveLayer,
    Clear,
    Modify,
    ChangeColor,
    Remove,
}
impl ToolKind {
    /// Whether actions of this kind put pixels on a layer.
    #[must_use]
    pub fn is_drawing(self) -> bool {
        matches!(
            self,
            Self::Draw
                | Self::Line
                | Self::QuadCurve
                | Self::CubicCurve
                | Self::Ellipse
                | Self::Fill
                | Self::Replace
        )
    }
    /// Whether actions of this kind refer to, and alter, an earlier action.
    #[must_use]
    pub fn is_meta(self) -> bool {
        matches!(self, Self::Modify | Self::ChangeColor | Self::Remove)
    }
}

impl Tool {
    #[must_use]
    pub fn kind(&self) -> ToolKind {
        match self {
            Self::Draw { .. } => ToolKind::Draw,
            Self::Line { .. } => ToolKind::Line,
            Self::QuadCurve { .. } => ToolKind::QuadCurve,
            Self::CubicCurve { .. } => ToolKind::CubicCurve,
            Self::Ellipse(_) => ToolKind::Ellipse,
            Self::Fill { .. } => ToolKind::Fill,
            Self::Replace { .. } => ToolKind::Replace,
            Self::AddLayer => ToolKind::AddLayer,
            Self::RemoveLayer => ToolKind::RemoveLayer,
            Self::Clear { .. } => ToolKind::Clear,
            Self::Modify { .. } => ToolKind::Modify,
            Self::ChangeColor { .. } => ToolKind::ChangeColor,
            Self::Remove { .. } => ToolKind::Remove,
        }
    }
    /// The action a meta-action refers to, if any.
    #[must_use]
    pub fn target(&self) -> Option<ActionID> {
        match self {
            Self::Modify { target, .. }
            | Self::ChangeColor { target, .. }
            | Self::Remove { target } => Some(*target),
            _ => None,
        }
    }
    /// The rasterized path of a stroked tool, without any stamping.
    ///
    /// `None` for tools that do not follow a path.
    #[must_use]
    pub fn path(&self) -> Option<Vec<Point>> {
        Some(match self {
            Self::Draw { at } => vec![*at],
            Self::Line { from, to } => raster::line(*from, *to),
            Self::QuadCurve {
                points: [start, control, end],
            } => raster::quad_bezier(*start, *control, *end),
            Self::CubicCurve {
                points: [start, a, b, end],
            } => raster::cubic_bezier(*start, *a, *b, *end),
            Self::Ellipse(shape) => raster::ellipse(shape),
            _ => return None,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Action {
    pub tool: Tool,
    /// Copy of the color at the time of the action.
    pub color: Color,
    pub brush: Arc<BrushStamp>,
    pub mode: Mode,
    /// The layer drawn on, added, or removed. Meta-actions carry their target's layer.
    pub layer: LayerID,
    pub flags: ActionFlags,
}
impl Action {
    #[must_use]
    pub fn kind(&self) -> ToolKind {
        self.tool.kind()
    }
    /// Stroke weight, the brush size.
    #[must_use]
    pub fn weight(&self) -> u32 {
        self.brush.size()
    }
    /// Whether replay should rasterize this action.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.flags.is_empty()
    }
    /// The color that actually lands on the layer.
    #[must_use]
    pub fn paint_color(&self) -> Color {
        match self.mode {
            Mode::Draw => self.color,
            Mode::Erase => Color::TRANSPARENT,
        }
    }
    /// Rasterize onto a layer's pixels. This is the only place actions touch pixels, used both live and by
    /// replay.
    ///
    /// Returns whether anything was painted. Non-drawing tools paint nothing.
    pub fn paint(&self, buffer: &mut PixelBuffer) -> bool {
        let color = self.paint_color();
        match &self.tool {
            Tool::Fill { at } => raster::fill::flood_fill(buffer, *at, color),
            Tool::Replace { from } => buffer.replace_color(*from, color) != 0,
            tool => match tool.path() {
                Some(points) => {
                    buffer.stamp_all(&points, &self.brush, color);
                    true
                }
                None => false,
            },
        }
    }
}

/// The actions of one gesture, in order.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Stroke(pub smallvec::SmallVec<[ActionID; 1]>);
impl Stroke {
    #[must_use]
    pub fn ids(&self) -> &[ActionID] {
        &self.0
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}
impl FromIterator<ActionID> for Stroke {
    fn from_iter<T: IntoIterator<Item = ActionID>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    #[error("layer {0} not found")]
    UnknownLayer(LayerID),
    #[error("layer {0} has been removed")]
    LayerRemoved(LayerID),
    #[error("layer {0} has no pixels to draw on")]
    NotRaster(LayerID),
    #[error("action {0} not found in history")]
    UnknownAction(ActionID),
    #[error("command constructed for a state that does not match the current state")]
    MismatchedState,
    #[error("command makes no changes")]
    NoOp,
}

/// A meta-action, applied forward or rolled back.
#[derive(PartialEq, Eq, Debug)]
pub enum DoUndo<'c, T> {
    Do(&'c T),
    Undo(&'c T),
}
impl<'c> DoUndo<'c, Tool> {
    /// Write the snapshot this direction calls for onto the target action.
    ///
    /// Non-meta tools are ignored. Returns the target that was written, if any.
    pub fn apply(&self, actions: &mut [Action]) -> Option<ActionID> {
        let (tool, forward) = match self {
            Self::Do(tool) => (*tool, true),
            Self::Undo(tool) => (*tool, false),
        };
        let target = tool.target()?;
        let action = actions.get_mut(target.as_usize())?;
        match tool {
            Tool::Modify { from, to, .. } => {
                let snapshot: &Tool = if forward { to } else { from };
                action.tool = snapshot.clone();
            }
            Tool::ChangeColor { from, to, .. } => {
                action.color = if forward { *to } else { *from };
            }
            Tool::Remove { .. } => action.flags.set(ActionFlags::REMOVED, forward),
            _ => return None,
        }
        Some(target)
    }
}

#[cfg(test)]
mod test {
    use super::{Action, ActionFlags, ActionID, DoUndo, Mode, Tool, ToolKind};
    use crate::{
        brush::{BrushShape, BrushStamp},
        geometry::Point,
        raster::PixelBuffer,
        state::layers::LayerID,
        Color,
    };
    use std::sync::Arc;

    fn action(tool: Tool) -> Action {
        Action {
            tool,
            color: Color::opaque(255, 0, 0),
            brush: Arc::new(BrushStamp::new(1, BrushShape::Square)),
            mode: Mode::Draw,
            layer: LayerID::from_index(0),
            flags: ActionFlags::empty(),
        }
    }

    #[test]
    fn kind_names() {
        use std::str::FromStr;
        use strum::IntoEnumIterator;
        assert_eq!(ToolKind::QuadCurve.as_ref(), "quadCurve");
        for kind in ToolKind::iter() {
            assert_eq!(ToolKind::from_str(kind.as_ref()), Ok(kind));
        }
        assert_eq!(ToolKind::iter().filter(|kind| kind.is_drawing()).count(), 7);
    }
    #[test]
    fn paint_line() {
        let mut buffer = PixelBuffer::new(4, 4);
        let line = action(Tool::Line {
            from: Point::new(0, 0),
            to: Point::new(3, 3),
        });
        assert!(line.paint(&mut buffer));
        for i in 0..4 {
            assert_eq!(buffer.get(Point::new(i, i)), Some(line.color));
        }
        assert_eq!(buffer.get(Point::new(1, 0)), Some(Color::TRANSPARENT));
    }
    #[test]
    fn erase_paints_transparent() {
        let mut buffer = PixelBuffer::new(3, 3);
        buffer.fill_rect(Point::ORIGIN, 3, 3, Color::WHITE);
        let mut erase = action(Tool::Draw {
            at: Point::new(1, 1),
        });
        erase.mode = Mode::Erase;
        erase.paint(&mut buffer);
        assert_eq!(buffer.get(Point::new(1, 1)), Some(Color::TRANSPARENT));
        assert_eq!(buffer.get(Point::new(0, 1)), Some(Color::WHITE));
    }
    #[test]
    fn non_drawing_paints_nothing() {
        let mut buffer = PixelBuffer::new(2, 2);
        assert!(!action(Tool::AddLayer).paint(&mut buffer));
        assert_eq!(buffer, PixelBuffer::new(2, 2));
    }
    #[test]
    fn meta_do_undo() {
        let original = Tool::Draw { at: Point::ORIGIN };
        let moved = Tool::Draw {
            at: Point::new(1, 1),
        };
        let mut actions = vec![action(original.clone())];
        let target = ActionID::from_index(0);
        let modify = Tool::Modify {
            target,
            from: Box::new(original.clone()),
            to: Box::new(moved.clone()),
        };
        assert_eq!(DoUndo::Do(&modify).apply(&mut actions), Some(target));
        assert_eq!(actions[0].tool, moved);
        DoUndo::Undo(&modify).apply(&mut actions);
        assert_eq!(actions[0].tool, original);

        let remove = Tool::Remove { target };
        DoUndo::Do(&remove).apply(&mut actions);
        assert!(actions[0].flags.contains(ActionFlags::REMOVED));
        DoUndo::Undo(&remove).apply(&mut actions);
        assert!(actions[0].is_live());

        let recolor = Tool::ChangeColor {
            target,
            from: actions[0].color,
            to: Color::BLACK,
        };
        DoUndo::Do(&recolor).apply(&mut actions);
        assert_eq!(actions[0].color, Color::BLACK);
        // Dangling targets are skipped.
        let dangling = Tool::Remove {
            target: ActionID::from_index(5),
        };
        assert_eq!(DoUndo::Do(&dangling).apply(&mut actions), None);
    }
}
