//! # Document files
//!
//! Documents are stored as JSON: canvas metadata, the layer list, and the committed history. Pixels are never
//! stored, loading rebuilds them by replay.
//!
//! Each history entry is one action, `{tool, properties, color, layerId, removed, brush, mode, stroke}`.
//! Layers are referred to by their index in `layers`, and actions by their index in `history`, so IDs are
//! renumbered on save. Point-valued properties are stored as `[x, y, brushSize]` triples. Undone strokes are
//! not saved.

use std::path::Path;

use serde_json::{json, Value};

use crate::{
    brush::{BrushShape, StampCache},
    commands::{Action, ActionFlags, ActionID, Mode, Stroke, Tool, ToolKind},
    geometry::Point,
    queue::Timeline,
    raster::Ellipse,
    state::{
        layers::{Layer, LayerArena, LayerID, LayerKind},
        Document, DocumentInfo,
    },
    util::Opacity,
    Color,
};

pub mod validate;

pub use validate::{validate, ValidationReport};

/// Format version written by this crate. Older versions load, newer ones are refused.
pub const VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document failed validation, {0}")]
    Invalid(ValidationReport),
    #[error("document version {0} is newer than supported version {}", VERSION)]
    UnsupportedVersion(u32),
    #[error("history[{entry}].properties.{name}: {source}")]
    Property {
        entry: usize,
        name: &'static str,
        source: serde_json::Error,
    },
    #[error("history[{entry}] has {found} point(s), expected {expected}")]
    PointCount {
        entry: usize,
        expected: usize,
        found: usize,
    },
    #[error("history[{entry}] refers to entry {target}, which is not an earlier drawing action")]
    DanglingTarget { entry: usize, target: u32 },
}

#[derive(thiserror::Error, Debug)]
pub enum SaveError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{0} refers to {1}, which is not in the committed history")]
    DanglingTarget(ActionID, ActionID),
}

#[derive(serde::Serialize, serde::Deserialize)]
struct Metadata {
    version: u32,
    timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(default = "untitled")]
    name: String,
    width: u32,
    height: u32,
}
fn untitled() -> String {
    "Untitled".to_owned()
}

#[derive(Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
enum LayerKindName {
    Raster,
    Reference,
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayerRecord {
    name: String,
    kind: LayerKindName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(default)]
    offset: Point,
    #[serde(default = "unit_scale")]
    scale: f32,
    #[serde(default)]
    opacity: Opacity,
    #[serde(default = "visible")]
    visible: bool,
    #[serde(default)]
    removed: bool,
}
fn unit_scale() -> f32 {
    1.0
}
fn visible() -> bool {
    true
}

#[derive(serde::Serialize, serde::Deserialize)]
struct BrushRecord {
    size: u32,
    shape: BrushShape,
}
impl Default for BrushRecord {
    fn default() -> Self {
        Self {
            size: 1,
            shape: BrushShape::default(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Entry {
    tool: ToolKind,
    properties: Value,
    color: Color,
    layer_id: u32,
    #[serde(default)]
    removed: bool,
    #[serde(default)]
    brush: BrushRecord,
    #[serde(default)]
    mode: Mode,
    /// Entries sharing a stroke number are one undo step.
    stroke: u32,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct DocumentRecord {
    metadata: Metadata,
    layers: Vec<LayerRecord>,
    history: Vec<Entry>,
}

fn triple(point: Point, weight: u32) -> [i64; 3] {
    [i64::from(point.x), i64::from(point.y), i64::from(weight)]
}

/// Properties of a tool. `live` is the saved history, whose positions become the new IDs.
fn encode_tool(tool: &Tool, weight: u32, live: &[ActionID]) -> Result<Value, ActionID> {
    // Live IDs are always ascending.
    let target = |target: ActionID| live.binary_search(&target).map_err(|_| target);
    let points = |points: &[Point]| -> Vec<[i64; 3]> {
        points.iter().map(|&point| triple(point, weight)).collect()
    };
    Ok(match tool {
        Tool::Draw { at } | Tool::Fill { at } => json!({ "points": points(&[*at]) }),
        Tool::Line { from, to } => json!({ "points": points(&[*from, *to]) }),
        Tool::QuadCurve { points: p } => json!({ "points": points(p) }),
        Tool::CubicCurve { points: p } => json!({ "points": points(p) }),
        Tool::Ellipse(shape) => json!({
            "center": triple(shape.center, weight),
            "radius": shape.radius,
            "angle": shape.angle,
            "forceCircle": shape.force_circle,
            "offset": shape.offset,
        }),
        Tool::Replace { from } => json!({ "from": from }),
        Tool::AddLayer | Tool::RemoveLayer => json!({}),
        Tool::Clear { upto } => json!({ "upto": live.partition_point(|id| id < upto) }),
        Tool::Modify { target: t, from, to } => json!({
            "target": target(*t)?,
            "from": { "tool": from.kind(), "properties": encode_tool(from, weight, live)? },
            "to": { "tool": to.kind(), "properties": encode_tool(to, weight, live)? },
        }),
        Tool::ChangeColor { target: t, from, to } => json!({
            "target": target(*t)?,
            "from": from,
            "to": to,
        }),
        Tool::Remove { target: t } => json!({ "target": target(*t)? }),
    })
}

/// Serialize the committed history of a document.
pub fn to_json(document: &Document) -> Result<String, SaveError> {
    let timeline = document.timeline();
    let live: Vec<ActionID> = timeline
        .undo_stack()
        .iter()
        .flat_map(|stroke| stroke.ids().iter().copied())
        .collect();
    let mut history = Vec::with_capacity(live.len());
    for (stroke, ids) in timeline.undo_stack().iter().enumerate() {
        for &id in ids.ids() {
            let Some(action) = timeline.action(id) else {
                log::warn!("stroke {stroke} refers to missing {id}, skipping");
                continue;
            };
            let properties = encode_tool(&action.tool, action.weight(), &live)
                .map_err(|target| SaveError::DanglingTarget(id, target))?;
            history.push(Entry {
                tool: action.kind(),
                properties,
                color: action.color,
                layer_id: action.layer.index(),
                removed: action.flags.contains(ActionFlags::REMOVED),
                brush: BrushRecord {
                    size: action.brush.size(),
                    shape: action.brush.shape(),
                },
                mode: action.mode,
                stroke: u32::try_from(stroke).unwrap_or(u32::MAX),
            });
        }
    }

    let layers = document
        .layers()
        .iter()
        .map(|(_, layer)| LayerRecord {
            name: layer.name.clone(),
            kind: match layer.kind {
                LayerKind::Raster(_) => LayerKindName::Raster,
                LayerKind::Reference { .. } => LayerKindName::Reference,
            },
            source: match &layer.kind {
                LayerKind::Raster(_) => None,
                LayerKind::Reference { source } => Some(source.clone()),
            },
            offset: layer.offset,
            scale: layer.scale,
            opacity: layer.opacity,
            visible: layer.visible,
            removed: layer.removed,
        })
        .collect();

    let info = document.info();
    let record = DocumentRecord {
        metadata: Metadata {
            version: VERSION,
            timestamp: info.created,
            name: info.name.clone(),
            width: info.size[0],
            height: info.size[1],
        },
        layers,
        history,
    };
    log::debug!(
        "saving {} layer(s) and {} action(s)",
        record.layers.len(),
        record.history.len()
    );
    Ok(serde_json::to_string_pretty(&record)?)
}

pub fn save_document(document: &Document, path: impl AsRef<Path>) -> Result<(), SaveError> {
    let json = to_json(document)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Decodes history entries into actions, renumbering saved indices to arena IDs.
struct Decoder<'h> {
    history: &'h [Entry],
    /// Number of synthesized actions placed before the saved ones.
    offset: u32,
}
impl Decoder<'_> {
    fn property<T: serde::de::DeserializeOwned>(
        entry: usize,
        properties: &Value,
        name: &'static str,
    ) -> Result<T, LoadError> {
        let value = properties.get(name).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|source| LoadError::Property {
            entry,
            name,
            source,
        })
    }
    fn points<const N: usize>(entry: usize, properties: &Value) -> Result<[Point; N], LoadError> {
        let triples: Vec<[i32; 3]> = Self::property(entry, properties, "points")?;
        let found = triples.len();
        let points: Vec<Point> = triples.into_iter().map(|[x, y, _]| Point::new(x, y)).collect();
        points.try_into().map_err(|_| LoadError::PointCount {
            entry,
            expected: N,
            found,
        })
    }
    /// An earlier entry that draws, as an arena ID.
    fn target(&self, entry: usize, properties: &Value) -> Result<ActionID, LoadError> {
        let target: u32 = Self::property(entry, properties, "target")?;
        let valid = usize::try_from(target).is_ok_and(|t| t < entry)
            && self
                .history
                .get(target as usize)
                .is_some_and(|saved| saved.tool.is_drawing());
        if valid {
            Ok(ActionID::from_index(target + self.offset))
        } else {
            Err(LoadError::DanglingTarget { entry, target })
        }
    }
    /// A drawing tool nested in a modify.
    fn nested(&self, entry: usize, properties: &Value, name: &'static str) -> Result<Box<Tool>, LoadError> {
        let nested = properties.get(name).cloned().unwrap_or(Value::Null);
        let kind: ToolKind = Self::property(entry, &nested, "tool")?;
        if !kind.is_drawing() {
            return Err(LoadError::Property {
                entry,
                name,
                source: serde::de::Error::custom(format!("{} is not a drawing tool", kind.as_ref())),
            });
        }
        let properties = nested.get("properties").cloned().unwrap_or(Value::Null);
        self.tool(entry, kind, &properties).map(Box::new)
    }
    fn tool(&self, entry: usize, kind: ToolKind, properties: &Value) -> Result<Tool, LoadError> {
        Ok(match kind {
            ToolKind::Draw => {
                let [at] = Self::points(entry, properties)?;
                Tool::Draw { at }
            }
            ToolKind::Fill => {
                let [at] = Self::points(entry, properties)?;
                Tool::Fill { at }
            }
            ToolKind::Line => {
                let [from, to] = Self::points(entry, properties)?;
                Tool::Line { from, to }
            }
            ToolKind::QuadCurve => Tool::QuadCurve {
                points: Self::points(entry, properties)?,
            },
            ToolKind::CubicCurve => Tool::CubicCurve {
                points: Self::points(entry, properties)?,
            },
            ToolKind::Ellipse => {
                let [x, y, _]: [i32; 3] = Self::property(entry, properties, "center")?;
                Tool::Ellipse(Ellipse {
                    center: Point::new(x, y),
                    radius: Self::property(entry, properties, "radius")?,
                    angle: Self::property::<Option<f64>>(entry, properties, "angle")?.unwrap_or(0.0),
                    force_circle: Self::property::<Option<bool>>(entry, properties, "forceCircle")?
                        .unwrap_or(false),
                    offset: Self::property::<Option<u8>>(entry, properties, "offset")?.unwrap_or(0),
                })
            }
            ToolKind::Replace => Tool::Replace {
                from: Self::property(entry, properties, "from")?,
            },
            ToolKind::AddLayer => Tool::AddLayer,
            ToolKind::RemoveLayer => Tool::RemoveLayer,
            ToolKind::Clear => {
                let upto: u32 = Self::property(entry, properties, "upto")?;
                if usize::try_from(upto).map_or(true, |upto| upto > entry) {
                    return Err(LoadError::DanglingTarget { entry, target: upto });
                }
                Tool::Clear {
                    upto: ActionID::from_index(upto + self.offset),
                }
            }
            ToolKind::Modify => Tool::Modify {
                target: self.target(entry, properties)?,
                from: self.nested(entry, properties, "from")?,
                to: self.nested(entry, properties, "to")?,
            },
            ToolKind::ChangeColor => Tool::ChangeColor {
                target: self.target(entry, properties)?,
                from: Self::property(entry, properties, "from")?,
                to: Self::property(entry, properties, "to")?,
            },
            ToolKind::Remove => Tool::Remove {
                target: self.target(entry, properties)?,
            },
        })
    }
}

/// Build a document from its JSON. Nothing is built unless the document validates.
pub fn from_json(text: &str) -> Result<Document, LoadError> {
    let value: Value = serde_json::from_str(text)?;
    let report = validate(&value);
    if !report.is_ok() {
        return Err(LoadError::Invalid(report));
    }
    let record: DocumentRecord = serde_json::from_value(value)?;
    if record.metadata.version > VERSION {
        return Err(LoadError::UnsupportedVersion(record.metadata.version));
    }
    let Metadata {
        timestamp,
        name,
        width,
        height,
        ..
    } = record.metadata;

    let mut layers = LayerArena::new();
    for layer in &record.layers {
        let mut built = match (layer.kind, &layer.source) {
            (LayerKindName::Reference, Some(source)) => Layer::reference(layer.name.clone(), source.clone()),
            (LayerKindName::Reference, None) => {
                log::warn!("reference layer {:?} has no source", layer.name);
                Layer::reference(layer.name.clone(), String::new())
            }
            (LayerKindName::Raster, _) => Layer::raster(layer.name.clone(), width, height),
        };
        built.offset = layer.offset;
        built.scale = layer.scale;
        built.opacity = layer.opacity;
        built.visible = layer.visible;
        built.removed = layer.removed;
        layers.push(built);
    }

    let mut stamps = StampCache::new();
    let mut synthesized = Vec::new();
    let mut synthesize = |tool: Tool, layer: LayerID, stamps: &mut StampCache| {
        synthesized.push(Action {
            tool,
            color: Color::BLACK,
            brush: stamps.get(1, BrushShape::default()),
            mode: Mode::Draw,
            layer,
            flags: ActionFlags::empty(),
        });
    };
    if layers.is_empty() {
        let base = layers.push(Layer::raster("Background", width, height));
        synthesize(Tool::AddLayer, base, &mut stamps);
    }
    // Layers whose creation isn't in the saved history get created by the base stroke instead.
    for (id, layer) in layers.iter() {
        let added = record
            .history
            .iter()
            .any(|entry| entry.tool == ToolKind::AddLayer && entry.layer_id == id.index());
        if !added {
            synthesize(Tool::AddLayer, id, &mut stamps);
            if layer.removed {
                synthesize(Tool::RemoveLayer, id, &mut stamps);
            }
        }
    }

    let decoder = Decoder {
        history: &record.history,
        offset: u32::try_from(synthesized.len()).unwrap_or(u32::MAX),
    };
    let mut actions: Vec<Action> = synthesized;
    let mut undo: Vec<Stroke> = vec![(0..actions.len()).filter_map(ActionID::next_for_len).collect()];
    // A leading stroke of layer setup belongs to the base stroke. Anything else stays undoable on its own.
    let first_stroke = record.history.first().map(|entry| entry.stroke);
    let setup_only = record
        .history
        .iter()
        .take_while(|entry| Some(entry.stroke) == first_stroke)
        .all(|entry| matches!(entry.tool, ToolKind::AddLayer | ToolKind::RemoveLayer));
    let joins_base = undo[0].is_empty() || setup_only;
    let mut current_stroke = None;
    for (i, entry) in record.history.iter().enumerate() {
        let tool = decoder.tool(i, entry.tool, &entry.properties)?;
        let mut flags = ActionFlags::empty();
        flags.set(ActionFlags::REMOVED, entry.removed);
        let Some(id) = ActionID::next_for_len(actions.len()) else {
            break;
        };
        actions.push(Action {
            tool,
            color: entry.color,
            brush: stamps.get(entry.brush.size, entry.brush.shape),
            mode: entry.mode,
            layer: LayerID::from_index(entry.layer_id),
            flags,
        });
        match current_stroke {
            Some(stroke) if stroke == entry.stroke => (),
            None if joins_base => (),
            _ => undo.push(Stroke::default()),
        }
        current_stroke = Some(entry.stroke);
        if let Some(stroke) = undo.last_mut() {
            stroke.0.push(id);
        }
    }
    log::debug!(
        "loaded {} layer(s), {} stroke(s) of {} action(s), {} brush stamp(s)",
        layers.len(),
        undo.len(),
        actions.len(),
        stamps.len()
    );

    let info = DocumentInfo {
        name,
        path: None,
        size: [width, height],
        created: timestamp,
    };
    let timeline = Timeline::from_parts(actions, undo, Vec::new());
    Ok(Document::from_parts(info, layers, timeline))
}

pub fn load_document(path: impl AsRef<Path>) -> Result<Document, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let mut document = from_json(&text)?;
    let info = document.info_mut();
    info.path = Some(path.to_owned());
    if let Some(stem) = path.file_stem() {
        info.name = stem.to_string_lossy().into_owned();
    }
    Ok(document)
}

#[cfg(test)]
mod test {
    use super::{from_json, to_json, LoadError};
    use crate::{
        brush::BrushShape,
        commands::{ActionFlags, Tool},
        geometry::Point,
        raster::Ellipse,
        state::{context::DrawContext, Document},
        Color,
    };

    const RED: Color = Color::opaque(255, 0, 0);

    fn sample() -> Document {
        let mut document = Document::new("sample", 16, 16);
        let mut context = DrawContext {
            color: RED,
            brush_size: 2,
            brush_shape: BrushShape::Square,
            ..DrawContext::default()
        };
        let line = document
            .write_with(&mut context, |writer| {
                writer.drag_to(Point::new(1, 1))?;
                writer.drag_to(Point::new(8, 3))
            })
            .unwrap()
            .unwrap();
        context.color = Color::opaque(0, 0, 255);
        document
            .write_with(&mut context, |writer| {
                writer.add_layer("ink");
                writer.ellipse(Ellipse::rotated(Point::new(8, 8), [6, 3], 0.5))?;
                writer.cubic_curve([
                    Point::new(0, 15),
                    Point::new(4, 0),
                    Point::new(12, 15),
                    Point::new(15, 0),
                ])
            })
            .unwrap();
        document
            .write_with(&mut context, |writer| {
                writer.modify(
                    line,
                    Tool::Line {
                        from: Point::new(1, 1),
                        to: Point::new(14, 3),
                    },
                )?;
                writer.change_color(line, Color::opaque(0, 255, 0))
            })
            .unwrap();
        document
            .write_with(&mut context, |writer| writer.fill(Point::new(0, 0)))
            .unwrap();
        document
    }

    #[test]
    fn save_load_replays_same() {
        let document = sample();
        let json = to_json(&document).unwrap();
        let loaded = from_json(&json).unwrap();
        assert_eq!(loaded.layers().len(), 2);
        assert_eq!(loaded.timeline().undo_stack().len(), 5);
        assert_eq!(
            loaded.composite(Color::WHITE).as_bytes(),
            document.composite(Color::WHITE).as_bytes()
        );
        for ((_, a), (_, b)) in loaded.layers().iter().zip(document.layers().iter()) {
            assert_eq!(a, b);
        }
        // Saving again gives the same document.
        assert_eq!(to_json(&loaded).unwrap(), json);
    }
    #[test]
    fn undone_strokes_not_saved() {
        let mut document = sample();
        assert!(document.undo());
        assert!(document.undo());
        let loaded = from_json(&to_json(&document).unwrap()).unwrap();
        assert_eq!(loaded.timeline().undo_stack().len(), 3);
        assert!(!loaded.timeline().can_redo());
        assert_eq!(
            loaded.composite(Color::WHITE).as_bytes(),
            document.composite(Color::WHITE).as_bytes()
        );
    }
    #[test]
    fn points_are_triples() {
        let json: serde_json::Value = serde_json::from_str(&to_json(&sample()).unwrap()).unwrap();
        let entry = &json["history"][1];
        assert_eq!(entry["tool"], "draw");
        assert_eq!(entry["properties"]["points"], serde_json::json!([[1, 1, 2]]));
        assert_eq!(entry["layerId"], 0);
        assert_eq!(json["history"][2]["tool"], "line");
    }
    #[test]
    fn synthesizes_base_stroke() {
        let json = serde_json::json!({
            "metadata": { "version": 1, "timestamp": "2024-03-01T12:00:00Z", "width": 4, "height": 4 },
            "layers": [
                { "name": "a", "kind": "raster" },
                { "name": "b", "kind": "raster", "removed": true },
            ],
            "history": [
                { "tool": "draw", "properties": { "points": [[1, 1, 1]] }, "color": [255, 0, 0, 255], "layerId": 0, "stroke": 3 },
                { "tool": "draw", "properties": { "points": [[2, 2, 1]] }, "color": [255, 0, 0, 255], "layerId": 1, "stroke": 4 },
                { "tool": "remove", "properties": { "target": 0 }, "color": [255, 0, 0, 255], "layerId": 0, "stroke": 4 },
            ],
        });
        let mut document = from_json(&json.to_string()).unwrap();
        // AddLayer a, AddLayer b, RemoveLayer b. Both saved strokes follow on their own.
        let undo = document.timeline().undo_stack();
        assert_eq!(undo.len(), 3);
        assert_eq!(undo[0].len(), 3);
        assert_eq!(document.timeline().action(undo[2].ids()[1]).unwrap().tool, Tool::Remove {
            target: crate::commands::ActionID::from_index(3)
        });
        assert!(document.layers().iter().nth(1).unwrap().1.removed);
        assert_eq!(document.active_layer().index(), 0);
        assert_eq!(document.composite(Color::TRANSPARENT).pixels().iter().filter(|c| !c.is_transparent()).count(), 0);

        assert!(document.undo());
        assert_eq!(document.composite(Color::TRANSPARENT).get(Point::new(1, 1)), Some(RED));
        assert!(document.undo());
        assert_eq!(document.composite(Color::TRANSPARENT).get(Point::new(1, 1)), Some(Color::TRANSPARENT));
        assert!(!document.undo());
        assert!(document
            .timeline()
            .actions()
            .iter()
            .all(|action| !action.flags.contains(ActionFlags::REMOVED)));
    }
    #[test]
    fn first_stroke_undoable_with_synthesized_layers() {
        let json = serde_json::json!({
            "metadata": { "version": 1, "timestamp": "2024-03-01T12:00:00Z", "width": 4, "height": 4 },
            "layers": [{ "name": "a", "kind": "raster" }],
            "history": [
                { "tool": "draw", "properties": { "points": [[1, 1, 1]] }, "color": [255, 0, 0, 255], "layerId": 0, "stroke": 0 },
                { "tool": "draw", "properties": { "points": [[2, 2, 1]] }, "color": [255, 0, 0, 255], "layerId": 0, "stroke": 1 },
            ],
        });
        let mut document = from_json(&json.to_string()).unwrap();
        assert_eq!(document.timeline().undo_stack().len(), 3);
        assert!(document.undo());
        assert!(document.undo());
        let image = document.composite(Color::TRANSPARENT);
        assert_eq!(image.get(Point::new(1, 1)), Some(Color::TRANSPARENT));
        assert_eq!(image.get(Point::new(2, 2)), Some(Color::TRANSPARENT));
        assert!(!document.undo());
        assert_eq!(document.layers().len(), 1);
    }
    #[test]
    fn no_layers_gets_background() {
        let json = r#"{"metadata":{"version":1,"timestamp":"2024-03-01T12:00:00Z","width":2,"height":2},"layers":[],"history":[]}"#;
        let document = from_json(json).unwrap();
        assert_eq!(document.layers().len(), 1);
        assert!(document.layers().get(document.active_layer()).unwrap().is_raster());
    }
    #[test]
    fn load_errors() {
        assert!(matches!(from_json("{"), Err(LoadError::Json(_))));
        match from_json(r#"{"layers": []}"#) {
            Err(LoadError::Invalid(report)) => {
                assert_eq!(report.missing, ["metadata", "history"]);
            }
            other => panic!("expected invalid, got {other:?}"),
        }
        let header = r#""metadata":{"version":1,"timestamp":"2024-03-01T12:00:00Z","width":2,"height":2},"layers":[{"name":"a","kind":"raster"}]"#;
        let newer = r#"{"metadata":{"version":9,"timestamp":"2024-03-01T12:00:00Z","width":2,"height":2},"layers":[],"history":[]}"#;
        assert!(matches!(from_json(newer), Err(LoadError::UnsupportedVersion(9))));
        let forward = format!(
            r#"{{{header},"history":[{{"tool":"remove","properties":{{"target":0}},"color":[0,0,0,255],"layerId":0,"stroke":0}}]}}"#
        );
        assert!(matches!(
            from_json(&forward),
            Err(LoadError::DanglingTarget { entry: 0, target: 0 })
        ));
        let short = format!(
            r#"{{{header},"history":[{{"tool":"line","properties":{{"points":[[0,0,1]]}},"color":[0,0,0,255],"layerId":0,"stroke":0}}]}}"#
        );
        assert!(matches!(
            from_json(&short),
            Err(LoadError::PointCount {
                entry: 0,
                expected: 2,
                found: 1
            })
        ));
        let missing = format!(
            r#"{{{header},"history":[{{"tool":"replace","properties":{{}},"color":[0,0,0,255],"layerId":0,"stroke":0}}]}}"#
        );
        assert!(matches!(
            from_json(&missing),
            Err(LoadError::Property { entry: 0, name: "from", .. })
        ));
    }
}
