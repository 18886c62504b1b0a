//! Structural checks on a document before anything is built from it.
//!
//! Validation never fails: every problem found is collected into a [`ValidationReport`] naming the offending
//! field by its path, like `history[3].layerId`.

use std::str::FromStr;

use serde_json::Value;

use crate::commands::ToolKind;

/// Every problem found in a document. Empty if the document can be loaded.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct ValidationReport {
    /// Required fields that are absent.
    pub missing: Vec<String>,
    /// Fields that are present but have the wrong type or an out-of-range value.
    pub invalid: Vec<String>,
}
impl ValidationReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }
    /// Record `field` as missing or invalid, depending on whether it's there at all.
    fn check(&mut self, value: Option<&Value>, field: impl Into<String>, valid: impl FnOnce(&Value) -> bool) {
        match value {
            None | Some(Value::Null) => self.missing.push(field.into()),
            Some(value) if !valid(value) => self.invalid.push(field.into()),
            Some(_) => (),
        }
    }
}
impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_ok() {
            return write!(f, "no problems");
        }
        if !self.missing.is_empty() {
            write!(f, "missing: {}", self.missing.join(", "))?;
        }
        if !self.invalid.is_empty() {
            if !self.missing.is_empty() {
                write!(f, "; ")?;
            }
            write!(f, "invalid: {}", self.invalid.join(", "))?;
        }
        Ok(())
    }
}

fn is_index(value: &Value) -> bool {
    value.as_u64().is_some_and(|v| u32::try_from(v).is_ok())
}
fn is_color(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|channels| channels.len() == 4 && channels.iter().all(|c| c.as_u64().is_some_and(|c| c <= 255)))
}

/// Check the parts of a document every loader relies on.
#[must_use]
pub fn validate(document: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();
    let metadata = document.get("metadata");
    report.check(metadata, "metadata", Value::is_object);
    if let Some(metadata) = metadata.filter(|m| m.is_object()) {
        report.check(metadata.get("version"), "metadata.version", |v| v.is_u64());
        report.check(metadata.get("timestamp"), "metadata.timestamp", |v| {
            v.as_str()
                .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok())
        });
        for dimension in ["width", "height"] {
            report.check(metadata.get(dimension), format!("metadata.{dimension}"), is_index);
        }
    }

    let layers = document.get("layers");
    report.check(layers, "layers", Value::is_array);
    let layer_count = layers.and_then(Value::as_array).map_or(0, Vec::len);
    for (i, layer) in layers.and_then(Value::as_array).into_iter().flatten().enumerate() {
        report.check(layer.get("name"), format!("layers[{i}].name"), Value::is_string);
        report.check(layer.get("kind"), format!("layers[{i}].kind"), |kind| {
            matches!(kind.as_str(), Some("raster" | "reference"))
        });
    }

    let history = document.get("history");
    report.check(history, "history", Value::is_array);
    for (i, entry) in history.and_then(Value::as_array).into_iter().flatten().enumerate() {
        report.check(entry.get("tool"), format!("history[{i}].tool"), |tool| {
            tool.as_str().is_some_and(|tool| ToolKind::from_str(tool).is_ok())
        });
        report.check(entry.get("properties"), format!("history[{i}].properties"), Value::is_object);
        report.check(entry.get("color"), format!("history[{i}].color"), is_color);
        report.check(entry.get("layerId"), format!("history[{i}].layerId"), |id| {
            id.as_u64()
                .is_some_and(|id| usize::try_from(id).is_ok_and(|id| id < layer_count))
        });
        report.check(entry.get("stroke"), format!("history[{i}].stroke"), is_index);
        if let Some(removed) = entry.get("removed") {
            if !removed.is_boolean() {
                report.invalid.push(format!("history[{i}].removed"));
            }
        }
    }
    report
}

#[cfg(test)]
mod test {
    use super::validate;
    use serde_json::json;

    fn minimal() -> serde_json::Value {
        json!({
            "metadata": {
                "version": 1,
                "timestamp": "2024-03-01T12:00:00Z",
                "name": "doc",
                "width": 4,
                "height": 4,
            },
            "layers": [{ "name": "Background", "kind": "raster" }],
            "history": [{
                "tool": "addLayer",
                "properties": {},
                "color": [0, 0, 0, 255],
                "layerId": 0,
                "stroke": 0,
            }],
        })
    }

    #[test]
    fn accepts_minimal() {
        let report = validate(&minimal());
        assert!(report.is_ok(), "{report}");
    }
    #[test]
    fn names_missing_fields() {
        let report = validate(&json!({ "metadata": {} }));
        assert_eq!(
            report.missing,
            [
                "metadata.version",
                "metadata.timestamp",
                "metadata.width",
                "metadata.height",
                "layers",
                "history"
            ]
        );
        assert!(report.invalid.is_empty());
        let report = validate(&json!([]));
        assert_eq!(report.missing, ["metadata", "layers", "history"]);
    }
    #[test]
    fn names_invalid_fields() {
        let mut document = minimal();
        document["metadata"]["timestamp"] = json!("yesterday");
        document["history"][0]["tool"] = json!("smudge");
        document["history"][0]["layerId"] = json!(1);
        document["history"][0]["color"] = json!([0, 0, 256, 0]);
        document["layers"] = json!([{ "name": "Background", "kind": "raster" }]);
        let report = validate(&document);
        assert!(report.missing.is_empty());
        assert_eq!(
            report.invalid,
            [
                "metadata.timestamp",
                "history[0].tool",
                "history[0].color",
                "history[0].layerId"
            ]
        );
        assert_eq!(
            report.to_string(),
            "invalid: metadata.timestamp, history[0].tool, history[0].color, history[0].layerId"
        );
    }
}
