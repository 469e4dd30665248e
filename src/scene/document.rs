use super::{ComputedStyle, ElementId, ElementSnapshot, ElementTree, LogicalRect, SceneTree, Viewport};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// JSON-документ сцены.
///
/// ```json
/// {
///   "viewport": { "width": 1280, "height": 720 },
///   "device_pixel_ratio": 1.0,
///   "children": [
///     { "tag": "button", "classes": ["primary"],
///       "bounds": { "left": 10, "top": 10, "width": 80, "height": 24 } }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default = "default_pixel_ratio")]
    pub device_pixel_ratio: f64,
    #[serde(default)]
    pub children: Vec<ElementDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ElementDocument {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub style: ComputedStyle,
    #[serde(default)]
    pub bounds: LogicalRect,
    #[serde(default)]
    pub children: Vec<ElementDocument>,
}

fn default_pixel_ratio() -> f64 {
    1.0
}

impl SceneDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn into_tree(self) -> Result<SceneTree> {
        let mut tree = SceneTree::new(self.viewport, self.device_pixel_ratio);
        let root = tree.root();

        let mut stack: Vec<(ElementId, ElementDocument)> =
            self.children.into_iter().rev().map(|child| (root, child)).collect();

        while let Some((parent, doc)) = stack.pop() {
            let mut snapshot = ElementSnapshot::new(ElementId(0), &doc.tag);
            snapshot.html_id = doc.id;
            snapshot.classes = doc.classes.into_iter().collect();
            snapshot.style = doc.style;
            snapshot.bounds = doc.bounds;

            let id = tree.insert(parent, snapshot)?;
            stack.extend(doc.children.into_iter().rev().map(|child| (id, child)));
        }

        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::PointerEvents;

    const SCENE: &str = r#"{
        "viewport": { "width": 640, "height": 480 },
        "device_pixel_ratio": 2.0,
        "children": [
            { "tag": "DIV", "id": "panel", "classes": ["card"],
              "style": { "background-color": "rgba(0, 0, 0, 0.5)" },
              "bounds": { "left": 10, "top": 20, "width": 100, "height": 50 },
              "children": [
                  { "tag": "button", "style": { "pointer-events": "none" } }
              ] },
            { "tag": "canvas" }
        ]
    }"#;

    #[test]
    fn test_document_into_tree() {
        let tree = SceneDocument::from_json(SCENE).unwrap().into_tree().unwrap();
        assert_eq!(tree.viewport(), Viewport { width: 640.0, height: 480.0 });
        assert_eq!(tree.device_pixel_ratio(), 2.0);

        let ids = tree.descendants(tree.root());
        assert_eq!(ids.len(), 3);

        let panel = tree.snapshot(ids[0]).unwrap();
        assert_eq!(panel.tag, "div");
        assert_eq!(panel.html_id.as_deref(), Some("panel"));
        assert!(panel.has_class("card"));
        assert_eq!(panel.bounds.width, 100.0);

        let button = tree.snapshot(ids[1]).unwrap();
        assert_eq!(button.tag, "button");
        assert_eq!(button.style.pointer_events, PointerEvents::None);

        assert_eq!(tree.snapshot(ids[2]).unwrap().tag, "canvas");
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let doc = SceneDocument::from_json("{}").unwrap();
        assert_eq!(doc.device_pixel_ratio, 1.0);
        assert_eq!(doc.viewport, Viewport::default());
        assert!(doc.children.is_empty());
    }

    #[test]
    fn test_invalid_json_is_scene_error() {
        let err = SceneDocument::from_json("{ not json").unwrap_err();
        assert!(matches!(err, crate::error::RegionError::Scene(_)));
    }
}
