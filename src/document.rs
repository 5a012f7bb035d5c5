//! Remote document tree model
//!
//! Serde types for the payloads the Figma API returns from the file and
//! image endpoints. The tree is deserialized once per run and treated as
//! immutable afterwards. Unknown node and paint types map to opaque
//! variants so new server-side types never break parsing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Node types the classifier distinguishes.
///
/// Anything the API sends that is not listed here lands on [`NodeType::Other`]
/// and is treated as opaque (walked, never classified).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    /// Document root
    Document,
    /// Page-level container
    Canvas,
    /// Reusable component definition
    Component,
    /// Placed instance of a component
    Instance,
    /// Frame container
    Frame,
    /// Group container
    Group,
    /// Vector shape
    Vector,
    /// Boolean combination of vector shapes
    BooleanOperation,
    /// Star shape
    Star,
    /// Polygon shape
    Polygon,
    /// Ellipse shape
    Ellipse,
    /// Rectangle shape
    Rectangle,
    /// Any type this crate does not interpret
    #[default]
    #[serde(other)]
    Other,
}

impl NodeType {
    /// True for the shape types counted by the vector-composition heuristic.
    #[must_use]
    pub fn is_vector_shape(self) -> bool {
        matches!(
            self,
            NodeType::Vector
                | NodeType::BooleanOperation
                | NodeType::Star
                | NodeType::Polygon
                | NodeType::Ellipse
                | NodeType::Rectangle
        )
    }
}

/// Paint kind for fill and stroke entries.
///
/// Only `IMAGE` paints carry usable bitmap references; every other kind
/// (solid, gradient, ...) is opaque here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaintType {
    /// Bitmap paint referencing an uploaded image
    Image,
    /// Any other paint kind
    #[default]
    #[serde(other)]
    Other,
}

/// One entry of a node's `fills` or `strokes` array.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paint {
    /// Paint kind; bitmap extraction only considers [`PaintType::Image`]
    #[serde(rename = "type", default)]
    pub paint_type: PaintType,

    /// Reference token of the backing bitmap, if any
    #[serde(default)]
    pub image_ref: Option<String>,
}

/// One entry of a node's `effects` array.
///
/// Effects qualify for extraction on `imageRef` presence alone; their type
/// is deliberately not modeled.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    /// Reference token of the backing bitmap, if any
    #[serde(default)]
    pub image_ref: Option<String>,
}

/// Axis-aligned bounding box in absolute coordinates.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Width in pixels
    #[serde(default)]
    pub width: f64,
    /// Height in pixels
    #[serde(default)]
    pub height: f64,
}

/// One element of the remote document's node tree.
///
/// Children are owned by their parent: the document is a strict tree with
/// no cycles or shared ownership.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNode {
    /// Remote-assigned identifier (typically `page:index` shaped)
    #[serde(default)]
    pub id: String,

    /// Free-text layer name
    #[serde(default)]
    pub name: String,

    /// Node type
    #[serde(rename = "type", default)]
    pub node_type: NodeType,

    /// Fill paints, in paint order
    #[serde(default)]
    pub fills: Vec<Paint>,

    /// Stroke paints, in paint order
    #[serde(default)]
    pub strokes: Vec<Paint>,

    /// Effects, in application order
    #[serde(default)]
    pub effects: Vec<Effect>,

    /// Export presets attached in the editor; contents are opaque, only
    /// presence matters to the classifier
    #[serde(default)]
    pub export_settings: Option<Vec<serde_json::Value>>,

    /// Absolute bounding box; absent for unpositioned nodes
    #[serde(default)]
    pub absolute_bounding_box: Option<BoundingBox>,

    /// Child nodes, in document order
    #[serde(default)]
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    /// True when the node carries at least one export preset.
    ///
    /// An empty `exportSettings` array counts as absent, matching the API's
    /// habit of sending `[]` for nodes that never had presets.
    #[must_use]
    pub fn has_export_settings(&self) -> bool {
        self.export_settings.as_ref().is_some_and(|s| !s.is_empty())
    }
}

/// Response of `GET /v1/files/{file_key}`.
#[derive(Clone, Debug, Deserialize)]
pub struct FileResponse {
    /// Document title
    #[serde(default)]
    pub name: String,

    /// Root of the node tree
    pub document: DocumentNode,
}

/// Response of `GET /v1/images/{file_key}`.
///
/// The server maps every requested id to either a download URL or `null`;
/// a `null` (or missing) entry is a per-id miss, not an error.
#[derive(Clone, Debug, Deserialize)]
pub struct ImagesResponse {
    /// Requested id to rendered-image URL
    #[serde(default)]
    pub images: HashMap<String, Option<String>>,

    /// Server-side error note, if any
    #[serde(default)]
    pub err: Option<String>,
}
