//! Node classification heuristics
//!
//! Pure functions over a single [`DocumentNode`]: bitmap-reference
//! extraction and the exportability predicates. None of these recurse;
//! traversal belongs to [`walk`](crate::walk).
//!
//! Two exportability predicates coexist on purpose. [`is_exportable`] is the
//! narrow rule that gates the collection pipeline. [`should_export_as_unit`]
//! is a richer rule (export presets, icon-ish names, vector composition)
//! kept as an alternate policy; it is intentionally NOT wired into the
//! pipeline, and the two disagree on `INSTANCE` nodes among others.

use crate::document::{DocumentNode, NodeType, PaintType};
use crate::types::ImageReference;

/// Smallest width/height (inclusive) for a frame or group to count as
/// icon-sized
pub const MIN_ICON_DIMENSION: f64 = 16.0;

/// Largest width/height (inclusive) for a frame or group to count as
/// icon-sized
pub const MAX_ICON_DIMENSION: f64 = 512.0;

/// Fraction of vector-shaped children (exclusive lower bound) for a node to
/// count as a vector composition
const VECTOR_RATIO_THRESHOLD: f64 = 0.7;

/// Minimum child count for the vector-composition heuristic
const MIN_COMPOSITION_CHILDREN: usize = 2;

/// Name fragments that mark a frame or group as icon-like
const ICON_NAME_KEYWORDS: &[&str] = &["icon", "logo", "symbol", "badge", "button", "avatar"];

/// Collect the bitmap references this single node carries.
///
/// Scans `fills`, then `effects`, then `strokes`, in that order. Fill and
/// stroke entries qualify only when their paint type is `IMAGE`; effect
/// entries qualify on `imageRef` presence alone. Returned in encounter
/// order.
#[must_use]
pub fn extract_image_references(node: &DocumentNode) -> Vec<ImageReference> {
    let mut refs = Vec::new();

    for paint in &node.fills {
        if paint.paint_type == PaintType::Image
            && let Some(image_ref) = &paint.image_ref
        {
            tracing::debug!(node = %node.name, reference = %image_ref, "found image in fills");
            refs.push(ImageReference::new(image_ref.clone()));
        }
    }

    for effect in &node.effects {
        if let Some(image_ref) = &effect.image_ref {
            tracing::debug!(node = %node.name, reference = %image_ref, "found image in effects");
            refs.push(ImageReference::new(image_ref.clone()));
        }
    }

    for paint in &node.strokes {
        if paint.paint_type == PaintType::Image
            && let Some(image_ref) = &paint.image_ref
        {
            tracing::debug!(node = %node.name, reference = %image_ref, "found image in strokes");
            refs.push(ImageReference::new(image_ref.clone()));
        }
    }

    refs
}

/// The predicate that gates the export list.
///
/// Components are always exportable; frames and groups only when
/// icon-sized. Everything else, `INSTANCE` included, never is.
#[must_use]
pub fn is_exportable(node: &DocumentNode) -> bool {
    match node.node_type {
        NodeType::Component => true,
        NodeType::Frame | NodeType::Group => is_icon_sized(node),
        _ => false,
    }
}

/// Richer exportability rule, kept as an alternate policy.
///
/// Accepts everything [`is_exportable`] accepts, plus instances, plus
/// frames/groups with export presets, icon-like names, or a
/// vector-composition shape. Not used by the collection pipeline.
#[must_use]
pub fn should_export_as_unit(node: &DocumentNode) -> bool {
    match node.node_type {
        NodeType::Component | NodeType::Instance => true,
        NodeType::Frame | NodeType::Group => {
            if is_icon_sized(node) {
                return true;
            }
            if node.has_export_settings() {
                tracing::debug!(node = %node.name, id = %node.id, "node has export presets");
                return true;
            }
            if has_icon_keyword_name(node) {
                tracing::debug!(node = %node.name, "node name looks icon-like");
                return true;
            }
            is_vector_composition(node)
        }
        _ => false,
    }
}

/// True when the node's bounds fit the icon size window.
///
/// A node with no bounding box is assumed icon-sized. Both bounds are
/// inclusive: 16x16 and 512x512 qualify, 15 and 513 do not.
#[must_use]
pub fn is_icon_sized(node: &DocumentNode) -> bool {
    match &node.absolute_bounding_box {
        Some(bounds) => {
            (MIN_ICON_DIMENSION..=MAX_ICON_DIMENSION).contains(&bounds.width)
                && (MIN_ICON_DIMENSION..=MAX_ICON_DIMENSION).contains(&bounds.height)
        }
        None => true,
    }
}

/// True when the node is mostly built from vector shapes.
///
/// Requires at least [`MIN_COMPOSITION_CHILDREN`] children and a
/// vector-shaped fraction strictly above [`VECTOR_RATIO_THRESHOLD`]. A
/// single vector child is not a composition.
#[must_use]
pub fn is_vector_composition(node: &DocumentNode) -> bool {
    let total = node.children.len();
    if total == 0 {
        return false;
    }

    let vector_count = node
        .children
        .iter()
        .filter(|child| child.node_type.is_vector_shape())
        .count();

    #[allow(clippy::cast_precision_loss)]
    let vector_ratio = vector_count as f64 / total as f64;

    if vector_ratio > VECTOR_RATIO_THRESHOLD && total >= MIN_COMPOSITION_CHILDREN {
        tracing::debug!(
            node = %node.name,
            vector_count,
            total,
            "node is a vector composition"
        );
        return true;
    }
    false
}

fn has_icon_keyword_name(node: &DocumentNode) -> bool {
    let name = node.name.to_lowercase();
    ICON_NAME_KEYWORDS
        .iter()
        .any(|keyword| name.contains(keyword))
}
