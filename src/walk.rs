//! Document tree traversal
//!
//! One depth-first pre-order pass over the tree, accumulating the raw
//! bitmap references and the exportable-node projections the resolver
//! consumes. Classification of a single node lives in
//! [`classify`](crate::classify); this module only drives it.

use crate::classify::{extract_image_references, is_exportable};
use crate::document::DocumentNode;
use crate::types::{ExportableNode, ImageReference};

/// Everything one traversal of the document tree produces.
#[derive(Clone, Debug, Default)]
pub struct WalkOutcome {
    /// Raw bitmap references in discovery order (duplicates preserved;
    /// deduplication is the resolver's job)
    pub image_refs: Vec<ImageReference>,

    /// Exportable-node projections in discovery order
    pub exportable_nodes: Vec<ExportableNode>,
}

/// Walk the document tree and classify every node below the root.
///
/// The root itself is a container, not content: classification starts at
/// its top-level children. Traversal is pre-order and visits every node
/// exactly once. Descent does NOT stop at exportable nodes — their children
/// are still classified and can appear in the outcome as overlapping
/// sub-images, matching the upstream behavior this crate reproduces.
///
/// Uses an explicit work stack, so depth is bounded by heap rather than
/// call stack.
#[must_use]
pub fn walk(document: &DocumentNode) -> WalkOutcome {
    let mut outcome = WalkOutcome::default();

    tracing::debug!(
        top_level = document.children.len(),
        "walking document tree"
    );

    // Reversed pushes keep sibling order: the stack pops left-to-right.
    let mut stack: Vec<&DocumentNode> = document.children.iter().rev().collect();

    while let Some(node) = stack.pop() {
        outcome.image_refs.extend(extract_image_references(node));

        if is_exportable(node) {
            tracing::debug!(node = %node.name, id = %node.id, "node is exportable");
            outcome.exportable_nodes.push(ExportableNode::from_node(node));
        }

        stack.extend(node.children.iter().rev());
    }

    tracing::debug!(
        image_refs = outcome.image_refs.len(),
        exportable_nodes = outcome.exportable_nodes.len(),
        "walk complete"
    );

    outcome
}
