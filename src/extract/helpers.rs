// Node navigation helpers shared by the extraction passes.

use tree_sitter::Node;

/// Find a direct child node by its kind.
pub(super) fn find_child_by_kind<'a>(node: &Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

/// Find a node of the given kind within a bounded depth, including the node
/// itself. Directive internals sit at most a couple of levels deep; the bound
/// keeps the search from descending into unrelated bodies.
pub(super) fn find_descendant_by_kind<'a>(
    node: &Node<'a>,
    kind: &str,
    max_depth: usize,
) -> Option<Node<'a>> {
    if node.kind() == kind {
        return Some(*node);
    }
    if max_depth == 0 {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_descendant_by_kind(&child, kind, max_depth - 1) {
            return Some(found);
        }
    }
    None
}

/// Get the source text of a node, bounds-checked against the file content.
pub(super) fn node_text(node: &Node, source: &str) -> String {
    let bytes = source.as_bytes();
    let start = node.start_byte();
    let end = node.end_byte();
    if start >= bytes.len() || end > bytes.len() {
        return String::new();
    }
    String::from_utf8_lossy(&bytes[start..end]).to_string()
}
