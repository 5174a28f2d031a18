/// Opaque handle to a node on a [`RenderSurface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct NodeId(pub u32);

/// Structural role of a node. Backends may use it to pick an element type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Surface root that scenes are attached to.
    Root,
    /// Scene container.
    Scene,
    /// Scene photo.
    Media,
    /// Photo credit line.
    Credit,
    /// Timed text block.
    Text,
    /// Positioned callout.
    Callout,
}

/// Retained node tree the lifecycle manager builds scenes on.
///
/// Mutators on a node that no longer exists are no-ops, mirroring how a detached element
/// tolerates writes. Only attaching to a missing parent is reported, because it means the
/// scene structure would never become visible.
pub trait RenderSurface: Send {
    /// Attachment point for scene roots. `None` when the surface is not ready for content.
    fn root(&self) -> Option<NodeId>;

    fn create_node(&mut self, kind: NodeKind) -> NodeId;

    /// Append `child` to `parent`. Returns `false` when `parent` does not exist.
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool;

    /// Remove `id` and its subtree. Removing a missing node is a no-op.
    fn remove_node(&mut self, id: NodeId);

    /// Add (`on = true`) or remove a class.
    fn set_class(&mut self, id: NodeId, class: &str, on: bool);

    fn set_style(&mut self, id: NodeId, prop: &str, value: &str);

    /// Replace the node's markup content.
    fn set_content(&mut self, id: NodeId, html: &str);

    fn set_attr(&mut self, id: NodeId, name: &str, value: &str);

    fn node_exists(&self, id: NodeId) -> bool;

    fn has_class(&self, id: NodeId, class: &str) -> bool;
}
