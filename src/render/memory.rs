use std::collections::{BTreeMap, BTreeSet};

use crate::render::surface::{NodeId, NodeKind, RenderSurface};

/// One mutation recorded by [`MemorySurface`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceOp {
    Create { id: NodeId, kind: NodeKind },
    Append { parent: NodeId, child: NodeId },
    Remove { id: NodeId },
    Class { id: NodeId, class: String, on: bool },
    Style { id: NodeId, prop: String, value: String },
    Content { id: NodeId },
    Attr { id: NodeId, name: String, value: String },
}

/// Node state held by [`MemorySurface`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemNode {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub classes: BTreeSet<String>,
    pub styles: BTreeMap<String, String>,
    pub attrs: BTreeMap<String, String>,
    pub content: String,
}

impl MemNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            classes: BTreeSet::new(),
            styles: BTreeMap::new(),
            attrs: BTreeMap::new(),
            content: String::new(),
        }
    }
}

/// Headless in-memory [`RenderSurface`] with an operation log.
///
/// Used by tests and by the CLI's headless playback.
#[derive(Clone, Debug)]
pub struct MemorySurface {
    nodes: BTreeMap<NodeId, MemNode>,
    root: Option<NodeId>,
    next_id: u32,
    ops: Vec<SurfaceOp>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    /// Surface with a root node ready for scenes.
    pub fn new() -> Self {
        let mut s = Self::detached();
        let root = s.alloc(NodeKind::Root);
        s.root = Some(root);
        s
    }

    /// Surface without a root; mounting on it fails.
    pub fn detached() -> Self {
        Self {
            nodes: BTreeMap::new(),
            root: None,
            next_id: 0,
            ops: Vec::new(),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&MemNode> {
        self.nodes.get(&id)
    }

    /// Children of `id` in attachment order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Live nodes of `kind`, in creation order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.kind == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn style(&self, id: NodeId, prop: &str) -> Option<&str> {
        self.nodes
            .get(&id)
            .and_then(|n| n.styles.get(prop))
            .map(String::as_str)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(&id)
            .and_then(|n| n.attrs.get(name))
            .map(String::as_str)
    }

    pub fn content(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(|n| n.content.as_str())
    }

    /// Number of live nodes, root included.
    pub fn live_count(&self) -> usize {
        self.nodes.len()
    }

    /// Mutations recorded so far.
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, MemNode::new(kind));
        id
    }

    fn detach(&mut self, id: NodeId) {
        let parent = self.nodes.get(&id).and_then(|n| n.parent);
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|c| *c != id);
        }
    }
}

impl RenderSurface for MemorySurface {
    fn root(&self) -> Option<NodeId> {
        self.root
    }

    fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.alloc(kind);
        self.ops.push(SurfaceOp::Create { id, kind });
        id
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if parent == child || !self.nodes.contains_key(&parent) || !self.nodes.contains_key(&child)
        {
            return false;
        }
        self.detach(child);
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(child);
        }
        self.ops.push(SurfaceOp::Append { parent, child });
        true
    }

    fn remove_node(&mut self, id: NodeId) {
        if !self.nodes.contains_key(&id) {
            return;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(n) = self.nodes.remove(&next) {
                stack.extend(n.children);
            }
        }
        if self.root == Some(id) {
            self.root = None;
        }
        self.ops.push(SurfaceOp::Remove { id });
    }

    fn set_class(&mut self, id: NodeId, class: &str, on: bool) {
        let Some(n) = self.nodes.get_mut(&id) else {
            return;
        };
        if on {
            n.classes.insert(class.to_string());
        } else {
            n.classes.remove(class);
        }
        self.ops.push(SurfaceOp::Class {
            id,
            class: class.to_string(),
            on,
        });
    }

    fn set_style(&mut self, id: NodeId, prop: &str, value: &str) {
        let Some(n) = self.nodes.get_mut(&id) else {
            return;
        };
        n.styles.insert(prop.to_string(), value.to_string());
        self.ops.push(SurfaceOp::Style {
            id,
            prop: prop.to_string(),
            value: value.to_string(),
        });
    }

    fn set_content(&mut self, id: NodeId, html: &str) {
        let Some(n) = self.nodes.get_mut(&id) else {
            return;
        };
        n.content = html.to_string();
        self.ops.push(SurfaceOp::Content { id });
    }

    fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(n) = self.nodes.get_mut(&id) else {
            return;
        };
        n.attrs.insert(name.to_string(), value.to_string());
        self.ops.push(SurfaceOp::Attr {
            id,
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn node_exists(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.nodes
            .get(&id)
            .is_some_and(|n| n.classes.contains(class))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/memory.rs"]
mod tests;
