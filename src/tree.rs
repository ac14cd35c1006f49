use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::mods::ModStore;
use crate::{statics, tags, unresolved};

/// Stable handle of a node inside one `CodeTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupNode {
    pub name: String,
    /// HTML-subset note, multiple notes joined with a separator.
    pub note: Option<String>,
    pub popup_notes: Vec<String>,
    /// Opened by a `^4 = FILE:` directive rather than `!name`.
    pub is_file: bool,
}

impl GroupNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn append_note(&mut self, note: &str, separator: &str) {
        match &mut self.note {
            Some(existing) => {
                existing.push_str(separator);
                existing.push_str(note);
            }
            None => self.note = Some(note.to_string()),
        }
    }
}

/// One code entry. `raw_template` never changes after parsing; the resolver
/// only rewrites `working_text`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CodeNode {
    pub base_name: String,
    raw_template: String,
    pub working_text: String,
    pub note: Option<String>,
    pub popup_notes: Vec<String>,
    /// Title -> display label, in first-applied order.
    pub applied_labels: IndexMap<String, String>,
}

impl CodeNode {
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            ..Default::default()
        }
    }

    pub fn raw_template(&self) -> &str {
        &self.raw_template
    }

    pub(crate) fn push_line(&mut self, line: &str) {
        for text in [&mut self.raw_template, &mut self.working_text] {
            if !text.is_empty() {
                text.push_str(statics::NL_LF);
            }
            text.push_str(line);
        }
    }

    /// Back to the parsed template with no labels applied.
    pub fn reset(&mut self) {
        self.working_text = self.raw_template.clone();
        self.applied_labels.clear();
    }

    /// Record a label for a substitution. A label with the same title replaces
    /// the earlier one in place.
    pub fn apply_label(&mut self, display_label: &str) {
        let key = tags::label_key(display_label);
        self.applied_labels.insert(key, display_label.to_string());
    }

    pub fn display_name(&self) -> String {
        if self.applied_labels.is_empty() {
            return self.base_name.clone();
        }
        let labels: Vec<&str> = self.applied_labels.values().map(String::as_str).collect();
        format!("{} [{}]", self.base_name, labels.join(", "))
    }

    pub fn has_unresolved(&self, mods: &ModStore) -> bool {
        unresolved::has_unresolved(&self.working_text, mods)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Group(GroupNode),
    Code(CodeNode),
}

#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
    /// This node or something below it still needs user input.
    pub has_mod: bool,
}

impl Node {
    pub fn name(&self) -> &str {
        match &self.kind {
            NodeKind::Group(g) => &g.name,
            NodeKind::Code(c) => &c.base_name,
        }
    }

    pub fn note(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Group(g) => g.note.as_deref(),
            NodeKind::Code(c) => c.note.as_deref(),
        }
    }

    pub fn popup_notes(&self) -> &[String] {
        match &self.kind {
            NodeKind::Group(g) => &g.popup_notes,
            NodeKind::Code(c) => &c.popup_notes,
        }
    }

    pub fn badges(&self) -> Badges {
        Badges {
            has_mod: self.has_mod,
            has_note: self.note().is_some_and(|n| !n.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Badges {
    pub has_mod: bool,
    pub has_note: bool,
}

impl fmt::Display for Badges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.has_mod {
            parts.push(statics::BADGE_MOD);
        }
        if self.has_note {
            parts.push(statics::BADGE_NOTE);
        }
        f.write_str(&parts.join(" "))
    }
}

/// Group/code forest under a synthetic root. Nodes are never removed, so a
/// `NodeId` stays valid for the life of the tree.
#[derive(Debug, Clone, Serialize)]
pub struct CodeTree {
    nodes: Vec<Node>,
}

impl CodeTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Group(GroupNode::new(root_name)),
                has_mod: false,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            kind,
            has_mod: false,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn add_group(&mut self, parent: NodeId, group: GroupNode) -> NodeId {
        self.push(parent, NodeKind::Group(group))
    }

    pub fn add_code(&mut self, parent: NodeId, code: CodeNode) -> NodeId {
        self.push(parent, NodeKind::Code(code))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn group(&self, id: NodeId) -> Option<&GroupNode> {
        match &self.get(id)?.kind {
            NodeKind::Group(g) => Some(g),
            NodeKind::Code(_) => None,
        }
    }

    pub fn group_mut(&mut self, id: NodeId) -> Option<&mut GroupNode> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::Group(g) => Some(g),
            NodeKind::Code(_) => None,
        }
    }

    pub fn code(&self, id: NodeId) -> Option<&CodeNode> {
        match &self.get(id)?.kind {
            NodeKind::Code(c) => Some(c),
            NodeKind::Group(_) => None,
        }
    }

    pub fn code_mut(&mut self, id: NodeId) -> Option<&mut CodeNode> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::Code(c) => Some(c),
            NodeKind::Group(_) => None,
        }
    }

    /// All node ids below the root, depth first, in document order.
    pub fn walk(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(self.root()).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    pub fn codes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.walk()
            .into_iter()
            .filter(move |id| self.code(*id).is_some())
    }

    /// Depth below the root (direct children are depth 0).
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            if p == self.root() {
                break;
            }
            depth += 1;
            cur = self.parent(p);
        }
        depth
    }

    /// `Group/Sub/Code`, excluding the root.
    pub fn path(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut cur = Some(id);
        while let Some(node_id) = cur {
            if node_id == self.root() {
                break;
            }
            let Some(node) = self.get(node_id) else {
                break;
            };
            parts.push(node.name().to_string());
            cur = node.parent;
        }
        parts.reverse();
        parts.join("/")
    }

    pub fn find_by_path(&self, path: &str) -> Option<NodeId> {
        let wanted = path.trim_matches('/');
        self.walk().into_iter().find(|id| self.path(*id) == wanted)
    }

    pub fn badges(&self, id: NodeId) -> Badges {
        self.get(id).map(Node::badges).unwrap_or_default()
    }

    /// Recompute every `has_mod` flag, children before parents.
    pub fn refresh_badges(&mut self, mods: &ModStore) {
        // Children always have larger ids than their parents.
        for idx in (0..self.nodes.len()).rev() {
            let has_mod = match &self.nodes[idx].kind {
                NodeKind::Code(code) => code.has_unresolved(mods),
                NodeKind::Group(_) => self.nodes[idx]
                    .children
                    .iter()
                    .any(|c| self.nodes[c.0].has_mod),
            };
            self.nodes[idx].has_mod = has_mod;
        }
    }

    /// Recompute one code's flag after it changed, then its ancestors.
    pub fn refresh_badge(&mut self, id: NodeId, mods: &ModStore) {
        let Some(code) = self.code(id) else {
            return;
        };
        let has_mod = code.has_unresolved(mods);
        self.nodes[id.0].has_mod = has_mod;

        let mut cur = self.parent(id);
        while let Some(p) = cur {
            let has_mod = self.nodes[p.0]
                .children
                .iter()
                .any(|c| self.nodes[c.0].has_mod);
            self.nodes[p.0].has_mod = has_mod;
            cur = self.parent(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_label_replaces_same_title() {
        let mut code = CodeNode::new("Max HP");
        code.apply_label("HP: Max");
        code.apply_label("Speed: Fast");
        code.apply_label("HP: 9999");

        assert_eq!(code.applied_labels.len(), 2);
        assert_eq!(code.applied_labels.get("HP").map(String::as_str), Some("HP: 9999"));
        assert_eq!(code.display_name(), "Max HP [HP: 9999, Speed: Fast]");
    }

    #[test]
    fn reset_restores_template() {
        let mut code = CodeNode::new("X");
        code.push_line("20000000 [ATK]");
        code.push_line("20000004 00000000");
        code.working_text = "changed".to_string();
        code.apply_label("Medium");

        code.reset();
        assert_eq!(code.working_text, "20000000 [ATK]\n20000004 00000000");
        assert!(code.applied_labels.is_empty());
    }

    #[test]
    fn paths_and_walk_follow_document_order() {
        let mut tree = CodeTree::new("Game");
        let file = tree.add_group(tree.root(), GroupNode::new("Main"));
        let sub = tree.add_group(file, GroupNode::new("Stats"));
        let code = tree.add_code(sub, CodeNode::new("Max HP"));
        let other = tree.add_code(file, CodeNode::new("Moon Jump"));

        assert_eq!(tree.walk(), vec![file, sub, code, other]);
        assert_eq!(tree.path(code), "Main/Stats/Max HP");
        assert_eq!(tree.find_by_path("Main/Moon Jump"), Some(other));
        assert_eq!(tree.depth(code), 2);
    }

    #[test]
    fn badges_render_markers() {
        let badges = Badges {
            has_mod: true,
            has_note: true,
        };
        assert_eq!(badges.to_string(), "-M- -N-");
        assert_eq!(Badges::default().to_string(), "");
    }
}
