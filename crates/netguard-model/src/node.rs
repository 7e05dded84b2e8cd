use crate::text;
use netguard_types::SourceLoc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Leaf command or block that owns children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Command,
    Section,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Command => "command",
            NodeKind::Section => "section",
        }
    }
}

/// One recognized unit of configuration (a command line or a block header).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigNode {
    /// Normalized command text used for selectors and checks.
    pub id: String,
    /// Source text exactly as it appeared.
    pub raw_text: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Quote-aware tokens of `id`.
    pub params: Vec<String>,
    #[serde(default)]
    pub children: Vec<ConfigNode>,
    pub loc: SourceLoc,
    /// Nesting depth assigned by the parser; 0 for top-level statements.
    #[serde(default)]
    pub depth: usize,
    /// Vendor provenance (the schema the node was parsed with).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
}

impl ConfigNode {
    /// Build a leaf from already-normalized text, tokenizing on whitespace and double quotes.
    pub fn command(id: &str) -> Self {
        Self::with_kind(NodeKind::Command, id)
    }

    /// Build a section from already-normalized text.
    pub fn section(id: &str, children: Vec<ConfigNode>) -> Self {
        let mut node = Self::with_kind(NodeKind::Section, id);
        for child in children {
            node.push_child(child);
        }
        node
    }

    fn with_kind(kind: NodeKind, id: &str) -> Self {
        let id = text::normalize_whitespace(id, &['"'], Some('\\'));
        Self {
            params: text::tokenize(&id, &['"'], Some('\\')),
            raw_text: id.clone(),
            id,
            kind,
            children: Vec::new(),
            loc: SourceLoc::new(1, 1),
            depth: 0,
            vendor: None,
        }
    }

    pub fn at(mut self, line: u32, col: u32) -> Self {
        self.loc = SourceLoc::new(line, col);
        self
    }

    pub fn with_vendor(mut self, vendor: &str) -> Self {
        self.stamp_vendor(vendor);
        self
    }

    fn stamp_vendor(&mut self, vendor: &str) {
        self.vendor = Some(vendor.to_string());
        for child in &mut self.children {
            child.stamp_vendor(vendor);
        }
    }

    /// Append a child, fixing up its depth (and its subtree's) relative to `self`.
    pub fn push_child(&mut self, mut child: ConfigNode) {
        child.set_depth(self.depth + 1);
        self.children.push(child);
    }

    fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
        for child in &mut self.children {
            child.set_depth(depth + 1);
        }
    }

    pub fn is_section(&self) -> bool {
        self.kind == NodeKind::Section
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// Case-insensitive, whitespace-normalized prefix test on `id`.
    pub fn id_starts_with(&self, prefix: &str) -> bool {
        text::starts_with_ignore_case(&self.id, prefix)
    }

    /// First direct child whose `id` starts with `prefix` (case-insensitive).
    pub fn child_with_prefix(&self, prefix: &str) -> Option<&ConfigNode> {
        self.children.iter().find(|c| c.id_starts_with(prefix))
    }

    /// All direct children whose `id` starts with `prefix` (case-insensitive).
    pub fn children_with_prefix<'s>(
        &'s self,
        prefix: &str,
    ) -> impl Iterator<Item = &'s ConfigNode> + use<'s> {
        let folded = text::fold_key(prefix);
        self.children
            .iter()
            .filter(move |c| text::starts_with_folded(&c.id, &folded))
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(ConfigNode::subtree_len).sum::<usize>()
    }
}
