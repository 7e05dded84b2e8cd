use crate::ConfigNode;

/// Depth-first, pre-order iterator over a forest: each node before its subtree, each subtree
/// before the following sibling.
pub struct PreOrder<'a> {
    stack: Vec<std::slice::Iter<'a, ConfigNode>>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a ConfigNode;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(node) => {
                    if !node.children.is_empty() {
                        self.stack.push(node.children.iter());
                    }
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

pub fn preorder(forest: &[ConfigNode]) -> PreOrder<'_> {
    PreOrder {
        stack: vec![forest.iter()],
    }
}

pub fn count_nodes(forest: &[ConfigNode]) -> usize {
    forest.iter().map(ConfigNode::subtree_len).sum()
}

/// Indented text rendering of a forest: two spaces per depth level, sections suffixed with `/`.
pub fn outline(forest: &[ConfigNode]) -> String {
    let mut out = String::new();
    for node in preorder(forest) {
        for _ in 0..node.depth {
            out.push_str("  ");
        }
        out.push_str(&node.id);
        if node.is_section() {
            out.push('/');
        }
        out.push('\n');
    }
    out
}
