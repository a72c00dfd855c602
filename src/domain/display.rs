//! Outline rendering of a template for terminal display.

use termtree::Tree;

use crate::domain::node::{Content, Node};
use crate::domain::template::Template;

const SUMMARY_LEN: usize = 32;

pub trait TreeDisplay {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeDisplay for Node {
    fn to_tree_string(&self) -> Tree<String> {
        let label = match summary(self) {
            Some(text) => format!("{} [{}] {:?}", self.kind_name(), self.id(), text),
            None => format!("{} [{}]", self.kind_name(), self.id()),
        };
        let leaves: Vec<_> = self.children().iter().map(|c| c.to_tree_string()).collect();
        Tree::new(label).with_leaves(leaves)
    }
}

impl TreeDisplay for Template {
    fn to_tree_string(&self) -> Tree<String> {
        let root = format!("template (v{}, {} nodes)", self.version(), self.node_count());
        let leaves: Vec<_> = self.children().iter().map(|c| c.to_tree_string()).collect();
        Tree::new(root).with_leaves(leaves)
    }
}

fn summary(node: &Node) -> Option<String> {
    let text = match node.content() {
        Content::Header(text) | Content::Text(text) => text.as_str(),
        Content::Image(image) => image.alt.as_str(),
        Content::Button(button) => button.text.as_str(),
        _ => return None,
    };
    Some(text.chars().take(SUMMARY_LEN).collect())
}
