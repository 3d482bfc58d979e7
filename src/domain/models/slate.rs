//! Rich-text node tree for reminder mail bodies.
//!
//! Update bodies are stored as a nested slate document. Rendering walks
//! the tree, wraps known container types in their HTML tags, and entity
//! escapes every text leaf. Unknown or empty types emit no wrapping tag.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Nodes(pub Vec<Node>);

fn tag(kind: &str) -> Option<&'static str> {
    match kind {
        "title" => Some("h3"),
        "paragraph" => Some("p"),
        "unordered-list" => Some("ul"),
        "list-item" => Some("li"),
        _ => None,
    }
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

fn render(node: &Node, styles: &HashMap<String, String>, out: &mut String) {
    let tag = tag(&node.kind);

    if let Some(t) = tag {
        match styles.get(&node.kind) {
            Some(style) => {
                out.push('<');
                out.push_str(t);
                out.push_str(" style=\"");
                out.push_str(style);
                out.push_str("\">");
            }
            None => {
                out.push('<');
                out.push_str(t);
                out.push('>');
            }
        }
    }

    for child in &node.children {
        if child.text.is_empty() {
            render(child, styles, out);
        } else {
            escape_into(&child.text, out);
        }
    }

    if let Some(t) = tag {
        out.push_str("</");
        out.push_str(t);
        out.push('>');
    }
}

impl Node {
    pub fn to_html(&self, styles: &HashMap<String, String>) -> String {
        let mut out = String::new();
        render(self, styles, &mut out);
        out
    }
}

impl Nodes {
    pub fn to_html(&self, styles: &HashMap<String, String>) -> String {
        let root = Node {
            children: self.0.clone(),
            ..Node::default()
        };
        root.to_html(styles)
    }
}
