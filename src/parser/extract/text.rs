use std::sync::LazyLock;

use regex::Regex;

use crate::parser::dom::Node;
use crate::parser::query::{has_class, search};

// A line break followed by indentation left over from the saved markup.
static WRAP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+\s+").unwrap());

/// Body of a message: every text node outside the header subtree.
pub fn extract(message: &Node, header_class: &str) -> String {
    let fragments: Vec<&str> = search(message, Node::is_text, |node| {
        !has_class(node, header_class)
    })
    .into_iter()
    .filter_map(Node::text_value)
    .collect();

    normalize(&join_fragments(&fragments))
}

pub fn join_fragments(fragments: &[&str]) -> String {
    fragments.join("\n\n")
}

pub fn normalize(joined: &str) -> String {
    WRAP_RE.replace_all(joined, "\n").trim().to_string()
}
