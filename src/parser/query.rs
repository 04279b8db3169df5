use super::dom::Node;

/// Signal returned by a [`walk`] visitor for each node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    /// Do not descend into this node's children.
    SkipSubtree,
    /// End the traversal.
    Stop,
}

/// Pre-order traversal with an explicit stack, so markup depth never maps to
/// call-stack depth.
pub fn walk<'a, F>(root: &'a Node, mut visitor: F)
where
    F: FnMut(&'a Node) -> Visit,
{
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match visitor(node) {
            Visit::Continue => stack.extend(node.children().iter().rev()),
            Visit::SkipSubtree => {}
            Visit::Stop => return,
        }
    }
}

/// Collect nodes satisfying `matches`, in pre-order. A node for which
/// `descend` is false is neither matched nor traversed further.
pub fn search<'a, M, D>(root: &'a Node, matches: M, descend: D) -> Vec<&'a Node>
where
    M: Fn(&Node) -> bool,
    D: Fn(&Node) -> bool,
{
    let mut found = Vec::new();
    walk(root, |node| {
        if !descend(node) {
            return Visit::SkipSubtree;
        }
        if matches(node) {
            found.push(node);
        }
        Visit::Continue
    });
    found
}

/// First node in pre-order satisfying `matches`; traversal ends there.
pub fn find_first<'a, M>(root: &'a Node, matches: M) -> Option<&'a Node>
where
    M: Fn(&Node) -> bool,
{
    let mut found = None;
    walk(root, |node| {
        if matches(node) {
            found = Some(node);
            return Visit::Stop;
        }
        Visit::Continue
    });
    found
}

pub fn search_all<'a, M>(root: &'a Node, matches: M) -> Vec<&'a Node>
where
    M: Fn(&Node) -> bool,
{
    search(root, matches, |_| true)
}

/// Class tokens of a node. Repeated `class` attributes are joined before
/// splitting, first-seen order, duplicates kept.
pub fn classes_of(node: &Node) -> Vec<&str> {
    node.attrs()
        .iter()
        .filter(|attr| attr.name == "class")
        .flat_map(|attr| attr.value.split_whitespace())
        .collect()
}

pub fn has_class(node: &Node, name: &str) -> bool {
    classes_of(node).contains(&name)
}

pub fn find_by_class<'a>(root: &'a Node, name: &str) -> Vec<&'a Node> {
    search_all(root, |node| has_class(node, name))
}
