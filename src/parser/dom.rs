use scraper::{ElementRef, Html};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
}

// Subtrees are torn down with an explicit stack, not one frame per level.
impl Drop for Element {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            if let Node::Element(el) = &mut node {
                pending.append(&mut el.children);
            }
        }
    }
}

/// Parsed markup node. Either an element with (possibly empty) children or a
/// leaf text node; each child is owned by exactly one parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    #[allow(dead_code)]
    pub fn element(tag: &str, attrs: &[(&str, &str)], children: Vec<Node>) -> Self {
        Node::Element(Element {
            tag: tag.to_string(),
            attrs: attrs
                .iter()
                .map(|(name, value)| Attribute {
                    name: name.to_string(),
                    value: value.to_string(),
                })
                .collect(),
            children,
        })
    }

    #[allow(dead_code)]
    pub fn text(value: &str) -> Self {
        Node::Text(value.to_string())
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Element(el) => Some(&el.tag),
            Node::Text(_) => None,
        }
    }

    pub fn text_value(&self) -> Option<&str> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn attrs(&self) -> &[Attribute] {
        match self {
            Node::Element(el) => &el.attrs,
            Node::Text(_) => &[],
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(el) => &el.children,
            Node::Text(_) => &[],
        }
    }
}

/// Convert a parsed HTML document into the extraction tree, rooted at `<html>`.
/// Comments, doctypes and processing instructions are dropped. Built with an
/// explicit stack, so nesting depth never maps to call-stack depth.
pub fn from_html(document: &Html) -> Node {
    let root = document.root_element();
    let mut root_children = Vec::new();
    let mut root_pending = root.children();
    // (element, converted children so far, children still to visit)
    let mut open = Vec::new();

    loop {
        let (children, pending) = match open.last_mut() {
            Some((_, children, pending)) => (children, pending),
            None => (&mut root_children, &mut root_pending),
        };

        match pending.next() {
            Some(child) => match child.value() {
                scraper::Node::Text(text) => children.push(Node::Text((**text).to_string())),
                scraper::Node::Element(_) => {
                    if let Some(element) = ElementRef::wrap(child) {
                        open.push((element, Vec::new(), element.children()));
                    }
                }
                _ => {}
            },
            None => match open.pop() {
                Some((element, children, _)) => {
                    let node = element_node(element, children);
                    match open.last_mut() {
                        Some((_, siblings, _)) => siblings.push(node),
                        None => root_children.push(node),
                    }
                }
                None => break,
            },
        }
    }

    element_node(root, root_children)
}

fn element_node(element: ElementRef<'_>, children: Vec<Node>) -> Node {
    Node::Element(Element {
        tag: element.value().name().to_string(),
        attrs: element
            .value()
            .attrs()
            .map(|(name, value)| Attribute {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect(),
        children,
    })
}
