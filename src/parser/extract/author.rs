use crate::parser::dom::Node;
use crate::parser::error::ExtractError;
use crate::parser::query::search_all;

/// Sender name: text of the header's first link. Messages sent by the archive
/// owner carry no link, so they get `self_label`.
pub fn extract(
    header: Option<&Node>,
    link_tag: &str,
    self_label: &str,
) -> Result<String, ExtractError> {
    let Some(header) = header else {
        return Ok(self_label.to_string());
    };

    let links = search_all(header, |node| node.tag() == Some(link_tag));
    let Some(first) = links.first() else {
        return Ok(self_label.to_string());
    };

    first
        .children()
        .first()
        .and_then(Node::text_value)
        .map(|name| name.trim().to_string())
        .ok_or(ExtractError::MissingAuthorText)
}
