pub mod author;
pub mod date;
pub mod text;

use serde::Serialize;

use super::dom::Node;
use super::error::ExtractError;
use super::query::{find_by_class, find_first, has_class};
use date::{MonthTable, Timestamp};

pub const MESSAGE_CLASS: &str = "message";
pub const MESSAGE_HEADER_CLASS: &str = "message__header";
pub const SELF_LABEL: &str = "You";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    pub text: String,
    pub author: String,
    pub date: Option<Timestamp>,
}

/// Markup dialect and locale the extractor is tuned for.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub message_class: String,
    pub header_class: String,
    pub link_tag: String,
    pub self_label: String,
    pub months: MonthTable,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        ExtractConfig {
            message_class: MESSAGE_CLASS.to_string(),
            header_class: MESSAGE_HEADER_CLASS.to_string(),
            link_tag: "a".to_string(),
            self_label: SELF_LABEL.to_string(),
            months: MonthTable::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFailure {
    /// Position of the message among the page's message nodes.
    pub index: usize,
    pub error: ExtractError,
}

#[derive(Debug, Clone, Default)]
pub struct PageReport {
    pub records: Vec<MessageRecord>,
    pub failures: Vec<MessageFailure>,
}

pub fn find_messages<'a>(document: &'a Node, message_class: &str) -> Vec<&'a Node> {
    find_by_class(document, message_class)
}

pub fn find_message_header<'a>(message: &'a Node, header_class: &str) -> Option<&'a Node> {
    find_first(message, |node| has_class(node, header_class))
}

pub struct Extractor {
    config: ExtractConfig,
}

impl Extractor {
    pub fn new(config: ExtractConfig) -> Self {
        Extractor { config }
    }

    pub fn extract_message(&self, message: &Node) -> Result<MessageRecord, ExtractError> {
        let header = find_message_header(message, &self.config.header_class);
        Ok(MessageRecord {
            text: text::extract(message, &self.config.header_class),
            author: author::extract(header, &self.config.link_tag, &self.config.self_label)?,
            date: date::extract(header, &self.config.months)?,
        })
    }

    /// Extract every message of a page in document order. A message that fails
    /// is dropped and reported; its siblings are unaffected.
    pub fn extract_page(&self, document: &Node) -> PageReport {
        let mut report = PageReport::default();
        for (index, message) in find_messages(document, &self.config.message_class)
            .into_iter()
            .enumerate()
        {
            match self.extract_message(message) {
                Ok(record) => report.records.push(record),
                Err(error) => report.failures.push(MessageFailure { index, error }),
            }
        }
        report
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::dom::from_html;
    use scraper::Html;

    fn parse(fixture: &str) -> Node {
        let html = std::fs::read_to_string(format!("tests/fixtures/{}.html", fixture)).unwrap();
        from_html(&Html::parse_document(&html))
    }

    fn message(header: Vec<Node>, body: Vec<Node>) -> Node {
        let mut children = vec![Node::element("div", &[("class", "message__header")], header)];
        children.extend(body);
        Node::element("div", &[("class", "message")], children)
    }

    #[test]
    fn header_is_first_in_preorder() {
        let msg = Node::element(
            "div",
            &[("class", "message")],
            vec![
                Node::element(
                    "div",
                    &[],
                    vec![Node::element("span", &[("class", "message__header")], vec![Node::text("first")])],
                ),
                Node::element("div", &[("class", "message__header")], vec![Node::text("second")]),
            ],
        );
        let header = find_message_header(&msg, MESSAGE_HEADER_CLASS).unwrap();
        assert_eq!(header.tag(), Some("span"));
        assert!(find_message_header(&Node::element("div", &[], vec![]), MESSAGE_HEADER_CLASS).is_none());
    }

    #[test]
    fn extracts_full_record() {
        let msg = message(
            vec![
                Node::element("a", &[("href", "https://vk.com/id1")], vec![Node::text("Иван")]),
                Node::text(", 5 мар 2020 в 13:02:07"),
            ],
            vec![Node::element("div", &[], vec![Node::text("Привет")])],
        );
        let record = Extractor::new(ExtractConfig::default()).extract_message(&msg).unwrap();
        assert_eq!(record.author, "Иван");
        assert_eq!(record.text, "Привет");
        assert_eq!(
            record.date,
            Some(Timestamp { year: 2020, month: 3, day: 5, hour: 13, minute: 2, second: 7 })
        );
    }

    #[test]
    fn message_without_header_uses_defaults() {
        let msg = Node::element("div", &[("class", "message")], vec![Node::text("orphan")]);
        let record = Extractor::new(ExtractConfig::default()).extract_message(&msg).unwrap();
        assert_eq!(record.author, SELF_LABEL);
        assert_eq!(record.date, None);
        assert_eq!(record.text, "orphan");
    }

    #[test]
    fn failing_message_dropped_siblings_kept() {
        let good = message(vec![Node::text("Вы, 1 янв 2021 в 0:00:00")], vec![Node::text("ok")]);
        let bad_author = message(
            vec![Node::element("a", &[], vec![])],
            vec![Node::text("lost")],
        );
        let bad_month = message(vec![Node::text(", 1 xyz 2021 в 0:00:00")], vec![Node::text("lost")]);
        let doc = Node::element("body", &[], vec![good.clone(), bad_author, bad_month, good]);

        let report = Extractor::new(ExtractConfig::default()).extract_page(&doc);
        assert_eq!(report.records.len(), 2);
        assert!(report.records.iter().all(|r| r.text == "ok"));
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(report.failures[0].error, ExtractError::MissingAuthorText);
        assert_eq!(report.failures[1].index, 2);
        assert!(report.failures[1].error.is_unrecognized_month());
    }

    #[test]
    fn page_without_messages_is_empty() {
        let doc = Node::element("body", &[], vec![Node::element("div", &[("class", "header")], vec![])]);
        let report = Extractor::new(ExtractConfig::default()).extract_page(&doc);
        assert!(report.records.is_empty());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn custom_class_tokens() {
        let config = ExtractConfig {
            message_class: "im-mess".to_string(),
            header_class: "im-mess--head".to_string(),
            ..ExtractConfig::default()
        };
        let doc = Node::element(
            "div",
            &[("class", "im-mess")],
            vec![
                Node::element("div", &[("class", "im-mess--head")], vec![Node::text("head")]),
                Node::text("body"),
            ],
        );
        let records = Extractor::new(config).extract_page(&doc).records;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "body");
    }

    #[test]
    fn record_serializes_with_null_date() {
        let record = MessageRecord {
            text: "hi".to_string(),
            author: "You".to_string(),
            date: None,
        };
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"text":"hi","author":"You","date":null}"#
        );
    }

    #[test]
    fn dialog_fixture() {
        let doc = parse("dialog");
        let records = Extractor::new(ExtractConfig::default()).extract_page(&doc).records;
        assert_eq!(records.len(), 4);

        assert_eq!(records[0].author, "Иван Петров");
        assert_eq!(records[0].text, "Привет! Как дела?");
        assert_eq!(
            records[0].date,
            Some(Timestamp { year: 2020, month: 3, day: 5, hour: 13, minute: 2, second: 7 })
        );

        assert_eq!(records[1].author, "You");
        assert_eq!(records[1].text, "Нормально.\nА у тебя?");
        assert_eq!(records[1].date.map(|d| d.minute), Some(5));

        // attachment description lives outside the header
        assert_eq!(records[2].author, "Иван Петров");
        assert!(records[2].text.contains("Фотография"));
        assert!(!records[2].text.contains("мая"));
        assert_eq!(records[2].date.map(|d| (d.month, d.day)), Some((5, 17)));

        assert_eq!(records[3].author, "You");
        assert_eq!(records[3].date, None);
        assert_eq!(records[3].text, "без даты");
    }
}
