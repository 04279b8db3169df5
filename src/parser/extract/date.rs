use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

use crate::parser::dom::Node;
use crate::parser::error::ExtractError;
use crate::parser::query::search_all;

// ", 5 мар 2020" somewhere in the fragment marks a date line rather than a
// status or nickname line. Digits are ASCII only; `\d` would accept any
// Unicode decimal digit.
static DATE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r", [0-9]{1,2} \S{2,3} [0-9]{4}").unwrap());
static DATE_STAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{1,2}) ([^0-9]{3}) ([0-9]{4})[^0-9]+?([0-9]{1,2}):([0-9]{1,2}):([0-9]{1,2})")
        .unwrap()
});

/// Calendar timestamp as written in the archive: local time, no zone, no
/// range checks. Field order gives chronological `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Timestamp {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

pub const RU_MONTHS: [&str; 12] = [
    "янв", "фев", "мар", "апр", "мая", "июн", "июл", "авг", "сен", "окт", "ноя", "дек",
];

/// Month abbreviations, January first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthTable([String; 12]);

impl MonthTable {
    pub fn new(names: [String; 12]) -> Self {
        MonthTable(names)
    }

    /// 1-based month number.
    pub fn lookup(&self, abbrev: &str) -> Option<u32> {
        self.0
            .iter()
            .position(|m| m == abbrev)
            .map(|idx| idx as u32 + 1)
    }
}

impl Default for MonthTable {
    fn default() -> Self {
        MonthTable(RU_MONTHS.map(String::from))
    }
}

/// First-stage match: the header text fragment that carries the date.
pub struct DateLine<'a>(&'a str);

impl<'a> DateLine<'a> {
    pub fn find(header: &'a Node) -> Option<Self> {
        search_all(header, Node::is_text)
            .into_iter()
            .filter_map(Node::text_value)
            .find(|text| DATE_LINE_RE.is_match(text))
            .map(DateLine)
    }

    pub fn stamp(&self) -> Result<DateStamp<'a>, ExtractError> {
        DATE_STAMP_RE
            .captures(self.0)
            .map(DateStamp)
            .ok_or_else(|| ExtractError::MalformedDate {
                fragment: self.0.trim().to_string(),
            })
    }
}

/// Second-stage match: `day month year ... H:M:S` captured inside a date line.
pub struct DateStamp<'a>(Captures<'a>);

impl DateStamp<'_> {
    pub fn month(&self) -> &str {
        &self.0[2]
    }

    pub fn resolve(&self, months: &MonthTable) -> Result<Timestamp, ExtractError> {
        let month = months
            .lookup(self.month())
            .ok_or_else(|| ExtractError::UnrecognizedMonth {
                month: self.month().to_string(),
            })?;

        Ok(Timestamp {
            year: self.number(3)?,
            month,
            day: self.number(1)?,
            hour: self.number(4)?,
            minute: self.number(5)?,
            second: self.number(6)?,
        })
    }

    fn number<T: std::str::FromStr>(&self, group: usize) -> Result<T, ExtractError> {
        self.0[group].parse().map_err(|_| ExtractError::MalformedDate {
            fragment: self.0[0].to_string(),
        })
    }
}

/// Date of a message from its header. `Ok(None)` when the header is missing or
/// carries no date line at all.
pub fn extract(header: Option<&Node>, months: &MonthTable) -> Result<Option<Timestamp>, ExtractError> {
    let Some(line) = header.and_then(DateLine::find) else {
        return Ok(None);
    };
    line.stamp()?.resolve(months).map(Some)
}
