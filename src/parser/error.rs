use thiserror::Error;

/// Failure extracting one message. Never crosses the message boundary: the
/// page extractor drops the record and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("header link has no text")]
    MissingAuthorText,

    #[error("date line {fragment:?} has no day/month/year/time stamp")]
    MalformedDate { fragment: String },

    #[error("unrecognized month abbreviation {month:?}")]
    UnrecognizedMonth { month: String },
}

impl ExtractError {
    pub fn is_unrecognized_month(&self) -> bool {
        matches!(self, ExtractError::UnrecognizedMonth { .. })
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unknown encoding label {label:?}")]
    UnknownEncoding { label: String },
}
