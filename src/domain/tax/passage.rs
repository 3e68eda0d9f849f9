//! Passage timestamps

use chrono::NaiveDateTime;

use crate::support::errors::{DomainError, DomainResult};

/// Wire format of a passage timestamp
pub const PASSAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const PASSAGE_LEN: usize = "yyyy-MM-dd HH:mm:ss".len();

/// Parse one `yyyy-MM-dd HH:mm:ss` timestamp. Surrounding whitespace is
/// ignored; anything else that deviates from the format is rejected,
/// including unpadded fields such as `2013-2-4 7:30:00`.
pub fn parse_passage(raw: &str) -> DomainResult<NaiveDateTime> {
    let trimmed = raw.trim();
    let malformed = |reason: String| DomainError::MalformedTimestamp {
        value: raw.to_string(),
        reason,
    };

    if trimmed.len() != PASSAGE_LEN {
        return Err(malformed(format!(
            "expected {} characters, got {}",
            PASSAGE_LEN,
            trimmed.len()
        )));
    }

    NaiveDateTime::parse_from_str(trimmed, PASSAGE_FORMAT).map_err(|e| malformed(e.to_string()))
}

/// Parse every timestamp, failing on the first malformed one.
pub fn parse_passages<S: AsRef<str>>(raw: &[S]) -> DomainResult<Vec<NaiveDateTime>> {
    raw.iter().map(|s| parse_passage(s.as_ref())).collect()
}
