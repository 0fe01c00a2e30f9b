use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// Column names of the vote file, in order.
pub const HEADER: [&str; 2] = ["ID", "Vote Choice"];

lazy_static! {
    static ref VOTER_ID: Regex = Regex::new(r"^[0-9]+$").unwrap();
}

/// One accepted submission as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteRecord {
    pub id: String,
    pub choice: String,
}

/// Result of a submission attempt. Callers must handle all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Duplicate,
    Invalid,
}

/// What the front end collected: an id and, if one was selected, a choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    pub id: String,
    pub choice: Option<String>,
}

impl VoteRecord {
    pub fn new(id: impl Into<String>, choice: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            choice: choice.into(),
        }
    }
}

impl Ballot {
    pub fn new(id: impl Into<String>, choice: Option<String>) -> Self {
        Self {
            id: id.into(),
            choice,
        }
    }

    /// Builds the record this ballot would store, or `None` if it is invalid.
    pub fn to_record(&self) -> Option<VoteRecord> {
        if !is_valid_id(&self.id) {
            return None;
        }
        match self.choice.as_deref() {
            Some(choice) if !choice.is_empty() => Some(VoteRecord::new(self.id.clone(), choice)),
            _ => None,
        }
    }
}

/// Voter ids are one or more ASCII decimal digits, nothing else.
pub fn is_valid_id(id: &str) -> bool {
    VOTER_ID.is_match(id)
}

/// True if `line`, minus its line terminator, is byte-for-byte the header.
pub fn is_header_line(line: &str) -> bool {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    line == HEADER.join(",")
}

/// True if the fields name the header columns, ignoring surrounding whitespace.
///
/// Such a row is never a vote since ids are digits only, so readers skip it
/// wherever it appears.
pub fn is_header_fields<'a>(fields: impl IntoIterator<Item = &'a str>) -> bool {
    fields.into_iter().map(str::trim).eq(HEADER.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        assert!(is_valid_id("0"));
        assert!(is_valid_id("101"));
        assert!(is_valid_id("000123"));
    }

    #[test]
    fn test_invalid_ids() {
        for id in ["", "abc", "12a", " 101", "101 ", "-5", "1.0", "١٢٣", "12\n"] {
            assert!(!is_valid_id(id), "{:?} should be rejected", id);
        }
    }

    #[test]
    fn test_ballot_to_record() {
        let ballot = Ballot::new("101", Some("Alice".to_string()));
        assert_eq!(ballot.to_record(), Some(VoteRecord::new("101", "Alice")));

        assert_eq!(Ballot::new("101", None).to_record(), None);
        assert_eq!(Ballot::new("101", Some(String::new())).to_record(), None);
        assert_eq!(Ballot::new("x1", Some("Alice".to_string())).to_record(), None);
    }

    #[test]
    fn test_header_line_detection() {
        assert!(is_header_line("ID,Vote Choice"));
        assert!(is_header_line("ID,Vote Choice\r\n"));
        assert!(!is_header_line(""));
        assert!(!is_header_line("101,Alice"));
        assert!(!is_header_line("ID,Vote Choice,Extra"));
        assert!(!is_header_line("id,vote choice"));
        assert!(!is_header_line("ID,Vote Choice \n"));
        assert!(!is_header_line(" ID,Vote Choice"));
    }

    #[test]
    fn test_header_fields_ignore_padding() {
        assert!(is_header_fields(["ID", "Vote Choice"]));
        assert!(is_header_fields([" ID", "Vote Choice \r"]));
        assert!(!is_header_fields(["ID"]));
        assert!(!is_header_fields(["101", "Alice"]));
        assert!(!is_header_fields(["ID", "Vote Choice", ""]));
    }
}
