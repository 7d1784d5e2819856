//! Record domain model
//!
//! A [`Record`] is the business entity derived 1:1 from a valid row. Its
//! natural key is the pair (insurer number, insured number), which the store
//! enforces with a conditional write.

use super::ids::RunId;
use super::row::Row;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column positions of the record fields in a source row
pub mod columns {
    /// Insurer number
    pub const INSURER_NUMBER: usize = 0;
    /// Insured person's number
    pub const INSURED_NUMBER: usize = 1;
    /// Holder name
    pub const HOLDER_NAME: usize = 2;
    /// Postal address
    pub const ADDRESS: usize = 3;
    /// Date of birth
    pub const BIRTH_DATE: usize = 4;
    /// First day of validity
    pub const VALID_FROM: usize = 5;
    /// Last day of validity
    pub const VALID_UNTIL: usize = 6;
}

/// Parses a calendar date
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` (optionally with fractional
/// seconds) and RFC 3339 timestamps. Surrounding whitespace is ignored.
///
/// # Examples
///
/// ```
/// use sluice::domain::record::parse_calendar_date;
///
/// assert!(parse_calendar_date("1960-04-01").is_some());
/// assert!(parse_calendar_date("1960-04-01T09:30:00+09:00").is_some());
/// assert!(parse_calendar_date("1960-02-30").is_none());
/// ```
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(datetime.date());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|datetime| datetime.date_naive())
}

/// Natural uniqueness key of a record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    /// Insurer number
    pub insurer_number: String,
    /// Insured person's number
    pub insured_number: String,
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.insurer_number, self.insured_number)
    }
}

/// Validated business record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Insurer number (first half of the natural key)
    pub insurer_number: String,

    /// Insured person's number (second half of the natural key)
    pub insured_number: String,

    /// Holder name
    pub holder_name: String,

    /// Postal address
    pub address: String,

    /// Date of birth
    pub birth_date: NaiveDate,

    /// First day of validity
    pub valid_from: NaiveDate,

    /// Last day of validity
    pub valid_until: NaiveDate,

    /// Run that produced this record
    pub run_id: RunId,

    /// Row ordinal the record was read from
    pub row_ordinal: u64,
}

impl Record {
    /// Builds a record from a row that already passed validation
    ///
    /// # Errors
    ///
    /// Returns an error message if a date column cannot be parsed. This only
    /// happens when the row was not validated first.
    pub fn from_row(run_id: &RunId, row: &Row) -> Result<Self, String> {
        let date = |index: usize| {
            parse_calendar_date(row.field(index)).ok_or_else(|| {
                format!(
                    "row {}: column {} is not a calendar date: '{}'",
                    row.ordinal,
                    index + 1,
                    row.field(index)
                )
            })
        };

        Ok(Self {
            insurer_number: row.field(columns::INSURER_NUMBER).to_string(),
            insured_number: row.field(columns::INSURED_NUMBER).to_string(),
            holder_name: row.field(columns::HOLDER_NAME).to_string(),
            address: row.field(columns::ADDRESS).to_string(),
            birth_date: date(columns::BIRTH_DATE)?,
            valid_from: date(columns::VALID_FROM)?,
            valid_until: date(columns::VALID_UNTIL)?,
            run_id: run_id.clone(),
            row_ordinal: row.ordinal,
        })
    }

    /// Returns the natural uniqueness key
    pub fn key(&self) -> RecordKey {
        RecordKey {
            insurer_number: self.insurer_number.clone(),
            insured_number: self.insured_number.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> Row {
        Row::new(7, fields.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_parse_calendar_date_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(parse_calendar_date("2024-02-29"), Some(expected));
        assert_eq!(parse_calendar_date(" 2024-02-29 "), Some(expected));
        assert_eq!(parse_calendar_date("2024-02-29T23:59:59"), Some(expected));
        assert_eq!(parse_calendar_date("2024-02-29T23:59:59.250"), Some(expected));
        assert_eq!(parse_calendar_date("2024-02-29T10:00:00Z"), Some(expected));
    }

    #[test]
    fn test_parse_calendar_date_rejects_invalid() {
        assert!(parse_calendar_date("2023-02-29").is_none());
        assert!(parse_calendar_date("2024/02/01").is_none());
        assert!(parse_calendar_date("20240201").is_none());
        assert!(parse_calendar_date("").is_none());
    }

    #[test]
    fn test_record_from_row() {
        let run_id = RunId::new("R-1").unwrap();
        let record = Record::from_row(
            &run_id,
            &row(&[
                "123456",
                "0000012345",
                "Hanako Yamada",
                "1-2-3 Chiyoda, Tokyo",
                "1950-01-15",
                "2024-04-01",
                "2026-03-31",
            ]),
        )
        .unwrap();

        assert_eq!(record.insurer_number, "123456");
        assert_eq!(record.insured_number, "0000012345");
        assert_eq!(record.birth_date, NaiveDate::from_ymd_opt(1950, 1, 15).unwrap());
        assert_eq!(record.row_ordinal, 7);
        assert_eq!(record.key().to_string(), "123456/0000012345");
    }

    #[test]
    fn test_record_from_row_with_bad_date() {
        let run_id = RunId::new("R-1").unwrap();
        let result = Record::from_row(
            &run_id,
            &row(&["1", "2", "3", "4", "not-a-date", "2024-04-01", "2026-03-31"]),
        );
        assert!(result.unwrap_err().contains("column 5"));
    }
}
