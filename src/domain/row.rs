//! Raw row model
//!
//! A [`Row`] is one record of the source file as handed over by the row
//! stream: its 1-based ordinal plus the raw field strings in column order.

/// One row of the source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based position of the row among the data rows of the file
    pub ordinal: u64,

    /// Raw field values in column order
    pub fields: Vec<String>,
}

impl Row {
    /// Creates a new row
    pub fn new(ordinal: u64, fields: Vec<String>) -> Self {
        Self { ordinal, fields }
    }

    /// Returns the field at `index`, or an empty string when the row is short
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_access() {
        let row = Row::new(3, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(row.ordinal, 3);
        assert_eq!(row.field(0), "a");
        assert_eq!(row.field(1), "b");
    }

    #[test]
    fn test_missing_field_is_empty() {
        let row = Row::new(1, vec!["a".to_string()]);
        assert_eq!(row.field(6), "");
    }
}
