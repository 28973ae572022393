use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record as the provider or input file delivered it: arbitrarily nested,
/// with no fixed schema across records.
pub type RawRecord = Value;

/// One batch of raw records returned by a single paginated request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub index: u32,
    pub records: Vec<RawRecord>,
    /// Total result count reported by the provider, when one is configured and present.
    pub total_found: Option<u64>,
}

impl Page {
    pub fn empty(index: u32) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A flat row: column name to scalar value, in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.data.get(column)
    }
}

/// Rows plus the final, ordered column set handed to the sink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self { columns, rows }
    }

    /// Columns in first-seen order across all rows.
    pub fn from_records(rows: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.data.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(data) => Record::new(data),
            _ => Record::default(),
        }
    }

    #[test]
    fn test_from_records_keeps_first_seen_column_order() {
        let table = Table::from_records(vec![
            record(json!({"b": 1, "a": 2})),
            record(json!({"a": 3, "c": 4})),
        ]);

        assert_eq!(table.columns, vec!["b", "a", "c"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_empty_page() {
        let page = Page::empty(3);
        assert_eq!(page.index, 3);
        assert!(page.is_empty());
        assert_eq!(page.total_found, None);
    }
}
