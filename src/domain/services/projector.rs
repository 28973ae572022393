use crate::domain::model::{RawRecord, Record, Table};
use crate::domain::services::path;
use std::collections::HashSet;

/// Projects raw nested records onto a declared, ordered set of dotted fields.
///
/// The output schema is the declared fields that were observed in at least one
/// record, in declared order. Declared fields nobody carries are dropped from
/// the schema rather than emitted as empty columns.
#[derive(Debug, Clone)]
pub struct RecordProjector {
    declared_fields: Vec<String>,
}

impl RecordProjector {
    pub fn new<I, S>(declared_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            declared_fields: declared_fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn declared_fields(&self) -> &[String] {
        &self.declared_fields
    }

    pub fn project(&self, records: Vec<RawRecord>) -> Table {
        if records.is_empty() {
            return Table::default();
        }

        let flattened: Vec<_> = records.iter().map(path::flatten_object).collect();
        drop(records);

        let observed: HashSet<&str> = flattened
            .iter()
            .flat_map(|flat| flat.keys().map(String::as_str))
            .collect();

        let mut columns: Vec<String> = Vec::new();
        for field in &self.declared_fields {
            if observed.contains(field.as_str()) && !columns.contains(field) {
                columns.push(field.clone());
            }
        }

        let dropped = self.declared_fields.len() - columns.len();
        if dropped > 0 {
            tracing::debug!(
                "Dropping {} declared field(s) absent from every record",
                dropped
            );
        }

        let rows = flattened
            .into_iter()
            .map(|mut flat| {
                let mut data = serde_json::Map::new();
                for column in &columns {
                    if let Some(value) = flat.remove(column) {
                        data.insert(column.clone(), value);
                    }
                }
                Record::new(data)
            })
            .collect();

        Table::new(columns, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn vacancies() -> Vec<Value> {
        vec![
            json!({
                "id": "1",
                "name": "Data Engineer",
                "employer": {"id": "10", "name": "Acme"},
                "salary": {"from": 1000, "to": 2000, "currency": "KZT"}
            }),
            json!({
                "id": "2",
                "name": "Analyst",
                "employer": {"id": "11", "name": "Globex"},
                "salary": null
            }),
        ]
    }

    #[test]
    fn test_project_keeps_declared_order_and_drops_unobserved() {
        let projector = RecordProjector::new([
            "id",
            "employer.name",
            "address.raw",
            "salary.from",
            "name",
        ]);

        let table = projector.project(vacancies());

        assert_eq!(table.columns, vec!["id", "employer.name", "salary.from", "name"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].get("salary.from"), Some(&json!(1000)));
        // Observed elsewhere, absent here: the cell is simply missing.
        assert_eq!(table.rows[1].get("salary.from"), None);
        assert_eq!(table.rows[1].get("employer.name"), Some(&json!("Globex")));
    }

    #[test]
    fn test_project_empty_input_has_no_columns() {
        let projector = RecordProjector::new(["id", "name"]);
        let table = projector.project(Vec::new());

        assert!(table.columns.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_rows_without_any_declared_field_are_kept() {
        let projector = RecordProjector::new(["id"]);
        let table = projector.project(vec![json!({"id": 1}), json!({"other": true})]);

        assert_eq!(table.columns, vec!["id"]);
        assert_eq!(table.len(), 2);
        assert!(table.rows[1].data.is_empty());
    }

    #[test]
    fn test_column_order_independent_of_record_order() {
        let projector = RecordProjector::new(["salary.currency", "id", "employer.id"]);

        let forward = projector.project(vacancies());
        let mut reversed_input = vacancies();
        reversed_input.reverse();
        let reversed = projector.project(reversed_input);

        assert_eq!(forward.columns, reversed.columns);
        assert_eq!(forward.columns, vec!["salary.currency", "id", "employer.id"]);
    }

    #[test]
    fn test_reprojecting_output_is_idempotent() {
        let projector = RecordProjector::new(["id", "employer.name", "salary.to", "missing"]);
        let first = projector.project(vacancies());

        let pseudo_records: Vec<Value> = first
            .rows
            .iter()
            .map(|row| Value::Object(row.data.clone()))
            .collect();
        let second = RecordProjector::new(first.columns.clone()).project(pseudo_records);

        assert_eq!(second.columns, first.columns);
        assert_eq!(second.rows, first.rows);
    }

    #[test]
    fn test_duplicate_declared_fields_emit_one_column() {
        let projector = RecordProjector::new(["id", "id"]);
        let table = projector.project(vec![json!({"id": 1})]);
        assert_eq!(table.columns, vec!["id"]);
    }
}
