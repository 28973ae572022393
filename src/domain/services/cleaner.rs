use crate::domain::model::{Record, Table};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Which columns get which normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningRules {
    pub drop_columns: Vec<String>,
    pub trim_columns: Vec<String>,
    pub title_case_columns: Vec<String>,
    pub email_column: Option<String>,
    pub email_domain_column: String,
    pub date_columns: Vec<String>,
}

impl Default for CleaningRules {
    fn default() -> Self {
        let names = |cols: &[&str]| cols.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        Self {
            drop_columns: names(&["Index"]),
            trim_columns: names(&["First Name", "Last Name", "Company", "City", "Country"]),
            title_case_columns: names(&["City", "Country"]),
            email_column: Some("Email".to_string()),
            email_domain_column: "Email Domain".to_string(),
            date_columns: names(&["Subscription Date"]),
        }
    }
}

/// Row-wise normalization of a customer export.
#[derive(Debug, Clone, Default)]
pub struct CustomerCleaner {
    rules: CleaningRules,
}

impl CustomerCleaner {
    pub fn new(rules: CleaningRules) -> Self {
        Self { rules }
    }

    pub fn clean(&self, table: Table) -> Table {
        let Table { columns, rows } = table;

        let mut columns: Vec<String> = columns
            .into_iter()
            .filter(|c| !self.rules.drop_columns.contains(c))
            .collect();

        let email_column = self
            .rules
            .email_column
            .as_ref()
            .filter(|email| columns.contains(email))
            .cloned();
        if email_column.is_some() && !columns.contains(&self.rules.email_domain_column) {
            columns.push(self.rules.email_domain_column.clone());
        }

        let rows = rows
            .into_iter()
            .map(|row| self.clean_row(row, email_column.as_deref()))
            .collect();

        Table::new(columns, rows)
    }

    fn clean_row(&self, mut row: Record, email_column: Option<&str>) -> Record {
        for column in &self.rules.drop_columns {
            row.data.shift_remove(column);
        }

        for column in &self.rules.trim_columns {
            if let Some(value) = row.data.get_mut(column) {
                *value = Value::String(text(value).trim().to_string());
            }
        }

        for column in &self.rules.title_case_columns {
            if let Some(value) = row.data.get_mut(column) {
                *value = Value::String(title_case(&text(value)));
            }
        }

        if let Some(email_column) = email_column {
            let email = row
                .data
                .get(email_column)
                .map(|v| text(v).trim().to_lowercase())
                .unwrap_or_default();
            let domain = email_domain(&email).to_string();
            row.data.insert(email_column.to_string(), Value::String(email));
            row.data
                .insert(self.rules.email_domain_column.clone(), Value::String(domain));
        }

        for column in &self.rules.date_columns {
            if let Some(value) = row.data.get_mut(column) {
                *value = coerce_datetime(&text(value))
                    .map(Value::String)
                    .unwrap_or(Value::Null);
            }
        }

        row
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_word = false;
    for ch in input.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

/// Everything after the last `@`; the whole string when there is none.
pub fn email_domain(email: &str) -> &str {
    email.rsplit('@').next().unwrap_or(email)
}

/// Parse a date or datetime in one of the common export formats.
///
/// Dates render as `YYYY-MM-DD`, datetimes with a time of day as
/// `YYYY-MM-DD HH:MM:SS`. Unparseable input yields `None`.
pub fn coerce_datetime(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let parsed = DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })?;

    if parsed.time() == NaiveTime::MIN {
        Some(parsed.format("%Y-%m-%d").to_string())
    } else {
        Some(parsed.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn customers() -> Table {
        let rows = vec![
            json!({
                "Index": "1",
                "First Name": "  Sheryl ",
                "Last Name": "Baxter",
                "Company": " Rasmussen Group",
                "City": "east leonard",
                "Country": "CHILE ",
                "Email": "  Zunigavanessa@Smith.info ",
                "Subscription Date": "2020-08-24"
            }),
            json!({
                "Index": "2",
                "First Name": "Preston",
                "Last Name": "Lozano ",
                "Company": "Vega-Gentry",
                "City": "EAST JIMMYCHESTER",
                "Country": "djibouti",
                "Email": "vmata@colon.com",
                "Subscription Date": "not a date"
            }),
        ];
        let rows: Vec<Record> = rows
            .into_iter()
            .map(|v| match v {
                Value::Object(data) => Record::new(data),
                _ => unreachable!(),
            })
            .collect();
        Table::from_records(rows)
    }

    #[test]
    fn test_clean_customers() {
        let table = CustomerCleaner::default().clean(customers());

        assert_eq!(
            table.columns,
            vec![
                "First Name",
                "Last Name",
                "Company",
                "City",
                "Country",
                "Email",
                "Subscription Date",
                "Email Domain"
            ]
        );

        let first = &table.rows[0];
        assert_eq!(first.get("Index"), None);
        assert_eq!(first.get("First Name"), Some(&json!("Sheryl")));
        assert_eq!(first.get("Company"), Some(&json!("Rasmussen Group")));
        assert_eq!(first.get("City"), Some(&json!("East Leonard")));
        assert_eq!(first.get("Country"), Some(&json!("Chile")));
        assert_eq!(first.get("Email"), Some(&json!("zunigavanessa@smith.info")));
        assert_eq!(first.get("Email Domain"), Some(&json!("smith.info")));
        assert_eq!(first.get("Subscription Date"), Some(&json!("2020-08-24")));

        let second = &table.rows[1];
        assert_eq!(second.get("City"), Some(&json!("East Jimmychester")));
        assert_eq!(second.get("Subscription Date"), Some(&Value::Null));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("SAINT-ÉTIENNE"), "Saint-Étienne");
        assert_eq!(title_case("o'neil"), "O'Neil");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_email_domain() {
        assert_eq!(email_domain("a@b.com"), "b.com");
        assert_eq!(email_domain("a@b@c.org"), "c.org");
        assert_eq!(email_domain("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn test_coerce_datetime() {
        assert_eq!(coerce_datetime("2021-05-24"), Some("2021-05-24".to_string()));
        assert_eq!(coerce_datetime("05/24/2021"), Some("2021-05-24".to_string()));
        assert_eq!(
            coerce_datetime("2021-05-24 13:45:00"),
            Some("2021-05-24 13:45:00".to_string())
        );
        assert_eq!(
            coerce_datetime("2024-01-15T10:30:00Z"),
            Some("2024-01-15 10:30:00".to_string())
        );
        assert_eq!(coerce_datetime("2021-02-30"), None);
        assert_eq!(coerce_datetime(""), None);
    }

    #[test]
    fn test_missing_email_column_adds_no_domain() {
        let rules = CleaningRules {
            email_column: Some("Mail".to_string()),
            ..CleaningRules::default()
        };
        let table = CustomerCleaner::new(rules).clean(customers());
        assert!(!table.columns.iter().any(|c| c == "Email Domain"));
    }
}
