use crate::domain::model::{Record, Table};
use crate::domain::services::path;
use crate::utils::error::{EtlError, Result};
use serde_json::{Map, Value};

/// Column used for leaves that are not mappings.
pub const SCALAR_LEAF_COLUMN: &str = "value";

/// One output row: the leaf element's own fields plus the ancestor values
/// copied from the chain that led to it.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedRow {
    pub fields: Map<String, Value>,
    pub meta: Map<String, Value>,
}

#[derive(Debug, Clone)]
struct MetaField {
    column: String,
    level: usize,
    rest: Vec<String>,
}

/// Expands hierarchical documents along a repeating path.
///
/// With `record_path = ["projects", "tasks"]`, every task of every project of
/// every document becomes one row. Meta paths are dotted; their leading
/// segments that match the repeating path pick the ancestor they are read
/// from, so `projects.id` is the id of the enclosing project while
/// `employee_id` is read from the top-level document.
#[derive(Debug, Clone)]
pub struct TreeFlattener {
    record_path: Vec<String>,
    meta: Vec<MetaField>,
    record_prefix: String,
}

impl TreeFlattener {
    pub fn new<P, M, S, T>(record_path: P, meta_paths: M) -> Self
    where
        P: IntoIterator<Item = S>,
        M: IntoIterator<Item = T>,
        S: Into<String>,
        T: AsRef<str>,
    {
        let record_path: Vec<String> = record_path.into_iter().map(Into::into).collect();
        let meta = meta_paths
            .into_iter()
            .map(|meta_path| Self::meta_field(&record_path, meta_path.as_ref()))
            .collect();

        Self {
            record_path,
            meta,
            record_prefix: String::new(),
        }
    }

    /// Prefix prepended verbatim to every leaf column name.
    pub fn with_record_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.record_prefix = prefix.into();
        self
    }

    /// Prefix prepended verbatim to every meta column name.
    pub fn with_meta_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        for field in &mut self.meta {
            field.column = format!("{}{}", prefix.as_ref(), field.column);
        }
        self
    }

    fn meta_field(record_path: &[String], meta_path: &str) -> MetaField {
        let segments: Vec<String> = meta_path.split(path::SEPARATOR).map(String::from).collect();
        let max_level = record_path
            .len()
            .saturating_sub(1)
            .min(segments.len().saturating_sub(1));
        let level = segments
            .iter()
            .zip(record_path)
            .take(max_level)
            .take_while(|(segment, step)| segment == step)
            .count();

        MetaField {
            column: meta_path.to_string(),
            level,
            rest: segments[level..].to_vec(),
        }
    }

    pub fn record_path(&self) -> &[String] {
        &self.record_path
    }

    pub fn meta_columns(&self) -> impl Iterator<Item = &str> {
        self.meta.iter().map(|field| field.column.as_str())
    }

    /// Lazily expand `documents`, depth first, in document order.
    pub fn iter<'a>(&'a self, documents: &'a [Value]) -> FlattenIter<'a> {
        FlattenIter {
            flattener: self,
            documents: documents.iter(),
            ancestors: Vec::with_capacity(self.record_path.len()),
            frames: Vec::with_capacity(self.record_path.len()),
        }
    }

    pub fn flatten(&self, documents: &[Value]) -> Vec<FlattenedRow> {
        self.iter(documents).collect()
    }

    /// Flatten and tabulate: leaf columns in first-seen order, then meta
    /// columns in declared order.
    pub fn to_table(&self, documents: &[Value]) -> Result<Table> {
        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::new();

        for row in self.iter(documents) {
            for key in row.fields.keys() {
                if row.meta.contains_key(key) {
                    return Err(EtlError::ProcessingError {
                        message: format!(
                            "Conflicting metadata name '{}': it is also a field of the flattened records; use a record or meta prefix",
                            key
                        ),
                    });
                }
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }

            let FlattenedRow { mut fields, meta } = row;
            fields.extend(meta);
            rows.push(Record::new(fields));
        }

        if !rows.is_empty() {
            columns.extend(self.meta_columns().map(String::from));
        }

        Ok(Table::new(columns, rows))
    }

    fn build_row(&self, ancestors: &[&Value], leaf: &Value) -> FlattenedRow {
        let mut fields = Map::new();
        match leaf {
            Value::Object(_) => {
                for (key, value) in path::flatten_object(leaf) {
                    fields.insert(format!("{}{}", self.record_prefix, key), value);
                }
            }
            scalar => {
                fields.insert(
                    format!("{}{}", self.record_prefix, SCALAR_LEAF_COLUMN),
                    scalar.clone(),
                );
            }
        }

        let meta = self
            .meta
            .iter()
            .map(|field| {
                let value = ancestors
                    .get(field.level)
                    .and_then(|node| path::resolve_segments(node, &field.rest))
                    .cloned()
                    .unwrap_or(Value::Null);
                (field.column.clone(), value)
            })
            .collect();

        FlattenedRow { fields, meta }
    }
}

/// Elements one repeating step below `node`. A mapping where a sequence is
/// expected counts as a one-element sequence; anything else has no children.
fn children<'a>(node: &'a Value, key: &str) -> std::slice::Iter<'a, Value> {
    let empty: &'a [Value] = &[];
    match node.get(key) {
        Some(Value::Array(items)) => items.iter(),
        Some(single @ Value::Object(_)) => std::slice::from_ref(single).iter(),
        _ => empty.iter(),
    }
}

/// Depth-first row producer returned by [`TreeFlattener::iter`].
pub struct FlattenIter<'a> {
    flattener: &'a TreeFlattener,
    documents: std::slice::Iter<'a, Value>,
    // ancestors[i] is the node at depth i; frames[i] walks its children along record_path[i].
    ancestors: Vec<&'a Value>,
    frames: Vec<std::slice::Iter<'a, Value>>,
}

impl Iterator for FlattenIter<'_> {
    type Item = FlattenedRow;

    fn next(&mut self) -> Option<FlattenedRow> {
        let flattener = self.flattener;
        let record_path = &flattener.record_path;

        loop {
            let Some(frame) = self.frames.last_mut() else {
                let document = self.documents.next()?;
                if record_path.is_empty() {
                    return Some(flattener.build_row(std::slice::from_ref(&document), document));
                }
                self.ancestors.clear();
                self.ancestors.push(document);
                self.frames.push(children(document, &record_path[0]));
                continue;
            };

            match frame.next() {
                None => {
                    self.frames.pop();
                    self.ancestors.pop();
                }
                Some(child) => {
                    let depth = self.frames.len();
                    if depth == record_path.len() {
                        return Some(flattener.build_row(&self.ancestors, child));
                    }
                    self.ancestors.push(child);
                    self.frames.push(children(child, &record_path[depth]));
                }
            }
        }
    }
}
