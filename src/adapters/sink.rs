use crate::config::toml_config::LoadConfig;
use crate::domain::model::Table;
use crate::domain::ports::Storage;
use crate::adapters::storage::output_location;
use crate::utils::error::Result;
use serde_json::Value;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Renders tables as delimited text and hands the bytes to storage.
#[derive(Debug, Clone)]
pub struct TabularSink {
    config: LoadConfig,
}

impl TabularSink {
    pub fn new(config: LoadConfig) -> Self {
        Self { config }
    }

    /// Header row of `table.columns`, then one line per row. Missing cells are empty.
    pub fn render(&self, table: &Table) -> Result<Vec<u8>> {
        if table.columns.is_empty() {
            return Ok(Vec::new());
        }

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.config.delimiter as u8)
            .from_writer(Vec::new());

        writer.write_record(&table.columns)?;
        for row in &table.rows {
            writer.write_record(
                table
                    .columns
                    .iter()
                    .map(|column| row.get(column).map(cell_text).unwrap_or_default()),
            )?;
        }

        writer.into_inner().map_err(|e| e.into_error().into())
    }

    /// Write the table and return the location it was saved to.
    pub async fn write<S: Storage>(&self, storage: &S, table: &Table) -> Result<String> {
        let data = self.render(table)?;

        match self.config.compression.as_ref().filter(|c| c.enabled) {
            Some(compression) => {
                let zip_data = {
                    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                    zip.start_file(self.config.filename.as_str(), SimpleFileOptions::default())?;
                    zip.write_all(&data)?;
                    zip.finish()?.into_inner()
                };

                tracing::debug!("Creating ZIP file ({} bytes)", zip_data.len());
                let location = output_location(&self.config.output_path, &compression.filename);
                storage.write_file(&location, &zip_data).await?;
                Ok(location)
            }
            None => {
                let location = output_location(&self.config.output_path, &self.config.filename);
                storage.write_file(&location, &data).await?;
                Ok(location)
            }
        }
    }
}

/// Text for one cell: strings verbatim, null empty, nested values as JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}
