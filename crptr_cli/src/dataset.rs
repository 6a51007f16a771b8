use anyhow::{Context, anyhow, bail};
use crptr_core::config::DatasetSettings;
use crptr_core::lookup::{read_text, resolve_encoding};
use crptr_core::record::{AttributeSchema, Record};
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// A clean input data set: the first column of every row is the record id.
#[derive(Debug, Clone)]
pub struct DataSet {
    /// Attribute names from the header line, without the id column.
    pub header: Option<Vec<String>>,
    pub rows: Vec<(String, Vec<String>)>,
}

impl DataSet {
    pub fn read(path: &Path, settings: &DatasetSettings) -> Result<Self, anyhow::Error> {
        let text = read_text(path, &settings.encoding)
            .with_context(|| format!("Failed to load data set {:?}", path))?;

        let mut reader = ReaderBuilder::new()
            .has_headers(settings.has_header_line)
            .from_reader(text.as_bytes());

        let header = if settings.has_header_line {
            let names: Vec<String> = reader
                .headers()
                .with_context(|| format!("Failed to read header of {:?}", path))?
                .iter()
                .skip(1)
                .map(str::to_string)
                .collect();
            Some(names)
        } else {
            None
        };

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record =
                result.with_context(|| format!("Failed to parse row {} of {:?}", idx + 1, path))?;
            let mut fields = record.iter().map(str::to_string);
            let id = fields
                .next()
                .filter(|id| !id.is_empty())
                .ok_or_else(|| anyhow!("Row {} of {:?} has no record id", idx + 1, path))?;
            rows.push((id, fields.collect()));
        }
        debug!(?path, rows = rows.len(), "Read data set");
        Ok(Self { header, rows })
    }

    /// Maps every row onto `schema`. Schema attributes the file does not carry
    /// (such as an appended record marker) start out empty.
    pub fn records(
        &self,
        schema: &Arc<AttributeSchema>,
    ) -> Result<BTreeMap<String, Record>, anyhow::Error> {
        let columns: Vec<String> = match &self.header {
            Some(header) => header.clone(),
            None => schema.names().to_vec(),
        };
        let layout: Vec<Option<usize>> = schema
            .names()
            .iter()
            .map(|name| columns.iter().position(|c| c == name))
            .collect();

        let mut records = BTreeMap::new();
        for (id, fields) in &self.rows {
            if fields.len() != columns.len() {
                bail!(
                    "Record '{}' has {} attribute values, expected {}",
                    id,
                    fields.len(),
                    columns.len()
                );
            }
            let values = layout
                .iter()
                .map(|col| col.map(|c| fields[c].clone()).unwrap_or_default())
                .collect();
            let record = Record::new(Arc::clone(schema), values)?;
            if records.insert(id.clone(), record).is_some() {
                bail!("Record id '{}' appears more than once", id);
            }
        }
        Ok(records)
    }
}

/// Serializes the record set as CSV (id column first) in the declared encoding.
pub fn encode_records(
    settings: &DatasetSettings,
    schema: &AttributeSchema,
    records: &BTreeMap<String, Record>,
) -> Result<Vec<u8>, anyhow::Error> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    let header = std::iter::once(settings.id_attribute.as_str())
        .chain(schema.names().iter().map(String::as_str));
    writer.write_record(header)?;
    for (id, record) in records {
        let row = std::iter::once(id.as_str()).chain(record.values().iter().map(String::as_str));
        writer.write_record(row)?;
    }
    let utf8 = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV output: {}", e))?;
    let text = String::from_utf8(utf8).context("CSV output is not valid UTF-8")?;

    let encoding = resolve_encoding(&settings.encoding)?;
    let (bytes, used, had_errors) = encoding.encode(&text);
    if had_errors {
        bail!(
            "Output contains characters that cannot be written as {}",
            used.name()
        );
    }
    Ok(bytes.into_owned())
}
