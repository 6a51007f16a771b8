//! Loading of the external lookup tables consumed by the OCR, phonetic and
//! misspelling corruptors.
//!
//! Tables are small delimited text files read once, under a declared text
//! encoding, when the owning corruptor is constructed:
//!
//! ```csv
//! 5,S
//! 5,s
//! 2,Z
//! 1,|
//! ```
//!
//! Every row must carry exactly the number of columns the table kind expects
//! and no empty value. Malformed rows abort the load; they are never skipped.

use crate::error::{ConfigError, LookupError};
use csv::{ReaderBuilder, Trim};
use encoding_rs::Encoding;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a lookup table lives and how to read it.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct LookupSource {
    pub path: PathBuf,
    #[serde(default)]
    pub has_header_line: bool,
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

pub fn default_encoding() -> String {
    "ascii".to_string()
}

impl LookupSource {
    pub fn new<P: Into<PathBuf>>(path: P, has_header_line: bool, encoding: &str) -> Self {
        Self {
            path: path.into(),
            has_header_line,
            encoding: encoding.to_string(),
        }
    }

    /// Checks the parameters without touching the file system.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::invalid(
                "lookup.path",
                "lookup file name must not be empty",
            ));
        }
        if self.encoding.trim().is_empty() {
            return Err(ConfigError::invalid(
                "lookup.encoding",
                "text encoding must not be empty",
            ));
        }
        resolve_encoding(&self.encoding)?;
        Ok(())
    }

    /// Reads and validates every data row, expecting exactly `columns` values per row.
    ///
    /// Returned rows are paired with their line number in the file.
    pub fn read_rows(&self, columns: usize) -> Result<Vec<(usize, Vec<String>)>, ConfigError> {
        self.validate()?;
        let text = read_text(&self.path, &self.encoding)?;

        let mut reader = ReaderBuilder::new()
            .has_headers(self.has_header_line)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result.map_err(|source| LookupError::Csv {
                path: self.path.clone(),
                source,
            })?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 1);

            if record.len() != columns {
                return Err(self.malformed(
                    line,
                    format!("expected {} columns, found {}", columns, record.len()),
                ));
            }
            if let Some(col) = record.iter().position(str::is_empty) {
                return Err(self.malformed(line, format!("column {} is empty", col + 1)));
            }
            rows.push((line, record.iter().map(str::to_string).collect()));
        }
        Ok(rows)
    }

    pub(crate) fn malformed(&self, row: usize, reason: String) -> ConfigError {
        ConfigError::Lookup(LookupError::MalformedRow {
            path: self.path.clone(),
            row,
            reason,
        })
    }
}

/// Maps an encoding label such as `ascii`, `utf-8` or `latin1` to an encoding.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, LookupError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| LookupError::UnknownEncoding(label.to_string()))
}

/// Reads a whole file and decodes it under the given encoding label.
pub fn read_text(path: &Path, encoding_label: &str) -> Result<String, LookupError> {
    let encoding = resolve_encoding(encoding_label)?;
    let bytes = std::fs::read(path).map_err(|source| LookupError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (text, _, had_errors) = encoding.decode(&bytes);
    if had_errors {
        return Err(LookupError::Decode {
            path: path.to_path_buf(),
            encoding: encoding.name().to_string(),
        });
    }
    Ok(text.into_owned())
}

/// How the two columns of a variant table relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Original and variant both serve as keys (OCR confusions work both ways).
    Symmetric,
    /// Only the original is a key (known misspellings of a value).
    OneWay,
}

/// Maps an original token to its equally weighted variants.
///
/// Immutable once loaded; shared freely between corruptors and records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantTable {
    entries: HashMap<String, Vec<String>>,
}

impl VariantTable {
    /// Loads an `original,variant` table.
    pub fn load(source: &LookupSource, direction: Direction) -> Result<Self, ConfigError> {
        let rows = source.read_rows(2)?;
        let mut table = VariantTable::default();
        for (line, row) in &rows {
            let (original, variant) = (&row[0], &row[1]);
            if original == variant {
                return Err(source.malformed(
                    *line,
                    format!("variant '{variant}' is the same as the original value"),
                ));
            }
            table.insert(original, variant, direction);
        }
        debug!(
            path = ?source.path,
            rows = rows.len(),
            keys = table.len(),
            ?direction,
            "Loaded variant lookup table"
        );
        Ok(table)
    }

    /// Builds a table from in-memory pairs, applying the same checks as [`VariantTable::load`].
    pub fn from_pairs<'a, I>(pairs: I, direction: Direction) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut table = VariantTable::default();
        for (original, variant) in pairs {
            if original.is_empty() || variant.is_empty() {
                return Err(ConfigError::invalid(
                    "variant_table",
                    "original and variant values must not be empty",
                ));
            }
            if original == variant {
                return Err(ConfigError::invalid(
                    "variant_table",
                    format!("variant '{variant}' is the same as the original value"),
                ));
            }
            table.insert(original, variant, direction);
        }
        Ok(table)
    }

    fn insert(&mut self, original: &str, variant: &str, direction: Direction) {
        self.entries
            .entry(original.to_string())
            .or_default()
            .push(variant.to_string());
        if direction == Direction::Symmetric {
            self.entries
                .entry(variant.to_string())
                .or_default()
                .push(original.to_string());
        }
    }

    pub fn variants(&self, original: &str) -> Option<&[String]> {
        self.entries.get(original).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Writes `contents` into a temporary file that lives as long as the handle.
    pub fn lookup_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp lookup file");
        file.write_all(contents.as_bytes())
            .expect("Failed to write temp lookup file");
        file.flush().expect("Failed to flush temp lookup file");
        file
    }
}
