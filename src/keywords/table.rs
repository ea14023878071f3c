use std::{collections::HashMap, fs, io, path::Path};

use thiserror::Error;
use tracing::{debug, info, warn};

const PHRASE_COLUMN: &str = "keyword";
const CATEGORY_COLUMN: &str = "category";

#[derive(Debug, Error)]
pub enum KeywordLoadError {
    #[error("failed to read keyword source: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse keyword source: {0}")]
    Csv(#[from] csv::Error),
    #[error("keyword source is missing the `{0}` column")]
    MissingColumn(&'static str),
}

/// Phrase to category lookup used by the offline scanner.
///
/// Phrases are stored trimmed and lowercased; categories are trimmed. A
/// duplicate phrase keeps the category from the last row that mentions it.
#[derive(Debug, Clone, Default)]
pub struct KeywordTable {
    entries: HashMap<String, String>,
}

impl KeywordTable {
    pub fn from_entries<I, P, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: AsRef<str>,
    {
        let mut table = Self::default();
        for (phrase, category) in entries {
            table.insert(phrase.as_ref(), category.as_ref());
        }
        table
    }

    /// Loads the table, degrading to an empty one when the source is absent
    /// or unreadable.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(table) => {
                info!(
                    target: "keywords",
                    path = %path.display(),
                    signatures = table.len(),
                    "keyword table loaded"
                );
                table
            }
            Err(err) => {
                warn!(
                    target: "keywords",
                    path = %path.display(),
                    error = %err,
                    "keyword table unavailable; fallback scan will report every message as safe"
                );
                Self::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self, KeywordLoadError> {
        let content = fs::read_to_string(path)?;
        Self::parse_csv(&content)
    }

    pub fn parse_csv(content: &str) -> Result<Self, KeywordLoadError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or(KeywordLoadError::MissingColumn(name))
        };
        let phrase_idx = column(PHRASE_COLUMN)?;
        let category_idx = column(CATEGORY_COLUMN)?;

        let mut table = Self::default();
        let mut skipped = 0usize;
        for (line, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    debug!(target: "keywords", row = line + 1, error = %err, "skipping unreadable row");
                    skipped += 1;
                    continue;
                }
            };
            let inserted = match (record.get(phrase_idx), record.get(category_idx)) {
                (Some(phrase), Some(category)) => table.insert(phrase, category),
                _ => false,
            };
            if !inserted {
                skipped += 1;
            }
        }

        if skipped > 0 {
            debug!(target: "keywords", skipped, "malformed keyword rows ignored");
        }
        Ok(table)
    }

    fn insert(&mut self, phrase: &str, category: &str) -> bool {
        let phrase = phrase.trim().to_lowercase();
        let category = category.trim();
        if phrase.is_empty() || category.is_empty() {
            return false;
        }
        self.entries.insert(phrase, category.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn category(&self, phrase: &str) -> Option<&str> {
        self.entries.get(phrase).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }
}
