//! Clipboard and file export of translated records

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::errors::{Result, TranslationError};
use crate::core::language::Language;
use crate::core::models::TranslationRecord;

/// Tab-separated rows: key, then every language in canonical order
pub fn to_tsv(records: &[TranslationRecord]) -> String {
    records
        .iter()
        .map(|record| {
            let mut fields = Vec::with_capacity(Language::ALL.len() + 1);
            fields.push(record.key.as_str());
            fields.extend(record.translations().map(|(_, text)| text));
            fields.join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pretty-printed JSON list, two-space indented
pub fn to_pretty_json(records: &[TranslationRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// `translated_export_<YYYY-MM-DD>.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("translated_export_{}.json", date.format("%Y-%m-%d"))
}

/// Write the records as a dated JSON file inside `dir`
pub fn write_export(dir: &Path, records: &[TranslationRecord], date: NaiveDate) -> Result<PathBuf> {
    if !dir.is_dir() {
        std::fs::create_dir_all(dir).map_err(TranslationError::Io)?;
    }

    let path = dir.join(export_file_name(date));
    std::fs::write(&path, to_pretty_json(records)?)?;
    info!("Exported {} records to {}", records.len(), path.display());

    Ok(path)
}

/// Write a dated export for today's UTC date
pub fn write_export_today(dir: &Path, records: &[TranslationRecord]) -> Result<PathBuf> {
    write_export(dir, records, chrono::Utc::now().date_naive())
}
