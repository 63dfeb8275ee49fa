//! Plain-text table rendering for terminals

use crate::core::language::Language;
use crate::core::models::TranslationRecord;

/// Column headers: index, key, then every language
pub fn headers() -> Vec<String> {
    let mut headers = vec!["#".to_string(), "key".to_string()];
    headers.extend(Language::ALL.iter().map(|lang| {
        if lang.is_source() {
            format!("{} (source)", lang.display_name())
        } else {
            lang.display_name()
        }
    }));
    headers
}

/// One row per record, 1-based index first
pub fn rows(records: &[TranslationRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let mut row = vec![(i + 1).to_string(), record.key.clone()];
            row.extend(record.translations().map(|(_, text)| text.to_string()));
            row
        })
        .collect()
}

/// Render with `|` separators, columns padded to their widest cell
pub fn render(records: &[TranslationRecord]) -> String {
    let headers = headers();
    let rows = rows(records);

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(format_row(headers.as_slice()));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.extend(rows.iter().map(|row| format_row(row.as_slice())));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers() {
        let headers = headers();
        assert_eq!(headers.len(), 23);
        assert_eq!(headers[0], "#");
        assert_eq!(headers[1], "key");
        assert_eq!(headers[4], "Chinese Simplified");
        assert_eq!(headers[12], "Korean (source)");
    }

    #[test]
    fn test_render_one_row_per_record() {
        let records = vec![
            TranslationRecord::empty("hello").with(Language::Korean, "안녕하세요"),
            TranslationRecord::empty("bye").with(Language::Korean, "안녕히 가세요"),
        ];
        let table = render(&records);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("1 | hello"));
        assert!(lines[3].starts_with("2 | bye"));
        assert!(lines[3].contains("안녕히 가세요"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]).lines().count(), 2);
    }
}
