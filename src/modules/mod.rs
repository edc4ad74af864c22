//! Document and spreadsheet formats: CSV import/export and the printable
//! asset record sheet.

pub mod export;
pub mod import;
pub mod record_sheet;

/// Fold a header or column name to its comparable form:
/// lower case, spaces and dashes as underscores.
pub fn normalize_header(name: &str) -> String {
    name.trim()
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .replace([' ', '-'], "_")
}
