//! CSV import of assets and inventory items
//!
//! Headers are matched case-insensitively against either the field name
//! (`asset_tag`) or the export label (`Asset Tag`). Unknown columns are
//! ignored. Row problems are collected per row instead of failing the file.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::export::{ASSET_COLUMNS, Column, INVENTORY_COLUMNS};
use super::normalize_header;
use crate::domain::{CreateAssetInput, CreateInventoryItemInput};

/// A rejected data row. `row` is 1-based and excludes the header line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

#[derive(Debug)]
pub struct ParsedRows<T> {
    pub rows: Vec<(usize, T)>,
    pub errors: Vec<RowError>,
}

impl<T> Default for ParsedRows<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> ParsedRows<T> {
    fn reject(&mut self, row: usize, message: impl Into<String>) {
        self.errors.push(RowError {
            row,
            message: message.into(),
        });
    }
}

/// One data row with lookup by field name
struct Row<'a> {
    record: &'a csv::StringRecord,
    index: &'a HashMap<&'static str, usize>,
}

impl Row<'_> {
    fn get(&self, key: &str) -> Option<String> {
        self.index
            .get(key)
            .and_then(|i| self.record.get(*i))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>, String> {
        match self.get(key) {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| format!("{} '{}' is not a number", key, raw)),
            None => Ok(None),
        }
    }
}

fn read_csv(
    content: &[u8],
    columns: &'static [Column],
    required: &[&str],
) -> Result<(HashMap<&'static str, usize>, Vec<csv::StringRecord>), String> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content);

    let headers = rdr
        .headers()
        .map_err(|e| format!("CSV parse error: {}", e))?
        .clone();

    let mut index = HashMap::new();
    for (i, header) in headers.iter().enumerate() {
        let wanted = normalize_header(header);
        if let Some((key, _)) = columns
            .iter()
            .find(|(key, label)| *key == wanted || normalize_header(label) == wanted)
        {
            index.entry(*key).or_insert(i);
        }
    }

    let missing: Vec<&str> = required
        .iter()
        .filter(|k| !index.contains_key(*k))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(format!("Missing required column(s): {}", missing.join(", ")));
    }

    let records = rdr
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("CSV parse error: {}", e))?;

    Ok((index, records))
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|v| v.trim().is_empty())
}

pub fn parse_assets_csv(content: &[u8]) -> Result<ParsedRows<CreateAssetInput>, String> {
    let (index, records) = read_csv(content, ASSET_COLUMNS, &["asset_tag", "name"])?;
    let mut parsed = ParsedRows::default();
    let mut seen_tags = HashSet::new();

    for (i, record) in records.iter().enumerate() {
        let row_no = i + 1;
        if is_blank(record) {
            continue;
        }
        let row = Row {
            record,
            index: &index,
        };

        let purchase_cost = match row.parse::<f64>("purchase_cost") {
            Ok(cost) => cost,
            Err(e) => {
                parsed.reject(row_no, e);
                continue;
            }
        };

        let input = CreateAssetInput {
            asset_tag: row.get("asset_tag").unwrap_or_default(),
            name: row.get("name").unwrap_or_default(),
            category: row.get("category"),
            manufacturer: row.get("manufacturer"),
            model: row.get("model"),
            serial_number: row.get("serial_number"),
            location: row.get("location"),
            purchase_date: row.get("purchase_date"),
            purchase_cost,
            warranty_expires: row.get("warranty_expires"),
            status: row.get("status").map(|s| s.to_lowercase()),
            notes: row.get("notes"),
        };

        match input.normalize() {
            Ok(input) => {
                if !seen_tags.insert(input.asset_tag.clone()) {
                    parsed.reject(
                        row_no,
                        format!("Duplicate asset tag '{}' in file", input.asset_tag),
                    );
                    continue;
                }
                parsed.rows.push((row_no, input));
            }
            Err(e) => parsed.reject(row_no, e.to_string()),
        }
    }

    Ok(parsed)
}

pub fn parse_inventory_csv(
    content: &[u8],
) -> Result<ParsedRows<CreateInventoryItemInput>, String> {
    let (index, records) = read_csv(content, INVENTORY_COLUMNS, &["sku", "name"])?;
    let mut parsed = ParsedRows::default();
    let mut seen_skus = HashSet::new();

    for (i, record) in records.iter().enumerate() {
        let row_no = i + 1;
        if is_blank(record) {
            continue;
        }
        let row = Row {
            record,
            index: &index,
        };

        let numbers = (|| -> Result<_, String> {
            Ok((
                row.parse::<i32>("quantity_on_hand")?,
                row.parse::<i32>("reorder_level")?,
                row.parse::<f64>("unit_cost")?,
            ))
        })();
        let (opening_quantity, reorder_level, unit_cost) = match numbers {
            Ok(n) => n,
            Err(e) => {
                parsed.reject(row_no, e);
                continue;
            }
        };

        let input = CreateInventoryItemInput {
            sku: row.get("sku").unwrap_or_default(),
            name: row.get("name").unwrap_or_default(),
            category: row.get("category"),
            unit: row.get("unit"),
            reorder_level,
            location: row.get("location"),
            unit_cost,
            opening_quantity,
        };

        match input.normalize() {
            Ok(input) => {
                if !seen_skus.insert(input.sku.clone()) {
                    parsed.reject(row_no, format!("Duplicate SKU '{}' in file", input.sku));
                    continue;
                }
                parsed.rows.push((row_no, input));
            }
            Err(e) => parsed.reject(row_no, e.to_string()),
        }
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_match_labels_and_names() {
        let csv = "Asset Tag,NAME,serial_number,Purchase Cost\nLT-1,Laptop,SN-9,1200\n";
        let parsed = parse_assets_csv(csv.as_bytes()).unwrap();
        assert!(parsed.errors.is_empty());
        let (row, input) = &parsed.rows[0];
        assert_eq!(*row, 1);
        assert_eq!(input.asset_tag, "LT-1");
        assert_eq!(input.serial_number.as_deref(), Some("SN-9"));
        assert_eq!(input.purchase_cost, Some(1200.0));
        assert_eq!(input.status.as_deref(), Some("available"));
    }

    #[test]
    fn test_bad_rows_are_reported_and_skipped() {
        let csv = "asset_tag,name,status,purchase_cost\n\
                   A-1,Desk,available,\n\
                   ,Chair,,\n\
                   A-2,Lamp,broken,\n\
                   A-1,Desk again,,\n\
                   A-3,Shelf,,abc\n";
        let parsed = parse_assets_csv(csv.as_bytes()).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        let rows: Vec<usize> = parsed.errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![2, 3, 4, 5]);
        assert!(parsed.errors[2].message.contains("Duplicate"));
    }

    #[test]
    fn test_missing_required_column_fails_file() {
        let err = parse_assets_csv(b"name,location\nDesk,HQ\n").unwrap_err();
        assert!(err.contains("asset_tag"));
        assert!(parse_assets_csv(b"").is_err());
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let csv = "asset_tag,name\nA-1,Desk\n,\nA-2,Lamp\n";
        let parsed = parse_assets_csv(csv.as_bytes()).unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[1].0, 3);
    }

    #[test]
    fn test_inventory_quantity_becomes_opening_stock() {
        let csv = "SKU,Name,Quantity On Hand,Reorder Level,Unit Cost\nP-1,Paper,40,10,4.5\nP-2,Pens,-3,,\n";
        let parsed = parse_inventory_csv(csv.as_bytes()).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].1.opening_quantity, Some(40));
        assert_eq!(parsed.rows[0].1.unit.as_deref(), Some("each"));
        assert_eq!(parsed.errors[0].row, 2);
    }
}
