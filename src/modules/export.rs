//! CSV export of assets, inventory items and report output

use serde_json::Value;

use super::normalize_header;
use crate::domain::{Asset, InventoryItem};
use crate::services::report_service::ReportOutput;

/// A spreadsheet column: field name and header label
pub type Column = (&'static str, &'static str);

pub const ASSET_COLUMNS: &[Column] = &[
    ("id", "ID"),
    ("asset_tag", "Asset Tag"),
    ("name", "Name"),
    ("category", "Category"),
    ("manufacturer", "Manufacturer"),
    ("model", "Model"),
    ("serial_number", "Serial Number"),
    ("location", "Location"),
    ("purchase_date", "Purchase Date"),
    ("purchase_cost", "Purchase Cost"),
    ("warranty_expires", "Warranty Expires"),
    ("status", "Status"),
    ("notes", "Notes"),
];

pub const INVENTORY_COLUMNS: &[Column] = &[
    ("id", "ID"),
    ("sku", "SKU"),
    ("name", "Name"),
    ("category", "Category"),
    ("unit", "Unit"),
    ("quantity_on_hand", "Quantity On Hand"),
    ("reorder_level", "Reorder Level"),
    ("location", "Location"),
    ("unit_cost", "Unit Cost"),
    ("stock_value", "Stock Value"),
];

/// Resolve a comma-separated `columns` parameter against the known columns,
/// keeping the requested order. `None` or blank selects every column.
pub fn select_columns(
    available: &'static [Column],
    requested: Option<&str>,
) -> Result<Vec<Column>, String> {
    let Some(requested) = requested.filter(|r| !r.trim().is_empty()) else {
        return Ok(available.to_vec());
    };

    let mut selected = Vec::new();
    for name in requested.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let wanted = normalize_header(name);
        let column = available
            .iter()
            .find(|(key, label)| *key == wanted || normalize_header(label) == wanted)
            .ok_or_else(|| format!("Unknown column '{}'", name))?;
        if !selected.contains(column) {
            selected.push(*column);
        }
    }
    Ok(selected)
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn asset_cell(asset: &Asset, key: &str) -> String {
    match key {
        "id" => asset.id.to_string(),
        "asset_tag" => asset.asset_tag.clone(),
        "name" => asset.name.clone(),
        "category" => text(&asset.category),
        "manufacturer" => text(&asset.manufacturer),
        "model" => text(&asset.model),
        "serial_number" => text(&asset.serial_number),
        "location" => text(&asset.location),
        "purchase_date" => text(&asset.purchase_date),
        "purchase_cost" => number(asset.purchase_cost),
        "warranty_expires" => text(&asset.warranty_expires),
        "status" => asset.status.clone(),
        "notes" => text(&asset.notes),
        _ => String::new(),
    }
}

fn item_cell(item: &InventoryItem, key: &str) -> String {
    match key {
        "id" => item.id.to_string(),
        "sku" => item.sku.clone(),
        "name" => item.name.clone(),
        "category" => text(&item.category),
        "unit" => item.unit.clone(),
        "quantity_on_hand" => item.quantity_on_hand.to_string(),
        "reorder_level" => item.reorder_level.to_string(),
        "location" => text(&item.location),
        "unit_cost" => number(item.unit_cost),
        "stock_value" => item.stock_value.to_string(),
        _ => String::new(),
    }
}

fn write_csv<I>(header: Vec<String>, rows: I) -> Result<Vec<u8>, String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(&header).map_err(|e| e.to_string())?;
    for row in rows {
        wtr.write_record(&row).map_err(|e| e.to_string())?;
    }
    wtr.into_inner().map_err(|e| e.to_string())
}

pub fn assets_csv(assets: &[Asset], columns: &[Column]) -> Result<Vec<u8>, String> {
    write_csv(
        columns.iter().map(|(_, label)| label.to_string()).collect(),
        assets
            .iter()
            .map(|a| columns.iter().map(|(key, _)| asset_cell(a, key)).collect()),
    )
}

pub fn inventory_csv(items: &[InventoryItem], columns: &[Column]) -> Result<Vec<u8>, String> {
    write_csv(
        columns.iter().map(|(_, label)| label.to_string()).collect(),
        items
            .iter()
            .map(|i| columns.iter().map(|(key, _)| item_cell(i, key)).collect()),
    )
}

fn value_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Flatten report output into CSV using its own column names
pub fn report_csv(output: &ReportOutput) -> Result<Vec<u8>, String> {
    write_csv(
        output.columns.clone(),
        output
            .rows
            .iter()
            .map(|row| row.iter().map(value_cell).collect()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn laptop() -> Asset {
        Asset {
            id: 7,
            asset_tag: "LT-7".into(),
            name: "Laptop, 14\"".into(),
            category: Some("Laptop".into()),
            manufacturer: None,
            model: None,
            serial_number: Some("SN1".into()),
            location: None,
            purchase_date: Some("2024-02-01".into()),
            purchase_cost: Some(999.5),
            warranty_expires: None,
            status: "available".into(),
            notes: None,
            created_at: "2024-02-01T00:00:00+00:00".into(),
            updated_at: "2024-02-01T00:00:00+00:00".into(),
        }
    }

    #[test]
    fn test_select_columns_keeps_requested_order() {
        let cols = select_columns(ASSET_COLUMNS, Some("status, Asset Tag,name")).unwrap();
        let keys: Vec<&str> = cols.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["status", "asset_tag", "name"]);
    }

    #[test]
    fn test_select_columns_rejects_unknown() {
        let err = select_columns(ASSET_COLUMNS, Some("asset_tag,colour")).unwrap_err();
        assert!(err.contains("colour"));
    }

    #[test]
    fn test_select_columns_defaults_to_all() {
        assert_eq!(select_columns(ASSET_COLUMNS, None).unwrap().len(), ASSET_COLUMNS.len());
        assert_eq!(select_columns(ASSET_COLUMNS, Some(" ")).unwrap().len(), ASSET_COLUMNS.len());
    }

    #[test]
    fn test_assets_csv_uses_labels_and_quotes() {
        let cols = select_columns(ASSET_COLUMNS, Some("asset_tag,name,purchase_cost,location")).unwrap();
        let bytes = assets_csv(&[laptop()], &cols).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Asset Tag,Name,Purchase Cost,Location"));
        assert_eq!(lines.next(), Some("LT-7,\"Laptop, 14\"\"\",999.5,"));
    }

    #[test]
    fn test_report_csv_flattens_values() {
        let output = ReportOutput {
            report_type: "low_stock".into(),
            generated_at: "now".into(),
            columns: vec!["SKU".into(), "Quantity".into(), "Location".into()],
            rows: vec![vec![json!("PAPER"), json!(3), Value::Null]],
            summary: json!({}),
        };
        let text = String::from_utf8(report_csv(&output).unwrap()).unwrap();
        assert_eq!(text, "SKU,Quantity,Location\nPAPER,3,\n");
    }
}
