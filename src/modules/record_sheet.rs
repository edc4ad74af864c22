//! Printable HTML record sheet for a single asset

use std::fmt::Write;

use crate::domain::Asset;
use crate::services::history_service::AssetHistory;

/// Escape text for use in HTML element content and quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn opt(value: &Option<String>) -> String {
    value.as_deref().map(escape_html).unwrap_or_else(|| "&mdash;".to_string())
}

fn money(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "&mdash;".to_string())
}

fn field_row(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "<tr><th>{}</th><td>{}</td></tr>", label, value);
}

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
h1{margin-bottom:0}table{border-collapse:collapse;width:100%;margin-bottom:1.5em}\
th,td{border:1px solid #ccc;padding:4px 8px;text-align:left}\
th{background:#f4f4f4}.muted{color:#777}";

/// Render the record sheet. Every interpolated value is escaped.
pub fn render_asset_sheet(asset: &Asset, history: &AssetHistory, generated_at: &str) -> String {
    let mut html = String::new();
    let tag = escape_html(&asset.asset_tag);
    let name = escape_html(&asset.name);

    let _ = writeln!(html, "<!DOCTYPE html>");
    let _ = writeln!(html, "<html lang=\"en\"><head><meta charset=\"utf-8\">");
    let _ = writeln!(html, "<title>Asset {} - {}</title>", tag, name);
    let _ = writeln!(html, "<style>{}</style></head><body>", STYLE);
    let _ = writeln!(html, "<h1>{}</h1>", name);
    let _ = writeln!(html, "<p class=\"muted\">Asset tag {} &middot; generated {}</p>", tag, escape_html(generated_at));

    html.push_str("<h2>Details</h2>\n<table>\n");
    field_row(&mut html, "Asset Tag", &tag);
    field_row(&mut html, "Name", &name);
    field_row(&mut html, "Status", &escape_html(&asset.status));
    field_row(&mut html, "Category", &opt(&asset.category));
    field_row(&mut html, "Manufacturer", &opt(&asset.manufacturer));
    field_row(&mut html, "Model", &opt(&asset.model));
    field_row(&mut html, "Serial Number", &opt(&asset.serial_number));
    field_row(&mut html, "Location", &opt(&asset.location));
    field_row(&mut html, "Purchase Date", &opt(&asset.purchase_date));
    field_row(&mut html, "Purchase Cost", &money(asset.purchase_cost));
    field_row(&mut html, "Warranty Expires", &opt(&asset.warranty_expires));
    field_row(&mut html, "Notes", &opt(&asset.notes));
    html.push_str("</table>\n");

    html.push_str("<h2>Current Assignment</h2>\n");
    match history.current_checkout() {
        Some(c) => {
            let _ = writeln!(
                html,
                "<p>Checked out to <strong>{}</strong> on {} (due {}){}</p>",
                escape_html(&c.employee_name),
                escape_html(&c.checkout_date),
                opt(&c.due_date),
                if c.is_overdue { " &middot; <strong>overdue</strong>" } else { "" }
            );
        }
        None => html.push_str("<p class=\"muted\">Not assigned</p>\n"),
    }

    html.push_str("<h2>Checkout History</h2>\n");
    if history.checkouts.is_empty() {
        html.push_str("<p class=\"muted\">No checkouts</p>\n");
    } else {
        html.push_str("<table>\n<tr><th>Employee</th><th>Checked Out</th><th>Due</th><th>Returned</th><th>Condition</th></tr>\n");
        for c in &history.checkouts {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&c.employee_name),
                escape_html(&c.checkout_date),
                opt(&c.due_date),
                opt(&c.return_date),
                opt(&c.return_condition)
            );
        }
        html.push_str("</table>\n");
    }

    html.push_str("<h2>Maintenance History</h2>\n");
    if history.maintenance.is_empty() {
        html.push_str("<p class=\"muted\">No maintenance records</p>\n");
    } else {
        html.push_str("<table>\n<tr><th>Title</th><th>Type</th><th>Status</th><th>Scheduled</th><th>Completed</th><th>Cost</th></tr>\n");
        for m in &history.maintenance {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&m.title),
                escape_html(&m.maintenance_type),
                escape_html(&m.status),
                opt(&m.scheduled_date),
                opt(&m.completed_date),
                money(m.cost)
            );
        }
        html.push_str("</table>\n");
    }

    html.push_str("<h2>Last Audit</h2>\n");
    match history.last_audit() {
        Some(a) => {
            let _ = writeln!(
                html,
                "<p>{} by {}: <strong>{}</strong>, found at {}</p>",
                escape_html(&a.audit_date),
                escape_html(&a.audited_by),
                escape_html(&a.condition),
                opt(&a.location_found)
            );
        }
        None => html.push_str("<p class=\"muted\">Never audited</p>\n"),
    }

    html.push_str("</body></html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> Asset {
        Asset {
            id: 1,
            asset_tag: "LT-001".into(),
            name: name.into(),
            category: Some("Laptop".into()),
            manufacturer: Some("Lenovo".into()),
            model: None,
            serial_number: Some("SN-42".into()),
            location: Some("HQ".into()),
            purchase_date: None,
            purchase_cost: Some(1349.0),
            warranty_expires: None,
            status: "available".into(),
            notes: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn empty_history() -> AssetHistory {
        AssetHistory {
            checkouts: vec![],
            maintenance: vec![],
            audits: vec![],
            reservations: vec![],
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_sheet_contains_fields() {
        let html = render_asset_sheet(&asset("ThinkPad"), &empty_history(), "2024-05-01");
        assert!(html.contains("<h1>ThinkPad</h1>"));
        assert!(html.contains("SN-42"));
        assert!(html.contains("1349.00"));
        assert!(html.contains("Not assigned"));
        assert!(html.contains("Never audited"));
    }

    #[test]
    fn test_sheet_escapes_user_text() {
        let html = render_asset_sheet(&asset("<script>alert(1)</script>"), &empty_history(), "now");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
