//! Report Service - saved report definitions and tabular report generation

use chrono::NaiveDate;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

use super::dashboard_service::round_money;
use super::{ServiceError, activity, audit_service, checkout_service};
use crate::models::asset::{self, Entity as Asset};
use crate::models::checkout;
use crate::models::inventory_item::{self, Entity as InventoryItem};
use crate::models::maintenance::{self, Entity as Maintenance};
use crate::models::report::{self, Entity as Report};
use crate::utils::{dates, non_blank};

pub const ASSET_REGISTER: &str = "asset_register";
pub const CHECKOUT_HISTORY: &str = "checkout_history";
pub const OVERDUE_CHECKOUTS: &str = "overdue_checkouts";
pub const MAINTENANCE_COSTS: &str = "maintenance_costs";
pub const INVENTORY_VALUATION: &str = "inventory_valuation";
pub const LOW_STOCK: &str = "low_stock";
pub const AUDIT_SUMMARY: &str = "audit_summary";

pub const REPORT_TYPES: [&str; 7] = [
    ASSET_REGISTER,
    CHECKOUT_HISTORY,
    OVERDUE_CHECKOUTS,
    MAINTENANCE_COSTS,
    INVENTORY_VALUATION,
    LOW_STOCK,
    AUDIT_SUMMARY,
];

pub fn is_valid_report_type(report_type: &str) -> bool {
    REPORT_TYPES.contains(&report_type)
}

/// Optional narrowing applied by the report types that understand it
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ReportParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

impl ReportParams {
    fn range(&self) -> Result<(Option<String>, Option<String>), ServiceError> {
        let from = dates::validate_optional("from", self.from.clone())
            .map_err(ServiceError::Validation)?;
        let to =
            dates::validate_optional("to", self.to.clone()).map_err(ServiceError::Validation)?;
        if let (Some(f), Some(t)) = (&from, &to)
            && f > t
        {
            return Err(ServiceError::Validation(
                "from cannot be after to".to_string(),
            ));
        }
        Ok((from, to))
    }
}

/// A generated report: a header row, data rows and a few totals
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    pub report_type: String,
    pub generated_at: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub summary: Value,
}

impl ReportOutput {
    fn new(report_type: &str, columns: &[&str], rows: Vec<Vec<Value>>, summary: Value) -> Self {
        Self {
            report_type: report_type.to_string(),
            generated_at: dates::now_rfc3339(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
            summary,
        }
    }
}

/// Request body for saving a report definition
#[derive(Debug, Deserialize)]
pub struct CreateReportDto {
    pub name: String,
    pub report_type: String,
    #[serde(default)]
    pub parameters: Option<ReportParams>,
}

pub async fn list_reports(db: &DatabaseConnection) -> Result<Vec<report::Model>, ServiceError> {
    Ok(Report::find()
        .order_by_asc(report::Column::Name)
        .all(db)
        .await?)
}

pub async fn create_report(
    db: &DatabaseConnection,
    dto: CreateReportDto,
    performed_by: Option<&str>,
) -> Result<report::Model, ServiceError> {
    let name = dto.name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::Validation("name is required".to_string()));
    }
    if !is_valid_report_type(&dto.report_type) {
        return Err(ServiceError::Validation(format!(
            "Unknown report_type '{}'",
            dto.report_type
        )));
    }
    let params = dto.parameters.unwrap_or_default();
    params.range()?;

    let saved = report::ActiveModel {
        name: Set(name),
        report_type: Set(dto.report_type),
        parameters: Set(Some(
            serde_json::to_string(&params).map_err(|e| ServiceError::Validation(e.to_string()))?,
        )),
        created_by: Set(performed_by.map(str::to_owned)),
        last_generated_at: Set(None),
        last_row_count: Set(None),
        created_at: Set(dates::now_rfc3339()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    activity::record(db, "report", saved.id, "create", None, performed_by).await;
    Ok(saved)
}

pub async fn delete_report(
    db: &DatabaseConnection,
    id: i32,
    performed_by: Option<&str>,
) -> Result<(), ServiceError> {
    let result = Report::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound("Report".to_string()));
    }
    activity::record(db, "report", id, "delete", None, performed_by).await;
    Ok(())
}

/// Run a saved report and remember when it last ran
pub async fn run_saved_report(
    db: &DatabaseConnection,
    id: i32,
) -> Result<(report::Model, ReportOutput), ServiceError> {
    let saved = Report::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Report".to_string()))?;

    let params: ReportParams = match saved.parameters.as_deref() {
        Some(text) if !text.trim().is_empty() => serde_json::from_str(text).unwrap_or_else(|e| {
            tracing::warn!("Report #{} has unreadable parameters: {}", saved.id, e);
            ReportParams::default()
        }),
        _ => ReportParams::default(),
    };

    let output = generate(db, &saved.report_type, &params).await?;

    let mut active: report::ActiveModel = saved.into();
    active.last_generated_at = Set(Some(output.generated_at.clone()));
    active.last_row_count = Set(Some(output.rows.len() as i32));
    let saved = active.update(db).await?;

    Ok((saved, output))
}

/// Generate a report of the given type
pub async fn generate(
    db: &DatabaseConnection,
    report_type: &str,
    params: &ReportParams,
) -> Result<ReportOutput, ServiceError> {
    tracing::debug!("Generating {} report", report_type);
    match report_type {
        ASSET_REGISTER => asset_register(db, params).await,
        CHECKOUT_HISTORY => checkout_history(db, params).await,
        OVERDUE_CHECKOUTS => overdue_checkouts(db).await,
        MAINTENANCE_COSTS => maintenance_costs(db, params).await,
        INVENTORY_VALUATION => inventory_valuation(db, params).await,
        LOW_STOCK => low_stock(db).await,
        AUDIT_SUMMARY => audit_summary(db).await,
        other => Err(ServiceError::Validation(format!(
            "Unknown report_type '{}'",
            other
        ))),
    }
}

fn opt(value: &Option<String>) -> Value {
    value.as_ref().map(|v| json!(v)).unwrap_or(Value::Null)
}

async fn asset_register(
    db: &DatabaseConnection,
    params: &ReportParams,
) -> Result<ReportOutput, ServiceError> {
    let mut query = Asset::find().filter(asset::Column::IsDeleted.eq(false));
    if let Some(category) = non_blank(params.category.clone()) {
        query = query.filter(asset::Column::Category.eq(category));
    }
    if let Some(status) = non_blank(params.status.clone()) {
        query = query.filter(asset::Column::Status.eq(status));
    }
    let assets = query.order_by_asc(asset::Column::AssetTag).all(db).await?;

    let total_cost: f64 = assets.iter().filter_map(|a| a.purchase_cost).sum();
    let rows = assets
        .iter()
        .map(|a| {
            vec![
                json!(a.asset_tag),
                json!(a.name),
                opt(&a.category),
                json!(a.status),
                opt(&a.location),
                opt(&a.purchase_date),
                a.purchase_cost.map(|c| json!(c)).unwrap_or(Value::Null),
            ]
        })
        .collect();

    Ok(ReportOutput::new(
        ASSET_REGISTER,
        &[
            "Asset Tag",
            "Name",
            "Category",
            "Status",
            "Location",
            "Purchase Date",
            "Purchase Cost",
        ],
        rows,
        json!({ "asset_count": assets.len(), "total_purchase_cost": round_money(total_cost) }),
    ))
}

async fn checkout_history(
    db: &DatabaseConnection,
    params: &ReportParams,
) -> Result<ReportOutput, ServiceError> {
    let (from, to) = params.range()?;
    let checkouts = checkout_service::list_checkouts(db, Default::default()).await?;

    let in_range: Vec<_> = checkouts
        .into_iter()
        .filter(|c| from.as_ref().is_none_or(|f| &c.checkout_date >= f))
        .filter(|c| to.as_ref().is_none_or(|t| &c.checkout_date <= t))
        .collect();

    let active = in_range
        .iter()
        .filter(|c| c.status == checkout::STATUS_ACTIVE)
        .count();
    let rows = in_range
        .iter()
        .map(|c| {
            vec![
                json!(c.asset_tag),
                json!(c.asset_name),
                json!(c.employee_name),
                json!(c.checkout_date),
                opt(&c.due_date),
                opt(&c.return_date),
                json!(c.status),
            ]
        })
        .collect();

    Ok(ReportOutput::new(
        CHECKOUT_HISTORY,
        &[
            "Asset Tag",
            "Asset",
            "Employee",
            "Checkout Date",
            "Due Date",
            "Return Date",
            "Status",
        ],
        rows,
        json!({
            "checkouts": in_range.len(),
            "active": active,
            "returned": in_range.len() - active,
        }),
    ))
}

async fn overdue_checkouts(db: &DatabaseConnection) -> Result<ReportOutput, ServiceError> {
    let today = chrono::Utc::now().date_naive();
    let overdue = checkout_service::list_checkouts(
        db,
        checkout_service::CheckoutFilter {
            overdue: Some(true),
            ..Default::default()
        },
    )
    .await?;

    let rows = overdue
        .iter()
        .map(|c| {
            let days = c
                .due_date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, dates::DATE_FORMAT).ok())
                .map(|d| (today - d).num_days())
                .unwrap_or(0);
            vec![
                json!(c.asset_tag),
                json!(c.asset_name),
                json!(c.employee_name),
                json!(c.checkout_date),
                opt(&c.due_date),
                json!(days),
            ]
        })
        .collect();

    Ok(ReportOutput::new(
        OVERDUE_CHECKOUTS,
        &[
            "Asset Tag",
            "Asset",
            "Employee",
            "Checkout Date",
            "Due Date",
            "Days Overdue",
        ],
        rows,
        json!({ "overdue": overdue.len() }),
    ))
}

async fn maintenance_costs(
    db: &DatabaseConnection,
    params: &ReportParams,
) -> Result<ReportOutput, ServiceError> {
    let (from, to) = params.range()?;
    let mut query =
        Maintenance::find().filter(maintenance::Column::Status.eq(maintenance::STATUS_COMPLETED));
    if let Some(from) = from {
        query = query.filter(maintenance::Column::CompletedDate.gte(from));
    }
    if let Some(to) = to {
        query = query.filter(maintenance::Column::CompletedDate.lte(to));
    }
    let records = query.all(db).await?;

    // asset_id -> (record count, total cost)
    let mut per_asset: BTreeMap<i32, (u64, f64)> = BTreeMap::new();
    for r in &records {
        let entry = per_asset.entry(r.asset_id).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += r.cost.unwrap_or(0.0);
    }

    let assets = Asset::find()
        .filter(asset::Column::Id.is_in(per_asset.keys().copied().collect::<Vec<_>>()))
        .all(db)
        .await?;

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(per_asset.len());
    let mut total = 0.0;
    for (asset_id, (count, cost)) in &per_asset {
        total += cost;
        let asset = assets.iter().find(|a| a.id == *asset_id);
        rows.push(vec![
            json!(asset.map(|a| a.asset_tag.as_str()).unwrap_or("Unknown")),
            json!(asset.map(|a| a.name.as_str()).unwrap_or("Unknown")),
            json!(count),
            json!(round_money(*cost)),
        ]);
    }

    Ok(ReportOutput::new(
        MAINTENANCE_COSTS,
        &["Asset Tag", "Asset", "Records", "Total Cost"],
        rows,
        json!({ "records": records.len(), "total_cost": round_money(total) }),
    ))
}

async fn inventory_valuation(
    db: &DatabaseConnection,
    params: &ReportParams,
) -> Result<ReportOutput, ServiceError> {
    let mut query = InventoryItem::find().filter(inventory_item::Column::IsDeleted.eq(false));
    if let Some(category) = non_blank(params.category.clone()) {
        query = query.filter(inventory_item::Column::Category.eq(category));
    }
    let items = query
        .order_by_asc(inventory_item::Column::Sku)
        .all(db)
        .await?;

    let total_value: f64 = items.iter().map(|i| i.stock_value()).sum();
    let total_units: i64 = items.iter().map(|i| i64::from(i.quantity_on_hand)).sum();
    let rows = items
        .iter()
        .map(|i| {
            vec![
                json!(i.sku),
                json!(i.name),
                opt(&i.category),
                json!(i.quantity_on_hand),
                i.unit_cost.map(|c| json!(c)).unwrap_or(Value::Null),
                json!(round_money(i.stock_value())),
            ]
        })
        .collect();

    Ok(ReportOutput::new(
        INVENTORY_VALUATION,
        &["SKU", "Name", "Category", "Quantity", "Unit Cost", "Value"],
        rows,
        json!({ "items": items.len(), "total_units": total_units, "total_value": round_money(total_value) }),
    ))
}

async fn low_stock(db: &DatabaseConnection) -> Result<ReportOutput, ServiceError> {
    let items: Vec<_> = InventoryItem::find()
        .filter(inventory_item::Column::IsDeleted.eq(false))
        .order_by_asc(inventory_item::Column::Sku)
        .all(db)
        .await?
        .into_iter()
        .filter(|i| i.is_low_stock())
        .collect();

    let rows = items
        .iter()
        .map(|i| {
            vec![
                json!(i.sku),
                json!(i.name),
                json!(i.quantity_on_hand),
                json!(i.reorder_level),
                json!(i.reorder_level - i.quantity_on_hand),
            ]
        })
        .collect();

    Ok(ReportOutput::new(
        LOW_STOCK,
        &["SKU", "Name", "Quantity", "Reorder Level", "Shortfall"],
        rows,
        json!({ "low_stock_items": items.len() }),
    ))
}

async fn audit_summary(db: &DatabaseConnection) -> Result<ReportOutput, ServiceError> {
    let summary = audit_service::audit_summary(db).await?;
    let rows = summary
        .by_condition
        .iter()
        .map(|(condition, count)| vec![json!(condition), json!(count)])
        .collect();

    Ok(ReportOutput::new(
        AUDIT_SUMMARY,
        &["Condition", "Audits"],
        rows,
        json!({ "total_audits": summary.total_audits, "never_audited": summary.never_audited }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_types() {
        assert!(is_valid_report_type("low_stock"));
        assert!(!is_valid_report_type("pdf_export"));
    }

    #[test]
    fn test_params_range_rejects_inverted_dates() {
        let params = ReportParams {
            from: Some("2024-05-01".into()),
            to: Some("2024-04-01".into()),
            ..Default::default()
        };
        assert!(matches!(params.range(), Err(ServiceError::Validation(_))));

        let params = ReportParams {
            from: Some("2024-04-01".into()),
            ..Default::default()
        };
        assert_eq!(
            params.range().unwrap(),
            (Some("2024-04-01".to_string()), None)
        );
    }
}
