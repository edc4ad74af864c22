use crate::infrastructure::auth::hash_password;
use crate::models::{asset, employee, inventory_item, user};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = chrono::Utc::now().to_rfc3339();

    // 1. Users
    let admin_password = hash_password("admin").map_err(DbErr::Custom)?;
    let admin = user::ActiveModel {
        username: Set("admin".to_owned()),
        password_hash: Set(admin_password),
        role: Set("admin".to_owned()),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    };
    user::Entity::insert(admin)
        .on_conflict(
            OnConflict::column(user::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    // 2. Employees (only on an empty table; they carry no unique key)
    if employee::Entity::find().count(db).await? == 0 {
        let employees = [
            ("Grace Hopper", "grace@example.com", "Engineering"),
            ("Alan Turing", "alan@example.com", "Research"),
            ("Katherine Johnson", "katherine@example.com", "Operations"),
        ];
        for (name, email, department) in employees {
            let row = employee::ActiveModel {
                name: Set(name.to_owned()),
                email: Set(Some(email.to_owned())),
                department: Set(Some(department.to_owned())),
                phone: Set(None),
                notes: Set(None),
                is_active: Set(true),
                created_at: Set(now.clone()),
                updated_at: Set(now.clone()),
                ..Default::default()
            };
            employee::Entity::insert(row).exec(db).await?;
        }
    }

    // 3. Assets
    let assets = [
        ("LT-0001", "ThinkPad T14", "Laptop", "Lenovo", "HQ-2F", 1349.0),
        ("LT-0002", "MacBook Pro 14", "Laptop", "Apple", "HQ-2F", 2199.0),
        ("MN-0001", "UltraSharp 27", "Monitor", "Dell", "HQ-3F", 429.0),
        ("PR-0001", "LaserJet M404", "Printer", "HP", "HQ-1F", 319.0),
        ("PJ-0001", "EpiqVision Mini", "Projector", "Epson", "Meeting Room A", 899.0),
    ];
    for (tag, name, category, manufacturer, location, cost) in assets {
        let row = asset::ActiveModel {
            asset_tag: Set(tag.to_owned()),
            name: Set(name.to_owned()),
            category: Set(Some(category.to_owned())),
            manufacturer: Set(Some(manufacturer.to_owned())),
            model: Set(None),
            serial_number: Set(None),
            location: Set(Some(location.to_owned())),
            purchase_date: Set(Some("2024-01-15".to_owned())),
            purchase_cost: Set(Some(cost)),
            warranty_expires: Set(Some("2027-01-15".to_owned())),
            status: Set(asset::STATUS_AVAILABLE.to_owned()),
            notes: Set(None),
            is_deleted: Set(false),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        asset::Entity::insert(row)
            .on_conflict(
                OnConflict::column(asset::Column::AssetTag)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    // 4. Consumables. Seeded stock is written directly; the ledger starts empty.
    let items = [
        ("TONER-404", "Toner cartridge 59A", "Printer supplies", 6, 2, 89.0),
        ("PAPER-A4", "A4 paper ream", "Office supplies", 40, 10, 4.5),
        ("USB-C-CBL", "USB-C cable 1m", "Cables", 3, 5, 9.9),
    ];
    for (sku, name, category, quantity, reorder_level, unit_cost) in items {
        let row = inventory_item::ActiveModel {
            sku: Set(sku.to_owned()),
            name: Set(name.to_owned()),
            category: Set(Some(category.to_owned())),
            unit: Set("each".to_owned()),
            quantity_on_hand: Set(quantity),
            reorder_level: Set(reorder_level),
            location: Set(Some("Supply closet".to_owned())),
            unit_cost: Set(Some(unit_cost)),
            is_deleted: Set(false),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        inventory_item::Entity::insert(row)
            .on_conflict(
                OnConflict::column(inventory_item::Column::Sku)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    tracing::info!("Demo data seeded");
    Ok(())
}
