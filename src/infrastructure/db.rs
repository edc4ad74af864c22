use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::time::Duration;

const DEFAULT_CONNECT_RETRIES: u32 = 3;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    init_db_with(
        database_url,
        DEFAULT_CONNECT_RETRIES,
        DEFAULT_CONNECT_TIMEOUT_SECS,
    )
    .await
}

/// Connect (retrying a bounded number of times) and run migrations.
pub async fn init_db_with(
    database_url: &str,
    retries: u32,
    connect_timeout_secs: u64,
) -> Result<DatabaseConnection, DbErr> {
    let db = connect_with_retry(database_url, retries, connect_timeout_secs).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn connect_with_retry(
    database_url: &str,
    retries: u32,
    connect_timeout_secs: u64,
) -> Result<DatabaseConnection, DbErr> {
    let mut attempt = 0;
    loop {
        let mut options = ConnectOptions::new(database_url.to_owned());
        options
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .sqlx_logging(false);

        match Database::connect(options).await {
            Ok(db) => return Ok(db),
            Err(e) if attempt < retries => {
                attempt += 1;
                tracing::warn!(
                    "Database connection failed (attempt {}/{}): {}",
                    attempt,
                    retries + 1,
                    e
                );
                tokio::time::sleep(Duration::from_millis(500 * u64::from(attempt))).await;
            }
            Err(e) => {
                tracing::error!("Giving up on database after {} attempts", attempt + 1);
                return Err(e);
            }
        }
    }
}

async fn execute(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        sql.to_owned(),
    ))
    .await?;
    Ok(())
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT,
            department TEXT,
            phone TEXT,
            notes TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_employees_department ON employees(department)",
    )
    .await?;

    // Tags stay unique across soft-deleted rows so history never points at two assets
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS assets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            asset_tag TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            category TEXT,
            manufacturer TEXT,
            model TEXT,
            serial_number TEXT,
            location TEXT,
            purchase_date TEXT,
            purchase_cost REAL,
            warranty_expires TEXT,
            status TEXT NOT NULL DEFAULT 'available',
            notes TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_assets_status ON assets(status)",
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_assets_category ON assets(category)",
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS checkouts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            asset_id INTEGER NOT NULL,
            employee_id INTEGER NOT NULL,
            checkout_date TEXT NOT NULL,
            due_date TEXT,
            return_date TEXT,
            status TEXT NOT NULL DEFAULT 'active',
            checkout_notes TEXT,
            return_notes TEXT,
            return_condition TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (asset_id) REFERENCES assets(id) ON DELETE CASCADE,
            FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_checkouts_asset_id ON checkouts(asset_id)",
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_checkouts_employee_id ON checkouts(employee_id)",
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_checkouts_status ON checkouts(status)",
    )
    .await?;
    // At most one open checkout per asset
    execute(
        db,
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_checkouts_one_active ON checkouts(asset_id) WHERE status = 'active'",
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS audits (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            asset_id INTEGER NOT NULL,
            audited_by TEXT NOT NULL,
            audit_date TEXT NOT NULL,
            location_found TEXT,
            condition TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (asset_id) REFERENCES assets(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_audits_asset_id ON audits(asset_id)",
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS maintenance (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            asset_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            maintenance_type TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'scheduled',
            scheduled_date TEXT,
            started_at TEXT,
            completed_date TEXT,
            cost REAL,
            performed_by TEXT,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (asset_id) REFERENCES assets(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_maintenance_asset_id ON maintenance(asset_id)",
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS reservations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            asset_id INTEGER NOT NULL,
            employee_id INTEGER NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            purpose TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK (end_date >= start_date),
            FOREIGN KEY (asset_id) REFERENCES assets(id) ON DELETE CASCADE,
            FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_reservations_asset_id ON reservations(asset_id)",
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS inventory_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sku TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            category TEXT,
            unit TEXT NOT NULL DEFAULT 'each',
            quantity_on_hand INTEGER NOT NULL DEFAULT 0 CHECK (quantity_on_hand >= 0),
            reorder_level INTEGER NOT NULL DEFAULT 0 CHECK (reorder_level >= 0),
            location TEXT,
            unit_cost REAL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS inventory_transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            item_id INTEGER NOT NULL,
            transaction_type TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            balance_after INTEGER NOT NULL,
            reference TEXT NOT NULL,
            notes TEXT,
            performed_by TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (item_id) REFERENCES inventory_items(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_inventory_transactions_item_id ON inventory_transactions(item_id)",
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS reports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            report_type TEXT NOT NULL,
            parameters TEXT,
            created_by TEXT,
            last_generated_at TEXT,
            last_row_count INTEGER,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS activity_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entity_type TEXT NOT NULL,
            entity_id INTEGER NOT NULL,
            operation TEXT NOT NULL,
            payload TEXT,
            performed_by TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_activity_log_entity ON activity_log(entity_type, entity_id)",
    )
    .await?;

    tracing::debug!("Database migrations applied");
    Ok(())
}
