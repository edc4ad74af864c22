use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use assetdesk::{config, db, seed, server};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "assetdesk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    // Check for --profile CLI argument
    let args: Vec<String> = std::env::args().collect();
    let profile = args
        .iter()
        .position(|arg| arg == "--profile")
        .and_then(|pos| args.get(pos + 1))
        .cloned();

    let mut config = config::Config::from_env_with_profile(profile);
    if args.iter().any(|arg| arg == "--seed") {
        config.seed_demo = true;
    }

    tracing::info!("Starting assetdesk (profile: {})", config.profile);

    let db = match db::init_db_with(
        &config.database_url,
        config.db_connect_retries,
        config.db_connect_timeout_secs,
    )
    .await
    {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    if config.seed_demo {
        tracing::info!("Seeding demo data...");
        if let Err(e) = seed::seed_demo_data(&db).await {
            tracing::error!("Failed to seed data: {}", e);
        }
    }

    if let Err(e) = server::serve(&config, db).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
