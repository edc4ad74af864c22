use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub profile: String,
    pub db_connect_retries: u32,
    pub db_connect_timeout_secs: u64,
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_env_with_profile(None)
    }

    /// Like `from_env`, with a profile that takes precedence over `PROFILE`
    pub fn from_env_with_profile(profile: Option<String>) -> Self {
        let profile = profile
            .or_else(|| env::var("PROFILE").ok())
            .unwrap_or_else(|| "default".to_string());

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            if profile == "default" {
                "sqlite://assetdesk.db?mode=rwc".to_string()
            } else {
                format!("sqlite://assetdesk_{}.db?mode=rwc", profile)
            }
        });

        Self {
            database_url,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            profile,
            db_connect_retries: env::var("DB_CONNECT_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            db_connect_timeout_secs: env::var("DB_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            seed_demo: env::var("SEED_DEMO").is_ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_names_the_database_file() {
        if env::var("DATABASE_URL").is_ok() {
            return;
        }
        let config = Config::from_env_with_profile(Some("demo".to_string()));
        assert_eq!(config.profile, "demo");
        assert_eq!(config.database_url, "sqlite://assetdesk_demo.db?mode=rwc");
    }
}
