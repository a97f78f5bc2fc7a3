use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_port: u16,
    pub jwt_secret: String,
    /// Gateway secret key, used both for API calls and webhook signatures.
    /// May be empty outside production for local testing.
    pub paystack_secret_key: String,
    pub app_env: String,
    pub allowed_origin: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let config = Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            listen_port: std::env::var("LISTEN_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            paystack_secret_key: std::env::var("PAYSTACK_SECRET_KEY").unwrap_or_default(),
            app_env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            allowed_origin: std::env::var("ALLOWED_ORIGIN").ok(),
        };

        if config.is_production() && config.paystack_secret_key.is_empty() {
            anyhow::bail!("PAYSTACK_SECRET_KEY must be set in production");
        }

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}
