use crate::errors::AppError;

const DEFAULT_NOTION_BASE_URL: &str = "https://api.notion.com/v1";
const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
const DEFAULT_AMOUNT_UNIT: &str = "억";

/// Deployment environment. Controls how much diagnostic detail 500 responses carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Anything that is not clearly a development setting is treated as production.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" | "test" => Environment::Development,
            _ => Environment::Production,
        }
    }

    pub fn exposes_error_details(self) -> bool {
        matches!(self, Environment::Development)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub notion_api_key: Option<String>,
    pub notion_database_id: Option<String>,
    pub notion_base_url: String,
    pub notion_version: String,
    pub environment: Environment,
    pub amount_unit: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Notion Base URL: {}", config.notion_base_url);
        tracing::debug!("Notion Version: {}", config.notion_version);
        tracing::debug!("Environment: {:?}", config.environment);
        tracing::debug!("Server Port: {}", config.port);

        if config.notion_api_key.is_none() {
            tracing::error!("NOTION_API_KEY is not set; every save request will fail");
        }
        if config.notion_database_id.is_none() {
            tracing::error!("NOTION_DATABASE_ID is not set; every save request will fail");
        }

        Ok(config)
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Malformed values fail immediately. The Notion credential and database id may be
    /// absent here; [`Config::store_target`] reports that per request.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            port: non_empty("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            notion_api_key: non_empty("NOTION_API_KEY").map(|key| key.trim().to_string()),
            notion_database_id: non_empty("NOTION_DATABASE_ID").map(|id| id.trim().to_string()),
            notion_base_url: validate_base_url(
                non_empty("NOTION_BASE_URL")
                    .map(|url| url.trim().trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_NOTION_BASE_URL.to_string()),
            )?,
            notion_version: non_empty("NOTION_VERSION")
                .unwrap_or_else(|| DEFAULT_NOTION_VERSION.to_string()),
            environment: non_empty("APP_ENV")
                .or_else(|| non_empty("NODE_ENV"))
                .map(|raw| Environment::parse(&raw))
                .unwrap_or(Environment::Production),
            amount_unit: non_empty("AMOUNT_UNIT")
                .map(|unit| unit.trim().to_string())
                .unwrap_or_else(|| DEFAULT_AMOUNT_UNIT.to_string()),
        })
    }

    /// Returns `(api_key, database_id)` or a configuration error naming what is missing.
    pub fn store_target(&self) -> Result<(&str, &str), AppError> {
        let api_key = self
            .notion_api_key
            .as_deref()
            .ok_or_else(|| AppError::Configuration("NOTION_API_KEY is not configured".to_string()))?;
        let database_id = self.notion_database_id.as_deref().ok_or_else(|| {
            AppError::Configuration("NOTION_DATABASE_ID is not configured".to_string())
        })?;
        Ok((api_key, database_id))
    }
}

fn validate_base_url(url: String) -> anyhow::Result<String> {
    let parsed = url::Url::parse(&url)
        .map_err(|e| anyhow::anyhow!("NOTION_BASE_URL is not a valid URL: {}", e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("NOTION_BASE_URL must start with http:// or https://");
    }
    Ok(url)
}
