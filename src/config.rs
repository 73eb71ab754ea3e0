use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub cors_allowed_origin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Rows returned by the combined feed when the client gives no limit.
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let feed = FeedConfig {
            default_limit: parse_or("FEED_LIMIT", 50)?,
            max_limit: parse_or("MAX_FEED_LIMIT", 100)?,
        };
        if feed.default_limit == 0 || feed.default_limit > feed.max_limit {
            return Err(format!(
                "FEED_LIMIT must be between 1 and MAX_FEED_LIMIT ({})",
                feed.max_limit
            ));
        }

        let mut database = DatabaseConfig::with_url(
            &env::var("DATABASE_URL").unwrap_or_else(|_| "memory://".to_string()),
        );
        if let Ok(namespace) = env::var("SURREAL_NS") {
            database.namespace = namespace;
        }
        if let Ok(name) = env::var("SURREAL_DB") {
            database.database = name;
        }
        database.username = env::var("SURREAL_USER").ok();
        database.password = env::var("SURREAL_PASS").ok();

        Ok(Config {
            database,
            server: ServerConfig {
                port: parse_or("PORT", 8080)?,
                cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN").ok(),
            },
            feed,
        })
    }
}

impl DatabaseConfig {
    pub fn with_url(url: &str) -> Self {
        Self {
            url: url.to_string(),
            namespace: "circles".to_string(),
            database: "main".to_string(),
            username: None,
            password: None,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 100,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| format!("{key} has an invalid value: {value}")),
        Err(_) => Ok(default),
    }
}
