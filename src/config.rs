use std::str::FromStr;

use rand::RngCore;

const PRODUCTION_ENV_VALUES: [&str; 2] = ["production", "prod"];

/// Which [`crate::store::DocumentStore`] backend to build at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => anyhow::bail!("unknown store backend '{}': expected postgres or memory", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store: StoreBackend,
    pub database_url: String,
    /// Name of the single employee collection (table).
    pub collection: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub demo_username: String,
    pub demo_password: String,
    /// Extra CORS origin besides localhost.
    pub dashboard_origin: String,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    from_lookup(|key| std::env::var(key).ok())
}

/// Build a [`Config`] from any key lookup. `load()` passes the process env.
pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let jwt_secret = match get("EMPLOYEES_JWT_SECRET") {
        Some(secret) => {
            if secret.len() < 32 {
                anyhow::bail!("EMPLOYEES_JWT_SECRET must be at least 32 characters long");
            }
            secret
        }
        None => {
            let env_mode = get("EMPLOYEES_ENV")
                .or_else(|| get("RUST_ENV"))
                .unwrap_or_default();
            if PRODUCTION_ENV_VALUES.contains(&env_mode.as_str()) {
                anyhow::bail!(
                    "EMPLOYEES_JWT_SECRET is not set. \
                     Set a secret of at least 32 characters before running in production."
                );
            }
            tracing::warn!(
                "EMPLOYEES_JWT_SECRET is not set, using a random per-process secret; \
                 issued tokens will not survive a restart"
            );
            random_secret()
        }
    };

    Ok(Config {
        port: parse_or("EMPLOYEES_PORT", get("EMPLOYEES_PORT"), 8000)?,
        store: parse_or("EMPLOYEES_STORE", get("EMPLOYEES_STORE"), StoreBackend::Postgres)?,
        database_url: get("DATABASE_URL")
            .unwrap_or_else(|| "postgres://localhost/employees".into()),
        collection: get("EMPLOYEES_COLLECTION").unwrap_or_else(|| "employees".into()),
        db_max_connections: parse_or(
            "EMPLOYEES_DB_MAX_CONNECTIONS",
            get("EMPLOYEES_DB_MAX_CONNECTIONS"),
            10,
        )?,
        jwt_secret,
        token_ttl_minutes: parse_or(
            "EMPLOYEES_TOKEN_TTL_MINUTES",
            get("EMPLOYEES_TOKEN_TTL_MINUTES"),
            crate::auth::jwt::DEFAULT_TOKEN_TTL_MINUTES,
        )?,
        demo_username: get("EMPLOYEES_DEMO_USERNAME").unwrap_or_else(|| "demo".into()),
        demo_password: get("EMPLOYEES_DEMO_PASSWORD").unwrap_or_else(|| "demo-password".into()),
        dashboard_origin: get("DASHBOARD_ORIGIN")
            .unwrap_or_else(|| "http://localhost:3000".into()),
    })
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid value for {}: '{}' ({})", key, v, e)),
        None => Ok(default),
    }
}

fn random_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
