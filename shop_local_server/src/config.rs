use std::env;

use chrono::Duration;
use log::*;
use rand::{distributions::Alphanumeric, Rng};
use sl_common::Secret;

const DEFAULT_SL_HOST: &str = "127.0.0.1";
const DEFAULT_SL_PORT: u16 = 8360;
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::hours(24);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SL_HOST.to_string(),
            port: DEFAULT_SL_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SL_HOST").ok().unwrap_or_else(|| DEFAULT_SL_HOST.into());
        let port = env::var("SL_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for SL_PORT. {e} Using the default, {DEFAULT_SL_PORT}, instead.");
                    DEFAULT_SL_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SL_PORT);
        let database_url = env::var("SL_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SL_DATABASE_URL is not set. Please set it to the URL for the ShopLocal database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to \
                 the default configuration."
            );
            AuthConfig::default()
        });
        Self { host, port, database_url, auth }
    }
}

//-------------------------------------------------  AuthConfig  -----------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The secret used to sign and verify access tokens (HMAC-SHA256).
    pub jwt_secret: Secret<String>,
    /// How long issued access tokens remain valid. They do not refresh.
    pub token_lifetime: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. DO NOT operate on \
             production like this, since every issued token dies with this process. Set SL_JWT_SECRET instead. 🚨️🚨️🚨️"
        );
        let secret = rand::thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect::<String>();
        Self { jwt_secret: Secret::new(secret), token_lifetime: DEFAULT_TOKEN_LIFETIME }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, String> {
        let secret = env::var("SL_JWT_SECRET").map_err(|e| format!("{e} [SL_JWT_SECRET]"))?;
        if secret.len() < 32 {
            return Err("SL_JWT_SECRET must be at least 32 characters long".to_string());
        }
        let token_lifetime = env::var("SL_TOKEN_LIFETIME_HOURS")
            .map_err(|_| {
                info!(
                    "🪛️ SL_TOKEN_LIFETIME_HOURS is not set. Using the default value of {} hrs.",
                    DEFAULT_TOKEN_LIFETIME.num_hours()
                )
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .map(Duration::hours)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for SL_TOKEN_LIFETIME_HOURS. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);
        Ok(Self { jwt_secret: Secret::new(secret), token_lifetime })
    }
}
