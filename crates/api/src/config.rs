use beyond_store::StoreConfig;

use crate::auth::jwt::JwtConfig;
use crate::auth::password::hash_password;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Hosted backend connection settings.
    pub store: StoreConfig,
    /// The single admin account.
    pub admin: AdminConfig,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    ///
    /// Store, admin and JWT settings are read by [`StoreConfig::from_env`],
    /// [`AdminConfig::from_env`] and [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            store: StoreConfig::from_env(),
            admin: AdminConfig::from_env(),
            jwt: JwtConfig::from_env(),
        }
    }
}

/// Admin credentials. Only the Argon2id hash is kept in memory.
#[derive(Clone)]
pub struct AdminConfig {
    pub username: String,
    /// PHC-formatted Argon2id hash.
    pub password_hash: String,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl AdminConfig {
    /// Load admin credentials from environment variables.
    ///
    /// | Env Var               | Required        | Default |
    /// |-----------------------|-----------------|---------|
    /// | `ADMIN_USERNAME`      | no              | `admin` |
    /// | `ADMIN_PASSWORD_HASH` | one of the two  | --      |
    /// | `ADMIN_PASSWORD`      | one of the two  | --      |
    ///
    /// # Panics
    ///
    /// Panics if neither password variable is set, or if the plaintext
    /// password cannot be hashed.
    pub fn from_env() -> Self {
        let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into());

        let password_hash = match std::env::var("ADMIN_PASSWORD_HASH") {
            Ok(hash) if !hash.is_empty() => hash,
            _ => {
                let plain = std::env::var("ADMIN_PASSWORD")
                    .expect("ADMIN_PASSWORD_HASH or ADMIN_PASSWORD must be set");
                assert!(!plain.is_empty(), "ADMIN_PASSWORD must not be empty");
                tracing::warn!("ADMIN_PASSWORD is set in plaintext; prefer ADMIN_PASSWORD_HASH");
                hash_password(&plain).expect("Failed to hash ADMIN_PASSWORD")
            }
        };

        Self {
            username,
            password_hash,
        }
    }
}
