use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::GatewayError;

/// Signing key used when `JWT_SECRET_KEY` is not set. Local development only.
pub const DEFAULT_JWT_SECRET: &str = "default_secret_key";

/// File name of the credential store inside `data_dir`.
pub const USERS_DB_FILE: &str = "users.db";

/// Extension every managed database file carries.
pub const DB_EXTENSION: &str = "db";

/// Process configuration, built once in `main` and handed to every component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub listen_addr: String,
    pub loglevel: String,
    /// Directory holding `users.db` and every `{db_name}.db`.
    pub data_dir: PathBuf,
    pub jwt_secret_key: String,
    /// Access token lifetime in seconds.
    pub token_ttl_secs: i64,
    /// Body limit applied to `/database/upload`.
    pub max_upload_bytes: usize,
    pub seed_username: String,
    pub seed_password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            loglevel: "info".to_string(),
            data_dir: PathBuf::from("data"),
            jwt_secret_key: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_secs: 15 * 60,
            max_upload_bytes: 256 * 1024 * 1024,
            seed_username: "user".to_string(),
            seed_password: "password".to_string(),
        }
    }
}

impl Config {
    /// Layer defaults, `SQLITE_GATEWAY_*` variables and the bare `JWT_SECRET_KEY`.
    pub fn load() -> Result<Self, GatewayError> {
        Self::figment().extract().map_err(GatewayError::from)
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("SQLITE_GATEWAY_"))
            .merge(Env::raw().only(&["JWT_SECRET_KEY"]))
    }

    pub fn users_db_path(&self) -> PathBuf {
        self.data_dir.join(USERS_DB_FILE)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret_key == DEFAULT_JWT_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert_eq!(cfg.token_ttl_secs, 900);
        assert_eq!(cfg.users_db_path(), PathBuf::from("data").join("users.db"));
        assert!(cfg.uses_default_secret());
    }

    #[test]
    fn environment_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("JWT_SECRET_KEY", "from-env");
            jail.set_env("SQLITE_GATEWAY_DATA_DIR", "/srv/gateway");
            jail.set_env("SQLITE_GATEWAY_TOKEN_TTL_SECS", "60");

            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.jwt_secret_key, "from-env");
            assert_eq!(cfg.data_dir, PathBuf::from("/srv/gateway"));
            assert_eq!(cfg.token_ttl_secs, 60);
            assert!(!cfg.uses_default_secret());
            Ok(())
        });
    }
}
