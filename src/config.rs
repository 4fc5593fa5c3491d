use rocket::figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_PATH: &str = "/api/v1";
pub const DEV_TOKEN_SECRET: &str = "dev-only-token-secret-change-me";
/// One week.
pub const MAX_INACTIVITY_MINUTES: i64 = 7 * 24 * 60;
/// One year.
pub const MAX_TOKEN_TTL_HOURS: i64 = 365 * 24;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub token: TokenConfig,
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_path: String,
    pub enable_swagger: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub cookie_secure: bool,
    /// Idle time after which a web session is discarded.
    pub inactivity_minutes: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TokenConfig {
    /// HMAC key for API tokens. Must be overridden outside the debug profile.
    pub secret: String,
    pub ttl_hours: i64,
}

/// Argon2 cost parameters used for new password hashes.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/worklog_db".to_string(),
            max_connections: 16,
            min_connections: 2,
            acquire_timeout: 5,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            address: "127.0.0.1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_credentials: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_API_BASE_PATH.to_string(),
            enable_swagger: true,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "worklog_session".to_string(),
            cookie_secure: false,
            inactivity_minutes: 30,
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: DEV_TOKEN_SECRET.to_string(),
            ttl_hours: 24,
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Worklog.toml (base configuration file)
    /// 2. Environment variables (prefixed with WORKLOG_, `__` separates sections)
    /// 3. DATABASE_URL environment variable
    pub fn load() -> Result<Self, figment::Error> {
        let defaults = toml::to_string(&Config::default()).map_err(|e| figment::Error::from(e.to_string()))?;

        let figment = Figment::new()
            .merge(Toml::string(&defaults))
            .merge(Toml::file("Worklog.toml"))
            // e.g. WORKLOG_SESSION__INACTIVITY_MINUTES=15
            .merge(Env::prefixed("WORKLOG_").split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects windows that would make every session or token expire at once,
    /// or that overflow the timestamp arithmetic.
    pub fn validate(&self) -> Result<(), figment::Error> {
        check_window("session.inactivity_minutes", self.session.inactivity_minutes, MAX_INACTIVITY_MINUTES)?;
        check_window("token.ttl_hours", self.token.ttl_hours, MAX_TOKEN_TTL_HOURS)
    }
}

fn check_window(key: &str, value: i64, max: i64) -> Result<(), figment::Error> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(figment::Error::from(format!("{key} must be between 1 and {max}, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_windows() {
        let config = Config::default();
        assert_eq!(config.session.inactivity_minutes, 30);
        assert_eq!(config.token.ttl_hours, 24);
        assert_eq!(config.api.base_path, "/api/v1");
    }

    #[test]
    fn load_reads_nested_environment_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("WORKLOG_SESSION__INACTIVITY_MINUTES", "15");
            jail.set_env("DATABASE_URL", "postgres://db.internal/worklog");

            let config = Config::load()?;
            assert_eq!(config.session.inactivity_minutes, 15);
            assert_eq!(config.database.url, "postgres://db.internal/worklog");
            assert_eq!(config.token.ttl_hours, 24);
            Ok(())
        });
    }

    #[test]
    fn validate_accepts_defaults_and_bounds() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.session.inactivity_minutes = MAX_INACTIVITY_MINUTES;
        config.token.ttl_hours = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_positive_and_oversized_windows() {
        let mut config = Config::default();
        config.session.inactivity_minutes = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("session.inactivity_minutes must be between 1 and 10080, got 0"));

        let mut config = Config::default();
        config.token.ttl_hours = MAX_TOKEN_TTL_HOURS + 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("token.ttl_hours"));
    }

    #[test]
    fn load_fails_on_invalid_windows() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("WORKLOG_SESSION__INACTIVITY_MINUTES", "-5");
            assert!(Config::load().is_err());

            jail.set_env("WORKLOG_SESSION__INACTIVITY_MINUTES", "30");
            jail.set_env("WORKLOG_TOKEN__TTL_HOURS", "0");
            assert!(Config::load().is_err());

            jail.set_env("WORKLOG_TOKEN__TTL_HOURS", "9223372036854775807");
            assert!(Config::load().is_err());

            jail.set_env("WORKLOG_TOKEN__TTL_HOURS", "48");
            assert_eq!(Config::load()?.token.ttl_hours, 48);
            Ok(())
        });
    }

    #[test]
    fn load_reads_worklog_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "Worklog.toml",
                r#"
                [token]
                secret = "from-file"
                ttl_hours = 12
                "#,
            )?;

            let config = Config::load()?;
            assert_eq!(config.token.secret, "from-file");
            assert_eq!(config.token.ttl_hours, 12);
            Ok(())
        });
    }
}
