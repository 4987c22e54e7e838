//! Handles settings for the application. Configuration is read from
//! `settings.toml` (optional) and `AFORO__*` environment variables, e.g.
//! `AFORO__SERVER__PORT=8080`.
use config::{Config, ConfigError, Environment, File};
use delivery::SinkConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
    /// IANA name; commit timestamps are local to it.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    /// Idle sessions are dropped after this long.
    pub session_ttl_minutes: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Delivery {
    pub sink: SinkConfig,
    pub timeout_secs: Option<u64>,
    pub retries: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    pub delivery: Option<Delivery>,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
            timezone: default_timezone(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(
            Config::builder()
                .add_source(File::with_name("settings").required(false))
                .add_source(
                    Environment::with_prefix("AFORO")
                        .separator("__")
                        .try_parsing(true),
                )
                .build()?,
        )
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Settings {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap();
        Settings::from_config(config).unwrap()
    }

    #[test]
    fn full_settings() {
        let settings = parse(
            r#"
            [app]
            level = "debug"
            timezone = "America/Lima"

            [server]
            port = 3000
            database = { sqlite = "aforo.db" }
            session_ttl_minutes = 90

            [delivery]
            retries = 3

            [delivery.sink]
            kind = "gcs"
            bucket = "ledgers"
            token = "ya29.token"
            "#,
        );

        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.app.timezone, "America/Lima");

        let server = settings.server.unwrap();
        assert_eq!(server.port, 3000);
        assert!(server.bind.is_none());
        assert_eq!(server.session_ttl_minutes, Some(90));
        assert!(matches!(server.database, Database::Sqlite(path) if path == "aforo.db"));

        let delivery = settings.delivery.unwrap();
        assert_eq!(delivery.retries, Some(3));
        assert_eq!(delivery.timeout_secs, None);
        assert!(matches!(delivery.sink, SinkConfig::Gcs { bucket, .. } if bucket == "ledgers"));
    }

    #[test]
    fn defaults_and_memory_database() {
        let settings = parse(
            r#"
            [server]
            port = 8080
            database = "memory"
            "#,
        );

        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.app.timezone, "UTC");
        let server = settings.server.unwrap();
        assert!(matches!(server.database, Database::Memory));
        assert!(server.session_ttl_minutes.is_none());
        assert!(settings.delivery.is_none());
    }
}
