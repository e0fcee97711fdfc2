//! Handles settings for the daemon. Configuration is read from an optional
//! `settings.toml` and from `SHAREPOT__*` environment variables, e.g.
//! `SHAREPOT__APP__LEVEL=debug` or
//! `SHAREPOT__HOUSEHOLD__PARTICIPANTS=alice,bob`.
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File, FileFormat};
use engine::Participants;
use serde::Deserialize;

const DEFAULT_TIMEZONE: &str = "Europe/Paris";
const ONE_DAY_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Household {
    /// Configuration order defines participant 1 and participant 2.
    pub participants: Vec<String>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Scheduler {
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_run_on_start")]
    pub run_on_start: bool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            run_on_start: default_run_on_start(),
        }
    }
}

fn default_interval() -> u64 {
    ONE_DAY_SECS
}

fn default_run_on_start() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub household: Household,
    pub database: Database,
    #[serde(default)]
    pub scheduler: Scheduler,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::build(Config::builder().add_source(File::with_name("settings").required(false)))
    }

    /// Settings from a TOML document, still subject to environment overrides.
    pub fn from_toml(document: &str) -> Result<Self, ConfigError> {
        Self::build(Config::builder().add_source(File::from_str(document, FileFormat::Toml)))
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let settings: Self = builder
            .add_source(
                Environment::with_prefix("SHAREPOT")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("household.participants")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.participants()?;
        settings.timezone()?;
        if settings.scheduler.interval_secs == 0 {
            return Err(ConfigError::Message(
                "scheduler.interval_secs must be > 0".to_string(),
            ));
        }
        Ok(settings)
    }

    /// The configured pair, in configuration order.
    pub fn participants(&self) -> Result<Participants, ConfigError> {
        match self.household.participants.as_slice() {
            [first, second] => Participants::new(first.as_str(), second.as_str())
                .map_err(|err| ConfigError::Message(err.to_string())),
            other => Err(ConfigError::Message(format!(
                "household.participants needs exactly two ids, got {}",
                other.len()
            ))),
        }
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.household.timezone.parse::<Tz>().map_err(|err| {
            ConfigError::Message(format!(
                "invalid household.timezone {:?}: {err}",
                self.household.timezone
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_full_document() {
        let settings = Settings::from_toml(
            r#"
            [app]
            level = "debug"

            [household]
            participants = ["Claire", "Malo"]
            timezone = "Europe/Rome"

            [database]
            sqlite = "./household.db"

            [scheduler]
            interval_secs = 3600
            run_on_start = false
            "#,
        )
        .unwrap();

        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.database, Database::Sqlite("./household.db".to_string()));
        assert_eq!(settings.scheduler.interval_secs, 3600);
        assert!(!settings.scheduler.run_on_start);
        assert_eq!(settings.timezone().unwrap(), chrono_tz::Europe::Rome);
        let participants = settings.participants().unwrap();
        assert_eq!(participants.first(), "Claire");
        assert_eq!(participants.second(), "Malo");
    }

    #[test]
    fn defaults_apply() {
        let settings = Settings::from_toml(
            r#"
            database = "memory"

            [household]
            participants = ["Claire", "Malo"]
            "#,
        )
        .unwrap();

        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.database, Database::Memory);
        assert_eq!(settings.scheduler.interval_secs, 86_400);
        assert!(settings.scheduler.run_on_start);
        assert_eq!(settings.timezone().unwrap(), chrono_tz::Europe::Paris);
    }

    #[test]
    fn rejects_a_household_that_is_not_a_pair() {
        let err = Settings::from_toml(
            r#"
            database = "memory"

            [household]
            participants = ["Claire"]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("exactly two"));

        let err = Settings::from_toml(
            r#"
            database = "memory"

            [household]
            participants = ["Claire", "Claire"]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("different"));
    }

    #[test]
    fn rejects_unknown_timezone() {
        let err = Settings::from_toml(
            r#"
            database = "memory"

            [household]
            participants = ["Claire", "Malo"]
            timezone = "Mars/Olympus"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("timezone"));
    }
}
