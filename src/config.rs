use anyhow::Context;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_DAILY_TARGET_HOURS: f64 = 8.0;

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub max_connections: u32,
    /// Base URL of the serverless email functions. Notifications are only
    /// logged when this is unset.
    pub notify_functions_url: Option<String>,
    pub notify_api_key: Option<String>,
    pub daily_target_hours: f64,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = non_empty("DATABASE_URL")
            .context("DATABASE_URL must be set to a production Postgres instance")?;

        let max_connections = match non_empty("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS is not a number: {raw}"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let daily_target_hours = match non_empty("FLEX_DAILY_TARGET_HOURS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("FLEX_DAILY_TARGET_HOURS is not a number: {raw}"))?,
            None => DEFAULT_DAILY_TARGET_HOURS,
        };

        Ok(Self {
            database_url,
            max_connections,
            notify_functions_url: non_empty("NOTIFY_FUNCTIONS_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            notify_api_key: non_empty("NOTIFY_API_KEY"),
            daily_target_hours,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn requires_database_url() {
        let err = Settings::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn applies_defaults() {
        let settings =
            Settings::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/shifts")])).unwrap();
        assert_eq!(settings.max_connections, 5);
        assert_eq!(settings.daily_target_hours, 8.0);
        assert!(settings.notify_functions_url.is_none());
    }

    #[test]
    fn reads_overrides_and_trims_function_url() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/shifts"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("FLEX_DAILY_TARGET_HOURS", "7.7"),
            ("NOTIFY_FUNCTIONS_URL", "https://functions.example.com/v1/"),
            ("NOTIFY_API_KEY", ""),
        ]))
        .unwrap();
        assert_eq!(settings.max_connections, 12);
        assert_eq!(settings.daily_target_hours, 7.7);
        assert_eq!(
            settings.notify_functions_url.as_deref(),
            Some("https://functions.example.com/v1")
        );
        assert!(settings.notify_api_key.is_none());
    }

    #[test]
    fn rejects_malformed_numbers() {
        let result = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/shifts"),
            ("DATABASE_MAX_CONNECTIONS", "many"),
        ]));
        assert!(result.is_err());
    }
}
