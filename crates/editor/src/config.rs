use std::time::Duration;

/// Debounce delay before an edit is auto-saved.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 3000;

/// Draft session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Quiet period after the last edit before an auto-save fires.
    pub autosave_delay: Duration,
    /// When `false`, edits only mark the draft dirty; saves are manual.
    pub autosave_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autosave_delay: Duration::from_millis(DEFAULT_AUTOSAVE_DELAY_MS),
            autosave_enabled: true,
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var             | Default |
    /// |---------------------|---------|
    /// | `AUTOSAVE_DELAY_MS` | `3000`  |
    /// | `AUTOSAVE_ENABLED`  | `true`  |
    ///
    /// Unparseable values fall back to the default with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let autosave_delay = match lookup("AUTOSAVE_DELAY_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    tracing::warn!(value = %raw, "AUTOSAVE_DELAY_MS is not a valid u64, using default");
                    defaults.autosave_delay
                }
            },
            None => defaults.autosave_delay,
        };

        let autosave_enabled = match lookup("AUTOSAVE_ENABLED") {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    tracing::warn!(value = %raw, "AUTOSAVE_ENABLED is not a boolean, using default");
                    defaults.autosave_enabled
                }
            },
            None => defaults.autosave_enabled,
        };

        Self {
            autosave_delay,
            autosave_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SessionConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.autosave_delay, Duration::from_millis(3000));
        assert!(config.autosave_enabled);
    }

    #[test]
    fn test_overrides() {
        let config = SessionConfig::from_lookup(lookup_from(&[
            ("AUTOSAVE_DELAY_MS", "500"),
            ("AUTOSAVE_ENABLED", "off"),
        ]));
        assert_eq!(config.autosave_delay, Duration::from_millis(500));
        assert!(!config.autosave_enabled);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = SessionConfig::from_lookup(lookup_from(&[
            ("AUTOSAVE_DELAY_MS", "soon"),
            ("AUTOSAVE_ENABLED", "maybe"),
        ]));
        assert_eq!(config.autosave_delay, Duration::from_millis(3000));
        assert!(config.autosave_enabled);
    }
}
